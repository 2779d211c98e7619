//! Dependency errors

use thiserror::Error;

/// A dependency problem that prevents ordering the units
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DependencyError {
    /// A hard requirement names a unit that is not in the universe
    #[error("Missing unit {name}{}", required_by_suffix(.required_by))]
    MissingUnit {
        /// Id of the missing unit
        name: String,
        /// Unit listing the requirement, `None` for units requested directly
        required_by: Option<String>,
    },

    /// Units requiring each other without a break edge, first and last
    /// entries of the path are the same unit
    #[error("Circular dependency: {}", .0.join(" >> "))]
    Cycle(Vec<String>),
}

fn required_by_suffix(required_by: &Option<String>) -> String {
    match required_by {
        Some(unit) => format!(" required by {}", unit),
        None => String::new(),
    }
}

/// Result type for resolver operations
pub type DependencyResult<T> = Result<T, DependencyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_unit_message() {
        let error = DependencyError::MissingUnit {
            name: "app.Missing".to_string(),
            required_by: Some("app.Main".to_string()),
        };
        assert_eq!(error.to_string(), "Missing unit app.Missing required by app.Main");

        let error = DependencyError::MissingUnit {
            name: "app.Main".to_string(),
            required_by: None,
        };
        assert_eq!(error.to_string(), "Missing unit app.Main");
    }

    #[test]
    fn test_cycle_message() {
        let error = DependencyError::Cycle(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(error.to_string(), "Circular dependency: a >> b >> a");
    }
}
