//! The set of known units

use std::collections::BTreeMap;

use crate::unit::Unit;

/// All units available to a build, keyed by id
#[derive(Debug, Clone, Default)]
pub struct Universe {
    units: BTreeMap<String, Unit>,
}

impl Universe {
    /// Create an empty universe
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit, replacing a unit with the same id
    pub fn add(&mut self, unit: Unit) {
        self.units.insert(unit.id.clone(), unit);
    }

    /// Look up a unit
    pub fn get(&self, id: &str) -> Option<&Unit> {
        self.units.get(id)
    }

    /// Whether a unit exists
    pub fn contains(&self, id: &str) -> bool {
        self.units.contains_key(id)
    }

    /// Number of units
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the universe has no units
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Unit ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }

    /// Ids of the units below a namespace, for `a.b.*` requirements
    pub fn below(&self, namespace: &str) -> Vec<&str> {
        let prefix = format!("{}.", namespace);
        self.units
            .range(prefix.clone()..)
            .take_while(|(id, _)| id.starts_with(&prefix))
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Longest unit id that is a prefix of a dotted chain, at segment boundaries
    ///
    /// # Examples
    ///
    /// ```
    /// use resolver::{Meta, Unit, Universe};
    ///
    /// let mut universe = Universe::new();
    /// universe.add(Unit::new("app", Meta::new()));
    /// universe.add(Unit::new("app.util", Meta::new()));
    /// assert_eq!(universe.longest_prefix("app.util.trim"), Some("app.util"));
    /// assert_eq!(universe.longest_prefix("application.x"), None);
    /// ```
    pub fn longest_prefix(&self, package: &str) -> Option<&str> {
        let mut candidate = package;
        loop {
            if let Some((id, _)) = self.units.get_key_value(candidate) {
                return Some(id.as_str());
            }
            match candidate.rfind('.') {
                Some(dot) => candidate = &candidate[..dot],
                None => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::Meta;

    fn universe(ids: &[&str]) -> Universe {
        let mut universe = Universe::new();
        for id in ids {
            universe.add(Unit::new(*id, Meta::new()));
        }
        universe
    }

    #[test]
    fn test_units_below_namespace() {
        let universe = universe(&["app.Main", "app.util.A", "app.util.B", "app.utility", "lib.X"]);
        assert_eq!(universe.below("app.util"), vec!["app.util.A", "app.util.B"]);
        assert!(universe.below("none").is_empty());
    }

    #[test]
    fn test_longest_prefix() {
        let universe = universe(&["core", "core.Env"]);
        assert_eq!(universe.longest_prefix("core.Env.getValue"), Some("core.Env"));
        assert_eq!(universe.longest_prefix("core.Other.x"), Some("core"));
        assert_eq!(universe.longest_prefix("core"), Some("core"));
        assert_eq!(universe.longest_prefix("corex.y"), None);
    }
}
