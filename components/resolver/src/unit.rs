//! Units and their dependency metadata

use std::collections::BTreeSet;

use parser::Scope;
use serde::{Deserialize, Serialize};

/// Dependency declarations of one unit
///
/// Produced from tags in the unit's comments by the caller.
///
/// # Examples
///
/// ```
/// use resolver::Meta;
///
/// let meta = Meta::new()
///     .with_name("app.Main")
///     .with_require("app.util.*")
///     .with_break("app.Late");
/// assert!(meta.breaks.contains("app.Late"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// Exported name declared by the unit
    pub name: Option<String>,
    /// Units that must be loaded before this one. A trailing `.*` matches
    /// every unit below a namespace.
    pub requires: BTreeSet<String>,
    /// Units loaded before this one when they exist
    pub optional: BTreeSet<String>,
    /// Units whose ordering constraint with this one is relaxed; this unit
    /// is laid out after them
    pub breaks: BTreeSet<String>,
    /// Asset globs used by the unit
    pub assets: BTreeSet<String>,
}

impl Meta {
    /// Empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the declared name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a hard requirement
    pub fn with_require(mut self, id: impl Into<String>) -> Self {
        self.requires.insert(id.into());
        self
    }

    /// Add an optional requirement
    pub fn with_optional(mut self, id: impl Into<String>) -> Self {
        self.optional.insert(id.into());
        self
    }

    /// Add a break edge
    pub fn with_break(mut self, id: impl Into<String>) -> Self {
        self.breaks.insert(id.into());
        self
    }

    /// Add an asset glob
    pub fn with_asset(mut self, glob: impl Into<String>) -> Self {
        self.assets.insert(glob.into());
        self
    }
}

/// A compilation unit as seen by the resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    /// Dotted unit id, like `app.util.Strings`
    pub id: String,
    /// Declared dependencies
    pub meta: Meta,
    /// Free names the unit reads
    pub shared: BTreeSet<String>,
    /// Dotted chains rooted at free names, like `app.util.Strings.trim`
    pub packages: BTreeSet<String>,
}

impl Unit {
    /// Unit without scope information
    pub fn new(id: impl Into<String>, meta: Meta) -> Self {
        Self {
            id: id.into(),
            meta,
            shared: BTreeSet::new(),
            packages: BTreeSet::new(),
        }
    }

    /// Unit using the free names and packages of its top level scope
    pub fn with_scope(id: impl Into<String>, meta: Meta, scope: &Scope) -> Self {
        Self {
            id: id.into(),
            meta,
            shared: scope.shared.keys().cloned().collect(),
            packages: scope.packages.clone(),
        }
    }

    /// Whether a break edge relaxes the ordering between this unit and `other`
    pub fn is_broken_with(&self, other: &Unit) -> bool {
        self.meta.breaks.contains(&other.id) || other.meta.breaks.contains(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parser::{parse, scan_tree};

    #[test]
    fn test_unit_from_scope() {
        let mut ast = parse("var local = app.util.Strings.trim(x); local.y();", "main.js").unwrap();
        let scope = scan_tree(&mut ast);
        let unit = Unit::with_scope("app.Main", Meta::new(), &scope);
        assert!(unit.shared.contains("app"));
        assert!(unit.shared.contains("x"));
        assert!(!unit.shared.contains("local"));
        assert!(unit.packages.contains("app.util.Strings.trim"));
        assert!(!unit.packages.iter().any(|p| p.starts_with("local")));
    }

    #[test]
    fn test_break_is_symmetric() {
        let a = Unit::new("a", Meta::new());
        let b = Unit::new("b", Meta::new().with_break("a"));
        assert!(a.is_broken_with(&b));
        assert!(b.is_broken_with(&a));
    }

    #[test]
    fn test_meta_serde_round_trip() {
        let meta = Meta::new().with_name("x").with_optional("y").with_asset("img/*.png");
        let json = serde_json::to_string(&meta).unwrap();
        let back: Meta = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }
}
