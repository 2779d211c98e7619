//! Transitive closure of required units

use std::collections::{BTreeSet, VecDeque};

use tracing::{debug, trace, warn};

use crate::error::{DependencyError, DependencyResult};
use crate::universe::Universe;

/// Computes which units a build needs
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    universe: &'a Universe,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over a universe
    pub fn new(universe: &'a Universe) -> Self {
        Self { universe }
    }

    /// The universe units are resolved in
    pub fn universe(&self) -> &'a Universe {
        self.universe
    }

    /// Direct dependencies of a unit
    ///
    /// Hard requirements (globs expanded), optional requirements that
    /// exist, units owning the packages the unit accesses and units named
    /// like a free name of the unit. The unit itself is never included.
    pub fn dependencies(&self, id: &str) -> DependencyResult<BTreeSet<String>> {
        let unit = self.universe.get(id).ok_or_else(|| DependencyError::MissingUnit {
            name: id.to_string(),
            required_by: None,
        })?;
        let mut found = BTreeSet::new();

        for required in &unit.meta.requires {
            if let Some(namespace) = required.strip_suffix(".*") {
                let matches = self.universe.below(namespace);
                if matches.is_empty() {
                    warn!(unit = id, pattern = %required, "requirement matches no unit");
                }
                found.extend(matches.into_iter().map(str::to_string));
            } else if self.universe.contains(required) {
                found.insert(required.clone());
            } else {
                return Err(DependencyError::MissingUnit {
                    name: required.clone(),
                    required_by: Some(id.to_string()),
                });
            }
        }

        for optional in &unit.meta.optional {
            if self.universe.contains(optional) {
                found.insert(optional.clone());
            } else {
                warn!(unit = id, optional = %optional, "optional unit not found");
            }
        }

        for package in &unit.packages {
            if let Some(owner) = self.universe.longest_prefix(package) {
                trace!(unit = id, package = %package, owner, "package dependency");
                found.insert(owner.to_string());
            }
        }

        for name in &unit.shared {
            if self.universe.contains(name) {
                found.insert(name.clone());
            }
        }

        found.remove(id);
        Ok(found)
    }

    /// All units needed by a set of required units, including themselves
    ///
    /// # Examples
    ///
    /// ```
    /// use resolver::{Meta, Resolver, Unit, Universe};
    ///
    /// let mut universe = Universe::new();
    /// universe.add(Unit::new("app.Main", Meta::new().with_require("app.Util")));
    /// universe.add(Unit::new("app.Util", Meta::new()));
    /// universe.add(Unit::new("app.Unused", Meta::new()));
    ///
    /// let needed = Resolver::new(&universe).resolve(["app.Main"]).unwrap();
    /// assert_eq!(needed.into_iter().collect::<Vec<_>>(), vec!["app.Main", "app.Util"]);
    /// ```
    pub fn resolve<I, S>(&self, required: I) -> DependencyResult<BTreeSet<String>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut needed = BTreeSet::new();
        let mut queue: VecDeque<String> = VecDeque::new();
        for id in required {
            let id = id.into();
            if !self.universe.contains(&id) {
                return Err(DependencyError::MissingUnit {
                    name: id,
                    required_by: None,
                });
            }
            if needed.insert(id.clone()) {
                queue.push_back(id);
            }
        }

        while let Some(id) = queue.pop_front() {
            for dependency in self.dependencies(&id)? {
                if needed.insert(dependency.clone()) {
                    queue.push_back(dependency);
                }
            }
        }

        debug!(units = needed.len(), "resolved dependencies");
        Ok(needed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::{Meta, Unit};

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_glob_requirement() {
        let mut universe = Universe::new();
        universe.add(Unit::new("main", Meta::new().with_require("ui.*").with_require("none.*")));
        universe.add(Unit::new("ui.Button", Meta::new()));
        universe.add(Unit::new("ui.Label", Meta::new()));
        let resolver = Resolver::new(&universe);
        assert_eq!(resolver.dependencies("main").unwrap(), set(&["ui.Button", "ui.Label"]));
    }

    #[test]
    fn test_optional_requirement() {
        let mut universe = Universe::new();
        universe.add(Unit::new("main", Meta::new().with_optional("polyfill").with_optional("gone")));
        universe.add(Unit::new("polyfill", Meta::new()));
        assert_eq!(Resolver::new(&universe).dependencies("main").unwrap(), set(&["polyfill"]));
    }

    #[test]
    fn test_missing_hard_requirement() {
        let mut universe = Universe::new();
        universe.add(Unit::new("main", Meta::new().with_require("gone")));
        let err = Resolver::new(&universe).resolve(["main"]).unwrap_err();
        assert_eq!(
            err,
            DependencyError::MissingUnit {
                name: "gone".to_string(),
                required_by: Some("main".to_string()),
            }
        );
    }

    #[test]
    fn test_packages_and_shared_names() {
        let mut universe = Universe::new();
        let mut main = Unit::new("main", Meta::new());
        main.packages.insert("core.Env.getValue".to_string());
        main.packages.insert("main.helper".to_string());
        main.shared.insert("jQuery".to_string());
        main.shared.insert("window".to_string());
        universe.add(main);
        universe.add(Unit::new("core", Meta::new()));
        universe.add(Unit::new("core.Env", Meta::new()));
        universe.add(Unit::new("jQuery", Meta::new()));
        assert_eq!(
            Resolver::new(&universe).dependencies("main").unwrap(),
            set(&["core.Env", "jQuery"])
        );
    }

    #[test]
    fn test_closure_is_transitive() {
        let mut universe = Universe::new();
        universe.add(Unit::new("a", Meta::new().with_require("b")));
        universe.add(Unit::new("b", Meta::new().with_require("c")));
        universe.add(Unit::new("c", Meta::new().with_require("a")));
        universe.add(Unit::new("d", Meta::new()));
        assert_eq!(Resolver::new(&universe).resolve(["a"]).unwrap(), set(&["a", "b", "c"]));
    }
}
