//! Load order of resolved units
//!
//! Every unit is laid out after its load dependencies: the direct
//! dependencies reported by the [`Resolver`] minus those relaxed by a break
//! edge in either direction. A unit declaring a break on another one is laid
//! out after it unless a hard dependency says otherwise. Units with fewer
//! transitive load dependencies come first, ties ordered by id.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::{debug, trace};

use crate::error::{DependencyError, DependencyResult};
use crate::resolver::Resolver;
use crate::universe::Universe;

/// Orders units for loading, memoizing dependency sets across calls
#[derive(Debug)]
pub struct Sorter<'a> {
    resolver: Resolver<'a>,
    direct: HashMap<String, BTreeSet<String>>,
    transitive: HashMap<String, BTreeSet<String>>,
}

impl<'a> Sorter<'a> {
    /// Create a sorter over a universe
    pub fn new(universe: &'a Universe) -> Self {
        Self {
            resolver: Resolver::new(universe),
            direct: HashMap::new(),
            transitive: HashMap::new(),
        }
    }

    /// Direct load dependencies of a unit
    pub fn load_dependencies(&mut self, id: &str) -> DependencyResult<BTreeSet<String>> {
        if let Some(found) = self.direct.get(id) {
            return Ok(found.clone());
        }
        let universe = self.resolver.universe();
        let unit = universe.get(id).ok_or_else(|| DependencyError::MissingUnit {
            name: id.to_string(),
            required_by: None,
        })?;
        let found: BTreeSet<String> = self
            .resolver
            .dependencies(id)?
            .into_iter()
            .filter(|dependency| match universe.get(dependency) {
                Some(other) => {
                    let broken = unit.is_broken_with(other);
                    if broken {
                        trace!(unit = id, dependency = %dependency, "dependency relaxed by break");
                    }
                    !broken
                }
                None => false,
            })
            .collect();
        self.direct.insert(id.to_string(), found.clone());
        Ok(found)
    }

    /// Transitive load dependencies of a unit
    pub fn transitive_dependencies(&mut self, id: &str) -> DependencyResult<BTreeSet<String>> {
        let mut stack = Vec::new();
        self.collect(id, &mut stack)
    }

    fn collect(&mut self, id: &str, stack: &mut Vec<String>) -> DependencyResult<BTreeSet<String>> {
        if let Some(found) = self.transitive.get(id) {
            return Ok(found.clone());
        }
        if let Some(start) = stack.iter().position(|entry| entry == id) {
            let mut path = stack[start..].to_vec();
            path.push(id.to_string());
            return Err(DependencyError::Cycle(path));
        }

        stack.push(id.to_string());
        let mut found = BTreeSet::new();
        for dependency in self.load_dependencies(id)? {
            let nested = self.collect(&dependency, stack)?;
            found.extend(nested);
            found.insert(dependency);
        }
        stack.pop();

        self.transitive.insert(id.to_string(), found.clone());
        Ok(found)
    }

    /// Load order of a resolved set of units
    ///
    /// # Examples
    ///
    /// ```
    /// use resolver::{Meta, Sorter, Unit, Universe};
    ///
    /// let mut universe = Universe::new();
    /// universe.add(Unit::new("A", Meta::new().with_require("B")));
    /// universe.add(Unit::new("B", Meta::new().with_break("A")));
    ///
    /// let units = ["A".to_string(), "B".to_string()].into_iter().collect();
    /// assert_eq!(Sorter::new(&universe).sort(&units).unwrap(), vec!["A", "B"]);
    /// ```
    pub fn sort(&mut self, units: &BTreeSet<String>) -> DependencyResult<Vec<String>> {
        let mut counts = HashMap::new();
        for id in units {
            counts.insert(id.clone(), self.transitive_dependencies(id)?.len());
        }

        let mut layout = Layout {
            units,
            counts: &counts,
            placed: Vec::with_capacity(units.len()),
            done: HashSet::new(),
            active: HashSet::new(),
        };
        for id in layout.by_weight(units.iter()) {
            self.place(&id, &mut layout)?;
        }

        debug!(units = layout.placed.len(), "sorted units");
        Ok(layout.placed)
    }

    fn place(&mut self, id: &str, layout: &mut Layout<'_>) -> DependencyResult<()> {
        if layout.done.contains(id) || layout.active.contains(id) {
            return Ok(());
        }
        layout.active.insert(id.to_string());

        let hard = self.load_dependencies(id)?;
        for dependency in layout.by_weight(hard.iter()) {
            self.place(&dependency, layout)?;
        }

        let breaks: Vec<String> = match self.resolver.universe().get(id) {
            Some(unit) => unit.meta.breaks.iter().cloned().collect(),
            None => Vec::new(),
        };
        for other in layout.by_weight(breaks.iter()) {
            // A break never overrides a hard dependency the other way round
            if self.transitive_dependencies(&other)?.contains(id) {
                continue;
            }
            self.place(&other, layout)?;
        }

        layout.active.remove(id);
        layout.done.insert(id.to_string());
        layout.placed.push(id.to_string());
        Ok(())
    }
}

struct Layout<'s> {
    units: &'s BTreeSet<String>,
    counts: &'s HashMap<String, usize>,
    placed: Vec<String>,
    done: HashSet<String>,
    active: HashSet<String>,
}

impl Layout<'_> {
    /// Members of the sorted set, fewest transitive dependencies first
    fn by_weight<'i>(&self, ids: impl Iterator<Item = &'i String>) -> Vec<String> {
        let mut ids: Vec<String> = ids.filter(|id| self.units.contains(*id)).cloned().collect();
        ids.sort_by(|a, b| {
            let weight_a = self.counts.get(a).copied().unwrap_or(0);
            let weight_b = self.counts.get(b).copied().unwrap_or(0);
            weight_a.cmp(&weight_b).then_with(|| a.cmp(b))
        });
        ids
    }
}
