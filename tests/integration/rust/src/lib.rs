//! Integration test suite for the script compiler
//!
//! This crate provides integration tests that verify components work
//! together across component boundaries: parsing, optimization, code
//! generation and dependency ordering.

use optimizer::{Permutation, Pipeline};
use parser::{parse, scan_tree};
use resolver::{Meta, Resolver, Sorter, Unit, Universe};

/// Re-export components for test convenience
pub mod components {
    pub use codegen;
    pub use core_types;
    pub use optimizer;
    pub use parser;
    pub use resolver;
}

/// Source of one unit of a test project
pub struct SourceUnit<'a> {
    /// Unit id
    pub id: &'a str,
    /// Source text
    pub source: &'a str,
    /// Declared dependencies
    pub meta: Meta,
}

/// Compile the units needed by `required` and join their code in load order
pub fn build(
    units: Vec<SourceUnit<'_>>,
    required: &[&str],
    pipeline: &Pipeline,
    permutation: &Permutation,
) -> Result<String, String> {
    let mut universe = Universe::new();
    let mut sources = std::collections::HashMap::new();
    for unit in units {
        let mut ast = parse(unit.source, unit.id).map_err(|e| format!("Parse error: {}", e))?;
        let scope = scan_tree(&mut ast);
        universe.add(Unit::with_scope(unit.id, unit.meta, &scope));
        sources.insert(unit.id.to_string(), unit.source);
    }

    let needed = Resolver::new(&universe)
        .resolve(required.iter().copied())
        .map_err(|e| format!("Dependency error: {}", e))?;
    let order = Sorter::new(&universe)
        .sort(&needed)
        .map_err(|e| format!("Dependency error: {}", e))?;

    let mut code = String::new();
    for id in order {
        let source = sources.get(&id).copied().unwrap_or_default();
        let output = pipeline
            .compile(source, &id, permutation)
            .map_err(|e| format!("Compile error: {}", e))?;
        code.push_str(&output.code);
    }
    Ok(code)
}
