//! Contract tests for resolver API
//!
//! These tests build universes from parsed units and check resolution and
//! load order through the public API.

use std::collections::{BTreeSet, HashMap};

use parser::{parse, scan_tree};
use pretty_assertions::assert_eq;
use resolver::{DependencyError, Meta, Resolver, Sorter, Unit, Universe};

fn parsed_unit(id: &str, source: &str, meta: Meta) -> Unit {
    let mut ast = parse(source, &format!("{}.js", id)).unwrap();
    let scope = scan_tree(&mut ast);
    Unit::with_scope(id, meta, &scope)
}

fn position(order: &[String]) -> HashMap<&str, usize> {
    order.iter().enumerate().map(|(i, id)| (id.as_str(), i)).collect()
}

#[test]
fn test_scenario_break_on_requirer() {
    let mut universe = Universe::new();
    universe.add(Unit::new("A", Meta::new().with_require("B")));
    universe.add(Unit::new("B", Meta::new().with_break("A")));

    let needed = Resolver::new(&universe).resolve(["A"]).unwrap();
    assert_eq!(needed.len(), 2);
    assert_eq!(Sorter::new(&universe).sort(&needed).unwrap(), vec!["A", "B"]);
}

#[test]
fn test_dependencies_from_source() {
    let mut universe = Universe::new();
    universe.add(parsed_unit(
        "app.Main",
        "app.ui.Button.create(); var local = 1; log(local);",
        Meta::new(),
    ));
    universe.add(parsed_unit("app.ui.Button", "app.Base.extend({});", Meta::new()));
    universe.add(parsed_unit("app.Base", "var x = 1;", Meta::new()));
    universe.add(parsed_unit("log", "", Meta::new()));
    universe.add(parsed_unit("unrelated", "", Meta::new()));

    let needed = Resolver::new(&universe).resolve(["app.Main"]).unwrap();
    let expected: BTreeSet<String> = ["app.Base", "app.Main", "app.ui.Button", "log"]
        .iter()
        .map(|id| id.to_string())
        .collect();
    assert_eq!(needed, expected);

    let order = Sorter::new(&universe).sort(&needed).unwrap();
    let at = position(&order);
    assert!(at["app.Base"] < at["app.ui.Button"]);
    assert!(at["app.ui.Button"] < at["app.Main"]);
    assert!(at["log"] < at["app.Main"]);
}

#[test]
fn test_every_unit_follows_its_requirements() {
    let mut universe = Universe::new();
    let edges: &[(&str, &[&str])] = &[
        ("a", &["b", "c"]),
        ("b", &["d"]),
        ("c", &["d", "e"]),
        ("d", &[]),
        ("e", &["d"]),
        ("f", &["a", "e"]),
    ];
    for (id, requires) in edges {
        let meta = requires.iter().fold(Meta::new(), |meta, r| meta.with_require(*r));
        universe.add(Unit::new(*id, meta));
    }

    let needed = Resolver::new(&universe).resolve(["f"]).unwrap();
    let order = Sorter::new(&universe).sort(&needed).unwrap();
    assert_eq!(order.len(), 6);
    let at = position(&order);
    for (id, requires) in edges {
        for required in *requires {
            assert!(at[required] < at[id], "{} must load before {}", required, id);
        }
    }
}

#[test]
fn test_break_only_cycle_sorts() {
    let mut universe = Universe::new();
    universe.add(Unit::new("x", Meta::new().with_require("y")));
    universe.add(Unit::new("y", Meta::new().with_require("z")));
    universe.add(Unit::new("z", Meta::new().with_require("x").with_break("x")));

    let needed = Resolver::new(&universe).resolve(["x"]).unwrap();
    let order = Sorter::new(&universe).sort(&needed).unwrap();
    let at = position(&order);
    assert!(at["z"] < at["y"]);
    assert!(at["y"] < at["x"]);
}

#[test]
fn test_unbroken_cycle_names_the_path() {
    let mut universe = Universe::new();
    universe.add(Unit::new("p", Meta::new().with_require("q")));
    universe.add(Unit::new("q", Meta::new().with_require("p")));

    let needed = Resolver::new(&universe).resolve(["p"]).unwrap();
    let err = Sorter::new(&universe).sort(&needed).unwrap_err();
    assert_eq!(err, DependencyError::Cycle(vec!["p".into(), "q".into(), "p".into()]));
}

#[test]
fn test_missing_requested_unit() {
    let universe = Universe::new();
    let err = Resolver::new(&universe).resolve(["nowhere"]).unwrap_err();
    assert_eq!(err.to_string(), "Missing unit nowhere");
}

#[test]
fn test_optional_and_glob_misses_only_warn() {
    let mut universe = Universe::new();
    universe.add(Unit::new(
        "main",
        Meta::new().with_optional("maybe").with_require("plugins.*"),
    ));
    let needed = Resolver::new(&universe).resolve(["main"]).unwrap();
    assert_eq!(needed.into_iter().collect::<Vec<_>>(), vec!["main"]);
}
