//! Build Integration Tests
//!
//! Units are parsed, their dependencies resolved and sorted, and each one is
//! compiled in load order.

use integration_tests::{build, SourceUnit};
use optimizer::{Optimization, Permutation, Pipeline, PipelineOptions};
use pretty_assertions::assert_eq;
use resolver::Meta;
use serde_json::json;

fn plain() -> Pipeline {
    Pipeline::new(PipelineOptions::new().with_optimization(Optimization::empty()))
}

fn project() -> Vec<SourceUnit<'static>> {
    vec![
        SourceUnit {
            id: "app.Main",
            source: "app.ui.Button.create();",
            meta: Meta::new(),
        },
        SourceUnit {
            id: "app.ui.Button",
            source: "app.ui.Button = app.Base.extend({});",
            meta: Meta::new(),
        },
        SourceUnit {
            id: "app.Base",
            source: "app.Base = { extend: function(members) { return members; } };",
            meta: Meta::new(),
        },
        SourceUnit {
            id: "app.Unused",
            source: "app.Unused = 1;",
            meta: Meta::new(),
        },
    ]
}

/// Test: only needed units are emitted, dependencies first
#[test]
fn test_units_in_load_order() {
    let code = build(project(), &["app.Main"], &plain(), &Permutation::default()).unwrap();
    assert_eq!(
        code,
        "app.Base={extend:function(members){return members}};\
         app.ui.Button=app.Base.extend({});\
         app.ui.Button.create();"
    );
}

/// Test: declared requirements pull in units the code never names
#[test]
fn test_declared_requirement() {
    let mut units = project();
    units[0].meta = Meta::new().with_require("app.Unused");
    let code = build(units, &["app.Main"], &plain(), &Permutation::default()).unwrap();
    assert!(code.contains("app.Unused=1;"));
    assert!(code.ends_with("app.ui.Button.create();"));
}

/// Test: each unit is compiled for the same permutation
#[test]
fn test_permutation_applies_to_every_unit() {
    let units = vec![
        SourceUnit {
            id: "app.Log",
            source: "app.Log = function(m) { if (core.Env.isSet('debug')) { print(m); } };",
            meta: Meta::new(),
        },
        SourceUnit {
            id: "app.Main",
            source: "if (core.Env.isSet('debug')) { app.Log('start'); } run();",
            meta: Meta::new().with_require("app.Log"),
        },
    ];
    let release = Permutation::from_pairs([("debug", json!(false))]);
    let code = build(units, &["app.Main"], &Pipeline::default(), &release).unwrap();
    assert_eq!(code, "app.Log=function(){};run();");
}

/// Test: a required unit that does not exist stops the build
#[test]
fn test_missing_unit() {
    let mut units = project();
    units[0].meta = Meta::new().with_require("app.Gone");
    let err = build(units, &["app.Main"], &plain(), &Permutation::default()).unwrap_err();
    assert!(err.contains("Missing unit app.Gone"), "{}", err);
}

/// Test: a cycle without a break edge stops the build
#[test]
fn test_cycle() {
    let units = vec![
        SourceUnit {
            id: "a",
            source: "x();",
            meta: Meta::new().with_require("b"),
        },
        SourceUnit {
            id: "b",
            source: "y();",
            meta: Meta::new().with_require("a"),
        },
    ];
    let err = build(units, &["a"], &plain(), &Permutation::default()).unwrap_err();
    assert!(err.contains("Circular dependency"), "{}", err);
}

/// Test: a syntax error in one unit names that unit
#[test]
fn test_parse_error_names_the_unit() {
    let units = vec![SourceUnit {
        id: "broken",
        source: "var = 1;",
        meta: Meta::new(),
    }];
    let err = build(units, &["broken"], &plain(), &Permutation::default()).unwrap_err();
    assert!(err.contains("broken"), "{}", err);
}
