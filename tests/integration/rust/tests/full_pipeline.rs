//! Full Pipeline Integration Tests
//!
//! Tests the complete flow: Source -> Parser -> Substitution -> Passes -> Code
//! generation, configured the way a build would configure it.

use codegen::Formatting;
use core_types::ErrorKind;
use optimizer::crypt_privates::encode;
use optimizer::{Optimization, Permutation, PermutationRegistry, Pipeline, PipelineOptions};
use pretty_assertions::assert_eq;
use serde_json::json;

/// Helper function to compile a source with the given options
fn compile_with(source: &str, options: PipelineOptions, permutation: &Permutation) -> String {
    Pipeline::new(options)
        .compile(source, "app.js", permutation)
        .expect("Compilation failed")
        .code
}

fn compile(source: &str) -> String {
    compile_with(source, PipelineOptions::new(), &Permutation::default())
}

/// Test: constant conditions are resolved before anything else
#[test]
fn test_dead_code_scenarios() {
    assert_eq!(compile("if (true) x++;"), "x++;");
    assert_eq!(compile("if (false) x++;"), "");
    assert_eq!(compile("if (x && true) y++;"), "x&&true&&y++;");
}

/// Test: only declaration combining enabled
#[test]
fn test_declarations_only() {
    let options = PipelineOptions::new().with_optimization(Optimization::DECLARATIONS);
    assert_eq!(
        compile_with("if (true) { var a=4; var b=5; use(a); }", options, &Permutation::default()),
        "var a=4;use(a);"
    );
}

/// Test: a build variant selects its code path
#[test]
fn test_permutation_variants() {
    let source = "
        var engine = core.Env.select('engine', {
            webkit: function() { return 'wk'; },
            gecko: function() { return 'gk'; },
            default: function() { return '?'; }
        });
        if (core.Env.isSet('debug')) { console.log(engine()); }
        run(engine);
    ";

    let mut registry = PermutationRegistry::new();
    let webkit = registry.intern(Permutation::from_pairs([("engine", json!("webkit")), ("debug", json!(false))]));
    let other = registry.intern(Permutation::from_pairs([("engine", json!("presto")), ("debug", json!(true))]));

    let options = PipelineOptions::new().with_optimization(Optimization::empty());
    assert_eq!(
        compile_with(source, options.clone(), &webkit),
        "var engine=function(){return\"wk\"};run(engine);"
    );
    assert_eq!(
        compile_with(source, options, &other),
        "var engine=function(){return\"?\"};console.log(engine());run(engine);"
    );
}

/// Test: every step together on a realistic function
#[test]
fn test_all_optimizations() {
    let source = "
        function format(items, separator, unused) {
            var result = '';
            var index;
            for (index = 0; index < items.length; index++) {
                if (index > 0) {
                    result += separator;
                }
                result += items[index];
            }
            return result;
        }
    ";
    assert_eq!(
        compile(source),
        "function format(c,d){var b=\"\",a;for(a=0;a<c.length;a++){if(a>0)b+=d;b+=c[a]}return b}"
    );
}

/// Test: private members under a context id
#[test]
fn test_private_members() {
    let options = PipelineOptions::new().with_context_id("42");
    let name = encode("42", "__secret");
    assert_eq!(
        compile_with(
            "var o = {__secret: 1}; o.__secret++;",
            options,
            &Permutation::default()
        ),
        format!("var o={{{}:1}};o.{}++;", name, name)
    );
}

/// Test: a step that can not be applied falls back to less optimized output
#[test]
fn test_skipped_step_fallback() {
    let output = Pipeline::default()
        .compile(
            "function f(input) { var copy = input; return eval('copy'); }",
            "app.js",
            &Permutation::default(),
        )
        .expect("Compilation failed");
    assert_eq!(output.code, "function f(input){var copy=input;return eval(\"copy\")}");
    assert_eq!(output.skipped.len(), 1);
    assert_eq!(output.skipped[0].kind, ErrorKind::Optimization);
    assert_eq!(output.skipped[0].file, "app.js");
}

/// Test: formatting options reach the generator
#[test]
fn test_formatting() {
    let options = PipelineOptions::new()
        .with_optimization(Optimization::empty())
        .with_formatting(Formatting::SEMICOLON | Formatting::COMMA);
    assert_eq!(
        compile_with("function f() { g(1, 2); }", options, &Permutation::default()),
        "function f(){g(1, 2);}"
    );
}

/// Test: fatal errors carry file and line
#[test]
fn test_errors_have_positions() {
    let err = Pipeline::default()
        .compile("var a = 1;\nvar b = ;", "broken.js", &Permutation::default())
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert_eq!(err.file, "broken.js");
    assert_eq!(err.line, 2);

    let err = Pipeline::default()
        .compile("var s = 'open;", "broken.js", &Permutation::default())
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Lexical);
}
