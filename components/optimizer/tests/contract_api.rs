//! Contract tests for optimizer API
//!
//! These tests run the passes through their public entry points and check
//! the generated code.

use std::rc::Rc;

use codegen::{compress, Formatting, GeneratorOptions};
use core_types::ErrorKind;
use optimizer::crypt_privates::encode;
use optimizer::{
    block_reduce, combine_declarations, crypt_privates, dead_code, local_variables, substitution, unused, Optimization,
    Permutation, PermutationRegistry, Pipeline, PipelineOptions,
};
use parser::{parse, scan_tree, NodeKind};
use pretty_assertions::assert_eq;
use serde_json::json;

fn generate(ast: &parser::Ast) -> String {
    compress(ast, &GeneratorOptions::default())
}

fn compile(source: &str, options: PipelineOptions) -> String {
    Pipeline::new(options)
        .compile(source, "contract.js", &Permutation::default())
        .unwrap()
        .code
}

// =============================================================================
// Permutations
// =============================================================================

#[test]
fn test_permutation_key_and_checksum() {
    let permutation = Permutation::from_pairs([("engine", json!("webkit")), ("debug", json!(false))]);
    assert_eq!(permutation.key(), "debug:false;engine:\"webkit\"");
    assert_eq!(permutation.checksum().len(), 8);
    assert!(permutation.has("engine"));
    assert_eq!(permutation.filter(&["engine"]).key(), "engine:\"webkit\"");
}

#[test]
fn test_registry_shares_equal_permutations() {
    let mut registry = PermutationRegistry::new();
    let first = registry.intern(Permutation::from_pairs([("a", json!(1))]));
    let second = registry.intern(Permutation::from_pairs([("a", json!(1))]));
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_substitution_then_dead_code() {
    let permutation = Permutation::from_pairs([("engine", json!("gecko"))]);
    let mut ast = parse(
        "if (core.Env.isSet('engine', 'webkit')) { webkit(); } else { other(); }",
        "contract.js",
    )
    .unwrap();
    assert!(substitution::substitute(&mut ast, &permutation).unwrap());
    assert!(dead_code::optimize(&mut ast));
    assert_eq!(generate(&ast), "other();");
}

// =============================================================================
// Dead code
// =============================================================================

#[test]
fn test_dead_code_scenarios() {
    for (source, expected) in [
        ("if (true) x++;", "x++;"),
        ("if (false) x++;", ""),
        ("if (x && true) y++;", "if(x&&true)y++;"),
    ] {
        let mut ast = parse(source, "contract.js").unwrap();
        dead_code::optimize(&mut ast);
        assert_eq!(generate(&ast), expected, "source: {}", source);
    }
}

// =============================================================================
// Unused declarations and combining
// =============================================================================

#[test]
fn test_declarations_only_scenario() {
    let options = PipelineOptions::new().with_optimization(Optimization::DECLARATIONS);
    assert_eq!(
        compile("if (true) { var a=4; var b=5; use(a); }", options),
        "var a=4;use(a);"
    );
}

#[test]
fn test_unused_reaches_fixpoint() {
    let mut ast = parse(
        "function f() { var a = 1; var b = a; function g() { return b; } return 0; }",
        "contract.js",
    )
    .unwrap();
    assert!(unused::optimize(&mut ast).unwrap());
    assert_eq!(generate(&ast), "function f(){return 0}");
}

#[test]
fn test_combining_preserves_initializer_order() {
    let mut ast = parse(
        "function f() { var a = first(); second(); var b = third(), c = fourth(); return [a, b, c]; }",
        "contract.js",
    )
    .unwrap();
    combine_declarations::optimize(&mut ast);
    let code = generate(&ast);
    assert_eq!(code, "function f(){var a=first(),b,c;second();b=third(),c=fourth();return[a,b,c]}");
    let order: Vec<usize> = ["first", "second", "third", "fourth"]
        .iter()
        .map(|name| code.find(name).unwrap())
        .collect();
    assert!(order.windows(2).all(|pair| pair[0] < pair[1]));
}

// =============================================================================
// Block reduction
// =============================================================================

#[test]
fn test_block_reduction() {
    let mut ast = parse(
        "function f(c) { if (c) { return 1; } else { return 2; } }",
        "contract.js",
    )
    .unwrap();
    assert!(block_reduce::optimize(&mut ast));
    assert_eq!(generate(&ast), "function f(c){return c?1:2}");
}

// =============================================================================
// Local variables
// =============================================================================

#[test]
fn test_renaming_never_remaps_shared_names() {
    let mut ast = parse(
        "var a = 1, b = 2; function f(x, y) { return a + b + x * y; }",
        "contract.js",
    )
    .unwrap();
    local_variables::optimize(&mut ast).unwrap();
    assert_eq!(generate(&ast), "var a=1,b=2;function f(c,d){return a+b+c*d}");
}

#[test]
fn test_renaming_keeps_bindings_apart() {
    let mut ast = parse(
        "function f(x) { var y = x; return function(z) { return x + y + z; }; }",
        "contract.js",
    )
    .unwrap();
    local_variables::optimize(&mut ast).unwrap();
    scan_tree(&mut ast);

    let functions: Vec<_> = ast
        .descendants(ast.root())
        .into_iter()
        .filter(|id| ast.kind(*id) == NodeKind::Function)
        .collect();
    let outer = ast.node(functions[0]).scope.clone().unwrap();
    let inner = ast.node(functions[1]).scope.clone().unwrap();
    assert_eq!(outer.declared.len() + outer.params.len(), 2);
    // Everything the inner function shares resolves to the outer locals
    for name in inner.shared.keys() {
        assert!(outer.is_local(name), "{} escaped its scope", name);
        assert!(!inner.is_local(name));
    }
}

#[test]
fn test_renaming_with_eval_fails_before_mutation() {
    let source = "function f(value) { return eval('value'); }";
    let mut ast = parse(source, "contract.js").unwrap();
    let before = generate(&ast);
    let err = local_variables::optimize(&mut ast).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Optimization);
    assert_eq!(generate(&ast), before);
}

// =============================================================================
// Private members
// =============================================================================

#[test]
fn test_private_names_share_one_name_per_context() {
    let source = "x = {__secret: 1}; y = obj.__secret;";

    let mut ast = parse(source, "contract.js").unwrap();
    crypt_privates::optimize(&mut ast, "42").unwrap();
    let name = encode("42", "__secret");
    assert_eq!(generate(&ast), format!("x={{{}:1}};y=obj.{};", name, name));

    let mut other = parse(source, "contract.js").unwrap();
    crypt_privates::optimize(&mut other, "43").unwrap();
    assert_ne!(generate(&other), generate(&ast));
}

#[test]
fn test_pipeline_uses_context_id() {
    let options = PipelineOptions::new()
        .with_optimization(Optimization::PRIVATES)
        .with_context_id("42");
    assert_eq!(
        compile("obj.__secret = 1;", options),
        format!("obj.{}=1;", encode("42", "__secret"))
    );
}

// =============================================================================
// Pipeline
// =============================================================================

#[test]
fn test_pipeline_formatting() {
    let options = PipelineOptions::new()
        .with_optimization(Optimization::empty())
        .with_formatting(Formatting::COMMA | Formatting::SEMICOLON);
    assert_eq!(compile("function f(a, b) { g(a, b); }", options), "function f(a, b){g(a, b);}");
}

#[test]
fn test_pipeline_output_is_stable() {
    let sources = [
        "function f(value) { var result; if (value) { result = 1; } else { result = 2; } return result; }",
        "var list = [1, 2, 3]; for (var i = 0; i < list.length; i++) { if (!list[i]) continue; use(list[i]); }",
        "function g(o) { for (var k in o) { if (o.hasOwnProperty(k)) { emit(k, o[k]); } } }",
        "x = function() { try { risky(); } catch (e) { report(e); } finally { done(); } };",
    ];
    for source in sources {
        let first = compile(source, PipelineOptions::new());
        let second = compile(&first, PipelineOptions::new());
        let reparsed = parse(&first, "contract.js").unwrap();
        assert_eq!(generate(&reparsed), first, "source: {}", source);
        assert!(second.len() <= first.len(), "source: {}", source);
    }
}
