//! Permutation substitution
//!
//! Replaces build-time queries against the environment with the values of
//! the active permutation:
//!
//! - `core.Env.getValue(key)` becomes the value itself
//! - `core.Env.isSet(key, expected)` becomes `true` or `false`
//! - `core.Env.select(key, {value: ..., default: ...})` becomes the matching branch
//!
//! Keys the permutation does not know are left for the runtime to answer.

use core_types::CompileResult;
use parser::{dotted_name, parse_expression, Ast, NodeId, NodeKind};
use serde_json::Value;
use tracing::{debug, trace};

use crate::permutation::Permutation;

const GET_VALUE: &str = "core.Env.getValue";
const IS_SET: &str = "core.Env.isSet";
const SELECT: &str = "core.Env.select";

/// Substitute permutation values into the tree, returns whether anything changed
pub fn substitute(ast: &mut Ast, permutation: &Permutation) -> CompileResult<bool> {
    if permutation.is_empty() {
        return Ok(false);
    }
    let root = ast.root();
    let changed = visit(ast, root, permutation)?;
    if changed {
        debug!(file = %ast.file, permutation = permutation.key(), "substituted permutation values");
    }
    Ok(changed)
}

fn visit(ast: &mut Ast, id: NodeId, permutation: &Permutation) -> CompileResult<bool> {
    if ast.kind(id) == NodeKind::Call {
        if let Some(replacement) = replacement(ast, id, permutation)? {
            ast.replace(id, replacement);
            return Ok(true);
        }
    }
    let mut changed = false;
    for child in ast.children(id).to_vec() {
        changed |= visit(ast, child, permutation)?;
    }
    Ok(changed)
}

fn replacement(ast: &mut Ast, call: NodeId, permutation: &Permutation) -> CompileResult<Option<NodeId>> {
    let Some(callee) = ast.nth(call, 0) else {
        return Ok(None);
    };
    let Some(name) = dotted_name(ast, callee) else {
        return Ok(None);
    };
    if !matches!(name.as_str(), GET_VALUE | IS_SET | SELECT) {
        return Ok(None);
    }
    let args = ast.nth(call, 1).map(|list| ast.children(list).to_vec()).unwrap_or_default();
    let Some(key) = args.first().filter(|a| ast.kind(**a) == NodeKind::String) else {
        return Ok(None);
    };
    let key = ast.text(*key).to_string();
    let Some(value) = permutation.get(&key) else {
        trace!(key = %key, "permutation has no value");
        return Ok(None);
    };

    let span = ast.node(call).span;
    let result = match name.as_str() {
        GET_VALUE => {
            let parsed = parse_expression(&value.to_string(), &ast.file)?;
            Some(ast.graft(&parsed, parsed.root()))
        }
        IS_SET => {
            let expected = match args.get(1) {
                Some(expected) => literal_value(ast, *expected),
                None => Some(Value::Bool(true)),
            };
            expected.map(|expected| {
                let kind = if matches_expected(value, &expected) {
                    NodeKind::True
                } else {
                    NodeKind::False
                };
                ast.add(kind, span)
            })
        }
        _ => match args.get(1) {
            Some(map) if ast.kind(*map) == NodeKind::ObjectInit => select_branch(ast, *map, value),
            _ => None,
        },
    };
    if result.is_some() {
        trace!(call = %name, key = %key, "replaced environment query");
    }
    Ok(result)
}

/// JSON equivalent of a literal node
fn literal_value(ast: &Ast, id: NodeId) -> Option<Value> {
    match ast.kind(id) {
        NodeKind::True => Some(Value::Bool(true)),
        NodeKind::False => Some(Value::Bool(false)),
        NodeKind::Null => Some(Value::Null),
        NodeKind::String => Some(Value::String(ast.text(id).to_string())),
        NodeKind::Number => ast.number(id).and_then(serde_json::Number::from_f64).map(Value::Number),
        _ => None,
    }
}

fn matches_expected(value: &Value, expected: &Value) -> bool {
    match (value, expected) {
        (Value::String(value), Value::String(expected)) => expected.split('|').any(|option| option == value),
        (Value::Number(value), Value::Number(expected)) => value.as_f64() == expected.as_f64(),
        _ => value == expected,
    }
}

fn select_branch(ast: &mut Ast, map: NodeId, value: &Value) -> Option<NodeId> {
    let wanted = match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    let mut fallback = None;
    for property in ast.children(map).to_vec() {
        if ast.kind(property) != NodeKind::PropertyInit {
            continue;
        }
        let (Some(key), Some(branch)) = (ast.nth(property, 0), ast.nth(property, 1)) else {
            continue;
        };
        let key_text = match ast.kind(key) {
            NodeKind::Number => ast.number(key).map(codegen::format_number).unwrap_or_default(),
            _ => ast.text(key).to_string(),
        };
        if key_text == wanted {
            ast.remove(branch);
            return Some(branch);
        }
        if key_text == "default" {
            fallback = Some(branch);
        }
    }
    if let Some(branch) = fallback {
        ast.remove(branch);
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegen::{compress, GeneratorOptions};
    use parser::parse;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn run(source: &str, permutation: &Permutation) -> (bool, String) {
        let mut ast = parse(source, "test.js").unwrap();
        let changed = substitute(&mut ast, permutation).unwrap();
        (changed, compress(&ast, &GeneratorOptions::default()))
    }

    fn permutation() -> Permutation {
        Permutation::from_pairs([
            ("debug", json!(false)),
            ("engine", json!("webkit")),
            ("level", json!(3)),
            ("config", json!({"a": [1, 2]})),
        ])
    }

    #[test]
    fn test_get_value() {
        let (changed, code) = run("x = core.Env.getValue('engine'); y = core.Env.getValue('config');", &permutation());
        assert!(changed);
        assert_eq!(code, "x=\"webkit\";y={\"a\":[1,2]};");
    }

    #[test]
    fn test_is_set_default_expects_true() {
        let (_, code) = run("if (core.Env.isSet('debug')) log();", &permutation());
        assert_eq!(code, "if(false)log();");
    }

    #[test]
    fn test_is_set_with_expected_values() {
        let (_, code) = run(
            "a = core.Env.isSet('engine', 'gecko|webkit'); b = core.Env.isSet('engine', 'trident'); c = core.Env.isSet('level', 3);",
            &permutation(),
        );
        assert_eq!(code, "a=true;b=false;c=true;");
    }

    #[test]
    fn test_is_set_kind_mismatch_is_false() {
        let (_, code) = run("a = core.Env.isSet('level', '3');", &permutation());
        assert_eq!(code, "a=false;");
    }

    #[test]
    fn test_select() {
        let (_, code) = run(
            "f = core.Env.select('engine', {gecko: 1, webkit: 2}); g = core.Env.select('level', {1: 'x', 'default': 'y'});",
            &permutation(),
        );
        assert_eq!(code, "f=2;g=\"y\";");
    }

    #[test]
    fn test_select_without_match_is_untouched() {
        let (changed, code) = run("f = core.Env.select('engine', {gecko: 1});", &permutation());
        assert!(!changed);
        assert_eq!(code, "f=core.Env.select(\"engine\",{gecko:1});");
    }

    #[test]
    fn test_unknown_key_is_untouched() {
        let (changed, code) = run("x = core.Env.getValue('missing');", &permutation());
        assert!(!changed);
        assert_eq!(code, "x=core.Env.getValue(\"missing\");");
    }

    #[test]
    fn test_other_calls_are_untouched() {
        let (changed, _) = run("core.Env.other('debug'); Env.getValue('debug');", &permutation());
        assert!(!changed);
    }
}
