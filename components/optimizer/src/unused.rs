//! Unused declaration removal
//!
//! Alternates with the scope scanner until nothing more can be removed:
//! dropping one declaration can make the names its initializer referenced
//! unused in turn.

use std::collections::BTreeSet;

use core_types::CompileResult;
use parser::{scan_tree, Ast, FunctionForm, NodeFlags, NodeId, NodeKind, Rel, Value};
use tracing::{debug, trace};

use crate::error::node_error;
use crate::tree::{body_nodes, is_side_effect_free, remove_statement};

/// Upper bound of scan/remove rounds
pub const MAX_ROUNDS: usize = 25;

/// Remove unused declarations until a fixpoint, returns whether anything changed
pub fn optimize(ast: &mut Ast) -> CompileResult<bool> {
    let mut changed = false;
    for round in 0..MAX_ROUNDS {
        scan_tree(ast);
        if !remove_unused(ast) {
            if changed {
                debug!(file = %ast.file, rounds = round, "removed unused declarations");
            }
            return Ok(changed);
        }
        changed = true;
    }
    let root = ast.root();
    Err(node_error(
        ast,
        root,
        format!("Unused declaration removal did not settle after {} rounds", MAX_ROUNDS),
    ))
}

/// One removal round over every scope, the tree must be freshly scanned
fn remove_unused(ast: &mut Ast) -> bool {
    let root = ast.root();
    let owners: Vec<NodeId> = ast
        .descendants(root)
        .into_iter()
        .filter(|id| matches!(ast.kind(*id), NodeKind::Script | NodeKind::Function))
        .collect();

    let mut changed = false;
    for owner in owners {
        if !ast.is_inside(owner, root) {
            continue;
        }
        let Some(scope) = ast.node(owner).scope.clone() else {
            continue;
        };
        if scope.unused.is_empty() || scope.uses_eval {
            continue;
        }
        let top_level = owner == root;

        if ast.kind(owner) == NodeKind::Function {
            if !scope.accessed.contains_key("arguments") {
                changed |= remove_trailing_params(ast, owner, &scope.unused);
            }
            changed |= remove_function_name(ast, owner, &scope.unused);
        }

        let body = if ast.kind(owner) == NodeKind::Function {
            match ast.child(owner, Rel::Body) {
                Some(body) => body,
                None => continue,
            }
        } else {
            owner
        };

        for node in body_nodes(ast, body) {
            if !ast.is_inside(node, body) {
                continue;
            }
            match ast.kind(node) {
                NodeKind::Function if !top_level => {
                    let declared = matches!(
                        ast.node(node).form,
                        Some(FunctionForm::Declared) | Some(FunctionForm::Statement)
                    );
                    let unused = ast.text_opt(node).map_or(false, |name| scope.unused.contains(name));
                    if declared && unused {
                        trace!(name = ast.text(node), "removing unused function");
                        remove_statement(ast, node);
                        changed = true;
                    }
                }
                NodeKind::Var => {
                    let in_list = ast.parent(node).map_or(false, |p| ast.kind(p).is_statement_list());
                    if in_list {
                        changed |= remove_declarators(ast, node, &scope.unused);
                    }
                }
                _ => {}
            }
        }
    }
    changed
}

fn remove_trailing_params(ast: &mut Ast, function: NodeId, unused: &BTreeSet<String>) -> bool {
    let Some(params) = ast.child(function, Rel::Params) else {
        return false;
    };
    let mut changed = false;
    while let Some(last) = ast.children(params).last().copied() {
        if ast.kind(last) != NodeKind::Identifier || !unused.contains(ast.text(last)) {
            break;
        }
        trace!(name = ast.text(last), "removing unused parameter");
        ast.remove(last);
        changed = true;
    }
    changed
}

fn remove_function_name(ast: &mut Ast, function: NodeId, unused: &BTreeSet<String>) -> bool {
    let accessor = ast.has_flag(function, NodeFlags::GETTER) || ast.has_flag(function, NodeFlags::SETTER);
    if accessor || ast.node(function).form != Some(FunctionForm::Expressed) {
        return false;
    }
    match ast.text_opt(function) {
        Some(name) if unused.contains(name) => {
            trace!(name, "removing unused function name");
            ast.node_mut(function).value = Value::None;
            true
        }
        _ => false,
    }
}

fn remove_declarators(ast: &mut Ast, list: NodeId, unused: &BTreeSet<String>) -> bool {
    let declarators = ast.children(list).to_vec();
    let count = declarators.len();
    let mut changed = false;

    for (index, declarator) in declarators.into_iter().enumerate() {
        let unused_name = ast.text_opt(declarator).map_or(false, |name| unused.contains(name));
        if !unused_name || ast.child(declarator, Rel::Names).is_some() {
            continue;
        }
        let initializer = ast.child(declarator, Rel::Initializer);
        match initializer {
            Some(init) if !is_side_effect_free(ast, init) => {
                if count > 1 && index > 0 && index < count - 1 {
                    continue;
                }
                let statement = expression_statement(ast, init);
                if count == 1 {
                    ast.replace(list, statement);
                    ast.set_rel(statement, None);
                    trace!(name = ast.text(declarator), "demoted unused declaration to its initializer");
                    return true;
                }
                if index == 0 {
                    ast.insert_before(list, statement);
                } else {
                    ast.insert_after(list, statement);
                }
                ast.set_rel(statement, None);
                ast.remove(declarator);
            }
            _ => ast.remove(declarator),
        }
        trace!(name = ast.text(declarator), "removed unused declaration");
        changed = true;
    }

    if changed && ast.children(list).is_empty() {
        remove_statement(ast, list);
    }
    changed
}

/// Wrap an expression into a statement, marking a leading function or
/// object literal as parenthesized
fn expression_statement(ast: &mut Ast, expression: NodeId) -> NodeId {
    let span = ast.node(expression).span;
    let statement = ast.add(NodeKind::Semicolon, span);
    ast.append_rel(statement, Rel::Expression, expression);

    let mut current = expression;
    loop {
        if ast.has_flag(current, NodeFlags::PARENTHESIZED) {
            break;
        }
        match ast.kind(current) {
            NodeKind::ObjectInit | NodeKind::Function => {
                ast.set_flag(current, NodeFlags::PARENTHESIZED, true);
                break;
            }
            kind if kind.is_binary()
                || matches!(
                    kind,
                    NodeKind::Assign
                        | NodeKind::Hook
                        | NodeKind::Comma
                        | NodeKind::Dot
                        | NodeKind::Index
                        | NodeKind::Call
                ) =>
            {
                match ast.nth(current, 0) {
                    Some(first) => current = first,
                    None => break,
                }
            }
            _ => break,
        }
    }
    statement
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegen::{compress, GeneratorOptions};
    use parser::parse;
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> String {
        let mut ast = parse(source, "test.js").unwrap();
        optimize(&mut ast).unwrap();
        compress(&ast, &GeneratorOptions::default())
    }

    #[test]
    fn test_trailing_parameters() {
        assert_eq!(run("function f(a, b, c) { return b; }"), "function f(a,b){return b}");
    }

    #[test]
    fn test_parameters_kept_when_arguments_is_used() {
        assert_eq!(
            run("function f(a, b) { return arguments.length; }"),
            "function f(a,b){return arguments.length}"
        );
    }

    #[test]
    fn test_unused_function_expression_name() {
        assert_eq!(run("x = function named() { return 1; };"), "x=function(){return 1};");
        assert_eq!(run("x = function self(n) { return self; };"), "x=function self(){return self};");
    }

    #[test]
    fn test_top_level_functions_are_kept() {
        assert_eq!(run("function exported() {}"), "function exported(){}");
    }

    #[test]
    fn test_nested_unused_function_is_removed() {
        assert_eq!(
            run("function outer() { function helper() {} return 1; }"),
            "function outer(){return 1}"
        );
    }

    #[test]
    fn test_side_effect_free_declarators_are_dropped() {
        assert_eq!(run("function f() { var a = 1, b = 'x', c; return 2; }"), "function f(){return 2}");
    }

    #[test]
    fn test_initializer_with_effects_is_demoted() {
        assert_eq!(run("function f() { var a = g(); }"), "function f(){g()}");
        assert_eq!(run("function f() { var a = g(), b = 1; return b; }"), "function f(){g();var b=1;return b}");
        assert_eq!(run("function f() { var b = 1, a = g(); return b; }"), "function f(){var b=1;g();return b}");
    }

    #[test]
    fn test_middle_declarator_with_effects_is_kept() {
        assert_eq!(
            run("function f() { var x = 1, a = g(), y = 2; return x + y; }"),
            "function f(){var x=1,a=g(),y=2;return x+y}"
        );
    }

    #[test]
    fn test_object_literal_initializer_is_parenthesized() {
        assert_eq!(run("function f() { var a = {b: g()}; }"), "function f(){({b:g()})}");
    }

    #[test]
    fn test_removal_cascades() {
        assert_eq!(
            run("function f() { var a = 1; var b = a; var c = b; return 0; }"),
            "function f(){return 0}"
        );
    }

    #[test]
    fn test_top_level_vars_are_removed() {
        assert_eq!(run("var a = 4; var b = 5; use(a);"), "var a=4;use(a);");
    }

    #[test]
    fn test_scopes_using_eval_are_kept() {
        assert_eq!(
            run("function f(a, b) { var c = 1; return eval('a'); }"),
            "function f(a,b){var c=1;return eval(\"a\")}"
        );
    }

    #[test]
    fn test_reports_change() {
        let mut ast = parse("var a = 1; use(a);", "test.js").unwrap();
        assert!(!optimize(&mut ast).unwrap());
    }
}
