//! Declaration combining
//!
//! Hoists every `var` of a function or script body into a single statement.
//! The first `var` collects the names, the others become plain assignments
//! at their original position, so initializers still run in source order.

use std::collections::BTreeSet;

use parser::{binding_identifiers, Ast, NodeId, NodeKind, Rel};
use tracing::{debug, trace};

use crate::tree::{body_nodes, remove_statement};

/// Combine declarations in every body of the tree, returns whether anything changed
pub fn optimize(ast: &mut Ast) -> bool {
    let root = ast.root();
    let mut bodies = vec![root];
    for id in ast.descendants(root) {
        if ast.kind(id) == NodeKind::Function {
            if let Some(body) = ast.child(id, Rel::Body) {
                bodies.push(body);
            }
        }
    }

    let mut changed = false;
    for body in bodies {
        changed |= merge_adjacent(ast, body);
        changed |= combine_body(ast, body);
        changed |= merge_adjacent(ast, body);
    }
    if changed {
        debug!(file = %ast.file, "combined declarations");
    }
    changed
}

fn is_for_in_iterator(ast: &Ast, list: NodeId) -> bool {
    ast.rel(list) == Some(Rel::Iterator)
}

fn combine_body(ast: &mut Ast, body: NodeId) -> bool {
    let lists: Vec<NodeId> = body_nodes(ast, body)
        .into_iter()
        .filter(|id| ast.kind(*id) == NodeKind::Var)
        .collect();
    let Some(first) = lists.first().copied() else {
        return false;
    };
    let rewritable: Vec<NodeId> = lists
        .iter()
        .copied()
        .filter(|list| *list != first && !is_for_in_iterator(ast, *list))
        .collect();
    if rewritable.is_empty() && !is_for_in_iterator(ast, first) {
        return prune_duplicates(ast, first);
    }
    if rewritable.is_empty() {
        return false;
    }

    let collector = if is_for_in_iterator(ast, first) {
        let span = ast.node(body).span;
        let collector = ast.add(NodeKind::Var, span);
        ast.insert(body, 0, collector);
        ast.set_rel(collector, None);
        trace!("inserted leading var");
        collector
    } else {
        first
    };

    let mut declared: BTreeSet<String> = declared_names(ast, collector);
    for list in rewritable {
        if list == collector {
            continue;
        }
        rewrite_as_assignments(ast, list, collector, &mut declared);
    }
    prune_duplicates(ast, collector);
    move_into_following_for(ast, collector);
    true
}

fn declared_names(ast: &Ast, list: NodeId) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for declarator in ast.children(list) {
        match ast.child(*declarator, Rel::Names) {
            Some(pattern) => {
                for binding in binding_identifiers(ast, pattern) {
                    names.insert(ast.text(binding).to_string());
                }
            }
            None => {
                names.insert(ast.text(*declarator).to_string());
            }
        }
    }
    names
}

fn add_name(ast: &mut Ast, collector: NodeId, name: &str, declared: &mut BTreeSet<String>) {
    if declared.insert(name.to_string()) {
        let span = ast.node(collector).span;
        let declarator = ast.add_text(NodeKind::Declaration, name, span);
        ast.append(collector, declarator);
        ast.set_rel(declarator, None);
    }
}

/// Replace a `var` by assignments of its initializers, moving its names to
/// the collector
fn rewrite_as_assignments(ast: &mut Ast, list: NodeId, collector: NodeId, declared: &mut BTreeSet<String>) {
    let mut assignments = Vec::new();
    for declarator in ast.children(list).to_vec() {
        let span = ast.node(declarator).span;
        let target = match ast.child(declarator, Rel::Names) {
            Some(pattern) => {
                for binding in binding_identifiers(ast, pattern) {
                    let name = ast.text(binding).to_string();
                    add_name(ast, collector, &name, declared);
                }
                pattern
            }
            None => {
                let name = ast.text(declarator).to_string();
                add_name(ast, collector, &name, declared);
                ast.add_text(NodeKind::Identifier, name, span)
            }
        };
        if let Some(initializer) = ast.child(declarator, Rel::Initializer) {
            let assign = ast.add(NodeKind::Assign, span);
            ast.append(assign, target);
            ast.set_rel(target, None);
            ast.append(assign, initializer);
            ast.set_rel(initializer, None);
            assignments.push(assign);
        }
    }

    let span = ast.node(list).span;
    let expression = match assignments.len() {
        0 => None,
        1 => Some(assignments[0]),
        _ => {
            let comma = ast.add(NodeKind::Comma, span);
            for assign in assignments {
                ast.append(comma, assign);
            }
            Some(comma)
        }
    };

    let in_for_setup = ast.rel(list) == Some(Rel::Setup);
    match expression {
        Some(expression) if in_for_setup => ast.replace(list, expression),
        Some(expression) => {
            let statement = ast.add(NodeKind::Semicolon, span);
            ast.append_rel(statement, Rel::Expression, expression);
            ast.replace(list, statement);
        }
        None if in_for_setup => ast.remove(list),
        None => remove_statement(ast, list),
    }
    trace!(line = span.line, "rewrote var as assignments");
}

/// Drop initializer-less declarators whose name is declared again
fn prune_duplicates(ast: &mut Ast, collector: NodeId) -> bool {
    let declarators = ast.children(collector).to_vec();
    let initialized: BTreeSet<String> = declarators
        .iter()
        .filter(|d| ast.child(**d, Rel::Initializer).is_some() || ast.child(**d, Rel::Names).is_some())
        .flat_map(|d| declared_names_of(ast, *d))
        .collect();

    let mut seen = BTreeSet::new();
    let mut changed = false;
    for declarator in declarators {
        if ast.child(declarator, Rel::Initializer).is_some() || ast.child(declarator, Rel::Names).is_some() {
            continue;
        }
        let name = ast.text(declarator).to_string();
        if initialized.contains(&name) || !seen.insert(name) {
            ast.remove(declarator);
            changed = true;
        }
    }
    changed
}

fn declared_names_of(ast: &Ast, declarator: NodeId) -> Vec<String> {
    match ast.child(declarator, Rel::Names) {
        Some(pattern) => binding_identifiers(ast, pattern)
            .into_iter()
            .map(|b| ast.text(b).to_string())
            .collect(),
        None => vec![ast.text(declarator).to_string()],
    }
}

/// Move the collector into the setup of a directly following `for (;...)`
fn move_into_following_for(ast: &mut Ast, collector: NodeId) {
    let Some(parent) = ast.parent(collector) else {
        return;
    };
    if !ast.kind(parent).is_statement_list() {
        return;
    }
    let Some(index) = ast.index_of(collector) else {
        return;
    };
    let Some(next) = ast.nth(parent, index + 1) else {
        return;
    };
    if ast.kind(next) == NodeKind::For && ast.child(next, Rel::Setup).is_none() {
        ast.insert(next, 0, collector);
        ast.set_rel(collector, Some(Rel::Setup));
        trace!("moved var into for setup");
    }
}

/// Merge directly adjacent `var` statements of every statement list
fn merge_adjacent(ast: &mut Ast, body: NodeId) -> bool {
    let mut lists = vec![body];
    lists.extend(
        body_nodes(ast, body)
            .into_iter()
            .filter(|id| ast.kind(*id).is_statement_list()),
    );

    let mut changed = false;
    for list in lists {
        let mut index = 1;
        while index < ast.children(list).len() {
            let children = ast.children(list);
            let (previous, current) = (children[index - 1], children[index]);
            if ast.kind(previous) == NodeKind::Var && ast.kind(current) == NodeKind::Var {
                ast.move_children(current, previous);
                ast.remove(current);
                changed = true;
            } else {
                index += 1;
            }
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegen::{compress, GeneratorOptions};
    use parser::parse;
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> String {
        let mut ast = parse(source, "test.js").unwrap();
        optimize(&mut ast);
        compress(&ast, &GeneratorOptions::default())
    }

    #[test]
    fn test_later_vars_become_assignments() {
        assert_eq!(
            run("var a = 1; f(); var b = 2, c; g(b, c);"),
            "var a=1,b,c;f();b=2;g(b,c);"
        );
    }

    #[test]
    fn test_adjacent_vars_are_merged() {
        assert_eq!(run("var a = 1; var b = 2; f(a, b);"), "var a=1,b=2;f(a,b);");
    }

    #[test]
    fn test_initializer_order_is_kept() {
        assert_eq!(
            run("var a = f(); g(); var b = h(), c = k();"),
            "var a=f(),b,c;g();b=h(),c=k();"
        );
    }

    #[test]
    fn test_nested_block_vars() {
        assert_eq!(
            run("function f() { var a = 1; if (x) { var b = 2; } }"),
            "function f(){var a=1,b;if(x){b=2}}"
        );
    }

    #[test]
    fn test_for_setup_var_becomes_expression() {
        assert_eq!(
            run("var a = 1; for (var i = 0; i < a; i++) f(i);"),
            "var a=1,i;for(i=0;i<a;i++)f(i);"
        );
    }

    #[test]
    fn test_for_in_iterator_is_never_a_collector() {
        assert_eq!(
            run("for (var k in o) f(k); var x = 1; use(x);"),
            "var x;for(var k in o)f(k);x=1;use(x);"
        );
    }

    #[test]
    fn test_for_in_iterator_is_not_rewritten() {
        assert_eq!(run("var a = 1; for (var k in o) f(k);"), "var a=1;for(var k in o)f(k);");
    }

    #[test]
    fn test_collector_moves_into_following_for() {
        assert_eq!(
            run("function f() { var i; for (;;) { var j = 1; } }"),
            "function f(){for(var i,j;;){j=1}}"
        );
    }

    #[test]
    fn test_destructuring_keeps_assignment() {
        assert_eq!(run("var a = 1; f(); var [b, c] = g();"), "var a=1,b,c;f();[b,c]=g();");
    }

    #[test]
    fn test_duplicates_are_pruned() {
        assert_eq!(run("var a = 1; f(); var a; use(a);"), "var a=1;f();use(a);");
        assert_eq!(run("var a, b, a = 2; use(a, b);"), "var b,a=2;use(a,b);");
    }

    #[test]
    fn test_nested_functions_are_separate() {
        assert_eq!(
            run("var a = 1; function f() { var b = 2; } var c = 3;"),
            "var a=1,c;function f(){var b=2}c=3;"
        );
    }
}
