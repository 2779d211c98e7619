//! Statement-level tree edits shared by the passes

use parser::{Ast, NodeId, NodeKind};

/// Remove a statement. Inside a statement list it is dropped, anywhere else
/// (a loop body, an `if` branch) it becomes an empty statement.
pub(crate) fn remove_statement(ast: &mut Ast, id: NodeId) {
    let in_list = ast.parent(id).map_or(false, |parent| ast.kind(parent).is_statement_list());
    if in_list {
        ast.remove(id);
    } else {
        let empty = ast.add(NodeKind::Semicolon, ast.node(id).span);
        ast.replace(id, empty);
    }
}

/// Replace a statement by another one. A block replacing a statement of a
/// statement list is spliced into the list unless it declares block scoped
/// names.
pub(crate) fn replace_statement(ast: &mut Ast, old: NodeId, new: NodeId) {
    let in_list = ast.parent(old).map_or(false, |parent| ast.kind(parent).is_statement_list());
    if in_list && ast.kind(new) == NodeKind::Block && !declares_block_scoped(ast, new) {
        for child in ast.children(new).to_vec() {
            ast.insert_before(old, child);
        }
        ast.remove(old);
    } else {
        ast.replace(old, new);
    }
}

/// Whether a block declares `let`/`const` names directly
pub(crate) fn declares_block_scoped(ast: &Ast, block: NodeId) -> bool {
    ast.children(block)
        .iter()
        .any(|child| matches!(ast.kind(*child), NodeKind::Let | NodeKind::Const))
}

/// Nodes of a body in pre-order, not entering nested functions
pub(crate) fn body_nodes(ast: &Ast, body: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = ast.children(body).iter().rev().copied().collect();
    while let Some(node) = stack.pop() {
        out.push(node);
        if ast.kind(node) != NodeKind::Function {
            stack.extend(ast.children(node).iter().rev().copied());
        }
    }
    out
}

/// Whether evaluating an expression can have no effect beyond its value
pub(crate) fn is_side_effect_free(ast: &Ast, id: NodeId) -> bool {
    match ast.kind(id) {
        NodeKind::Number
        | NodeKind::String
        | NodeKind::RegExp
        | NodeKind::True
        | NodeKind::False
        | NodeKind::Null
        | NodeKind::This
        | NodeKind::Identifier
        | NodeKind::Function => true,
        NodeKind::ArrayInit => ast.children(id).iter().all(|c| is_side_effect_free(ast, *c)),
        NodeKind::Hole => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parser::{parse, Rel};

    #[test]
    fn test_remove_statement_in_list_and_body() {
        let mut ast = parse("a(); while (x) b();", "test.js").unwrap();
        let root = ast.root();
        let first = ast.children(root)[0];
        let loop_node = ast.children(root)[1];
        let body = ast.child(loop_node, Rel::Body).unwrap();
        remove_statement(&mut ast, first);
        remove_statement(&mut ast, body);
        assert_eq!(ast.children(root).len(), 1);
        let body = ast.child(loop_node, Rel::Body).unwrap();
        assert_eq!(ast.kind(body), NodeKind::Semicolon);
        assert!(ast.child(body, Rel::Expression).is_none());
    }

    #[test]
    fn test_replace_statement_splices_blocks() {
        let mut ast = parse("if (x) { a(); b(); } c();", "test.js").unwrap();
        let root = ast.root();
        let statement = ast.children(root)[0];
        let block = ast.child(statement, Rel::ThenPart).unwrap();
        replace_statement(&mut ast, statement, block);
        assert_eq!(ast.children(root).len(), 3);
    }

    #[test]
    fn test_block_with_let_is_not_spliced() {
        let mut ast = parse("if (x) { let a = 1; f(a); }", "test.js").unwrap();
        let root = ast.root();
        let statement = ast.children(root)[0];
        let block = ast.child(statement, Rel::ThenPart).unwrap();
        replace_statement(&mut ast, statement, block);
        assert_eq!(ast.children(root), &[block]);
    }

    #[test]
    fn test_side_effect_free() {
        let ast = parse("x = [1, 'a', y]; z = f();", "test.js").unwrap();
        let assigns: Vec<NodeId> = ast
            .descendants(ast.root())
            .into_iter()
            .filter(|id| ast.kind(*id) == NodeKind::Assign)
            .collect();
        assert!(is_side_effect_free(&ast, ast.nth(assigns[0], 1).unwrap()));
        assert!(!is_side_effect_free(&ast, ast.nth(assigns[1], 1).unwrap()));
    }
}
