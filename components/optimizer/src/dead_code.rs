//! Dead code elimination
//!
//! Conditions that are constant after permutation substitution are
//! evaluated with three-valued logic: known true, known false, or unknown.
//! Branches that can never run are dropped, the taken branch replaces its
//! `if`, `?:` or `switch`.

use parser::{Ast, NodeId, NodeKind, Rel};
use tracing::{debug, trace};

use crate::tree::{remove_statement, replace_statement};

/// Remove unreachable branches below the root, returns whether anything changed
pub fn optimize(ast: &mut Ast) -> bool {
    let root = ast.root();
    let changed = visit(ast, root);
    if changed {
        debug!(file = %ast.file, "removed dead code");
    }
    changed
}

fn visit(ast: &mut Ast, id: NodeId) -> bool {
    let mut changed = false;
    for child in ast.children(id).to_vec() {
        changed |= visit(ast, child);
    }

    match ast.kind(id) {
        NodeKind::If => changed |= fold_if(ast, id),
        NodeKind::Hook => changed |= fold_hook(ast, id),
        NodeKind::Switch => changed |= fold_switch(ast, id),
        _ => {}
    }
    changed
}

/// Three-valued value of a condition, `None` when unknown
///
/// # Examples
///
/// ```
/// use optimizer::dead_code::evaluate;
/// use parser::parse_expression;
///
/// let known = parse_expression("!(false || 'a' == 'b')", "x.js").unwrap();
/// assert_eq!(evaluate(&known, known.root()), Some(true));
///
/// let unknown = parse_expression("x && true", "x.js").unwrap();
/// assert_eq!(evaluate(&unknown, unknown.root()), None);
/// ```
pub fn evaluate(ast: &Ast, id: NodeId) -> Option<bool> {
    match ast.kind(id) {
        NodeKind::True => Some(true),
        NodeKind::False => Some(false),
        NodeKind::Not => ast.nth(id, 0).and_then(|operand| evaluate(ast, operand)).map(|v| !v),
        NodeKind::And => {
            let left = ast.nth(id, 0).and_then(|n| evaluate(ast, n));
            let right = ast.nth(id, 1).and_then(|n| evaluate(ast, n));
            match (left, right) {
                (Some(false), _) | (_, Some(false)) => Some(false),
                (Some(true), Some(true)) => Some(true),
                _ => None,
            }
        }
        NodeKind::Or => {
            let left = ast.nth(id, 0).and_then(|n| evaluate(ast, n));
            let right = ast.nth(id, 1).and_then(|n| evaluate(ast, n));
            match (left, right) {
                (Some(true), _) | (_, Some(true)) => Some(true),
                (Some(false), Some(false)) => Some(false),
                _ => None,
            }
        }
        NodeKind::Eq | NodeKind::StrictEq => literal_equality(ast, id),
        NodeKind::Ne | NodeKind::StrictNe => literal_equality(ast, id).map(|v| !v),
        _ => None,
    }
}

/// Equality of two literals of the same kind
fn literal_equality(ast: &Ast, id: NodeId) -> Option<bool> {
    let left = ast.nth(id, 0)?;
    let right = ast.nth(id, 1)?;
    literals_equal(ast, left, right)
}

fn literals_equal(ast: &Ast, left: NodeId, right: NodeId) -> Option<bool> {
    let kind = ast.kind(left);
    let same_kind = kind == ast.kind(right)
        || (matches!(kind, NodeKind::True | NodeKind::False)
            && matches!(ast.kind(right), NodeKind::True | NodeKind::False));
    if !same_kind {
        return None;
    }
    match kind {
        NodeKind::String => Some(ast.text(left) == ast.text(right)),
        NodeKind::Number => Some(ast.number(left)? == ast.number(right)?),
        NodeKind::True | NodeKind::False => Some(kind == ast.kind(right)),
        NodeKind::Null => Some(true),
        _ => None,
    }
}

fn fold_if(ast: &mut Ast, id: NodeId) -> bool {
    let Some(value) = ast.child(id, Rel::Condition).and_then(|c| evaluate(ast, c)) else {
        return false;
    };
    let taken = if value {
        ast.child(id, Rel::ThenPart)
    } else {
        ast.child(id, Rel::ElsePart)
    };
    trace!(line = ast.node(id).span.line, value, "resolved if");
    match taken {
        Some(branch) => replace_statement(ast, id, branch),
        None => remove_statement(ast, id),
    }
    true
}

fn fold_hook(ast: &mut Ast, id: NodeId) -> bool {
    let Some(value) = ast.nth(id, 0).and_then(|c| evaluate(ast, c)) else {
        return false;
    };
    let Some(taken) = ast.nth(id, if value { 1 } else { 2 }) else {
        return false;
    };
    trace!(line = ast.node(id).span.line, value, "resolved conditional");
    ast.replace(id, taken);
    true
}

fn fold_switch(ast: &mut Ast, id: NodeId) -> bool {
    let Some(discriminant) = ast.child(id, Rel::Discriminant) else {
        return false;
    };
    if !matches!(ast.kind(discriminant), NodeKind::String | NodeKind::Number) {
        return false;
    }

    let clauses: Vec<NodeId> = ast
        .children(id)
        .iter()
        .copied()
        .filter(|c| matches!(ast.kind(*c), NodeKind::Case | NodeKind::Default))
        .collect();

    let mut matched = None;
    let mut default = None;
    for clause in &clauses {
        let Some(statements) = ast.child(*clause, Rel::Statements) else {
            return false;
        };
        if !ends_in_plain_break(ast, statements) || breaks_early(ast, statements, id) {
            return false;
        }
        match ast.kind(*clause) {
            NodeKind::Default => default = Some(statements),
            _ => {
                let Some(label) = ast.child(*clause, Rel::Label) else {
                    return false;
                };
                match literals_equal(ast, discriminant, label) {
                    Some(true) if matched.is_none() => matched = Some(statements),
                    Some(_) => {}
                    // A case label that is not a comparable literal
                    None if ast.kind(label).is_literal() => {}
                    None => return false,
                }
            }
        }
    }

    trace!(line = ast.node(id).span.line, "resolved switch");
    match matched.or(default) {
        Some(statements) => {
            if let Some(last) = ast.children(statements).last().copied() {
                ast.remove(last);
            }
            ast.set_rel(statements, None);
            replace_statement(ast, id, statements);
        }
        None => remove_statement(ast, id),
    }
    true
}

fn ends_in_plain_break(ast: &Ast, statements: NodeId) -> bool {
    ast.children(statements)
        .last()
        .map_or(false, |last| ast.kind(*last) == NodeKind::Break && ast.text_opt(*last).is_none())
}

/// Whether a `break` other than the final one leaves the switch
fn breaks_early(ast: &Ast, statements: NodeId, switch: NodeId) -> bool {
    let children = ast.children(statements);
    let Some((_, body)) = children.split_last() else {
        return false;
    };
    body.iter().any(|statement| {
        ast.descendants(*statement).into_iter().any(|node| {
            ast.kind(node) == NodeKind::Break
                && ast.text_opt(node).is_none()
                && ast.ancestor(
                    node,
                    &[
                        NodeKind::For,
                        NodeKind::ForIn,
                        NodeKind::While,
                        NodeKind::Do,
                        NodeKind::Switch,
                        NodeKind::Function,
                    ],
                ) == Some(switch)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegen::{compress, GeneratorOptions};
    use parser::{parse, parse_expression};
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> String {
        let mut ast = parse(source, "test.js").unwrap();
        optimize(&mut ast);
        compress(&ast, &GeneratorOptions::default())
    }

    fn value(source: &str) -> Option<bool> {
        let ast = parse_expression(source, "test.js").unwrap();
        evaluate(&ast, ast.root())
    }

    #[test]
    fn test_and_truth_table() {
        assert_eq!(value("true && true"), Some(true));
        assert_eq!(value("true && false"), Some(false));
        assert_eq!(value("false && x"), Some(false));
        assert_eq!(value("x && false"), Some(false));
        assert_eq!(value("x && true"), None);
        assert_eq!(value("true && x"), None);
    }

    #[test]
    fn test_or_truth_table() {
        assert_eq!(value("false || false"), Some(false));
        assert_eq!(value("false || true"), Some(true));
        assert_eq!(value("true || x"), Some(true));
        assert_eq!(value("x || true"), Some(true));
        assert_eq!(value("x || false"), None);
    }

    #[test]
    fn test_literal_comparisons() {
        assert_eq!(value("'a' == 'a'"), Some(true));
        assert_eq!(value("'a' !== 'b'"), Some(true));
        assert_eq!(value("1 === 2"), Some(false));
        assert_eq!(value("true != false"), Some(true));
        assert_eq!(value("null == null"), Some(true));
        assert_eq!(value("1 == '1'"), None);
        assert_eq!(value("a == 'a'"), None);
        assert_eq!(value("!(1 == 1)"), Some(false));
    }

    #[test]
    fn test_if_true_keeps_then() {
        assert_eq!(run("if (true) x++;"), "x++;");
    }

    #[test]
    fn test_if_false_without_else_is_removed() {
        assert_eq!(run("if (false) x++;"), "");
    }

    #[test]
    fn test_if_false_keeps_else() {
        assert_eq!(run("if (false) a(); else b();"), "b();");
    }

    #[test]
    fn test_unknown_condition_is_kept() {
        assert_eq!(run("if (x && true) y++;"), "if(x&&true)y++;");
    }

    #[test]
    fn test_taken_block_is_spliced() {
        assert_eq!(run("a(); if (true) { b(); c(); } d();"), "a();b();c();d();");
    }

    #[test]
    fn test_block_with_let_is_kept() {
        assert_eq!(run("if (true) { let a = 1; f(a); }"), "{let a=1;f(a)}");
    }

    #[test]
    fn test_nested_if_branch_becomes_empty() {
        assert_eq!(run("while (x) if (false) y();"), "while(x);");
    }

    #[test]
    fn test_conditional_expression() {
        assert_eq!(run("x = 'a' == 'a' ? 1 : 2;"), "x=1;");
        assert_eq!(run("x = false ? 1 : y ? 2 : 3;"), "x=y?2:3;");
    }

    #[test]
    fn test_switch_on_literal() {
        assert_eq!(
            run("switch ('b') { case 'a': a(); break; case 'b': b(); c(); break; default: d(); break; }"),
            "b();c();"
        );
        assert_eq!(run("switch (3) { case 1: a(); break; default: d(); break; }"), "d();");
        assert_eq!(run("switch (3) { case 1: a(); break; }"), "");
    }

    #[test]
    fn test_switch_with_fallthrough_is_kept() {
        let source = "switch(\"a\"){case\"a\":a();case\"b\":b();break}";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_switch_with_inner_break_is_kept() {
        let source = "switch(\"a\"){case\"a\":if(x)break;a();break}";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_reports_change() {
        let mut ast = parse("if (y) x();", "test.js").unwrap();
        assert!(!optimize(&mut ast));
        let mut ast = parse("if (!true) x();", "test.js").unwrap();
        assert!(optimize(&mut ast));
    }
}
