//! Block and statement reduction
//!
//! A bottom-up peephole pass. Children are reduced first, so a branch is
//! already as small as it gets when its `if` is looked at.

use codegen::{format_number, quote_string, Compressor, GeneratorOptions};
use parser::{Ast, NodeFlags, NodeId, NodeKind, Rel};
use tracing::{debug, trace};

use crate::tree::declares_block_scoped;

/// Reduce blocks, statements and expressions, returns whether anything changed
pub fn optimize(ast: &mut Ast) -> bool {
    let root = ast.root();
    let mut reducer = Reducer {
        options: GeneratorOptions::default(),
        changed: false,
    };
    reducer.visit(ast, root);
    if reducer.changed {
        debug!(file = %ast.file, "reduced blocks");
    }
    reducer.changed
}

struct Reducer {
    options: GeneratorOptions,
    changed: bool,
}

impl Reducer {
    fn text(&self, ast: &Ast, id: NodeId) -> String {
        Compressor::new(ast, self.options).compress(id)
    }

    fn visit(&mut self, ast: &mut Ast, id: NodeId) {
        for child in ast.children(id).to_vec() {
            self.visit(ast, child);
        }

        let kind = ast.kind(id);
        if ast.has_flag(id, NodeFlags::PARENTHESIZED) {
            self.remove_parens(ast, id);
        }
        match kind {
            NodeKind::Script | NodeKind::Block => {
                self.reduce_list(ast, id);
                if kind == NodeKind::Block {
                    self.collapse_block(ast, id);
                }
            }
            NodeKind::If => self.reduce_if(ast, id),
            NodeKind::UnaryMinus => self.fold_negation(ast, id),
            _ if kind.is_binary() => self.fold_literals(ast, id),
            _ => {}
        }
    }

    // ---------------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------------

    fn remove_parens(&mut self, ast: &mut Ast, id: NodeId) {
        let keep = match ast.kind(id) {
            NodeKind::Function => is_callee(ast, id) || at_statement_start(ast, id),
            NodeKind::ObjectInit => at_statement_start(ast, id),
            NodeKind::New => ast.parent(id).map_or(false, |parent| {
                matches!(ast.kind(parent), NodeKind::Dot | NodeKind::Index | NodeKind::Call)
                    && ast.index_of(id) == Some(0)
            }),
            NodeKind::Generator => true,
            _ => false,
        };
        if !keep {
            ast.set_flag(id, NodeFlags::PARENTHESIZED, false);
            self.changed = true;
        }
    }

    fn fold_negation(&mut self, ast: &mut Ast, id: NodeId) {
        let Some(operand) = ast.nth(id, 0) else {
            return;
        };
        if ast.kind(operand) != NodeKind::Number || ast.has_flag(id, NodeFlags::PARENTHESIZED) {
            return;
        }
        if let Some(value) = ast.number(operand).filter(|v| *v != 0.0) {
            let folded = ast.add_number(-value, ast.node(id).span);
            ast.replace(id, folded);
            self.changed = true;
        }
    }

    fn fold_literals(&mut self, ast: &mut Ast, id: NodeId) {
        let (Some(left), Some(right)) = (ast.nth(id, 0), ast.nth(id, 1)) else {
            return;
        };
        let span = ast.node(id).span;
        let folded = match (ast.kind(left), ast.kind(right)) {
            (NodeKind::Number, NodeKind::Number) => {
                let (Some(a), Some(b)) = (ast.number(left), ast.number(right)) else {
                    return;
                };
                let value = match ast.kind(id) {
                    NodeKind::Plus => a + b,
                    NodeKind::Minus => a - b,
                    NodeKind::Mul => a * b,
                    NodeKind::Div => a / b,
                    NodeKind::Mod => a % b,
                    _ => return,
                };
                if !value.is_finite() || (value == 0.0 && value.is_sign_negative()) {
                    return;
                }
                if format_number(value).len() > self.text(ast, id).len() {
                    return;
                }
                ast.add_number(value, span)
            }
            (NodeKind::String, NodeKind::String) if ast.kind(id) == NodeKind::Plus => {
                let value = format!("{}{}", ast.text(left), ast.text(right));
                if quote_string(&value, self.options.ascii_threshold).len() > self.text(ast, id).len() {
                    return;
                }
                ast.add_text(NodeKind::String, value, span)
            }
            _ => return,
        };
        trace!(line = span.line, "folded literal expression");
        ast.replace(id, folded);
        self.changed = true;
    }

    // ---------------------------------------------------------------------
    // Statement lists
    // ---------------------------------------------------------------------

    fn reduce_list(&mut self, ast: &mut Ast, list: NodeId) {
        for child in ast.children(list).to_vec() {
            match ast.kind(child) {
                NodeKind::Semicolon if ast.child(child, Rel::Expression).is_none() => {
                    ast.remove(child);
                    self.changed = true;
                }
                NodeKind::Block if !declares_block_scoped(ast, child) && !has_function_statement(ast, child) => {
                    for statement in ast.children(child).to_vec() {
                        ast.insert_before(child, statement);
                    }
                    ast.remove(child);
                    self.changed = true;
                }
                _ => {}
            }
        }

        let mut index = 1;
        while index < ast.children(list).len() {
            let children = ast.children(list);
            let (previous, current) = (children[index - 1], children[index]);
            let expressions = (
                ast.child(previous, Rel::Expression).filter(|_| ast.kind(previous) == NodeKind::Semicolon),
                ast.child(current, Rel::Expression).filter(|_| ast.kind(current) == NodeKind::Semicolon),
            );
            if let (Some(first), Some(second)) = expressions {
                let comma = comma_of(ast, first);
                append_flattened(ast, comma, second);
                ast.remove(current);
                self.changed = true;
            } else {
                index += 1;
            }
        }
    }

    fn collapse_block(&mut self, ast: &mut Ast, block: NodeId) {
        let Some(parent) = ast.parent(block) else {
            return;
        };
        let in_statement_position = matches!(
            ast.kind(parent),
            NodeKind::If | NodeKind::For | NodeKind::ForIn | NodeKind::While | NodeKind::Do | NodeKind::With | NodeKind::Label
        ) && matches!(
            ast.rel(block),
            Some(Rel::ThenPart) | Some(Rel::ElsePart) | Some(Rel::Body) | Some(Rel::Statement)
        );
        if !in_statement_position {
            return;
        }

        match ast.children(block) {
            [] => {
                let empty = ast.add(NodeKind::Semicolon, ast.node(block).span);
                ast.replace(block, empty);
                self.changed = true;
            }
            [statement] => {
                let statement = *statement;
                let single_safe = !matches!(
                    ast.kind(statement),
                    NodeKind::Let | NodeKind::Const | NodeKind::Function
                );
                let dangling = ast.rel(block) == Some(Rel::ThenPart)
                    && ast.child(parent, Rel::ElsePart).is_some()
                    && ends_with_open_if(ast, statement);
                if single_safe && !dangling {
                    ast.replace(block, statement);
                    self.changed = true;
                }
            }
            _ => {}
        }
    }

    // ---------------------------------------------------------------------
    // If statements
    // ---------------------------------------------------------------------

    fn reduce_if(&mut self, ast: &mut Ast, id: NodeId) {
        let (Some(condition), Some(then_part)) = (ast.child(id, Rel::Condition), ast.child(id, Rel::ThenPart)) else {
            return;
        };
        let span = ast.node(id).span;

        let Some(else_part) = ast.child(id, Rel::ElsePart) else {
            self.if_to_logical(ast, id, condition, then_part);
            return;
        };

        // if(c)return A;else return B; => return c?A:B;
        if ast.kind(then_part) == NodeKind::Return && ast.kind(else_part) == NodeKind::Return {
            if let (Some(a), Some(b)) = (ast.child(then_part, Rel::Value), ast.child(else_part, Rel::Value)) {
                let hook = hook(ast, condition, a, b);
                let statement = ast.add(NodeKind::Return, span);
                ast.append_rel(statement, Rel::Value, hook);
                ast.replace(id, statement);
                trace!(line = span.line, "merged returns into conditional");
                self.changed = true;
                return;
            }
        }

        let then_expression = expression_of(ast, then_part);
        let else_expression = expression_of(ast, else_part);
        if let (Some(a), Some(b)) = (then_expression, else_expression) {
            // if(c)x=A;else x=B; => x=c?A:B;
            if ast.kind(a) == NodeKind::Assign && ast.kind(b) == NodeKind::Assign && same_assignment(self, ast, a, b) {
                if let (Some(target), Some(value_a), Some(value_b)) = (ast.nth(a, 0), ast.nth(a, 1), ast.nth(b, 1)) {
                    let operator = ast.node(a).assign_op;
                    let hook = hook(ast, condition, value_a, value_b);
                    let assign = ast.add(NodeKind::Assign, span);
                    ast.node_mut(assign).assign_op = operator;
                    ast.append(assign, target);
                    ast.append(assign, hook);
                    let statement = expression_statement(ast, assign);
                    ast.replace(id, statement);
                    trace!(line = span.line, "merged assignments into conditional");
                    self.changed = true;
                    return;
                }
            }

            // if(c)A;else B; => c?A:B;
            let hook = hook(ast, condition, a, b);
            let statement = expression_statement(ast, hook);
            ast.replace(id, statement);
            trace!(line = span.line, "turned if into conditional");
            self.changed = true;
            return;
        }

        // if(c){...return}else{...} => if(c){...return}...
        let in_list = ast.parent(id).map_or(false, |p| ast.kind(p).is_statement_list());
        if in_list && ends_in_jump(ast, then_part) {
            let statements = if ast.kind(else_part) == NodeKind::Block {
                if declares_block_scoped(ast, else_part) {
                    return;
                }
                ast.children(else_part).to_vec()
            } else {
                vec![else_part]
            };
            ast.remove(else_part);
            let mut anchor = id;
            for statement in statements {
                ast.insert_after(anchor, statement);
                ast.set_rel(statement, None);
                anchor = statement;
            }
            trace!(line = span.line, "elided else after jump");
            self.changed = true;
        }
    }

    /// if(c)EXPR; => c&&EXPR; and if(!c)EXPR; => c||EXPR; when shorter
    fn if_to_logical(&mut self, ast: &mut Ast, id: NodeId, condition: NodeId, then_part: NodeId) {
        let Some(expression) = expression_of(ast, then_part) else {
            return;
        };
        let (kind, left) = match ast.kind(condition) {
            NodeKind::Not if !ast.has_flag(condition, NodeFlags::PARENTHESIZED) => match ast.nth(condition, 0) {
                Some(operand) => (NodeKind::Or, operand),
                None => return,
            },
            _ => (NodeKind::And, condition),
        };

        let span = ast.node(id).span;
        let left_copy = ast.clone_subtree(left);
        let right_copy = ast.clone_subtree(expression);
        ast.set_rel(left_copy, None);
        ast.set_rel(right_copy, None);
        let logical = ast.add(kind, span);
        ast.append(logical, left_copy);
        ast.append(logical, right_copy);
        let statement = expression_statement(ast, logical);

        if self.text(ast, statement).len() < self.text(ast, id).len() {
            ast.replace(id, statement);
            trace!(line = span.line, "turned if into logical expression");
            self.changed = true;
        }
    }
}

fn hook(ast: &mut Ast, condition: NodeId, a: NodeId, b: NodeId) -> NodeId {
    let span = ast.node(condition).span;
    let hook = ast.add(NodeKind::Hook, span);
    for part in [condition, a, b] {
        ast.append(hook, part);
        ast.set_rel(part, None);
    }
    hook
}

fn expression_statement(ast: &mut Ast, expression: NodeId) -> NodeId {
    let statement = ast.add(NodeKind::Semicolon, ast.node(expression).span);
    ast.append_rel(statement, Rel::Expression, expression);
    statement
}

/// Expression of an expression statement
fn expression_of(ast: &Ast, statement: NodeId) -> Option<NodeId> {
    if ast.kind(statement) == NodeKind::Semicolon {
        ast.child(statement, Rel::Expression)
    } else {
        None
    }
}

fn same_assignment(reducer: &Reducer, ast: &Ast, a: NodeId, b: NodeId) -> bool {
    if ast.node(a).assign_op != ast.node(b).assign_op {
        return false;
    }
    match (ast.nth(a, 0), ast.nth(b, 0)) {
        (Some(x), Some(y)) => {
            matches!(ast.kind(x), NodeKind::Identifier | NodeKind::Dot | NodeKind::Index)
                && reducer.text(ast, x) == reducer.text(ast, y)
        }
        _ => false,
    }
}

/// Comma expression holding `first`, creating one in its place if needed
fn comma_of(ast: &mut Ast, first: NodeId) -> NodeId {
    if ast.kind(first) == NodeKind::Comma && !ast.has_flag(first, NodeFlags::PARENTHESIZED) {
        return first;
    }
    let comma = ast.add(NodeKind::Comma, ast.node(first).span);
    ast.replace(first, comma);
    ast.append(comma, first);
    ast.set_rel(first, None);
    comma
}

fn append_flattened(ast: &mut Ast, comma: NodeId, expression: NodeId) {
    if ast.kind(expression) == NodeKind::Comma && !ast.has_flag(expression, NodeFlags::PARENTHESIZED) {
        for child in ast.children(expression).to_vec() {
            ast.append(comma, child);
        }
    } else {
        ast.append(comma, expression);
        ast.set_rel(expression, None);
    }
}

fn has_function_statement(ast: &Ast, block: NodeId) -> bool {
    ast.children(block)
        .iter()
        .any(|child| ast.kind(*child) == NodeKind::Function)
}

fn ends_in_jump(ast: &Ast, statement: NodeId) -> bool {
    match ast.kind(statement) {
        NodeKind::Return | NodeKind::Throw => true,
        NodeKind::Block => ast
            .children(statement)
            .last()
            .map_or(false, |last| matches!(ast.kind(*last), NodeKind::Return | NodeKind::Throw)),
        _ => false,
    }
}

fn ends_with_open_if(ast: &Ast, id: NodeId) -> bool {
    match ast.kind(id) {
        NodeKind::If => match ast.child(id, Rel::ElsePart) {
            Some(else_part) => ends_with_open_if(ast, else_part),
            None => true,
        },
        NodeKind::For | NodeKind::ForIn | NodeKind::While | NodeKind::With => ast
            .child(id, Rel::Body)
            .map_or(false, |body| ends_with_open_if(ast, body)),
        NodeKind::Label => ast
            .child(id, Rel::Statement)
            .map_or(false, |statement| ends_with_open_if(ast, statement)),
        _ => false,
    }
}

fn is_callee(ast: &Ast, id: NodeId) -> bool {
    ast.parent(id).map_or(false, |parent| {
        matches!(ast.kind(parent), NodeKind::Call | NodeKind::New | NodeKind::NewWithArgs) && ast.index_of(id) == Some(0)
    })
}

/// Whether the node is the leftmost part of an expression statement
fn at_statement_start(ast: &Ast, id: NodeId) -> bool {
    let mut current = id;
    while let Some(parent) = ast.parent(current) {
        let kind = ast.kind(parent);
        if kind == NodeKind::Semicolon {
            return true;
        }
        let leftmost_child = kind.is_binary()
            || matches!(
                kind,
                NodeKind::Assign | NodeKind::Hook | NodeKind::Comma | NodeKind::Dot | NodeKind::Index | NodeKind::Call
            )
            || ((kind == NodeKind::Increment || kind == NodeKind::Decrement) && ast.has_flag(parent, NodeFlags::POSTFIX));
        if !leftmost_child || ast.index_of(current) != Some(0) || ast.has_flag(parent, NodeFlags::PARENTHESIZED) {
            return false;
        }
        current = parent;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegen::compress;
    use parser::parse;
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> String {
        let mut ast = parse(source, "test.js").unwrap();
        optimize(&mut ast);
        compress(&ast, &GeneratorOptions::default())
    }

    #[test]
    fn test_literal_folding() {
        assert_eq!(run("x = 2 * 3 + 1;"), "x=7;");
        assert_eq!(run("x = 'a' + 'b';"), "x=\"ab\";");
        assert_eq!(run("x = 1 / 3;"), "x=1/3;");
        assert_eq!(run("x = 1 / 0;"), "x=1/0;");
        assert_eq!(run("x = a + 1 + 2;"), "x=a+1+2;");
        assert_eq!(run("x = -2 * 4;"), "x=-8;");
    }

    #[test]
    fn test_parentheses_removal() {
        assert_eq!(run("x = (a) + (b * c);"), "x=a+b*c;");
        assert_eq!(run("x = (a + b) * c;"), "x=(a+b)*c;");
        assert_eq!(run("x = typeof (a);"), "x=typeof a;");
    }

    #[test]
    fn test_parentheses_kept_where_needed() {
        assert_eq!(run("(function() {})();"), "(function(){})();");
        assert_eq!(run("({}).toString();"), "({}).toString();");
        assert_eq!(run("x = (new Foo).bar;"), "x=(new Foo).bar;");
    }

    #[test]
    fn test_single_statement_block_collapse() {
        assert_eq!(run("while (x) { f(); }"), "while(x)f();");
        assert_eq!(run("if (x) {}"), "if(x);");
        assert_eq!(run("if (x) { let y = 1; }"), "if(x){let y=1}");
    }

    #[test]
    fn test_dangling_else_block_is_kept() {
        assert_eq!(
            run("if (a) { if (b) { c(); d(); } } else e();"),
            "if(a){if(b)c(),d()}else e();"
        );
    }

    #[test]
    fn test_nested_blocks_and_empty_statements() {
        assert_eq!(run("a(); ; { b(); } ;"), "a(),b();");
    }

    #[test]
    fn test_expression_statements_merge() {
        assert_eq!(run("a(); b(); c = 1; return_();"), "a(),b(),c=1,return_();");
        assert_eq!(run("function f() { a(); b(); return 1; }"), "function f(){a(),b();return 1}");
    }

    #[test]
    fn test_if_else_returns() {
        assert_eq!(run("function f() { if (c) return a; else return b; }"), "function f(){return c?a:b}");
    }

    #[test]
    fn test_if_else_same_assignment() {
        assert_eq!(run("if (c) x = 1; else x = 2;"), "x=c?1:2;");
        assert_eq!(run("if (c) o.p += 1; else o.p += g();"), "o.p+=c?1:g();");
        assert_eq!(run("if (c) x = 1; else y = 2;"), "c?x=1:y=2;");
    }

    #[test]
    fn test_if_else_expressions() {
        assert_eq!(run("if (c) { a(); } else { b(); }"), "c?a():b();");
    }

    #[test]
    fn test_else_after_return_is_elided() {
        assert_eq!(
            run("function f() { if (c) { g(); return 1; } else { h(); } k(); }"),
            "function f(){if(c){g();return 1}h(),k()}"
        );
    }

    #[test]
    fn test_if_to_logical() {
        assert_eq!(run("if (c) f();"), "c&&f();");
        assert_eq!(run("if (!c) f();"), "c||f();");
    }

    #[test]
    fn test_if_kept_when_not_shorter() {
        assert_eq!(run("if (a = b) x = 1;"), "if(a=b)x=1;");
    }
}
