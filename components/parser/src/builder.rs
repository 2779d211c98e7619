//! Tree construction seam between the parser and its output
//!
//! The parser never touches nodes directly. Every production calls one
//! [`TreeBuilder`] method with the already-built children, so the grammar can
//! be exercised with any representation. [`AstBuilder`] builds the arena
//! [`Ast`] used by the rest of the compiler.

use crate::ast::{Ast, FunctionForm, NodeFlags, NodeId, NodeKind, Rel, Value};
use crate::comment::Comment;
use core_types::Span;

/// How a node may be used on the left side of an assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetShape {
    /// Identifier or member access
    Simple,
    /// Array or object destructuring pattern
    Pattern,
    /// Call expression, accepted as a legacy target
    Call,
    /// Anything else
    Invalid,
}

/// Property accessor kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessor {
    /// `get name() {}`
    Getter,
    /// `set name(v) {}`
    Setter,
}

/// Declared name of a single declarator
#[derive(Debug, Clone, PartialEq)]
pub enum DeclTarget<N> {
    /// Plain identifier
    Name(String),
    /// Destructuring pattern
    Pattern(N),
}

/// Parts of a function handed to [`TreeBuilder::function`]
#[derive(Debug, Clone)]
pub struct FunctionParts<N> {
    /// Function name, the property name for accessors
    pub name: Option<String>,
    /// Parameter identifiers or patterns
    pub params: Vec<N>,
    /// Body script, or the bare expression of an expression closure
    pub body: N,
    /// Declared, expressed or statement form
    pub form: FunctionForm,
    /// Body is a bare expression
    pub expression_closure: bool,
    /// Getter or setter inside an object literal
    pub accessor: Option<Accessor>,
}

/// One method per grammar production.
///
/// Children are always built before their parent, so an implementation only
/// ever combines finished nodes.
pub trait TreeBuilder {
    /// Handle of a built node
    type Node: Copy;

    // Statements

    /// Top level or function body
    fn script(&mut self, statements: Vec<Self::Node>, span: Span) -> Self::Node;
    /// `{ ... }`
    fn block(&mut self, statements: Vec<Self::Node>, span: Span) -> Self::Node;
    /// `;`
    fn empty_statement(&mut self, span: Span) -> Self::Node;
    /// Expression followed by `;`
    fn expression_statement(&mut self, expression: Self::Node, span: Span) -> Self::Node;
    /// `var`, `const` or `let` list, `kind` is one of the declaration list kinds
    fn variables(&mut self, kind: NodeKind, declarations: Vec<Self::Node>, span: Span) -> Self::Node;
    /// Single declarator
    fn declaration(
        &mut self,
        target: DeclTarget<Self::Node>,
        initializer: Option<Self::Node>,
        span: Span,
    ) -> Self::Node;
    /// `if`
    fn if_statement(
        &mut self,
        condition: Self::Node,
        then_part: Self::Node,
        else_part: Option<Self::Node>,
        span: Span,
    ) -> Self::Node;
    /// `switch`
    fn switch_statement(&mut self, discriminant: Self::Node, cases: Vec<Self::Node>, span: Span) -> Self::Node;
    /// `case label:` or, without label, `default:`
    fn case_clause(&mut self, label: Option<Self::Node>, statements: Vec<Self::Node>, span: Span) -> Self::Node;
    /// Classic `for`
    fn for_statement(
        &mut self,
        setup: Option<Self::Node>,
        condition: Option<Self::Node>,
        update: Option<Self::Node>,
        body: Self::Node,
        span: Span,
    ) -> Self::Node;
    /// `for (x in o)` and `for each (x in o)`
    fn for_in_statement(
        &mut self,
        iterator: Self::Node,
        object: Self::Node,
        body: Self::Node,
        each: bool,
        span: Span,
    ) -> Self::Node;
    /// `while`
    fn while_statement(&mut self, condition: Self::Node, body: Self::Node, span: Span) -> Self::Node;
    /// `do ... while`
    fn do_while_statement(&mut self, body: Self::Node, condition: Self::Node, span: Span) -> Self::Node;
    /// `try`
    fn try_statement(
        &mut self,
        block: Self::Node,
        catches: Vec<Self::Node>,
        finally: Option<Self::Node>,
        span: Span,
    ) -> Self::Node;
    /// `catch (e [if guard]) { ... }`
    fn catch_clause(
        &mut self,
        exception: Self::Node,
        guard: Option<Self::Node>,
        block: Self::Node,
        span: Span,
    ) -> Self::Node;
    /// `throw`
    fn throw_statement(&mut self, exception: Self::Node, span: Span) -> Self::Node;
    /// `return`
    fn return_statement(&mut self, value: Option<Self::Node>, span: Span) -> Self::Node;
    /// `break`
    fn break_statement(&mut self, label: Option<String>, span: Span) -> Self::Node;
    /// `continue`
    fn continue_statement(&mut self, label: Option<String>, span: Span) -> Self::Node;
    /// `label: statement`
    fn labeled_statement(&mut self, label: String, statement: Self::Node, span: Span) -> Self::Node;
    /// `with`
    fn with_statement(&mut self, object: Self::Node, body: Self::Node, span: Span) -> Self::Node;
    /// `debugger`
    fn debugger_statement(&mut self, span: Span) -> Self::Node;
    /// `let (...) { ... }`, `variables` is a `let` list
    fn let_block(&mut self, variables: Self::Node, block: Self::Node, span: Span) -> Self::Node;

    // Functions

    /// Function declaration, expression, expression closure or accessor
    fn function(&mut self, parts: FunctionParts<Self::Node>, span: Span) -> Self::Node;

    // Expressions

    /// `a, b, c`
    fn comma(&mut self, expressions: Vec<Self::Node>, span: Span) -> Self::Node;
    /// `target = value`, `op` set for compound assignments
    fn assignment(
        &mut self,
        op: Option<NodeKind>,
        target: Self::Node,
        value: Self::Node,
        span: Span,
    ) -> Self::Node;
    /// `c ? a : b`
    fn conditional(
        &mut self,
        condition: Self::Node,
        then_part: Self::Node,
        else_part: Self::Node,
        span: Span,
    ) -> Self::Node;
    /// Binary operator
    fn binary(&mut self, op: NodeKind, left: Self::Node, right: Self::Node, span: Span) -> Self::Node;
    /// Prefix unary operator
    fn unary(&mut self, op: NodeKind, operand: Self::Node, span: Span) -> Self::Node;
    /// `++`/`--`, prefix or postfix
    fn update(&mut self, op: NodeKind, operand: Self::Node, postfix: bool, span: Span) -> Self::Node;
    /// `object.name`
    fn member(&mut self, object: Self::Node, name: String, span: Span) -> Self::Node;
    /// `object[index]`
    fn index(&mut self, object: Self::Node, index: Self::Node, span: Span) -> Self::Node;
    /// `callee(args)`
    fn call(&mut self, callee: Self::Node, args: Vec<Self::Node>, span: Span) -> Self::Node;
    /// `new callee` or `new callee(args)`
    fn new_expression(&mut self, callee: Self::Node, args: Option<Vec<Self::Node>>, span: Span) -> Self::Node;
    /// Identifier
    fn identifier(&mut self, name: String, span: Span) -> Self::Node;
    /// Number literal
    fn number(&mut self, value: f64, span: Span) -> Self::Node;
    /// String literal
    fn string(&mut self, value: String, span: Span) -> Self::Node;
    /// Regular expression literal
    fn regexp(&mut self, source: String, span: Span) -> Self::Node;
    /// `this`, `true`, `false` or `null`
    fn primary(&mut self, kind: NodeKind, span: Span) -> Self::Node;
    /// Array literal, `None` marks an elided slot
    fn array_literal(&mut self, elements: Vec<Option<Self::Node>>, span: Span) -> Self::Node;
    /// Object literal of properties and accessors
    fn object_literal(&mut self, properties: Vec<Self::Node>, span: Span) -> Self::Node;
    /// `key: value`
    fn property(&mut self, key: Self::Node, value: Self::Node, span: Span) -> Self::Node;
    /// `[expr for (x in o) if (c)]`
    fn array_comprehension(&mut self, expression: Self::Node, tail: Self::Node, span: Span) -> Self::Node;
    /// `(expr for (x in o))`
    fn generator_expression(&mut self, expression: Self::Node, tail: Self::Node, span: Span) -> Self::Node;
    /// `for` clauses and optional guard of a comprehension
    fn comprehension_tail(&mut self, fors: Vec<Self::Node>, guard: Option<Self::Node>, span: Span) -> Self::Node;
    /// Single `for (x in o)` clause of a comprehension
    fn comprehension_for(&mut self, iterator: Self::Node, object: Self::Node, each: bool, span: Span) -> Self::Node;
    /// `let (...) expression`
    fn let_expression(&mut self, variables: Self::Node, expression: Self::Node, span: Span) -> Self::Node;
    /// `yield`
    fn yield_expression(&mut self, value: Option<Self::Node>, span: Span) -> Self::Node;
    /// Expression written inside parentheses
    fn parenthesized(&mut self, expression: Self::Node) -> Self::Node;

    // Queries

    /// Classify a node as assignment target
    fn target_shape(&self, node: Self::Node) -> TargetShape;
    /// Attach comments that precede a statement
    fn attach_comments(&mut self, node: Self::Node, comments: Vec<Comment>);
}

/// Builds the arena [`Ast`]
pub struct AstBuilder {
    ast: Ast,
}

impl AstBuilder {
    /// Create a builder for the given file id
    pub fn new(file: impl Into<String>) -> Self {
        Self { ast: Ast::new(file) }
    }

    /// Finish building, making `root` the root of the tree
    pub fn finish(mut self, root: NodeId) -> Ast {
        self.ast.set_root(root);
        self.ast
    }

    /// Tree built so far
    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    fn node(&mut self, kind: NodeKind, span: Span, children: &[(Option<Rel>, NodeId)]) -> NodeId {
        let id = self.ast.add(kind, span);
        for (rel, child) in children {
            match rel {
                Some(rel) => self.ast.append_rel(id, *rel, *child),
                None => self.ast.append(id, *child),
            }
        }
        id
    }

    fn with_children(&mut self, kind: NodeKind, span: Span, children: Vec<NodeId>) -> NodeId {
        let id = self.ast.add(kind, span);
        for child in children {
            self.ast.append(id, child);
        }
        id
    }

    fn labeled(&mut self, kind: NodeKind, label: Option<String>, span: Span) -> NodeId {
        let id = self.ast.add(kind, span);
        if let Some(label) = label {
            self.ast.node_mut(id).value = Value::Text(label);
        }
        id
    }

    fn comprehension(&mut self, kind: NodeKind, expression: NodeId, tail: NodeId, span: Span) -> NodeId {
        self.node(
            kind,
            span,
            &[(Some(Rel::Expression), expression), (Some(Rel::Tail), tail)],
        )
    }
}

impl TreeBuilder for AstBuilder {
    type Node = NodeId;

    fn script(&mut self, statements: Vec<NodeId>, span: Span) -> NodeId {
        self.with_children(NodeKind::Script, span, statements)
    }

    fn block(&mut self, statements: Vec<NodeId>, span: Span) -> NodeId {
        self.with_children(NodeKind::Block, span, statements)
    }

    fn empty_statement(&mut self, span: Span) -> NodeId {
        self.ast.add(NodeKind::Semicolon, span)
    }

    fn expression_statement(&mut self, expression: NodeId, span: Span) -> NodeId {
        self.node(NodeKind::Semicolon, span, &[(Some(Rel::Expression), expression)])
    }

    fn variables(&mut self, kind: NodeKind, declarations: Vec<NodeId>, span: Span) -> NodeId {
        self.with_children(kind, span, declarations)
    }

    fn declaration(&mut self, target: DeclTarget<NodeId>, initializer: Option<NodeId>, span: Span) -> NodeId {
        let id = self.ast.add(NodeKind::Declaration, span);
        match target {
            DeclTarget::Name(name) => self.ast.set_text(id, name),
            DeclTarget::Pattern(pattern) => self.ast.append_rel(id, Rel::Names, pattern),
        }
        if let Some(init) = initializer {
            self.ast.append_rel(id, Rel::Initializer, init);
        }
        id
    }

    fn if_statement(&mut self, condition: NodeId, then_part: NodeId, else_part: Option<NodeId>, span: Span) -> NodeId {
        let id = self.node(
            NodeKind::If,
            span,
            &[(Some(Rel::Condition), condition), (Some(Rel::ThenPart), then_part)],
        );
        if let Some(else_part) = else_part {
            self.ast.append_rel(id, Rel::ElsePart, else_part);
        }
        id
    }

    fn switch_statement(&mut self, discriminant: NodeId, cases: Vec<NodeId>, span: Span) -> NodeId {
        let id = self.node(NodeKind::Switch, span, &[(Some(Rel::Discriminant), discriminant)]);
        for case in cases {
            self.ast.append(id, case);
        }
        id
    }

    fn case_clause(&mut self, label: Option<NodeId>, statements: Vec<NodeId>, span: Span) -> NodeId {
        let block = self.with_children(NodeKind::Block, span, statements);
        match label {
            Some(label) => self.node(
                NodeKind::Case,
                span,
                &[(Some(Rel::Label), label), (Some(Rel::Statements), block)],
            ),
            None => self.node(NodeKind::Default, span, &[(Some(Rel::Statements), block)]),
        }
    }

    fn for_statement(
        &mut self,
        setup: Option<NodeId>,
        condition: Option<NodeId>,
        update: Option<NodeId>,
        body: NodeId,
        span: Span,
    ) -> NodeId {
        let id = self.ast.add(NodeKind::For, span);
        let parts = [
            (Rel::Setup, setup),
            (Rel::Condition, condition),
            (Rel::Update, update),
            (Rel::Body, Some(body)),
        ];
        for (rel, part) in parts {
            if let Some(part) = part {
                self.ast.append_rel(id, rel, part);
            }
        }
        id
    }

    fn for_in_statement(&mut self, iterator: NodeId, object: NodeId, body: NodeId, each: bool, span: Span) -> NodeId {
        let id = self.comprehension_for(iterator, object, each, span);
        self.ast.append_rel(id, Rel::Body, body);
        id
    }

    fn while_statement(&mut self, condition: NodeId, body: NodeId, span: Span) -> NodeId {
        self.node(
            NodeKind::While,
            span,
            &[(Some(Rel::Condition), condition), (Some(Rel::Body), body)],
        )
    }

    fn do_while_statement(&mut self, body: NodeId, condition: NodeId, span: Span) -> NodeId {
        self.node(
            NodeKind::Do,
            span,
            &[(Some(Rel::Body), body), (Some(Rel::Condition), condition)],
        )
    }

    fn try_statement(&mut self, block: NodeId, catches: Vec<NodeId>, finally: Option<NodeId>, span: Span) -> NodeId {
        let id = self.node(NodeKind::Try, span, &[(Some(Rel::TryBlock), block)]);
        for catch in catches {
            self.ast.append(id, catch);
        }
        if let Some(finally) = finally {
            self.ast.append_rel(id, Rel::FinallyBlock, finally);
        }
        id
    }

    fn catch_clause(&mut self, exception: NodeId, guard: Option<NodeId>, block: NodeId, span: Span) -> NodeId {
        let id = self.node(NodeKind::Catch, span, &[(Some(Rel::Exception), exception)]);
        if let Some(guard) = guard {
            self.ast.append_rel(id, Rel::Guard, guard);
        }
        self.ast.append_rel(id, Rel::Block, block);
        id
    }

    fn throw_statement(&mut self, exception: NodeId, span: Span) -> NodeId {
        self.node(NodeKind::Throw, span, &[(Some(Rel::Exception), exception)])
    }

    fn return_statement(&mut self, value: Option<NodeId>, span: Span) -> NodeId {
        let id = self.ast.add(NodeKind::Return, span);
        if let Some(value) = value {
            self.ast.append_rel(id, Rel::Value, value);
        }
        id
    }

    fn break_statement(&mut self, label: Option<String>, span: Span) -> NodeId {
        self.labeled(NodeKind::Break, label, span)
    }

    fn continue_statement(&mut self, label: Option<String>, span: Span) -> NodeId {
        self.labeled(NodeKind::Continue, label, span)
    }

    fn labeled_statement(&mut self, label: String, statement: NodeId, span: Span) -> NodeId {
        let id = self.labeled(NodeKind::Label, Some(label), span);
        self.ast.append_rel(id, Rel::Statement, statement);
        id
    }

    fn with_statement(&mut self, object: NodeId, body: NodeId, span: Span) -> NodeId {
        self.node(
            NodeKind::With,
            span,
            &[(Some(Rel::Object), object), (Some(Rel::Body), body)],
        )
    }

    fn debugger_statement(&mut self, span: Span) -> NodeId {
        self.ast.add(NodeKind::Debugger, span)
    }

    fn let_block(&mut self, variables: NodeId, block: NodeId, span: Span) -> NodeId {
        self.node(
            NodeKind::LetBlock,
            span,
            &[(Some(Rel::Variables), variables), (Some(Rel::Block), block)],
        )
    }

    fn function(&mut self, parts: FunctionParts<NodeId>, span: Span) -> NodeId {
        let id = self.ast.add(NodeKind::Function, span);
        if let Some(name) = parts.name {
            self.ast.set_text(id, name);
        }
        self.ast.node_mut(id).form = Some(parts.form);

        let params = self.with_children(NodeKind::List, span, parts.params);
        self.ast.append_rel(id, Rel::Params, params);

        let body = if parts.expression_closure {
            self.ast.set_flag(id, NodeFlags::EXPRESSION_CLOSURE, true);
            let body_span = self.ast.node(parts.body).span;
            let ret = self.return_statement(Some(parts.body), body_span);
            self.script(vec![ret], body_span)
        } else {
            parts.body
        };
        self.ast.append_rel(id, Rel::Body, body);

        match parts.accessor {
            Some(Accessor::Getter) => self.ast.set_flag(id, NodeFlags::GETTER, true),
            Some(Accessor::Setter) => self.ast.set_flag(id, NodeFlags::SETTER, true),
            None => {}
        }
        id
    }

    fn comma(&mut self, expressions: Vec<NodeId>, span: Span) -> NodeId {
        self.with_children(NodeKind::Comma, span, expressions)
    }

    fn assignment(&mut self, op: Option<NodeKind>, target: NodeId, value: NodeId, span: Span) -> NodeId {
        let id = self.with_children(NodeKind::Assign, span, vec![target, value]);
        self.ast.node_mut(id).assign_op = op;
        id
    }

    fn conditional(&mut self, condition: NodeId, then_part: NodeId, else_part: NodeId, span: Span) -> NodeId {
        self.with_children(NodeKind::Hook, span, vec![condition, then_part, else_part])
    }

    fn binary(&mut self, op: NodeKind, left: NodeId, right: NodeId, span: Span) -> NodeId {
        self.with_children(op, span, vec![left, right])
    }

    fn unary(&mut self, op: NodeKind, operand: NodeId, span: Span) -> NodeId {
        self.with_children(op, span, vec![operand])
    }

    fn update(&mut self, op: NodeKind, operand: NodeId, postfix: bool, span: Span) -> NodeId {
        let id = self.with_children(op, span, vec![operand]);
        self.ast.set_flag(id, NodeFlags::POSTFIX, postfix);
        id
    }

    fn member(&mut self, object: NodeId, name: String, span: Span) -> NodeId {
        let name = self.ast.add_text(NodeKind::Identifier, name, span);
        self.with_children(NodeKind::Dot, span, vec![object, name])
    }

    fn index(&mut self, object: NodeId, index: NodeId, span: Span) -> NodeId {
        self.with_children(NodeKind::Index, span, vec![object, index])
    }

    fn call(&mut self, callee: NodeId, args: Vec<NodeId>, span: Span) -> NodeId {
        let list = self.with_children(NodeKind::List, span, args);
        self.with_children(NodeKind::Call, span, vec![callee, list])
    }

    fn new_expression(&mut self, callee: NodeId, args: Option<Vec<NodeId>>, span: Span) -> NodeId {
        match args {
            Some(args) => {
                let list = self.with_children(NodeKind::List, span, args);
                self.with_children(NodeKind::NewWithArgs, span, vec![callee, list])
            }
            None => self.with_children(NodeKind::New, span, vec![callee]),
        }
    }

    fn identifier(&mut self, name: String, span: Span) -> NodeId {
        self.ast.add_text(NodeKind::Identifier, name, span)
    }

    fn number(&mut self, value: f64, span: Span) -> NodeId {
        self.ast.add_number(value, span)
    }

    fn string(&mut self, value: String, span: Span) -> NodeId {
        self.ast.add_text(NodeKind::String, value, span)
    }

    fn regexp(&mut self, source: String, span: Span) -> NodeId {
        self.ast.add_text(NodeKind::RegExp, source, span)
    }

    fn primary(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.ast.add(kind, span)
    }

    fn array_literal(&mut self, elements: Vec<Option<NodeId>>, span: Span) -> NodeId {
        let id = self.ast.add(NodeKind::ArrayInit, span);
        for element in elements {
            let element = match element {
                Some(element) => element,
                None => self.ast.add(NodeKind::Hole, span),
            };
            self.ast.append(id, element);
        }
        id
    }

    fn object_literal(&mut self, properties: Vec<NodeId>, span: Span) -> NodeId {
        self.with_children(NodeKind::ObjectInit, span, properties)
    }

    fn property(&mut self, key: NodeId, value: NodeId, span: Span) -> NodeId {
        self.with_children(NodeKind::PropertyInit, span, vec![key, value])
    }

    fn array_comprehension(&mut self, expression: NodeId, tail: NodeId, span: Span) -> NodeId {
        self.comprehension(NodeKind::ArrayComp, expression, tail, span)
    }

    fn generator_expression(&mut self, expression: NodeId, tail: NodeId, span: Span) -> NodeId {
        self.comprehension(NodeKind::Generator, expression, tail, span)
    }

    fn comprehension_tail(&mut self, fors: Vec<NodeId>, guard: Option<NodeId>, span: Span) -> NodeId {
        let id = self.with_children(NodeKind::CompTail, span, fors);
        if let Some(guard) = guard {
            self.ast.append_rel(id, Rel::Guard, guard);
        }
        id
    }

    fn comprehension_for(&mut self, iterator: NodeId, object: NodeId, each: bool, span: Span) -> NodeId {
        let id = self.node(
            NodeKind::ForIn,
            span,
            &[(Some(Rel::Iterator), iterator), (Some(Rel::Object), object)],
        );
        self.ast.set_flag(id, NodeFlags::EACH, each);
        id
    }

    fn let_expression(&mut self, variables: NodeId, expression: NodeId, span: Span) -> NodeId {
        self.node(
            NodeKind::LetBlock,
            span,
            &[(Some(Rel::Variables), variables), (Some(Rel::Expression), expression)],
        )
    }

    fn yield_expression(&mut self, value: Option<NodeId>, span: Span) -> NodeId {
        let id = self.ast.add(NodeKind::Yield, span);
        if let Some(value) = value {
            self.ast.append(id, value);
        }
        id
    }

    fn parenthesized(&mut self, expression: NodeId) -> NodeId {
        self.ast.set_flag(expression, NodeFlags::PARENTHESIZED, true);
        expression
    }

    fn target_shape(&self, node: NodeId) -> TargetShape {
        match self.ast.kind(node) {
            NodeKind::Identifier | NodeKind::Dot | NodeKind::Index => TargetShape::Simple,
            NodeKind::ArrayInit | NodeKind::ObjectInit
                if !self.ast.has_flag(node, NodeFlags::PARENTHESIZED) =>
            {
                TargetShape::Pattern
            }
            NodeKind::Call => TargetShape::Call,
            _ => TargetShape::Invalid,
        }
    }

    fn attach_comments(&mut self, node: NodeId, comments: Vec<Comment>) {
        self.ast.node_mut(node).comments.extend(comments);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_closure_body_is_wrapped_in_return() {
        let mut b = AstBuilder::new("test.js");
        let span = Span::new(1, 0, 0);
        let x = b.identifier("x".to_string(), span);
        let f = b.function(
            FunctionParts {
                name: None,
                params: vec![],
                body: x,
                form: FunctionForm::Expressed,
                expression_closure: true,
                accessor: None,
            },
            span,
        );
        let ast = b.finish(f);
        let body = ast.child(f, Rel::Body).unwrap();
        assert_eq!(ast.kind(body), NodeKind::Script);
        let ret = ast.children(body)[0];
        assert_eq!(ast.kind(ret), NodeKind::Return);
        assert_eq!(ast.child(ret, Rel::Value), Some(x));
        assert!(ast.has_flag(f, NodeFlags::EXPRESSION_CLOSURE));
    }

    #[test]
    fn test_target_shapes() {
        let mut b = AstBuilder::new("test.js");
        let span = Span::new(1, 0, 0);
        let x = b.identifier("x".to_string(), span);
        let arr = b.array_literal(vec![Some(x), None], span);
        let num = b.number(1.0, span);
        assert_eq!(b.target_shape(x), TargetShape::Simple);
        assert_eq!(b.target_shape(arr), TargetShape::Pattern);
        assert_eq!(b.target_shape(num), TargetShape::Invalid);
        assert_eq!(b.ast().kind(b.ast().children(arr)[1]), NodeKind::Hole);
    }
}
