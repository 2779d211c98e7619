//! Code generator
//!
//! A single top-down walk writes the most compact source text for a tree.
//! Statement terminators are kept pending until the next token is written,
//! so the `;` in front of a closing brace can be dropped. Parentheses are
//! written where a node is flagged [`NodeFlags::PARENTHESIZED`] or where the
//! precedence table demands them.

use parser::{Ast, NodeFlags, NodeId, NodeKind, Rel};
use tracing::debug;

use crate::literals::{format_number, quote_string};
use crate::options::{Formatting, GeneratorOptions};
use crate::precedence::{binary_operands, precedence, ASSIGNMENT, COMMA, CONDITIONAL, MEMBER, POSTFIX, UNARY};

/// Generate code for the whole tree
pub fn compress(ast: &Ast, options: &GeneratorOptions) -> String {
    Compressor::new(ast, *options).compress(ast.root())
}

/// Writes source text for a tree
pub struct Compressor<'a> {
    ast: &'a Ast,
    options: GeneratorOptions,
    out: String,
    pending_semicolon: bool,
    /// Inside a `for` setup, where a bare `in` would end the expression
    no_in: bool,
}

impl<'a> Compressor<'a> {
    /// Create a generator over `ast`
    pub fn new(ast: &'a Ast, options: GeneratorOptions) -> Self {
        Self {
            ast,
            options,
            out: String::new(),
            pending_semicolon: false,
            no_in: false,
        }
    }

    /// Generate code for `node` and everything below it
    pub fn compress(mut self, node: NodeId) -> String {
        let kind = self.ast.kind(node);
        if kind == NodeKind::Script {
            self.statements(node);
        } else if is_expression(kind) {
            self.expression(node, COMMA);
        } else {
            self.statement(node);
        }
        if self.pending_semicolon {
            self.pending_semicolon = false;
            self.out.push(';');
        }
        debug!(file = %self.ast.file, bytes = self.out.len(), "generated code");
        self.out
    }

    // ---------------------------------------------------------------------
    // Output primitives
    // ---------------------------------------------------------------------

    fn write(&mut self, text: &str) {
        let Some(first) = text.chars().next() else {
            return;
        };
        if self.pending_semicolon {
            self.pending_semicolon = false;
            self.out.push(';');
        }
        if let Some(last) = self.out.chars().last() {
            if needs_space(last, first) {
                self.out.push(' ');
            }
        }
        self.out.push_str(text);
    }

    fn separator(&mut self) {
        if self.options.formatting.contains(Formatting::COMMA) {
            self.write(", ");
        } else {
            self.write(",");
        }
    }

    fn close_brace(&mut self) {
        if !self.options.formatting.contains(Formatting::SEMICOLON) {
            self.pending_semicolon = false;
        }
        self.write("}");
    }

    // ---------------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------------

    fn statements(&mut self, list: NodeId) {
        for child in self.ast.children(list) {
            self.statement(*child);
        }
    }

    fn block(&mut self, block: NodeId) {
        self.write("{");
        self.statements(block);
        self.close_brace();
    }

    fn statement(&mut self, id: NodeId) {
        let ast = self.ast;
        match ast.kind(id) {
            NodeKind::Script => self.statements(id),
            NodeKind::Block => self.block(id),
            NodeKind::Semicolon => match ast.child(id, Rel::Expression) {
                Some(expression) => {
                    if self.starts_ambiguously(expression) {
                        self.write("(");
                        self.expression(expression, COMMA);
                        self.write(")");
                    } else {
                        self.expression(expression, COMMA);
                    }
                    self.pending_semicolon = true;
                }
                None => self.write(";"),
            },
            NodeKind::If => self.if_statement(id),
            NodeKind::Switch => self.switch_statement(id),
            NodeKind::Case | NodeKind::Default => self.case_clause(id),
            NodeKind::For => self.for_statement(id),
            NodeKind::ForIn => self.for_in_statement(id),
            NodeKind::While => {
                self.write("while(");
                self.optional_expression(ast.child(id, Rel::Condition), COMMA);
                self.write(")");
                self.body(ast.child(id, Rel::Body));
            }
            NodeKind::Do => {
                self.write("do");
                self.body(ast.child(id, Rel::Body));
                self.write("while(");
                self.optional_expression(ast.child(id, Rel::Condition), COMMA);
                self.write(")");
                self.pending_semicolon = true;
            }
            NodeKind::Try => self.try_statement(id),
            NodeKind::Catch => self.catch_clause(id),
            NodeKind::Throw => {
                self.write("throw");
                self.optional_expression(ast.child(id, Rel::Exception), COMMA);
                self.pending_semicolon = true;
            }
            NodeKind::Return => {
                self.write("return");
                self.optional_expression(ast.child(id, Rel::Value), COMMA);
                self.pending_semicolon = true;
            }
            NodeKind::Break | NodeKind::Continue => {
                self.write(if ast.kind(id) == NodeKind::Break { "break" } else { "continue" });
                if let Some(label) = ast.text_opt(id) {
                    self.write(label);
                }
                self.pending_semicolon = true;
            }
            NodeKind::Label => {
                self.write(ast.text(id));
                self.write(":");
                self.body(ast.child(id, Rel::Statement));
            }
            NodeKind::Var | NodeKind::Const | NodeKind::Let => {
                self.declarations(id, true);
                self.pending_semicolon = true;
            }
            NodeKind::LetBlock => {
                self.let_head(id);
                match ast.child(id, Rel::Block) {
                    Some(block) => self.block(block),
                    None => {
                        self.optional_expression(ast.child(id, Rel::Expression), ASSIGNMENT);
                        self.pending_semicolon = true;
                    }
                }
            }
            NodeKind::Declaration => self.declaration(id),
            NodeKind::Function => self.function(id),
            NodeKind::With => {
                self.write("with(");
                self.optional_expression(ast.child(id, Rel::Object), COMMA);
                self.write(")");
                self.body(ast.child(id, Rel::Body));
            }
            NodeKind::Debugger => {
                self.write("debugger");
                self.pending_semicolon = true;
            }
            NodeKind::Identifier
            | NodeKind::Number
            | NodeKind::String
            | NodeKind::RegExp
            | NodeKind::True
            | NodeKind::False
            | NodeKind::Null
            | NodeKind::This
            | NodeKind::Assign
            | NodeKind::Hook
            | NodeKind::Or
            | NodeKind::And
            | NodeKind::BitwiseOr
            | NodeKind::BitwiseXor
            | NodeKind::BitwiseAnd
            | NodeKind::Eq
            | NodeKind::Ne
            | NodeKind::StrictEq
            | NodeKind::StrictNe
            | NodeKind::Lt
            | NodeKind::Le
            | NodeKind::Ge
            | NodeKind::Gt
            | NodeKind::In
            | NodeKind::Instanceof
            | NodeKind::Lsh
            | NodeKind::Rsh
            | NodeKind::Ursh
            | NodeKind::Plus
            | NodeKind::Minus
            | NodeKind::Mul
            | NodeKind::Div
            | NodeKind::Mod
            | NodeKind::Not
            | NodeKind::BitwiseNot
            | NodeKind::UnaryPlus
            | NodeKind::UnaryMinus
            | NodeKind::Typeof
            | NodeKind::Void
            | NodeKind::Delete
            | NodeKind::Increment
            | NodeKind::Decrement
            | NodeKind::Dot
            | NodeKind::Index
            | NodeKind::Call
            | NodeKind::New
            | NodeKind::NewWithArgs
            | NodeKind::List
            | NodeKind::ArrayInit
            | NodeKind::ObjectInit
            | NodeKind::PropertyInit
            | NodeKind::Comma
            | NodeKind::ArrayComp
            | NodeKind::Generator
            | NodeKind::CompTail
            | NodeKind::Yield
            | NodeKind::Hole => {
                self.expression(id, COMMA);
                self.pending_semicolon = true;
            }
        }
    }

    /// Body of a compound statement, `;` when it is missing
    fn body(&mut self, body: Option<NodeId>) {
        match body {
            Some(body) => self.statement(body),
            None => self.write(";"),
        }
    }

    fn if_statement(&mut self, id: NodeId) {
        let ast = self.ast;
        self.write("if(");
        self.optional_expression(ast.child(id, Rel::Condition), COMMA);
        self.write(")");

        let then_part = ast.child(id, Rel::ThenPart);
        let else_part = ast.child(id, Rel::ElsePart);
        match then_part {
            // A dangling else would bind to the inner if
            Some(then_part)
                if else_part.is_some()
                    && ast.kind(then_part) != NodeKind::Block
                    && self.ends_with_open_if(then_part) =>
            {
                self.write("{");
                self.statement(then_part);
                self.close_brace();
            }
            _ => self.body(then_part),
        }

        if let Some(else_part) = else_part {
            self.write("else");
            self.statement(else_part);
        }
    }

    fn ends_with_open_if(&self, id: NodeId) -> bool {
        let ast = self.ast;
        match ast.kind(id) {
            NodeKind::If => match ast.child(id, Rel::ElsePart) {
                Some(else_part) => self.ends_with_open_if(else_part),
                None => true,
            },
            NodeKind::For | NodeKind::ForIn | NodeKind::While | NodeKind::With => ast
                .child(id, Rel::Body)
                .map_or(false, |body| self.ends_with_open_if(body)),
            NodeKind::Label => ast
                .child(id, Rel::Statement)
                .map_or(false, |statement| self.ends_with_open_if(statement)),
            _ => false,
        }
    }

    fn switch_statement(&mut self, id: NodeId) {
        let ast = self.ast;
        self.write("switch(");
        self.optional_expression(ast.child(id, Rel::Discriminant), COMMA);
        self.write("){");
        for clause in ast.children(id) {
            if matches!(ast.kind(*clause), NodeKind::Case | NodeKind::Default) {
                self.case_clause(*clause);
            }
        }
        self.close_brace();
    }

    fn case_clause(&mut self, id: NodeId) {
        let ast = self.ast;
        if ast.kind(id) == NodeKind::Case {
            self.write("case");
            self.optional_expression(ast.child(id, Rel::Label), COMMA);
            self.write(":");
        } else {
            self.write("default:");
        }
        if let Some(statements) = ast.child(id, Rel::Statements) {
            self.statements(statements);
        }
    }

    fn for_statement(&mut self, id: NodeId) {
        let ast = self.ast;
        self.write("for(");
        if let Some(setup) = ast.child(id, Rel::Setup) {
            self.no_in = true;
            if ast.kind(setup).is_declaration_list() {
                self.declarations(setup, true);
            } else {
                self.expression(setup, COMMA);
            }
            self.no_in = false;
        }
        self.write(";");
        self.optional_expression(ast.child(id, Rel::Condition), COMMA);
        self.write(";");
        self.optional_expression(ast.child(id, Rel::Update), COMMA);
        self.write(")");
        self.body(ast.child(id, Rel::Body));
    }

    fn for_in_statement(&mut self, id: NodeId) {
        self.for_in_head(id);
        self.body(self.ast.child(id, Rel::Body));
    }

    fn for_in_head(&mut self, id: NodeId) {
        let ast = self.ast;
        self.write("for");
        if ast.has_flag(id, NodeFlags::EACH) {
            self.write("each");
        }
        self.write("(");
        if let Some(iterator) = ast.child(id, Rel::Iterator) {
            self.no_in = true;
            if ast.kind(iterator).is_declaration_list() {
                self.declarations(iterator, true);
            } else {
                self.expression(iterator, POSTFIX);
            }
            self.no_in = false;
        }
        self.write("in");
        self.optional_expression(ast.child(id, Rel::Object), COMMA);
        self.write(")");
    }

    fn try_statement(&mut self, id: NodeId) {
        let ast = self.ast;
        self.write("try");
        if let Some(block) = ast.child(id, Rel::TryBlock) {
            self.block(block);
        }
        for child in ast.children(id) {
            if ast.kind(*child) == NodeKind::Catch {
                self.catch_clause(*child);
            }
        }
        if let Some(finally) = ast.child(id, Rel::FinallyBlock) {
            self.write("finally");
            self.block(finally);
        }
    }

    fn catch_clause(&mut self, id: NodeId) {
        let ast = self.ast;
        self.write("catch(");
        self.optional_expression(ast.child(id, Rel::Exception), ASSIGNMENT);
        if let Some(guard) = ast.child(id, Rel::Guard) {
            self.write("if");
            self.expression(guard, COMMA);
        }
        self.write(")");
        if let Some(block) = ast.child(id, Rel::Block) {
            self.block(block);
        }
    }

    /// A `var`/`const`/`let` list, with or without its keyword
    fn declarations(&mut self, id: NodeId, keyword: bool) {
        let ast = self.ast;
        if keyword {
            let word = match ast.kind(id) {
                NodeKind::Const => "const",
                NodeKind::Let => "let",
                _ => "var",
            };
            self.write(word);
        }
        for (index, declaration) in ast.children(id).iter().enumerate() {
            if index > 0 {
                self.separator();
            }
            self.declaration(*declaration);
        }
    }

    fn declaration(&mut self, id: NodeId) {
        let ast = self.ast;
        match ast.child(id, Rel::Names) {
            Some(pattern) => self.expression(pattern, ASSIGNMENT),
            None => self.write(ast.text(id)),
        }
        if let Some(initializer) = ast.child(id, Rel::Initializer) {
            self.write("=");
            self.expression(initializer, ASSIGNMENT);
        }
    }

    fn let_head(&mut self, id: NodeId) {
        self.write("let(");
        if let Some(variables) = self.ast.child(id, Rel::Variables) {
            let saved = std::mem::replace(&mut self.no_in, false);
            self.declarations(variables, false);
            self.no_in = saved;
        }
        self.write(")");
    }

    fn function(&mut self, id: NodeId) {
        let ast = self.ast;
        let saved_no_in = std::mem::replace(&mut self.no_in, false);

        if ast.has_flag(id, NodeFlags::GETTER) {
            self.write("get");
        } else if ast.has_flag(id, NodeFlags::SETTER) {
            self.write("set");
        } else {
            self.write("function");
        }
        if let Some(name) = ast.text_opt(id) {
            self.write(name);
        }

        self.write("(");
        if let Some(params) = ast.child(id, Rel::Params) {
            for (index, param) in ast.children(params).iter().enumerate() {
                if index > 0 {
                    self.separator();
                }
                self.expression(*param, ASSIGNMENT);
            }
        }
        self.write(")");

        let body = ast.child(id, Rel::Body);
        match (self.closure_value(id), body) {
            (Some(value), _) => {
                if ast.kind(value) == NodeKind::ObjectInit && !ast.has_flag(value, NodeFlags::PARENTHESIZED) {
                    self.write("(");
                    self.expression(value, ASSIGNMENT);
                    self.write(")");
                } else {
                    self.expression(value, ASSIGNMENT);
                }
            }
            (None, Some(body)) => {
                self.write("{");
                self.statements(body);
                self.close_brace();
            }
            (None, None) => self.write("{}"),
        }

        self.no_in = saved_no_in;
    }

    /// Value of an expression closure whose body is still a single `return`
    fn closure_value(&self, id: NodeId) -> Option<NodeId> {
        let ast = self.ast;
        if !ast.has_flag(id, NodeFlags::EXPRESSION_CLOSURE) {
            return None;
        }
        let body = ast.child(id, Rel::Body)?;
        match ast.children(body) {
            [statement] if ast.kind(*statement) == NodeKind::Return => ast.child(*statement, Rel::Value),
            _ => None,
        }
    }

    /// Whether an expression statement would start with `function` or `{`
    fn starts_ambiguously(&self, id: NodeId) -> bool {
        let ast = self.ast;
        let mut current = id;
        loop {
            if ast.has_flag(current, NodeFlags::PARENTHESIZED) {
                return false;
            }
            match ast.kind(current) {
                NodeKind::Function | NodeKind::ObjectInit => return true,
                NodeKind::Increment | NodeKind::Decrement if !ast.has_flag(current, NodeFlags::POSTFIX) => {
                    return false
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
                            | NodeKind::Increment
                            | NodeKind::Decrement
                    ) =>
                {
                    match ast.nth(current, 0) {
                        Some(first) => current = first,
                        None => return false,
                    }
                }
                _ => return false,
            }
        }
    }

    // ---------------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------------

    fn optional_expression(&mut self, id: Option<NodeId>, min: u8) {
        if let Some(id) = id {
            self.expression(id, min);
        }
    }

    fn expression(&mut self, id: NodeId, min: u8) {
        let ast = self.ast;
        let kind = ast.kind(id);
        let own = match kind {
            NodeKind::Number if ast.number(id).map_or(false, |n| n < 0.0) => UNARY,
            _ => precedence(kind),
        };
        let flagged = ast.has_flag(id, NodeFlags::PARENTHESIZED) && kind != NodeKind::Generator;
        let wrap = flagged || own < min || (kind == NodeKind::In && self.no_in);
        if wrap {
            let saved = std::mem::replace(&mut self.no_in, false);
            self.write("(");
            self.expression_inner(id);
            self.write(")");
            self.no_in = saved;
        } else {
            self.expression_inner(id);
        }
    }

    fn expression_inner(&mut self, id: NodeId) {
        let ast = self.ast;
        let kind = ast.kind(id);
        match kind {
            NodeKind::Identifier | NodeKind::RegExp => self.write(ast.text(id)),
            NodeKind::Number => {
                let text = format_number(ast.number(id).unwrap_or(0.0));
                self.write(&text);
            }
            NodeKind::String => {
                let text = quote_string(ast.text(id), self.options.ascii_threshold);
                self.write(&text);
            }
            NodeKind::True => self.write("true"),
            NodeKind::False => self.write("false"),
            NodeKind::Null => self.write("null"),
            NodeKind::This => self.write("this"),
            NodeKind::Hole => {}

            NodeKind::Assign => {
                if let Some(target) = ast.nth(id, 0) {
                    self.expression(target, POSTFIX);
                }
                let operator = match ast.node(id).assign_op.and_then(|op| op.operator()) {
                    Some(op) => format!("{}=", op),
                    None => "=".to_string(),
                };
                self.write(&operator);
                self.optional_expression(ast.nth(id, 1), ASSIGNMENT);
            }
            NodeKind::Hook => {
                self.optional_expression(ast.nth(id, 0), CONDITIONAL + 1);
                self.write("?");
                let saved = std::mem::replace(&mut self.no_in, false);
                self.optional_expression(ast.nth(id, 1), ASSIGNMENT);
                self.no_in = saved;
                self.write(":");
                self.optional_expression(ast.nth(id, 2), ASSIGNMENT);
            }
            NodeKind::Or
            | NodeKind::And
            | NodeKind::BitwiseOr
            | NodeKind::BitwiseXor
            | NodeKind::BitwiseAnd
            | NodeKind::Eq
            | NodeKind::Ne
            | NodeKind::StrictEq
            | NodeKind::StrictNe
            | NodeKind::Lt
            | NodeKind::Le
            | NodeKind::Ge
            | NodeKind::Gt
            | NodeKind::In
            | NodeKind::Instanceof
            | NodeKind::Lsh
            | NodeKind::Rsh
            | NodeKind::Ursh
            | NodeKind::Plus
            | NodeKind::Minus
            | NodeKind::Mul
            | NodeKind::Div
            | NodeKind::Mod => {
                let (left, right) = binary_operands(kind);
                self.optional_expression(ast.nth(id, 0), left);
                self.write(kind.operator().unwrap_or_default());
                self.optional_expression(ast.nth(id, 1), right);
            }
            NodeKind::Not
            | NodeKind::BitwiseNot
            | NodeKind::UnaryPlus
            | NodeKind::UnaryMinus
            | NodeKind::Typeof
            | NodeKind::Void
            | NodeKind::Delete => {
                self.write(kind.operator().unwrap_or_default());
                self.optional_expression(ast.nth(id, 0), UNARY);
            }
            NodeKind::Increment | NodeKind::Decrement => {
                let operator = kind.operator().unwrap_or_default();
                if ast.has_flag(id, NodeFlags::POSTFIX) {
                    self.optional_expression(ast.nth(id, 0), POSTFIX);
                    self.write(operator);
                } else {
                    self.write(operator);
                    self.optional_expression(ast.nth(id, 0), UNARY);
                }
            }

            NodeKind::Dot => {
                if let Some(object) = ast.nth(id, 0) {
                    if self.is_bare_integer(object) {
                        self.write("(");
                        self.expression_inner(object);
                        self.write(")");
                    } else {
                        self.expression(object, MEMBER);
                    }
                }
                self.write(".");
                if let Some(property) = ast.nth(id, 1) {
                    self.write(ast.text(property));
                }
            }
            NodeKind::Index => {
                self.optional_expression(ast.nth(id, 0), MEMBER);
                self.write("[");
                self.optional_expression(ast.nth(id, 1), COMMA);
                self.write("]");
            }
            NodeKind::Call => {
                self.optional_expression(ast.nth(id, 0), MEMBER);
                self.arguments(ast.nth(id, 1));
            }
            NodeKind::New | NodeKind::NewWithArgs => {
                self.write("new");
                if let Some(callee) = ast.nth(id, 0) {
                    self.new_callee(callee);
                }
                if kind == NodeKind::NewWithArgs {
                    self.arguments(ast.nth(id, 1));
                }
            }
            NodeKind::List => self.list(id),

            NodeKind::ArrayInit => {
                self.write("[");
                let children = ast.children(id);
                for (index, element) in children.iter().enumerate() {
                    if index > 0 {
                        self.separator();
                    }
                    self.expression(*element, ASSIGNMENT);
                }
                if children.last().map(|last| ast.kind(*last)) == Some(NodeKind::Hole) {
                    self.write(",");
                }
                self.write("]");
            }
            NodeKind::ObjectInit => {
                self.write("{");
                for (index, property) in ast.children(id).iter().enumerate() {
                    if index > 0 {
                        self.separator();
                    }
                    self.expression_inner(*property);
                }
                self.write("}");
            }
            NodeKind::PropertyInit => {
                if let Some(key) = ast.nth(id, 0) {
                    self.property_key(key);
                }
                self.write(":");
                self.optional_expression(ast.nth(id, 1), ASSIGNMENT);
            }
            NodeKind::Comma => {
                for (index, child) in ast.children(id).iter().enumerate() {
                    if index > 0 {
                        self.separator();
                    }
                    self.expression(*child, ASSIGNMENT);
                }
            }
            NodeKind::Function => self.function(id),
            NodeKind::ArrayComp => {
                self.write("[");
                self.optional_expression(ast.child(id, Rel::Expression), ASSIGNMENT);
                self.optional_expression(ast.child(id, Rel::Tail), COMMA);
                self.write("]");
            }
            NodeKind::Generator => {
                let sole_argument = ast.parent(id).map_or(false, |list| {
                    ast.kind(list) == NodeKind::List
                        && ast.children(list).len() == 1
                        && ast
                            .parent(list)
                            .map_or(false, |call| matches!(ast.kind(call), NodeKind::Call | NodeKind::NewWithArgs))
                });
                if !sole_argument {
                    self.write("(");
                }
                self.optional_expression(ast.child(id, Rel::Expression), ASSIGNMENT);
                self.optional_expression(ast.child(id, Rel::Tail), COMMA);
                if !sole_argument {
                    self.write(")");
                }
            }
            NodeKind::CompTail => {
                for child in ast.children(id) {
                    if ast.kind(*child) == NodeKind::ForIn {
                        self.for_in_head(*child);
                    }
                }
                if let Some(guard) = ast.child(id, Rel::Guard) {
                    self.write("if(");
                    self.expression(guard, COMMA);
                    self.write(")");
                }
            }
            NodeKind::LetBlock => {
                self.let_head(id);
                self.optional_expression(ast.child(id, Rel::Expression), ASSIGNMENT);
            }
            NodeKind::Yield => {
                self.write("yield");
                self.optional_expression(ast.nth(id, 0), ASSIGNMENT);
            }

            NodeKind::Script
            | NodeKind::Block
            | NodeKind::Semicolon
            | NodeKind::If
            | NodeKind::Switch
            | NodeKind::Case
            | NodeKind::Default
            | NodeKind::For
            | NodeKind::ForIn
            | NodeKind::While
            | NodeKind::Do
            | NodeKind::Try
            | NodeKind::Catch
            | NodeKind::Throw
            | NodeKind::Return
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Label
            | NodeKind::Var
            | NodeKind::Const
            | NodeKind::Let
            | NodeKind::Declaration
            | NodeKind::With
            | NodeKind::Debugger => self.statement(id),
        }
    }

    fn list(&mut self, id: NodeId) {
        for (index, child) in self.ast.children(id).iter().enumerate() {
            if index > 0 {
                self.separator();
            }
            self.expression(*child, ASSIGNMENT);
        }
    }

    fn arguments(&mut self, list: Option<NodeId>) {
        self.write("(");
        let saved = std::mem::replace(&mut self.no_in, false);
        if let Some(list) = list {
            self.list(list);
        }
        self.no_in = saved;
        self.write(")");
    }

    fn property_key(&mut self, key: NodeId) {
        let ast = self.ast;
        match ast.kind(key) {
            NodeKind::String => {
                let text = quote_string(ast.text(key), self.options.ascii_threshold);
                self.write(&text);
            }
            NodeKind::Number => {
                let text = format_number(ast.number(key).unwrap_or(0.0));
                self.write(&text);
            }
            _ => self.write(ast.text(key)),
        }
    }

    /// Callee of `new`, which must not contain an unparenthesized call
    fn new_callee(&mut self, callee: NodeId) {
        let ast = self.ast;
        let needs_parens = !ast.has_flag(callee, NodeFlags::PARENTHESIZED)
            && (precedence(ast.kind(callee)) < MEMBER || self.chain_has_call(callee));
        if needs_parens {
            self.write("(");
            self.expression(callee, COMMA);
            self.write(")");
        } else {
            self.expression(callee, MEMBER);
        }
    }

    fn chain_has_call(&self, id: NodeId) -> bool {
        let ast = self.ast;
        match ast.kind(id) {
            NodeKind::Call => true,
            NodeKind::Dot | NodeKind::Index if !ast.has_flag(id, NodeFlags::PARENTHESIZED) => {
                ast.nth(id, 0).map_or(false, |object| self.chain_has_call(object))
            }
            _ => false,
        }
    }

    /// Integer literal whose text would swallow a following `.`
    fn is_bare_integer(&self, id: NodeId) -> bool {
        let ast = self.ast;
        if ast.kind(id) != NodeKind::Number || ast.has_flag(id, NodeFlags::PARENTHESIZED) {
            return false;
        }
        match ast.number(id) {
            Some(value) if value >= 0.0 => {
                let text = format_number(value);
                !text.contains(['.', 'e'])
            }
            _ => false,
        }
    }
}

/// Whether a kind is an expression rather than a statement
fn is_expression(kind: NodeKind) -> bool {
    !matches!(
        kind,
        NodeKind::Script
            | NodeKind::Block
            | NodeKind::Semicolon
            | NodeKind::If
            | NodeKind::Switch
            | NodeKind::Case
            | NodeKind::Default
            | NodeKind::For
            | NodeKind::ForIn
            | NodeKind::While
            | NodeKind::Do
            | NodeKind::Try
            | NodeKind::Catch
            | NodeKind::Throw
            | NodeKind::Return
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Label
            | NodeKind::Var
            | NodeKind::Const
            | NodeKind::Let
            | NodeKind::Declaration
            | NodeKind::With
            | NodeKind::Debugger
            | NodeKind::Function
    )
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '\\' || !c.is_ascii()
}

/// Whether two adjacent pieces of output would merge into a different token
fn needs_space(last: char, first: char) -> bool {
    (is_word_char(last) && is_word_char(first))
        || (last == '+' && first == '+')
        || (last == '-' && first == '-')
        || (last == '/' && first == '/')
}
