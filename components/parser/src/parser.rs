//! Recursive descent parser for the script dialect
//!
//! Statements are parsed top-down, expressions through the precedence ladder
//! comma < assignment < conditional < binary levels < unary < member/call <
//! primary. All nodes are built through a [`TreeBuilder`].
//!
//! Function and script bodies are parsed in two phases. A token-level
//! pre-scan collects the hoisted declarations of the body into a
//! [`DeclarationContext`] before the real parse starts, so `let`/`const`
//! redeclarations of hoisted names are rejected where they appear.

use std::collections::HashSet;

use crate::ast::{Ast, FunctionForm, NodeKind};
use crate::builder::{Accessor, AstBuilder, DeclTarget, FunctionParts, TargetShape, TreeBuilder};
use crate::error::{syntax_error, unexpected_eof, unexpected_token};
use crate::lexer::{expects_operand_after, Keyword, Lexer, Punctuator, Token, TokenKind};
use core_types::{CompileError, CompileResult, Span};
use tracing::trace;

/// Hoisted declarations of one function or script body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarationContext {
    /// Names declared with `var` anywhere in the body
    pub vars: HashSet<String>,
    /// Names of functions declared at statement level of the body
    pub functions: HashSet<String>,
    /// Whether function declarations appear inside nested blocks
    pub nested_functions: bool,
}

/// Enclosing construct, used to validate `break` and `continue`
#[derive(Debug, Clone, PartialEq, Eq)]
enum Frame {
    Loop,
    Switch,
    Label(String),
    Other,
}

/// Result of parsing a declaration list
struct Variables<N> {
    node: N,
    count: usize,
    uninitialized_pattern: bool,
}

/// Parser over a single compilation unit
pub struct Parser<B: TreeBuilder> {
    lexer: Lexer,
    builder: B,
    frames: Vec<Frame>,
    contexts: Vec<DeclarationContext>,
    /// Number of statements enclosing the current one inside the current body
    nesting: usize,
    function_depth: usize,
    /// Inside a `for` setup, where `in` ends the expression
    no_in: bool,
}

/// Parse a unit into an [`Ast`]
pub fn parse(source: &str, file: &str) -> CompileResult<Ast> {
    let mut parser = Parser::new(source, file, 1, AstBuilder::new(file));
    let root = parser.parse()?;
    Ok(parser.into_builder().finish(root))
}

/// Parse a single expression into an [`Ast`] whose root is the expression
pub fn parse_expression(source: &str, file: &str) -> CompileResult<Ast> {
    let mut parser = Parser::new(source, file, 1, AstBuilder::new(file));
    let root = parser.parse_expression()?;
    Ok(parser.into_builder().finish(root))
}

impl<B: TreeBuilder> Parser<B> {
    /// Create a parser for `source`, reporting errors against `file` and
    /// counting lines from `line`
    pub fn new(source: &str, file: &str, line: u32, builder: B) -> Self {
        Self {
            lexer: Lexer::new(source, file, line),
            builder,
            frames: Vec::new(),
            contexts: Vec::new(),
            nesting: 0,
            function_depth: 0,
            no_in: false,
        }
    }

    /// Hand back the builder after parsing
    pub fn into_builder(self) -> B {
        self.builder
    }

    /// Parse the whole input as a script
    pub fn parse(&mut self) -> CompileResult<B::Node> {
        let start = Span::new(self.lexer.line(), 0, 0);
        let context = self.prescan();
        self.contexts.push(context);

        let mut statements = Vec::new();
        while !self.lexer.is_done()? {
            statements.push(self.statement()?);
        }
        self.contexts.pop();

        let script = self.builder.script(statements, self.span_from(start));
        let trailing = self.lexer.take_comments();
        if !trailing.is_empty() {
            self.builder.attach_comments(script, trailing);
        }
        Ok(script)
    }

    /// Parse the whole input as a single expression
    pub fn parse_expression(&mut self) -> CompileResult<B::Node> {
        let expression = self.expression()?;
        let token = self.lexer.get(false)?;
        if token.kind != TokenKind::EOF {
            return Err(self.unexpected("end of input", &token));
        }
        Ok(expression)
    }

    // ---------------------------------------------------------------------
    // Declaration pre-scan
    // ---------------------------------------------------------------------

    /// Collect the hoisted declarations of the body starting at the current
    /// position, leaving the lexer untouched
    fn prescan(&mut self) -> DeclarationContext {
        let state = self.lexer.save();
        let mut context = DeclarationContext::default();
        // A lexical error inside the body is reported by the real parse
        let _ = self.scan_declarations(&mut context);
        self.lexer.rewind(state);
        trace!(
            vars = context.vars.len(),
            functions = context.functions.len(),
            nested_functions = context.nested_functions,
            "declaration pre-scan"
        );
        context
    }

    fn scan_declarations(&mut self, context: &mut DeclarationContext) -> CompileResult<()> {
        let mut depth: i32 = 0;
        let mut braces: i32 = 0;
        let mut prev: Option<TokenKind> = None;
        let mut prev_line = 0;
        let mut var_depth: Option<i32> = None;
        let mut pattern_depth: Option<i32> = None;
        let mut expect_name = false;
        // Paren depths of open `if`/`for`/`while`/`with` headers
        let mut control_parens: Vec<i32> = Vec::new();
        let mut control_pending = false;
        let mut after_control = false;

        loop {
            let operand = prev.as_ref().map_or(true, expects_operand_after);
            let token = self.lexer.get(operand)?;
            let body_start = std::mem::take(&mut after_control);

            // A line break ends a var list when the next line starts a new statement
            if var_depth == Some(depth)
                && pattern_depth.is_none()
                && token.span.line > prev_line
                && prev.as_ref().map_or(false, |p| !expects_operand_after(p))
                && !continues_expression(&token.kind)
            {
                var_depth = None;
            }

            let mut name_follows = false;
            match &token.kind {
                TokenKind::EOF => break,
                TokenKind::Punctuator(Punctuator::LParen) | TokenKind::Punctuator(Punctuator::LBracket) => {
                    if expect_name && pattern_depth.is_none() {
                        pattern_depth = Some(depth);
                    }
                    if control_pending && token.is_punctuator(Punctuator::LParen) {
                        control_parens.push(depth);
                        control_pending = false;
                    }
                    depth += 1;
                }
                TokenKind::Punctuator(Punctuator::LBrace) => {
                    if expect_name && pattern_depth.is_none() {
                        pattern_depth = Some(depth);
                    }
                    depth += 1;
                    braces += 1;
                }
                TokenKind::Punctuator(Punctuator::RParen) | TokenKind::Punctuator(Punctuator::RBracket) => {
                    depth -= 1;
                    if pattern_depth == Some(depth) {
                        pattern_depth = None;
                    }
                    if control_parens.last() == Some(&depth) {
                        control_parens.pop();
                        after_control = true;
                    }
                }
                TokenKind::Punctuator(Punctuator::RBrace) => {
                    if braces == 0 {
                        break;
                    }
                    depth -= 1;
                    braces -= 1;
                    if pattern_depth == Some(depth) {
                        pattern_depth = None;
                    }
                }
                TokenKind::Punctuator(Punctuator::Semicolon) => {
                    if var_depth == Some(depth) {
                        var_depth = None;
                    }
                }
                TokenKind::Punctuator(Punctuator::Comma) => {
                    name_follows = var_depth == Some(depth) && pattern_depth.is_none();
                }
                TokenKind::Keyword(Keyword::If | Keyword::For | Keyword::While | Keyword::With) => {
                    control_pending = true;
                }
                TokenKind::Keyword(Keyword::Var) => {
                    var_depth = Some(depth);
                    name_follows = true;
                }
                TokenKind::Keyword(Keyword::In) => {
                    if var_depth == Some(depth) {
                        var_depth = None;
                    }
                }
                TokenKind::Keyword(Keyword::Function) => {
                    let statement_position = prev.as_ref().map_or(true, |p| {
                        matches!(
                            p,
                            TokenKind::Punctuator(Punctuator::Semicolon)
                                | TokenKind::Punctuator(Punctuator::LBrace)
                                | TokenKind::Punctuator(Punctuator::RBrace)
                                | TokenKind::Punctuator(Punctuator::RParen)
                                | TokenKind::Keyword(Keyword::Else)
                                | TokenKind::Keyword(Keyword::Do)
                        )
                    });
                    let braceless_body = body_start
                        || matches!(prev, Some(TokenKind::Keyword(Keyword::Else | Keyword::Do)));
                    let next = self.lexer.get(false)?;
                    match next.kind {
                        TokenKind::Identifier(name) if statement_position => {
                            if braces == 0 && !braceless_body {
                                context.functions.insert(name);
                            } else {
                                context.nested_functions = true;
                            }
                        }
                        TokenKind::Identifier(_) => {}
                        _ => self.lexer.unget(),
                    }
                    self.skip_function()?;
                    prev = Some(TokenKind::Punctuator(Punctuator::RBrace));
                    prev_line = self.lexer.token().end_line;
                    expect_name = false;
                    continue;
                }
                TokenKind::Identifier(name) => {
                    if expect_name && var_depth.is_some() {
                        context.vars.insert(name.clone());
                    } else if pattern_depth.is_some()
                        && !self.lexer.peek(false)?.is_punctuator(Punctuator::Colon)
                    {
                        context.vars.insert(name.clone());
                    }
                }
                _ => {}
            }

            if depth < 0 {
                break;
            }
            if pattern_depth.is_some() && var_depth.is_none() {
                pattern_depth = None;
            }
            expect_name = name_follows;
            prev_line = token.end_line;
            prev = Some(token.kind);
        }
        Ok(())
    }

    /// Skip the parameters and braced body of a function whose name was
    /// already consumed
    fn skip_function(&mut self) -> CompileResult<()> {
        if !self.lexer.match_punctuator(Punctuator::LParen, false)? {
            return Ok(());
        }
        self.skip_balanced(Punctuator::LParen, Punctuator::RParen)?;
        if self.lexer.match_punctuator(Punctuator::LBrace, false)? {
            self.skip_balanced(Punctuator::LBrace, Punctuator::RBrace)?;
        }
        Ok(())
    }

    fn skip_balanced(&mut self, open: Punctuator, close: Punctuator) -> CompileResult<()> {
        let mut depth = 1;
        let mut operand = true;
        while depth > 0 {
            let token = self.lexer.get(operand)?;
            if token.kind == TokenKind::EOF {
                break;
            }
            if token.is_punctuator(open) {
                depth += 1;
            } else if token.is_punctuator(close) {
                depth -= 1;
            }
            operand = expects_operand_after(&token.kind);
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------------

    fn statement(&mut self) -> CompileResult<B::Node> {
        // Scan the first token so the comments in front of it are collected
        self.lexer.peek(true)?;
        let comments = self.lexer.take_comments();
        let node = self.statement_inner()?;
        if !comments.is_empty() {
            self.builder.attach_comments(node, comments);
        }
        Ok(node)
    }

    fn statement_inner(&mut self) -> CompileResult<B::Node> {
        let token = self.lexer.get(true)?;
        let start = token.span;

        match token.kind {
            TokenKind::Keyword(Keyword::Function) => {
                let form = if self.nesting > 0 && self.body_has_nested_functions() {
                    FunctionForm::Statement
                } else {
                    FunctionForm::Declared
                };
                self.function(start, form, true)
            }
            TokenKind::Punctuator(Punctuator::LBrace) => self.nested(Frame::Other, |p| p.block(start)),
            TokenKind::Punctuator(Punctuator::Semicolon) => Ok(self.builder.empty_statement(start)),
            TokenKind::Keyword(Keyword::If) => self.if_statement(start),
            TokenKind::Keyword(Keyword::Switch) => self.switch_statement(start),
            TokenKind::Keyword(Keyword::For) => self.for_statement(start),
            TokenKind::Keyword(Keyword::While) => self.while_statement(start),
            TokenKind::Keyword(Keyword::Do) => self.do_statement(start),
            TokenKind::Keyword(Keyword::Break) => self.jump_statement(start, false),
            TokenKind::Keyword(Keyword::Continue) => self.jump_statement(start, true),
            TokenKind::Keyword(Keyword::Try) => self.try_statement(start),
            TokenKind::Keyword(Keyword::Throw) => {
                let exception = self.expression()?;
                self.consume_semicolon()?;
                Ok(self.builder.throw_statement(exception, self.span_from(start)))
            }
            TokenKind::Keyword(Keyword::Return) => self.return_statement(start),
            TokenKind::Keyword(Keyword::With) => {
                let object = self.paren_expression()?;
                let body = self.nested(Frame::Other, |p| p.statement())?;
                Ok(self.builder.with_statement(object, body, self.span_from(start)))
            }
            TokenKind::Keyword(Keyword::Debugger) => {
                self.consume_semicolon()?;
                Ok(self.builder.debugger_statement(self.span_from(start)))
            }
            TokenKind::Keyword(Keyword::Var) => self.variable_statement(start, NodeKind::Var),
            TokenKind::Keyword(Keyword::Const) => self.variable_statement(start, NodeKind::Const),
            TokenKind::Keyword(Keyword::Let) => {
                if self.lexer.peek(false)?.is_punctuator(Punctuator::LParen) {
                    self.let_block_statement(start)
                } else {
                    self.variable_statement(start, NodeKind::Let)
                }
            }
            TokenKind::Keyword(keyword @ (Keyword::Catch | Keyword::Finally)) => Err(self.error(
                format!("{} without try", keyword.as_str()),
                start.line,
            )),
            TokenKind::Identifier(name) => {
                if self.lexer.peek(false)?.is_punctuator(Punctuator::Colon) {
                    self.lexer.get(false)?;
                    self.labeled_statement(start, name)
                } else {
                    self.lexer.unget();
                    self.expression_statement(start)
                }
            }
            _ => {
                self.lexer.unget();
                self.expression_statement(start)
            }
        }
    }

    /// Parse statements up to the closing brace, the opening brace is consumed
    fn statements_until_brace(&mut self) -> CompileResult<Vec<B::Node>> {
        let mut statements = Vec::new();
        loop {
            let token = self.lexer.peek(true)?;
            if token.is_punctuator(Punctuator::RBrace) {
                self.lexer.get(true)?;
                return Ok(statements);
            }
            if token.kind == TokenKind::EOF {
                return Err(unexpected_eof(self.lexer.file(), token.span.line));
            }
            statements.push(self.statement()?);
        }
    }

    fn block(&mut self, start: Span) -> CompileResult<B::Node> {
        let statements = self.statements_until_brace()?;
        Ok(self.builder.block(statements, self.span_from(start)))
    }

    fn expression_statement(&mut self, start: Span) -> CompileResult<B::Node> {
        let expression = self.expression()?;
        self.consume_semicolon()?;
        Ok(self.builder.expression_statement(expression, self.span_from(start)))
    }

    fn if_statement(&mut self, start: Span) -> CompileResult<B::Node> {
        let condition = self.paren_expression()?;
        let then_part = self.nested(Frame::Other, |p| p.statement())?;
        let else_part = if self.lexer.match_keyword(Keyword::Else, true)? {
            Some(self.nested(Frame::Other, |p| p.statement())?)
        } else {
            None
        };
        Ok(self
            .builder
            .if_statement(condition, then_part, else_part, self.span_from(start)))
    }

    fn switch_statement(&mut self, start: Span) -> CompileResult<B::Node> {
        let discriminant = self.paren_expression()?;
        self.must_match(Punctuator::LBrace)?;

        let cases = self.nested(Frame::Switch, |p| {
            let mut cases = Vec::new();
            let mut has_default = false;
            loop {
                let token = p.lexer.get(true)?;
                let case_start = token.span;
                let label = match token.kind {
                    TokenKind::Punctuator(Punctuator::RBrace) => break,
                    TokenKind::Keyword(Keyword::Case) => Some(p.expression()?),
                    TokenKind::Keyword(Keyword::Default) => {
                        if has_default {
                            return Err(p.error("More than one switch default", case_start.line));
                        }
                        has_default = true;
                        None
                    }
                    _ => return Err(p.unexpected("'case', 'default' or '}'", &token)),
                };
                p.must_match(Punctuator::Colon)?;

                let mut statements = Vec::new();
                loop {
                    let next = p.lexer.peek(true)?;
                    if next.is_keyword(Keyword::Case)
                        || next.is_keyword(Keyword::Default)
                        || next.is_punctuator(Punctuator::RBrace)
                    {
                        break;
                    }
                    if next.kind == TokenKind::EOF {
                        return Err(unexpected_eof(p.lexer.file(), next.span.line));
                    }
                    statements.push(p.statement()?);
                }
                cases.push(p.builder.case_clause(label, statements, p.span_from(case_start)));
            }
            Ok(cases)
        })?;

        Ok(self
            .builder
            .switch_statement(discriminant, cases, self.span_from(start)))
    }

    fn for_statement(&mut self, start: Span) -> CompileResult<B::Node> {
        let each = match self.lexer.peek(false)?.kind {
            TokenKind::Identifier(ref word) if word == "each" => {
                self.lexer.get(false)?;
                true
            }
            _ => false,
        };
        self.must_match(Punctuator::LParen)?;

        let mut setup = None;
        let mut declared: Option<Variables<B::Node>> = None;
        let token = self.lexer.peek(true)?;
        if !token.is_punctuator(Punctuator::Semicolon) {
            let saved = std::mem::replace(&mut self.no_in, true);
            let result = match token.kind {
                TokenKind::Keyword(Keyword::Var) => self.for_variables(NodeKind::Var),
                TokenKind::Keyword(Keyword::Const) => self.for_variables(NodeKind::Const),
                TokenKind::Keyword(Keyword::Let) => self.for_variables(NodeKind::Let),
                _ => self.expression().map(|e| (e, None)),
            };
            self.no_in = saved;
            let (node, variables) = result?;
            setup = Some(node);
            declared = variables;
        }

        if self.lexer.match_keyword(Keyword::In, false)? {
            let iterator = match setup {
                Some(iterator) => iterator,
                None => return Err(self.error("Missing for-in iterator", start.line)),
            };
            match &declared {
                Some(variables) if variables.count != 1 => {
                    return Err(self.error("Invalid for-in left-hand side", start.line));
                }
                Some(_) => {}
                None => {
                    if self.builder.target_shape(iterator) == TargetShape::Invalid {
                        return Err(self.error("Invalid for-in left-hand side", start.line));
                    }
                }
            }
            let object = self.expression()?;
            self.must_match(Punctuator::RParen)?;
            let body = self.nested(Frame::Loop, |p| p.statement())?;
            return Ok(self
                .builder
                .for_in_statement(iterator, object, body, each, self.span_from(start)));
        }

        if each {
            return Err(self.error("Invalid for each loop", start.line));
        }
        if declared.map_or(false, |v| v.uninitialized_pattern) {
            return Err(self.error("Missing = in destructuring declaration", start.line));
        }

        self.must_match(Punctuator::Semicolon)?;
        let condition = if self.lexer.peek(true)?.is_punctuator(Punctuator::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.must_match(Punctuator::Semicolon)?;
        let update = if self.lexer.peek(true)?.is_punctuator(Punctuator::RParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.must_match(Punctuator::RParen)?;
        let body = self.nested(Frame::Loop, |p| p.statement())?;
        Ok(self
            .builder
            .for_statement(setup, condition, update, body, self.span_from(start)))
    }

    fn for_variables(&mut self, kind: NodeKind) -> CompileResult<(B::Node, Option<Variables<B::Node>>)> {
        let keyword = self.lexer.get(true)?;
        let variables = self.variables(keyword.span, kind, true)?;
        Ok((variables.node, Some(variables)))
    }

    fn while_statement(&mut self, start: Span) -> CompileResult<B::Node> {
        let condition = self.paren_expression()?;
        let body = self.nested(Frame::Loop, |p| p.statement())?;
        Ok(self.builder.while_statement(condition, body, self.span_from(start)))
    }

    fn do_statement(&mut self, start: Span) -> CompileResult<B::Node> {
        let body = self.nested(Frame::Loop, |p| p.statement())?;
        self.must_match_keyword(Keyword::While)?;
        let condition = self.paren_expression()?;
        // The semicolon after do-while is always optional
        self.lexer.match_punctuator(Punctuator::Semicolon, false)?;
        Ok(self.builder.do_while_statement(body, condition, self.span_from(start)))
    }

    fn jump_statement(&mut self, start: Span, is_continue: bool) -> CompileResult<B::Node> {
        let label = match self.lexer.peek_on_same_line(false)?.kind {
            TokenKind::Identifier(name) => {
                self.lexer.get(false)?;
                Some(name)
            }
            _ => None,
        };
        self.check_jump(label.as_deref(), is_continue, start.line)?;
        self.consume_semicolon()?;

        let span = self.span_from(start);
        Ok(if is_continue {
            self.builder.continue_statement(label, span)
        } else {
            self.builder.break_statement(label, span)
        })
    }

    /// Validate a `break`/`continue` target against the enclosing constructs
    fn check_jump(&self, label: Option<&str>, is_continue: bool, line: u32) -> CompileResult<()> {
        match label {
            None => {
                let found = self.frames.iter().any(|frame| match frame {
                    Frame::Loop => true,
                    Frame::Switch => !is_continue,
                    _ => false,
                });
                if found {
                    Ok(())
                } else if is_continue {
                    Err(self.error("continue must be inside loop", line))
                } else {
                    Err(self.error("break must be inside loop or switch", line))
                }
            }
            Some(label) => {
                let position = self
                    .frames
                    .iter()
                    .rposition(|frame| matches!(frame, Frame::Label(name) if name == label))
                    .ok_or_else(|| self.error(format!("Label not found: {}", label), line))?;
                if is_continue {
                    let target = self.frames[position + 1..]
                        .iter()
                        .find(|frame| !matches!(frame, Frame::Label(_)));
                    if target != Some(&Frame::Loop) {
                        return Err(self.error(
                            format!("Invalid continue, label {} is not a loop", label),
                            line,
                        ));
                    }
                }
                Ok(())
            }
        }
    }

    fn try_statement(&mut self, start: Span) -> CompileResult<B::Node> {
        let block_start = self.must_match(Punctuator::LBrace)?.span;
        let block = self.nested(Frame::Other, |p| p.block(block_start))?;

        let mut catches = Vec::new();
        let mut unconditional = false;
        while self.lexer.match_keyword(Keyword::Catch, false)? {
            let catch_start = self.lexer.token().span;
            if unconditional {
                return Err(self.error("Catch after unconditional catch", catch_start.line));
            }
            self.must_match(Punctuator::LParen)?;
            let token = self.lexer.peek(true)?;
            let exception = match token.kind {
                TokenKind::Punctuator(Punctuator::LBracket) | TokenKind::Punctuator(Punctuator::LBrace) => {
                    self.pattern()?.0
                }
                TokenKind::Identifier(name) => {
                    self.lexer.get(true)?;
                    self.builder.identifier(name, token.span)
                }
                _ => return Err(self.unexpected("catch variable", &token)),
            };
            let guard = if self.lexer.match_keyword(Keyword::If, false)? {
                Some(self.expression()?)
            } else {
                unconditional = true;
                None
            };
            self.must_match(Punctuator::RParen)?;
            let inner_start = self.must_match(Punctuator::LBrace)?.span;
            let body = self.nested(Frame::Other, |p| p.block(inner_start))?;
            catches.push(
                self.builder
                    .catch_clause(exception, guard, body, self.span_from(catch_start)),
            );
        }

        let finally = if self.lexer.match_keyword(Keyword::Finally, false)? {
            let finally_start = self.must_match(Punctuator::LBrace)?.span;
            Some(self.nested(Frame::Other, |p| p.block(finally_start))?)
        } else {
            None
        };

        if catches.is_empty() && finally.is_none() {
            return Err(self.error("Missing catch or finally after try", start.line));
        }
        Ok(self
            .builder
            .try_statement(block, catches, finally, self.span_from(start)))
    }

    fn return_statement(&mut self, start: Span) -> CompileResult<B::Node> {
        if self.function_depth == 0 {
            return Err(self.error("Return not in function", start.line));
        }
        let next = self.lexer.peek_on_same_line(true)?;
        let value = match next.kind {
            TokenKind::Newline
            | TokenKind::EOF
            | TokenKind::Punctuator(Punctuator::Semicolon)
            | TokenKind::Punctuator(Punctuator::RBrace) => None,
            _ => Some(self.expression()?),
        };
        self.consume_semicolon()?;
        Ok(self.builder.return_statement(value, self.span_from(start)))
    }

    fn labeled_statement(&mut self, start: Span, label: String) -> CompileResult<B::Node> {
        if self
            .frames
            .iter()
            .any(|frame| matches!(frame, Frame::Label(name) if *name == label))
        {
            return Err(self.error(format!("Duplicate label: {}", label), start.line));
        }
        let statement = self.nested(Frame::Label(label.clone()), |p| p.statement())?;
        Ok(self
            .builder
            .labeled_statement(label, statement, self.span_from(start)))
    }

    fn variable_statement(&mut self, start: Span, kind: NodeKind) -> CompileResult<B::Node> {
        let variables = self.variables(start, kind, false)?;
        if variables.uninitialized_pattern {
            return Err(self.error("Missing = in destructuring declaration", start.line));
        }
        self.consume_semicolon()?;
        Ok(variables.node)
    }

    /// Parse a declaration list, the introducing keyword is consumed
    fn variables(&mut self, start: Span, kind: NodeKind, in_for: bool) -> CompileResult<Variables<B::Node>> {
        let mut declarations = Vec::new();
        let mut uninitialized_pattern = false;

        loop {
            let token = self.lexer.get(true)?;
            let declaration_start = token.span;
            let (target, names) = match token.kind {
                TokenKind::Identifier(name) => (DeclTarget::Name(name.clone()), vec![name]),
                TokenKind::Punctuator(Punctuator::LBracket) | TokenKind::Punctuator(Punctuator::LBrace) => {
                    self.lexer.unget();
                    let (pattern, names) = self.pattern()?;
                    (DeclTarget::Pattern(pattern), names)
                }
                _ => return Err(self.unexpected("variable name", &token)),
            };

            if kind != NodeKind::Var && !in_for && self.nesting == 0 {
                self.check_redeclaration(&names, declaration_start.line)?;
            }

            let is_pattern = matches!(target, DeclTarget::Pattern(_));
            let initializer = if self.match_plain_assign()? {
                Some(self.assignment()?)
            } else {
                uninitialized_pattern |= is_pattern;
                None
            };

            declarations.push(self.builder.declaration(
                target,
                initializer,
                self.span_from(declaration_start),
            ));

            if !self.lexer.match_punctuator(Punctuator::Comma, false)? {
                break;
            }
        }

        let count = declarations.len();
        let node = self.builder.variables(kind, declarations, self.span_from(start));
        Ok(Variables {
            node,
            count,
            uninitialized_pattern,
        })
    }

    /// Reject `let`/`const` names that are hoisted `var`s or functions of the body
    fn check_redeclaration(&self, names: &[String], line: u32) -> CompileResult<()> {
        let Some(context) = self.contexts.last() else {
            return Ok(());
        };
        for name in names {
            if context.vars.contains(name) || context.functions.contains(name) {
                return Err(self.error(format!("Redeclaration of {}", name), line));
            }
        }
        Ok(())
    }

    /// `let (declarations)` followed by a block or an expression, `let` is consumed
    fn let_block_statement(&mut self, start: Span) -> CompileResult<B::Node> {
        let variables = self.let_head(start)?;
        if self.lexer.peek(true)?.is_punctuator(Punctuator::LBrace) {
            let block_start = self.lexer.get(true)?.span;
            let block = self.nested(Frame::Other, |p| p.block(block_start))?;
            return Ok(self.builder.let_block(variables, block, self.span_from(start)));
        }
        let expression = self.assignment()?;
        let let_expression = self
            .builder
            .let_expression(variables, expression, self.span_from(start));
        self.consume_semicolon()?;
        Ok(self
            .builder
            .expression_statement(let_expression, self.span_from(start)))
    }

    fn let_head(&mut self, start: Span) -> CompileResult<B::Node> {
        self.must_match(Punctuator::LParen)?;
        let variables = self.allow_in(|p| p.variables(start, NodeKind::Let, true))?;
        if variables.uninitialized_pattern {
            return Err(self.error("Missing = in destructuring declaration", start.line));
        }
        self.must_match(Punctuator::RParen)?;
        Ok(variables.node)
    }

    /// Parse a destructuring pattern and collect the names it binds
    fn pattern(&mut self) -> CompileResult<(B::Node, Vec<String>)> {
        let mut names = Vec::new();
        let node = self.pattern_into(&mut names)?;
        Ok((node, names))
    }

    fn pattern_into(&mut self, names: &mut Vec<String>) -> CompileResult<B::Node> {
        let token = self.lexer.get(true)?;
        let start = token.span;
        match token.kind {
            TokenKind::Punctuator(Punctuator::LBracket) => {
                let mut elements = Vec::new();
                loop {
                    let next = self.lexer.peek(true)?;
                    if next.is_punctuator(Punctuator::RBracket) {
                        self.lexer.get(true)?;
                        break;
                    }
                    if next.is_punctuator(Punctuator::Comma) {
                        self.lexer.get(true)?;
                        elements.push(None);
                        continue;
                    }
                    elements.push(Some(self.pattern_element(names)?));
                    let after = self.lexer.get(false)?;
                    if after.is_punctuator(Punctuator::RBracket) {
                        break;
                    }
                    if !after.is_punctuator(Punctuator::Comma) {
                        return Err(self.unexpected("',' or ']'", &after));
                    }
                }
                Ok(self.builder.array_literal(elements, self.span_from(start)))
            }
            TokenKind::Punctuator(Punctuator::LBrace) => {
                let mut properties = Vec::new();
                loop {
                    let key_token = self.lexer.get(false)?;
                    let key_span = key_token.span;
                    let property = match key_token.kind {
                        TokenKind::Punctuator(Punctuator::RBrace) => break,
                        TokenKind::Identifier(name) => {
                            let key = self.builder.identifier(name.clone(), key_span);
                            let value = if self.lexer.match_punctuator(Punctuator::Colon, false)? {
                                self.pattern_element(names)?
                            } else {
                                names.push(name.clone());
                                self.builder.identifier(name, key_span)
                            };
                            self.builder.property(key, value, self.span_from(key_span))
                        }
                        TokenKind::String(_) | TokenKind::Number(_) | TokenKind::Keyword(_) => {
                            let key = self.property_key(&key_token)?;
                            self.must_match(Punctuator::Colon)?;
                            let value = self.pattern_element(names)?;
                            self.builder.property(key, value, self.span_from(key_span))
                        }
                        _ => return Err(self.unexpected("property name", &key_token)),
                    };
                    properties.push(property);
                    let after = self.lexer.get(false)?;
                    if after.is_punctuator(Punctuator::RBrace) {
                        break;
                    }
                    if !after.is_punctuator(Punctuator::Comma) {
                        return Err(self.unexpected("',' or '}'", &after));
                    }
                }
                Ok(self.builder.object_literal(properties, self.span_from(start)))
            }
            _ => Err(self.unexpected("destructuring pattern", &token)),
        }
    }

    fn pattern_element(&mut self, names: &mut Vec<String>) -> CompileResult<B::Node> {
        let token = self.lexer.peek(true)?;
        match token.kind {
            TokenKind::Punctuator(Punctuator::LBracket) | TokenKind::Punctuator(Punctuator::LBrace) => {
                self.pattern_into(names)
            }
            TokenKind::Identifier(name) => {
                self.lexer.get(true)?;
                names.push(name.clone());
                Ok(self.builder.identifier(name, token.span))
            }
            _ => Err(self.unexpected("variable name", &token)),
        }
    }

    // ---------------------------------------------------------------------
    // Functions
    // ---------------------------------------------------------------------

    /// Parse a function after the `function` keyword
    fn function(&mut self, start: Span, form: FunctionForm, require_name: bool) -> CompileResult<B::Node> {
        let name = match self.lexer.peek(false)?.kind {
            TokenKind::Identifier(name) => {
                self.lexer.get(false)?;
                Some(name)
            }
            _ => None,
        };
        if require_name && name.is_none() {
            return Err(self.error("Missing function name", start.line));
        }
        self.function_rest(start, name, form, None)
    }

    /// Parse parameters and body of a function whose name is known
    fn function_rest(
        &mut self,
        start: Span,
        name: Option<String>,
        form: FunctionForm,
        accessor: Option<Accessor>,
    ) -> CompileResult<B::Node> {
        self.must_match(Punctuator::LParen)?;
        let mut params = Vec::new();
        if !self.lexer.match_punctuator(Punctuator::RParen, false)? {
            loop {
                let token = self.lexer.peek(true)?;
                let param = match token.kind {
                    TokenKind::Punctuator(Punctuator::LBracket) | TokenKind::Punctuator(Punctuator::LBrace) => {
                        self.pattern()?.0
                    }
                    TokenKind::Identifier(name) => {
                        self.lexer.get(true)?;
                        self.builder.identifier(name, token.span)
                    }
                    _ => return Err(self.unexpected("formal parameter", &token)),
                };
                params.push(param);
                if self.lexer.match_punctuator(Punctuator::RParen, false)? {
                    break;
                }
                self.must_match(Punctuator::Comma)?;
            }
        }

        let saved_frames = std::mem::take(&mut self.frames);
        let saved_nesting = std::mem::replace(&mut self.nesting, 0);
        let saved_no_in = std::mem::replace(&mut self.no_in, false);
        self.function_depth += 1;
        let body = self.function_body();
        self.function_depth -= 1;
        self.no_in = saved_no_in;
        self.nesting = saved_nesting;
        self.frames = saved_frames;
        let (body, expression_closure) = body?;

        let parts = FunctionParts {
            name,
            params,
            body,
            form,
            expression_closure,
            accessor,
        };
        Ok(self.builder.function(parts, self.span_from(start)))
    }

    /// Braced body, or the bare expression of an expression closure
    fn function_body(&mut self) -> CompileResult<(B::Node, bool)> {
        if !self.lexer.peek(false)?.is_punctuator(Punctuator::LBrace) {
            let expression = self.assignment()?;
            return Ok((expression, true));
        }
        let start = self.lexer.get(false)?.span;
        let context = self.prescan();
        self.contexts.push(context);
        let statements = self.statements_until_brace();
        self.contexts.pop();
        let statements = statements?;
        Ok((self.builder.script(statements, self.span_from(start)), false))
    }

    // ---------------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------------

    fn paren_expression(&mut self) -> CompileResult<B::Node> {
        self.must_match(Punctuator::LParen)?;
        let expression = self.allow_in(|p| p.expression())?;
        self.must_match(Punctuator::RParen)?;
        Ok(expression)
    }

    /// Comma expression
    fn expression(&mut self) -> CompileResult<B::Node> {
        let start = self.lexer.peek(true)?.span;
        let first = self.assignment()?;
        if !self.lexer.peek(false)?.is_punctuator(Punctuator::Comma) {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.lexer.match_punctuator(Punctuator::Comma, false)? {
            expressions.push(self.assignment()?);
        }
        Ok(self.builder.comma(expressions, self.span_from(start)))
    }

    fn assignment(&mut self) -> CompileResult<B::Node> {
        let token = self.lexer.peek(true)?;
        if token.is_keyword(Keyword::Yield) {
            return self.yield_expression();
        }
        let start = token.span;
        let target = self.conditional()?;

        let token = self.lexer.peek(false)?;
        if !token.is_punctuator(Punctuator::Assign) {
            return Ok(target);
        }
        self.lexer.get(false)?;

        let op = token.assign_op.and_then(binary_kind);
        let valid = match self.builder.target_shape(target) {
            TargetShape::Simple | TargetShape::Call => true,
            TargetShape::Pattern => op.is_none(),
            TargetShape::Invalid => false,
        };
        if !valid {
            return Err(self.error("Invalid assignment left-hand side", token.span.line));
        }

        let value = self.assignment()?;
        Ok(self.builder.assignment(op, target, value, self.span_from(start)))
    }

    fn yield_expression(&mut self) -> CompileResult<B::Node> {
        let token = self.lexer.get(true)?;
        if self.function_depth == 0 {
            return Err(self.error("Yield not in function", token.span.line));
        }
        let next = self.lexer.peek_on_same_line(true)?;
        let value = match next.kind {
            TokenKind::Newline
            | TokenKind::EOF
            | TokenKind::Punctuator(Punctuator::RParen)
            | TokenKind::Punctuator(Punctuator::RBracket)
            | TokenKind::Punctuator(Punctuator::RBrace)
            | TokenKind::Punctuator(Punctuator::Comma)
            | TokenKind::Punctuator(Punctuator::Semicolon)
            | TokenKind::Punctuator(Punctuator::Colon) => None,
            _ => Some(self.assignment()?),
        };
        Ok(self.builder.yield_expression(value, self.span_from(token.span)))
    }

    fn conditional(&mut self) -> CompileResult<B::Node> {
        let start = self.lexer.peek(true)?.span;
        let condition = self.binary(0)?;
        if !self.lexer.match_punctuator(Punctuator::Question, false)? {
            return Ok(condition);
        }
        let then_part = self.allow_in(|p| p.assignment())?;
        self.must_match(Punctuator::Colon)?;
        let else_part = self.assignment()?;
        Ok(self
            .builder
            .conditional(condition, then_part, else_part, self.span_from(start)))
    }

    /// Left-associative binary operators from `||` (level 0) to the
    /// multiplicative operators (level 9)
    fn binary(&mut self, level: u8) -> CompileResult<B::Node> {
        if level > MULTIPLICATIVE_LEVEL {
            return self.unary();
        }
        let start = self.lexer.peek(true)?.span;
        let mut left = self.binary(level + 1)?;
        loop {
            let token = self.lexer.peek(false)?;
            let op = match binary_operator(&token.kind) {
                Some((op_level, op)) if op_level == level && !(op == NodeKind::In && self.no_in) => op,
                _ => break,
            };
            self.lexer.get(false)?;
            let right = self.binary(level + 1)?;
            left = self.builder.binary(op, left, right, self.span_from(start));
        }
        Ok(left)
    }

    fn unary(&mut self) -> CompileResult<B::Node> {
        let token = self.lexer.get(true)?;
        let start = token.span;
        let op = match token.kind {
            TokenKind::Punctuator(Punctuator::Not) => Some(NodeKind::Not),
            TokenKind::Punctuator(Punctuator::Tilde) => Some(NodeKind::BitwiseNot),
            TokenKind::Punctuator(Punctuator::Plus) => Some(NodeKind::UnaryPlus),
            TokenKind::Punctuator(Punctuator::Minus) => Some(NodeKind::UnaryMinus),
            TokenKind::Keyword(Keyword::Delete) => Some(NodeKind::Delete),
            TokenKind::Keyword(Keyword::Void) => Some(NodeKind::Void),
            TokenKind::Keyword(Keyword::Typeof) => Some(NodeKind::Typeof),
            _ => None,
        };
        if let Some(op) = op {
            let operand = self.unary()?;
            return Ok(self.builder.unary(op, operand, self.span_from(start)));
        }

        let update = match token.kind {
            TokenKind::Punctuator(Punctuator::PlusPlus) => Some(NodeKind::Increment),
            TokenKind::Punctuator(Punctuator::MinusMinus) => Some(NodeKind::Decrement),
            _ => None,
        };
        if let Some(op) = update {
            let operand = self.unary()?;
            self.check_update_target(operand, start.line)?;
            return Ok(self.builder.update(op, operand, false, self.span_from(start)));
        }

        self.lexer.unget();
        let expression = self.member(true)?;

        // Postfix operators must stay on the line of their operand
        let next = self.lexer.peek_on_same_line(false)?;
        let postfix = match next.kind {
            TokenKind::Punctuator(Punctuator::PlusPlus) => Some(NodeKind::Increment),
            TokenKind::Punctuator(Punctuator::MinusMinus) => Some(NodeKind::Decrement),
            _ => None,
        };
        match postfix {
            Some(op) => {
                self.lexer.get(false)?;
                self.check_update_target(expression, next.span.line)?;
                Ok(self.builder.update(op, expression, true, self.span_from(start)))
            }
            None => Ok(expression),
        }
    }

    fn check_update_target(&self, operand: B::Node, line: u32) -> CompileResult<()> {
        match self.builder.target_shape(operand) {
            TargetShape::Simple | TargetShape::Call => Ok(()),
            _ => Err(self.error("Invalid increment/decrement operand", line)),
        }
    }

    /// Member access, calls and `new`
    fn member(&mut self, allow_call: bool) -> CompileResult<B::Node> {
        let token = self.lexer.get(true)?;
        let start = token.span;
        let mut node = if token.is_keyword(Keyword::New) {
            let callee = self.member(false)?;
            if self.lexer.match_punctuator(Punctuator::LParen, false)? {
                let args = self.arguments()?;
                self.builder.new_expression(callee, Some(args), self.span_from(start))
            } else {
                self.builder.new_expression(callee, None, self.span_from(start))
            }
        } else {
            self.lexer.unget();
            self.primary()?
        };

        loop {
            let token = self.lexer.get(false)?;
            match token.kind {
                TokenKind::Punctuator(Punctuator::Dot) => {
                    let name_token = self.lexer.get(false)?;
                    let name = match property_name(&name_token.kind) {
                        Some(name) => name,
                        None => return Err(self.unexpected("property name", &name_token)),
                    };
                    node = self.builder.member(node, name, self.span_from(start));
                }
                TokenKind::Punctuator(Punctuator::LBracket) => {
                    let index = self.allow_in(|p| p.expression())?;
                    self.must_match(Punctuator::RBracket)?;
                    node = self.builder.index(node, index, self.span_from(start));
                }
                TokenKind::Punctuator(Punctuator::LParen) if allow_call => {
                    let args = self.arguments()?;
                    node = self.builder.call(node, args, self.span_from(start));
                }
                _ => {
                    self.lexer.unget();
                    break;
                }
            }
        }
        Ok(node)
    }

    /// Argument list, the opening parenthesis is consumed
    fn arguments(&mut self) -> CompileResult<Vec<B::Node>> {
        self.allow_in(|p| {
            let mut args = Vec::new();
            if p.lexer.match_punctuator(Punctuator::RParen, false)? {
                return Ok(args);
            }
            loop {
                let start = p.lexer.peek(true)?.span;
                let argument = p.assignment()?;
                let next = p.lexer.peek(false)?;
                if next.is_keyword(Keyword::For) {
                    let tail = p.comprehension_tail()?;
                    let generator = p.builder.generator_expression(argument, tail, p.span_from(start));
                    if !args.is_empty() || !p.lexer.peek(false)?.is_punctuator(Punctuator::RParen) {
                        return Err(p.error("Generator expression must be parenthesized", next.span.line));
                    }
                    args.push(generator);
                } else {
                    args.push(argument);
                }
                if !p.lexer.match_punctuator(Punctuator::Comma, false)? {
                    break;
                }
            }
            p.must_match(Punctuator::RParen)?;
            Ok(args)
        })
    }

    /// `for (x in o)` clauses and optional `if (c)` guard of a comprehension
    fn comprehension_tail(&mut self) -> CompileResult<B::Node> {
        let start = self.lexer.peek(false)?.span;
        let mut fors = Vec::new();
        while self.lexer.match_keyword(Keyword::For, false)? {
            let for_start = self.lexer.token().span;
            let each = match self.lexer.peek(false)?.kind {
                TokenKind::Identifier(ref word) if word == "each" => {
                    self.lexer.get(false)?;
                    true
                }
                _ => false,
            };
            self.must_match(Punctuator::LParen)?;
            let token = self.lexer.peek(true)?;
            let iterator = match token.kind {
                TokenKind::Punctuator(Punctuator::LBracket) | TokenKind::Punctuator(Punctuator::LBrace) => {
                    self.pattern()?.0
                }
                TokenKind::Identifier(name) => {
                    self.lexer.get(true)?;
                    self.builder.identifier(name, token.span)
                }
                _ => return Err(self.unexpected("comprehension variable", &token)),
            };
            self.must_match_keyword(Keyword::In)?;
            let object = self.allow_in(|p| p.expression())?;
            self.must_match(Punctuator::RParen)?;
            fors.push(
                self.builder
                    .comprehension_for(iterator, object, each, self.span_from(for_start)),
            );
        }
        let guard = if self.lexer.match_keyword(Keyword::If, false)? {
            Some(self.paren_expression()?)
        } else {
            None
        };
        Ok(self.builder.comprehension_tail(fors, guard, self.span_from(start)))
    }

    fn primary(&mut self) -> CompileResult<B::Node> {
        let token = self.lexer.get(true)?;
        let start = token.span;
        match token.kind {
            TokenKind::Keyword(Keyword::Function) => self.function(start, FunctionForm::Expressed, false),
            TokenKind::Punctuator(Punctuator::LBracket) => self.allow_in(|p| p.array_literal(start)),
            TokenKind::Punctuator(Punctuator::LBrace) => self.allow_in(|p| p.object_literal(start)),
            TokenKind::Punctuator(Punctuator::LParen) => self.allow_in(|p| {
                let mut expression = p.expression()?;
                if p.lexer.peek(false)?.is_keyword(Keyword::For) {
                    let tail = p.comprehension_tail()?;
                    expression = p.builder.generator_expression(expression, tail, p.span_from(start));
                }
                p.must_match(Punctuator::RParen)?;
                Ok(p.builder.parenthesized(expression))
            }),
            TokenKind::Keyword(Keyword::Let) => {
                let variables = self.let_head(start)?;
                let expression = self.assignment()?;
                Ok(self
                    .builder
                    .let_expression(variables, expression, self.span_from(start)))
            }
            TokenKind::Keyword(Keyword::This) => Ok(self.builder.primary(NodeKind::This, start)),
            TokenKind::Keyword(Keyword::True) => Ok(self.builder.primary(NodeKind::True, start)),
            TokenKind::Keyword(Keyword::False) => Ok(self.builder.primary(NodeKind::False, start)),
            TokenKind::Keyword(Keyword::Null) => Ok(self.builder.primary(NodeKind::Null, start)),
            TokenKind::Identifier(name) => Ok(self.builder.identifier(name, start)),
            TokenKind::Number(value) => Ok(self.builder.number(value, start)),
            TokenKind::String(value) => Ok(self.builder.string(value, start)),
            TokenKind::RegExp(source) => Ok(self.builder.regexp(source, start)),
            _ => Err(self.unexpected("expression", &token)),
        }
    }

    /// Array literal or comprehension, the opening bracket is consumed
    fn array_literal(&mut self, start: Span) -> CompileResult<B::Node> {
        let mut elements = Vec::new();
        loop {
            let token = self.lexer.peek(true)?;
            if token.is_punctuator(Punctuator::RBracket) {
                self.lexer.get(true)?;
                break;
            }
            if token.is_punctuator(Punctuator::Comma) {
                self.lexer.get(true)?;
                elements.push(None);
                continue;
            }

            let element = self.assignment()?;
            if elements.is_empty() && self.lexer.peek(false)?.is_keyword(Keyword::For) {
                let tail = self.comprehension_tail()?;
                self.must_match(Punctuator::RBracket)?;
                return Ok(self
                    .builder
                    .array_comprehension(element, tail, self.span_from(start)));
            }
            elements.push(Some(element));

            let after = self.lexer.get(false)?;
            if after.is_punctuator(Punctuator::RBracket) {
                break;
            }
            if !after.is_punctuator(Punctuator::Comma) {
                return Err(self.unexpected("',' or ']'", &after));
            }
        }
        Ok(self.builder.array_literal(elements, self.span_from(start)))
    }

    /// Object literal, the opening brace is consumed
    fn object_literal(&mut self, start: Span) -> CompileResult<B::Node> {
        let mut properties = Vec::new();
        loop {
            let token = self.lexer.get(false)?;
            let property_start = token.span;
            if token.is_punctuator(Punctuator::RBrace) {
                break;
            }

            let accessor = match token.kind {
                TokenKind::Identifier(ref word) if word == "get" => Some(Accessor::Getter),
                TokenKind::Identifier(ref word) if word == "set" => Some(Accessor::Setter),
                _ => None,
            };
            let next = self.lexer.peek(false)?;
            let property = match accessor {
                Some(accessor) if property_name(&next.kind).is_some() || is_literal_key(&next.kind) => {
                    let name_token = self.lexer.get(false)?;
                    let name = match &name_token.kind {
                        TokenKind::String(value) => value.clone(),
                        TokenKind::Number(value) => value.to_string(),
                        other => property_name(other).unwrap_or_default(),
                    };
                    self.function_rest(property_start, Some(name), FunctionForm::Expressed, Some(accessor))?
                }
                _ => {
                    let key = self.property_key(&token)?;
                    self.must_match(Punctuator::Colon)?;
                    let value = self.assignment()?;
                    self.builder.property(key, value, self.span_from(property_start))
                }
            };
            properties.push(property);

            let after = self.lexer.get(false)?;
            if after.is_punctuator(Punctuator::RBrace) {
                break;
            }
            if !after.is_punctuator(Punctuator::Comma) {
                return Err(self.unexpected("',' or '}'", &after));
            }
        }
        Ok(self.builder.object_literal(properties, self.span_from(start)))
    }

    fn property_key(&mut self, token: &Token) -> CompileResult<B::Node> {
        match &token.kind {
            TokenKind::String(value) => Ok(self.builder.string(value.clone(), token.span)),
            TokenKind::Number(value) => Ok(self.builder.number(*value, token.span)),
            other => match property_name(other) {
                Some(name) => Ok(self.builder.identifier(name, token.span)),
                None => Err(self.unexpected("property name", token)),
            },
        }
    }

    // ---------------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------------

    /// Whether the pre-scan of the current body found function declarations
    /// below its statement level
    fn body_has_nested_functions(&self) -> bool {
        self.contexts.last().map_or(true, |context| context.nested_functions)
    }

    /// Run `f` one statement level deeper, inside `frame`
    fn nested<T>(&mut self, frame: Frame, f: impl FnOnce(&mut Self) -> CompileResult<T>) -> CompileResult<T> {
        self.frames.push(frame);
        self.nesting += 1;
        let result = f(self);
        self.nesting -= 1;
        self.frames.pop();
        result
    }

    /// Run `f` with the `in` operator allowed again
    fn allow_in<T>(&mut self, f: impl FnOnce(&mut Self) -> CompileResult<T>) -> CompileResult<T> {
        let saved = std::mem::replace(&mut self.no_in, false);
        let result = f(self);
        self.no_in = saved;
        result
    }

    /// Statement terminator, inserted automatically before a line break,
    /// a closing brace or the end of input
    fn consume_semicolon(&mut self) -> CompileResult<()> {
        let token = self.lexer.peek_on_same_line(false)?;
        match token.kind {
            TokenKind::Newline | TokenKind::EOF | TokenKind::Punctuator(Punctuator::RBrace) => Ok(()),
            TokenKind::Punctuator(Punctuator::Semicolon) => {
                self.lexer.get(false)?;
                Ok(())
            }
            _ => Err(self.error("Missing ; before statement", token.span.line)),
        }
    }

    fn match_plain_assign(&mut self) -> CompileResult<bool> {
        let token = self.lexer.get(false)?;
        if token.is_punctuator(Punctuator::Assign) && token.assign_op.is_none() {
            Ok(true)
        } else {
            self.lexer.unget();
            Ok(false)
        }
    }

    fn must_match(&mut self, punctuator: Punctuator) -> CompileResult<Token> {
        let token = self.lexer.get(false)?;
        if token.is_punctuator(punctuator) {
            Ok(token)
        } else {
            Err(self.unexpected(&format!("'{}'", punctuator.as_str()), &token))
        }
    }

    fn must_match_keyword(&mut self, keyword: Keyword) -> CompileResult<Token> {
        let token = self.lexer.get(false)?;
        if token.is_keyword(keyword) {
            Ok(token)
        } else {
            Err(self.unexpected(&format!("'{}'", keyword.as_str()), &token))
        }
    }

    fn span_from(&self, start: Span) -> Span {
        start.to(self.lexer.token().span)
    }

    fn error(&self, message: impl Into<String>, line: u32) -> CompileError {
        syntax_error(message, self.lexer.file(), line)
    }

    fn unexpected(&self, expected: &str, token: &Token) -> CompileError {
        if token.kind == TokenKind::EOF {
            unexpected_eof(self.lexer.file(), token.span.line)
        } else {
            unexpected_token(expected, &token.kind.describe(), self.lexer.file(), token.span.line)
        }
    }
}

const MULTIPLICATIVE_LEVEL: u8 = 9;

/// Precedence level and node kind of a binary operator token
fn binary_operator(kind: &TokenKind) -> Option<(u8, NodeKind)> {
    let entry = match kind {
        TokenKind::Punctuator(p) => match p {
            Punctuator::OrOr => (0, NodeKind::Or),
            Punctuator::AndAnd => (1, NodeKind::And),
            Punctuator::Or => (2, NodeKind::BitwiseOr),
            Punctuator::Xor => (3, NodeKind::BitwiseXor),
            Punctuator::And => (4, NodeKind::BitwiseAnd),
            Punctuator::EqEq => (5, NodeKind::Eq),
            Punctuator::NotEq => (5, NodeKind::Ne),
            Punctuator::EqEqEq => (5, NodeKind::StrictEq),
            Punctuator::NotEqEq => (5, NodeKind::StrictNe),
            Punctuator::Lt => (6, NodeKind::Lt),
            Punctuator::LtEq => (6, NodeKind::Le),
            Punctuator::Gt => (6, NodeKind::Gt),
            Punctuator::GtEq => (6, NodeKind::Ge),
            Punctuator::LtLt => (7, NodeKind::Lsh),
            Punctuator::GtGt => (7, NodeKind::Rsh),
            Punctuator::GtGtGt => (7, NodeKind::Ursh),
            Punctuator::Plus => (8, NodeKind::Plus),
            Punctuator::Minus => (8, NodeKind::Minus),
            Punctuator::Star => (9, NodeKind::Mul),
            Punctuator::Slash => (9, NodeKind::Div),
            Punctuator::Percent => (9, NodeKind::Mod),
            _ => return None,
        },
        TokenKind::Keyword(Keyword::In) => (6, NodeKind::In),
        TokenKind::Keyword(Keyword::Instanceof) => (6, NodeKind::Instanceof),
        _ => return None,
    };
    Some(entry)
}

/// Node kind of the operator of a compound assignment
fn binary_kind(op: Punctuator) -> Option<NodeKind> {
    binary_operator(&TokenKind::Punctuator(op)).map(|(_, kind)| kind)
}

/// Name usable after a dot or as an object key: identifiers and reserved words
fn property_name(kind: &TokenKind) -> Option<String> {
    match kind {
        TokenKind::Identifier(name) => Some(name.clone()),
        TokenKind::Keyword(keyword) => Some(keyword.as_str().to_string()),
        _ => None,
    }
}

fn is_literal_key(kind: &TokenKind) -> bool {
    matches!(kind, TokenKind::String(_) | TokenKind::Number(_))
}

/// Whether a token at the start of a line continues the expression before it
fn continues_expression(kind: &TokenKind) -> bool {
    match kind {
        TokenKind::Punctuator(p) => !matches!(
            p,
            Punctuator::PlusPlus
                | Punctuator::MinusMinus
                | Punctuator::Not
                | Punctuator::Tilde
                | Punctuator::LBrace
                | Punctuator::RBrace
        ),
        TokenKind::Keyword(Keyword::In) | TokenKind::Keyword(Keyword::Instanceof) => true,
        _ => false,
    }
}
