//! Lexer - tokenizes dialect source into a lookahead-buffered token stream

use crate::comment::{Comment, CommentContext};
use crate::error::lexical_error;
use core_types::{CompileResult, Span};

/// Reserved words of the dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// break keyword
    Break,
    /// case keyword
    Case,
    /// catch keyword
    Catch,
    /// const keyword
    Const,
    /// continue keyword
    Continue,
    /// debugger keyword
    Debugger,
    /// default keyword
    Default,
    /// delete keyword
    Delete,
    /// do keyword
    Do,
    /// else keyword
    Else,
    /// false keyword
    False,
    /// finally keyword
    Finally,
    /// for keyword
    For,
    /// function keyword
    Function,
    /// if keyword
    If,
    /// in keyword
    In,
    /// instanceof keyword
    Instanceof,
    /// let keyword
    Let,
    /// new keyword
    New,
    /// null keyword
    Null,
    /// return keyword
    Return,
    /// switch keyword
    Switch,
    /// this keyword
    This,
    /// throw keyword
    Throw,
    /// true keyword
    True,
    /// try keyword
    Try,
    /// typeof keyword
    Typeof,
    /// var keyword
    Var,
    /// void keyword
    Void,
    /// while keyword
    While,
    /// with keyword
    With,
    /// yield keyword
    Yield,
    // Reserved for future use, never valid in this dialect
    /// class keyword
    Class,
    /// enum keyword
    Enum,
    /// export keyword
    Export,
    /// extends keyword
    Extends,
    /// import keyword
    Import,
    /// super keyword
    Super,
}

const KEYWORDS: &[(&str, Keyword)] = &[
    ("break", Keyword::Break),
    ("case", Keyword::Case),
    ("catch", Keyword::Catch),
    ("const", Keyword::Const),
    ("continue", Keyword::Continue),
    ("debugger", Keyword::Debugger),
    ("default", Keyword::Default),
    ("delete", Keyword::Delete),
    ("do", Keyword::Do),
    ("else", Keyword::Else),
    ("false", Keyword::False),
    ("finally", Keyword::Finally),
    ("for", Keyword::For),
    ("function", Keyword::Function),
    ("if", Keyword::If),
    ("in", Keyword::In),
    ("instanceof", Keyword::Instanceof),
    ("let", Keyword::Let),
    ("new", Keyword::New),
    ("null", Keyword::Null),
    ("return", Keyword::Return),
    ("switch", Keyword::Switch),
    ("this", Keyword::This),
    ("throw", Keyword::Throw),
    ("true", Keyword::True),
    ("try", Keyword::Try),
    ("typeof", Keyword::Typeof),
    ("var", Keyword::Var),
    ("void", Keyword::Void),
    ("while", Keyword::While),
    ("with", Keyword::With),
    ("yield", Keyword::Yield),
    ("class", Keyword::Class),
    ("enum", Keyword::Enum),
    ("export", Keyword::Export),
    ("extends", Keyword::Extends),
    ("import", Keyword::Import),
    ("super", Keyword::Super),
];

impl Keyword {
    /// Look up a keyword by its source text
    pub fn lookup(name: &str) -> Option<Keyword> {
        KEYWORDS
            .iter()
            .find(|(text, _)| *text == name)
            .map(|(_, keyword)| *keyword)
    }

    /// Source text of the keyword
    pub fn as_str(&self) -> &'static str {
        KEYWORDS
            .iter()
            .find(|(_, keyword)| keyword == self)
            .map(|(text, _)| *text)
            .unwrap_or("")
    }
}

/// Whether `name` is a reserved word and cannot be used as an identifier
pub fn is_reserved_word(name: &str) -> bool {
    Keyword::lookup(name).is_some()
}

/// Punctuators (operators and delimiters)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Punctuator {
    /// Opening parenthesis
    LParen,
    /// Closing parenthesis
    RParen,
    /// Opening brace
    LBrace,
    /// Closing brace
    RBrace,
    /// Opening bracket
    LBracket,
    /// Closing bracket
    RBracket,
    /// Semicolon
    Semicolon,
    /// Comma
    Comma,
    /// Dot
    Dot,
    /// Colon
    Colon,
    /// Question mark
    Question,
    /// Assignment, plain or compound (see [`Token::assign_op`])
    Assign,
    /// Plus
    Plus,
    /// Minus
    Minus,
    /// Multiply
    Star,
    /// Divide
    Slash,
    /// Modulo
    Percent,
    /// Equality
    EqEq,
    /// Strict equality
    EqEqEq,
    /// Inequality
    NotEq,
    /// Strict inequality
    NotEqEq,
    /// Less than
    Lt,
    /// Less than or equal
    LtEq,
    /// Greater than
    Gt,
    /// Greater than or equal
    GtEq,
    /// Logical AND
    AndAnd,
    /// Logical OR
    OrOr,
    /// Logical NOT
    Not,
    /// Bitwise AND
    And,
    /// Bitwise OR
    Or,
    /// Bitwise XOR
    Xor,
    /// Bitwise NOT
    Tilde,
    /// Left shift
    LtLt,
    /// Right shift
    GtGt,
    /// Unsigned right shift
    GtGtGt,
    /// Increment
    PlusPlus,
    /// Decrement
    MinusMinus,
}

impl Punctuator {
    /// Source text of the punctuator
    pub fn as_str(&self) -> &'static str {
        match self {
            Punctuator::LParen => "(",
            Punctuator::RParen => ")",
            Punctuator::LBrace => "{",
            Punctuator::RBrace => "}",
            Punctuator::LBracket => "[",
            Punctuator::RBracket => "]",
            Punctuator::Semicolon => ";",
            Punctuator::Comma => ",",
            Punctuator::Dot => ".",
            Punctuator::Colon => ":",
            Punctuator::Question => "?",
            Punctuator::Assign => "=",
            Punctuator::Plus => "+",
            Punctuator::Minus => "-",
            Punctuator::Star => "*",
            Punctuator::Slash => "/",
            Punctuator::Percent => "%",
            Punctuator::EqEq => "==",
            Punctuator::EqEqEq => "===",
            Punctuator::NotEq => "!=",
            Punctuator::NotEqEq => "!==",
            Punctuator::Lt => "<",
            Punctuator::LtEq => "<=",
            Punctuator::Gt => ">",
            Punctuator::GtEq => ">=",
            Punctuator::AndAnd => "&&",
            Punctuator::OrOr => "||",
            Punctuator::Not => "!",
            Punctuator::And => "&",
            Punctuator::Or => "|",
            Punctuator::Xor => "^",
            Punctuator::Tilde => "~",
            Punctuator::LtLt => "<<",
            Punctuator::GtGt => ">>",
            Punctuator::GtGtGt => ">>>",
            Punctuator::PlusPlus => "++",
            Punctuator::MinusMinus => "--",
        }
    }
}

/// Kind and literal value of a token
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Identifier (variable name, property name, contextual word)
    Identifier(String),
    /// Number literal
    Number(f64),
    /// String literal with escapes decoded
    String(String),
    /// Regular expression literal, full source text including slashes and flags
    RegExp(String),
    /// Reserved word
    Keyword(Keyword),
    /// Punctuator/operator
    Punctuator(Punctuator),
    /// Line break, only produced in significant-newline mode
    Newline,
    /// End of file
    EOF,
}

impl TokenKind {
    /// Short description used in error messages
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Identifier(name) => format!("identifier '{}'", name),
            TokenKind::Number(value) => format!("number {}", value),
            TokenKind::String(_) => "string".to_string(),
            TokenKind::RegExp(_) => "regular expression".to_string(),
            TokenKind::Keyword(keyword) => format!("'{}'", keyword.as_str()),
            TokenKind::Punctuator(punctuator) => format!("'{}'", punctuator.as_str()),
            TokenKind::Newline => "newline".to_string(),
            TokenKind::EOF => "end of input".to_string(),
        }
    }
}

/// Token produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Kind and literal value
    pub kind: TokenKind,
    /// Source range
    pub span: Span,
    /// Line the token ends on
    pub end_line: u32,
    /// Operator of a compound assignment (`+` for `+=`)
    pub assign_op: Option<Punctuator>,
}

impl Default for Token {
    fn default() -> Self {
        Self {
            kind: TokenKind::EOF,
            span: Span::default(),
            end_line: 0,
            assign_op: None,
        }
    }
}

impl Token {
    /// Whether this token is the given punctuator
    pub fn is_punctuator(&self, p: Punctuator) -> bool {
        self.kind == TokenKind::Punctuator(p)
    }

    /// Whether this token is the given keyword
    pub fn is_keyword(&self, k: Keyword) -> bool {
        self.kind == TokenKind::Keyword(k)
    }
}

const RING_SIZE: usize = 4;
const RING_MASK: usize = RING_SIZE - 1;

/// Snapshot of the complete lexer state, see [`Lexer::save`]
#[derive(Debug, Clone)]
pub struct LexerState {
    cursor: usize,
    line: u32,
    tokens: [Token; RING_SIZE],
    comment_marks: [usize; RING_SIZE],
    token_index: usize,
    lookahead: usize,
    scan_newlines: bool,
    comments: usize,
    pending_from: usize,
    last_code_line: u32,
    last_line: u32,
}

/// Lexer for dialect source code
pub struct Lexer {
    file: String,
    chars: Vec<char>,
    cursor: usize,
    line: u32,
    tokens: [Token; RING_SIZE],
    /// Number of collected comments right after each buffered token
    comment_marks: [usize; RING_SIZE],
    token_index: usize,
    lookahead: usize,
    /// Produce [`TokenKind::Newline`] tokens instead of skipping line breaks
    pub scan_newlines: bool,
    comments: Vec<Comment>,
    /// First comment whose context may still turn into [`CommentContext::Free`]
    pending_from: usize,
    /// Line on which the last real token ended, 0 before the first token
    last_code_line: u32,
    /// Line on which the last token or comment ended
    last_line: u32,
}

impl Lexer {
    /// Create a new lexer for the given source, file id and first line number
    pub fn new(source: &str, file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            chars: source.chars().collect(),
            cursor: 0,
            line,
            tokens: Default::default(),
            comment_marks: [0; RING_SIZE],
            token_index: 0,
            lookahead: 0,
            scan_newlines: false,
            comments: Vec::new(),
            pending_from: 0,
            last_code_line: 0,
            last_line: line.saturating_sub(1),
        }
    }

    /// File id used in error messages
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Current line of the scanner
    pub fn line(&self) -> u32 {
        self.line
    }

    /// The most recently consumed token
    pub fn token(&self) -> &Token {
        &self.tokens[self.token_index]
    }

    /// Whether the whole input has been consumed
    pub fn is_done(&mut self) -> CompileResult<bool> {
        Ok(self.peek(false)?.kind == TokenKind::EOF)
    }

    /// Consume and return the next token.
    ///
    /// `scan_operand` tells the lexer that an operand is expected, so a `/`
    /// starts a regular expression rather than a division.
    pub fn get(&mut self, scan_operand: bool) -> CompileResult<Token> {
        while self.lookahead > 0 {
            self.lookahead -= 1;
            self.token_index = (self.token_index + 1) & RING_MASK;
            let token = &self.tokens[self.token_index];
            if token.kind == TokenKind::Newline && !self.scan_newlines {
                continue;
            }
            if self.needs_relex(token, scan_operand) {
                let start = token.span.start;
                let line = token.span.line;
                return self.relex(start, line, scan_operand);
            }
            return Ok(token.clone());
        }

        self.skip()?;
        self.token_index = (self.token_index + 1) & RING_MASK;
        let token = self.scan_token(scan_operand)?;
        self.tokens[self.token_index] = token.clone();
        self.comment_marks[self.token_index] = self.comments.len();
        Ok(token)
    }

    /// Push the current token back, at most three times in a row
    pub fn unget(&mut self) {
        self.lookahead += 1;
        debug_assert!(self.lookahead < RING_SIZE, "lookahead buffer overflow");
        self.token_index = (self.token_index + RING_SIZE - 1) & RING_MASK;
    }

    /// Look at the next token without consuming it
    pub fn peek(&mut self, scan_operand: bool) -> CompileResult<Token> {
        let token = self.get(scan_operand)?;
        self.unget();
        Ok(token)
    }

    /// Look at the token after the next one
    pub fn peek_second(&mut self, scan_operand: bool) -> CompileResult<Token> {
        self.get(scan_operand)?;
        let token = self.get(false)?;
        self.unget();
        self.unget();
        Ok(token)
    }

    /// Peek in significant-newline mode.
    ///
    /// Returns [`TokenKind::Newline`] when a line break separates the current
    /// token from the next one.
    pub fn peek_on_same_line(&mut self, scan_operand: bool) -> CompileResult<Token> {
        let current_end = self.token().end_line;
        self.scan_newlines = true;
        let result = self.peek(scan_operand);
        self.scan_newlines = false;
        let token = result?;
        if token.kind != TokenKind::Newline && token.span.line > current_end && current_end > 0 {
            return Ok(Token {
                kind: TokenKind::Newline,
                span: Span::new(current_end, token.span.start, token.span.start),
                end_line: current_end,
                assign_op: None,
            });
        }
        Ok(token)
    }

    /// Consume the next token when it is the given punctuator
    pub fn match_punctuator(&mut self, p: Punctuator, scan_operand: bool) -> CompileResult<bool> {
        let token = self.get(scan_operand)?;
        if token.is_punctuator(p) {
            Ok(true)
        } else {
            self.unget();
            Ok(false)
        }
    }

    /// Consume the next token when it is the given keyword
    pub fn match_keyword(&mut self, k: Keyword, scan_operand: bool) -> CompileResult<bool> {
        let token = self.get(scan_operand)?;
        if token.is_keyword(k) {
            Ok(true)
        } else {
            self.unget();
            Ok(false)
        }
    }

    /// Save the complete lexer state for a later [`Lexer::rewind`]
    pub fn save(&self) -> LexerState {
        LexerState {
            cursor: self.cursor,
            line: self.line,
            tokens: self.tokens.clone(),
            comment_marks: self.comment_marks,
            token_index: self.token_index,
            lookahead: self.lookahead,
            scan_newlines: self.scan_newlines,
            comments: self.comments.len(),
            pending_from: self.pending_from,
            last_code_line: self.last_code_line,
            last_line: self.last_line,
        }
    }

    /// Restore a state captured with [`Lexer::save`]
    pub fn rewind(&mut self, state: LexerState) {
        self.cursor = state.cursor;
        self.line = state.line;
        self.tokens = state.tokens;
        self.comment_marks = state.comment_marks;
        self.token_index = state.token_index;
        self.lookahead = state.lookahead;
        self.scan_newlines = state.scan_newlines;
        self.comments.truncate(state.comments);
        self.pending_from = state.pending_from.min(self.comments.len());
        self.last_code_line = state.last_code_line;
        self.last_line = state.last_line;
    }

    /// Remove and return all comments collected so far
    pub fn take_comments(&mut self) -> Vec<Comment> {
        self.pending_from = 0;
        std::mem::take(&mut self.comments)
    }

    /// Tokenize the remaining input, treating every `/` as an operator
    /// unless it follows a token after which an operand is expected
    pub fn tokenize_all(&mut self) -> CompileResult<Vec<Token>> {
        let mut tokens = Vec::new();
        let mut operand = true;
        loop {
            let token = self.get(operand)?;
            if token.kind == TokenKind::EOF {
                break;
            }
            operand = expects_operand_after(&token.kind);
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn needs_relex(&self, token: &Token, scan_operand: bool) -> bool {
        match &token.kind {
            TokenKind::Punctuator(Punctuator::Slash) => scan_operand,
            TokenKind::Punctuator(Punctuator::Assign) => {
                scan_operand && token.assign_op == Some(Punctuator::Slash)
            }
            TokenKind::RegExp(_) => !scan_operand,
            _ => false,
        }
    }

    /// Scan the buffered token at `start` again in the other operand mode.
    ///
    /// Drops all tokens buffered after it along with the comments
    /// collected behind them.
    fn relex(&mut self, start: usize, line: u32, scan_operand: bool) -> CompileResult<Token> {
        self.lookahead = 0;
        self.cursor = start;
        self.line = line;
        self.comments.truncate(self.comment_marks[self.token_index]);
        self.pending_from = self.pending_from.min(self.comments.len());
        let token = self.scan_token(scan_operand)?;
        self.tokens[self.token_index] = token.clone();
        self.comment_marks[self.token_index] = self.comments.len();
        Ok(token)
    }

    fn scan_token(&mut self, scan_operand: bool) -> CompileResult<Token> {
        let line = self.line;
        let start = self.cursor;

        if self.is_at_end() {
            return Ok(Token {
                kind: TokenKind::EOF,
                span: Span::new(line, start, start),
                end_line: line,
                assign_op: None,
            });
        }

        let ch = self.advance();
        let mut assign_op = None;

        let kind = match ch {
            '\n' | '\r' | '\u{2028}' | '\u{2029}' => {
                // Only reached in significant-newline mode, skip() stops here
                if ch == '\r' && self.peek_char() == '\n' {
                    self.advance();
                }
                self.line += 1;
                return Ok(Token {
                    kind: TokenKind::Newline,
                    span: Span::new(line, start, self.cursor),
                    end_line: line,
                    assign_op: None,
                });
            }
            '(' => TokenKind::Punctuator(Punctuator::LParen),
            ')' => TokenKind::Punctuator(Punctuator::RParen),
            '{' => TokenKind::Punctuator(Punctuator::LBrace),
            '}' => TokenKind::Punctuator(Punctuator::RBrace),
            '[' => TokenKind::Punctuator(Punctuator::LBracket),
            ']' => TokenKind::Punctuator(Punctuator::RBracket),
            ';' => TokenKind::Punctuator(Punctuator::Semicolon),
            ',' => TokenKind::Punctuator(Punctuator::Comma),
            ':' => TokenKind::Punctuator(Punctuator::Colon),
            '?' => TokenKind::Punctuator(Punctuator::Question),
            '~' => TokenKind::Punctuator(Punctuator::Tilde),

            '.' => {
                if self.peek_char().is_ascii_digit() {
                    // Number with leading decimal: .5, .123, etc.
                    self.scan_number(ch, start)?
                } else {
                    TokenKind::Punctuator(Punctuator::Dot)
                }
            }

            '=' => {
                if self.match_char('=') {
                    if self.match_char('=') {
                        TokenKind::Punctuator(Punctuator::EqEqEq)
                    } else {
                        TokenKind::Punctuator(Punctuator::EqEq)
                    }
                } else {
                    TokenKind::Punctuator(Punctuator::Assign)
                }
            }

            '!' => {
                if self.match_char('=') {
                    if self.match_char('=') {
                        TokenKind::Punctuator(Punctuator::NotEqEq)
                    } else {
                        TokenKind::Punctuator(Punctuator::NotEq)
                    }
                } else {
                    TokenKind::Punctuator(Punctuator::Not)
                }
            }

            '+' => {
                if self.match_char('+') {
                    TokenKind::Punctuator(Punctuator::PlusPlus)
                } else {
                    self.operator_or_assign(Punctuator::Plus, &mut assign_op)
                }
            }

            '-' => {
                if self.match_char('-') {
                    TokenKind::Punctuator(Punctuator::MinusMinus)
                } else {
                    self.operator_or_assign(Punctuator::Minus, &mut assign_op)
                }
            }

            '*' => self.operator_or_assign(Punctuator::Star, &mut assign_op),
            '%' => self.operator_or_assign(Punctuator::Percent, &mut assign_op),
            '^' => self.operator_or_assign(Punctuator::Xor, &mut assign_op),

            '/' => {
                if scan_operand {
                    self.scan_regexp(start)?
                } else {
                    self.operator_or_assign(Punctuator::Slash, &mut assign_op)
                }
            }

            '&' => {
                if self.match_char('&') {
                    TokenKind::Punctuator(Punctuator::AndAnd)
                } else {
                    self.operator_or_assign(Punctuator::And, &mut assign_op)
                }
            }

            '|' => {
                if self.match_char('|') {
                    TokenKind::Punctuator(Punctuator::OrOr)
                } else {
                    self.operator_or_assign(Punctuator::Or, &mut assign_op)
                }
            }

            '<' => {
                if self.match_char('<') {
                    self.operator_or_assign(Punctuator::LtLt, &mut assign_op)
                } else if self.match_char('=') {
                    TokenKind::Punctuator(Punctuator::LtEq)
                } else {
                    TokenKind::Punctuator(Punctuator::Lt)
                }
            }

            '>' => {
                if self.match_char('>') {
                    if self.match_char('>') {
                        self.operator_or_assign(Punctuator::GtGtGt, &mut assign_op)
                    } else {
                        self.operator_or_assign(Punctuator::GtGt, &mut assign_op)
                    }
                } else if self.match_char('=') {
                    TokenKind::Punctuator(Punctuator::GtEq)
                } else {
                    TokenKind::Punctuator(Punctuator::Gt)
                }
            }

            '"' | '\'' => self.scan_string(ch)?,

            _ if ch.is_ascii_digit() => self.scan_number(ch, start)?,

            _ if is_id_start(ch) => self.scan_identifier(ch),

            _ => {
                return Err(lexical_error(
                    format!("Illegal token: '{}'", ch),
                    &self.file,
                    line,
                ))
            }
        };

        self.last_code_line = self.line;
        self.last_line = self.line;
        self.finish_pending_comments(line);

        Ok(Token {
            kind,
            span: Span::new(line, start, self.cursor),
            end_line: self.line,
            assign_op,
        })
    }

    fn operator_or_assign(&mut self, op: Punctuator, assign_op: &mut Option<Punctuator>) -> TokenKind {
        if self.match_char('=') {
            *assign_op = Some(op);
            TokenKind::Punctuator(Punctuator::Assign)
        } else {
            TokenKind::Punctuator(op)
        }
    }

    fn scan_string(&mut self, quote: char) -> CompileResult<TokenKind> {
        let start_line = self.line;
        let mut value = String::new();

        while !self.is_at_end() && self.peek_char() != quote {
            let ch = self.advance();
            if ch == '\\' {
                if self.is_at_end() {
                    break;
                }
                let escaped = self.advance();
                match escaped {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    'b' => value.push('\u{0008}'),
                    'f' => value.push('\u{000C}'),
                    'v' => value.push('\u{000B}'),
                    '0' if !self.peek_char().is_ascii_digit() => value.push('\0'),
                    'x' => {
                        let code = self.scan_hex_digits(2, start_line)?;
                        value.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                    }
                    'u' => {
                        let code = self.scan_hex_digits(4, start_line)?;
                        value.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                    }
                    // Line continuation: backslash followed by a line terminator
                    '\n' | '\u{2028}' | '\u{2029}' => {
                        self.line += 1;
                    }
                    '\r' => {
                        if self.peek_char() == '\n' {
                            self.advance();
                        }
                        self.line += 1;
                    }
                    _ => value.push(escaped),
                }
            } else if is_line_terminator(ch) {
                return Err(lexical_error(
                    "Unterminated string literal",
                    &self.file,
                    start_line,
                ));
            } else {
                value.push(ch);
            }
        }

        if self.is_at_end() {
            return Err(lexical_error(
                "Unterminated string literal",
                &self.file,
                start_line,
            ));
        }

        self.advance(); // Closing quote
        Ok(TokenKind::String(value))
    }

    fn scan_hex_digits(&mut self, count: usize, line: u32) -> CompileResult<u32> {
        let mut code = 0u32;
        for _ in 0..count {
            let digit = self.peek_char().to_digit(16).ok_or_else(|| {
                lexical_error("Invalid hexadecimal escape sequence", &self.file, line)
            })?;
            self.advance();
            code = code * 16 + digit;
        }
        Ok(code)
    }

    /// Scan a regular expression literal, the opening '/' is already consumed
    fn scan_regexp(&mut self, start: usize) -> CompileResult<TokenKind> {
        let start_line = self.line;
        let mut in_class = false; // Inside character class [...]

        loop {
            if self.is_at_end() || is_line_terminator(self.peek_char()) {
                return Err(lexical_error(
                    "Unterminated regular expression literal",
                    &self.file,
                    start_line,
                ));
            }

            let ch = self.advance();
            match ch {
                '\\' => {
                    if !self.is_at_end() && !is_line_terminator(self.peek_char()) {
                        self.advance();
                    }
                }
                '[' => in_class = true,
                ']' if in_class => in_class = false,
                '/' if !in_class => break,
                _ => {}
            }
        }

        // Flags
        while !self.is_at_end() && is_id_part(self.peek_char()) {
            self.advance();
        }

        Ok(TokenKind::RegExp(self.chars[start..self.cursor].iter().collect()))
    }

    fn scan_number(&mut self, first: char, start: usize) -> CompileResult<TokenKind> {
        let start_line = self.line;

        // Hexadecimal
        if first == '0' && (self.peek_char() == 'x' || self.peek_char() == 'X') {
            self.advance();
            let mut digits = String::new();
            while self.peek_char().is_ascii_hexdigit() {
                digits.push(self.advance());
            }
            if digits.is_empty() {
                return Err(lexical_error("Invalid hexadecimal literal", &self.file, start_line));
            }
            let value = digits
                .chars()
                .fold(0f64, |acc, d| acc * 16.0 + f64::from(d.to_digit(16).unwrap_or(0)));
            return Ok(TokenKind::Number(value));
        }

        // Legacy octal: 0 followed by octal digits only
        if first == '0' && self.peek_char().is_ascii_digit() {
            let save = self.cursor;
            let mut digits = String::new();
            while self.peek_char().is_ascii_digit() {
                digits.push(self.advance());
            }
            if digits.chars().all(|d| d < '8') && self.peek_char() != '.' {
                let value = digits
                    .chars()
                    .fold(0f64, |acc, d| acc * 8.0 + f64::from(d.to_digit(8).unwrap_or(0)));
                return Ok(TokenKind::Number(value));
            }
            self.cursor = save;
        }

        if first != '.' {
            while self.peek_char().is_ascii_digit() {
                self.advance();
            }
            if self.peek_char() == '.' {
                self.advance();
            }
        }
        while self.peek_char().is_ascii_digit() {
            self.advance();
        }

        // Exponent
        if self.peek_char() == 'e' || self.peek_char() == 'E' {
            let save = self.cursor;
            self.advance();
            if self.peek_char() == '+' || self.peek_char() == '-' {
                self.advance();
            }
            if self.peek_char().is_ascii_digit() {
                while self.peek_char().is_ascii_digit() {
                    self.advance();
                }
            } else {
                self.cursor = save;
            }
        }

        if is_id_start(self.peek_char()) {
            return Err(lexical_error(
                "Identifier starts immediately after numeric literal",
                &self.file,
                start_line,
            ));
        }

        let text: String = self.chars[start..self.cursor].iter().collect();
        let value = text.parse::<f64>().map_err(|_| {
            lexical_error(format!("Invalid number: {}", text), &self.file, start_line)
        })?;
        Ok(TokenKind::Number(value))
    }

    fn scan_identifier(&mut self, first: char) -> TokenKind {
        let mut ident = first.to_string();
        while !self.is_at_end() && is_id_part(self.peek_char()) {
            ident.push(self.advance());
        }

        match Keyword::lookup(&ident) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier(ident),
        }
    }

    /// Skip whitespace and comments, collecting comments into the side buffer
    fn skip(&mut self) -> CompileResult<()> {
        while !self.is_at_end() {
            match self.peek_char() {
                ' ' | '\t' | '\u{000B}' | '\u{000C}' | '\u{00A0}' | '\u{FEFF}' => {
                    self.advance();
                }
                '\n' | '\r' | '\u{2028}' | '\u{2029}' => {
                    if self.scan_newlines {
                        break;
                    }
                    let ch = self.advance();
                    if ch == '\r' && self.peek_char() == '\n' {
                        self.advance();
                    }
                    self.line += 1;
                }
                '/' if self.peek_next() == Some('/') => {
                    let start = self.cursor;
                    while !self.is_at_end() && !is_line_terminator(self.peek_char()) {
                        self.advance();
                    }
                    let text: String = self.chars[start..self.cursor].iter().collect();
                    self.push_comment(text, self.line, self.line);
                }
                '/' if self.peek_next() == Some('*') => {
                    let start = self.cursor;
                    let start_line = self.line;
                    self.advance(); // /
                    self.advance(); // *
                    let mut found_end = false;
                    while !self.is_at_end() {
                        if self.peek_char() == '*' && self.peek_next() == Some('/') {
                            self.advance();
                            self.advance();
                            found_end = true;
                            break;
                        }
                        let ch = self.advance();
                        if ch == '\n' || ch == '\u{2028}' || ch == '\u{2029}' {
                            self.line += 1;
                        } else if ch == '\r' {
                            if self.peek_char() == '\n' {
                                self.advance();
                            }
                            self.line += 1;
                        }
                    }
                    if !found_end {
                        return Err(lexical_error(
                            "Unterminated comment",
                            &self.file,
                            start_line,
                        ));
                    }
                    let text: String = self.chars[start..self.cursor].iter().collect();
                    self.push_comment(text, start_line, self.line);
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn push_comment(&mut self, text: String, line: u32, end_line: u32) {
        let context = if self.last_code_line > 0 && line == self.last_code_line {
            CommentContext::Inline
        } else if line > self.last_line + 1 {
            CommentContext::Section
        } else {
            CommentContext::Block
        };
        self.last_line = end_line;
        self.comments.push(Comment::new(text, context, line, end_line));
    }

    /// Comments followed by a blank line belong to no particular code
    fn finish_pending_comments(&mut self, token_line: u32) {
        for comment in self.comments.iter_mut().skip(self.pending_from) {
            if comment.context != CommentContext::Inline && token_line > comment.end_line + 1 {
                comment.context = CommentContext::Free;
            }
        }
        self.pending_from = self.comments.len();
    }

    fn is_at_end(&self) -> bool {
        self.cursor >= self.chars.len()
    }

    fn peek_char(&self) -> char {
        self.chars.get(self.cursor).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.cursor + 1).copied()
    }

    fn advance(&mut self) -> char {
        let ch = self.peek_char();
        self.cursor += 1;
        ch
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek_char() == expected && !self.is_at_end() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }
}

/// Whether an operand is expected after a token of this kind.
///
/// Used where no parser context is available to tell a division from the
/// start of a regular expression.
pub fn expects_operand_after(kind: &TokenKind) -> bool {
    match kind {
        TokenKind::Identifier(_)
        | TokenKind::Number(_)
        | TokenKind::String(_)
        | TokenKind::RegExp(_) => false,
        TokenKind::Keyword(k) => !matches!(
            k,
            Keyword::This | Keyword::True | Keyword::False | Keyword::Null
        ),
        TokenKind::Punctuator(p) => !matches!(
            p,
            Punctuator::RParen
                | Punctuator::RBracket
                | Punctuator::RBrace
                | Punctuator::PlusPlus
                | Punctuator::MinusMinus
        ),
        TokenKind::Newline | TokenKind::EOF => true,
    }
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn is_id_start(c: char) -> bool {
    c.is_alphabetic() || c == '$' || c == '_'
}

fn is_id_part(c: char) -> bool {
    c.is_alphanumeric() || c == '$' || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source, "test.js", 1)
            .tokenize_all()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_lexer_empty_source() {
        let mut lexer = Lexer::new("", "test.js", 1);
        assert_eq!(lexer.get(true).unwrap().kind, TokenKind::EOF);
    }

    #[test]
    fn test_lexer_peek_then_scan_characters() {
        let mut lexer = Lexer::new("0x1F\r\n.5e1 'a\\\nb'", "test.js", 1);
        assert_eq!(lexer.peek(true).unwrap().kind, TokenKind::Number(31.0));
        assert_eq!(lexer.get(true).unwrap().kind, TokenKind::Number(31.0));
        assert_eq!(lexer.peek(true).unwrap().kind, TokenKind::Number(5.0));
        let token = lexer.get(true).unwrap();
        assert_eq!(token.kind, TokenKind::Number(5.0));
        assert_eq!(token.span.line, 2);
        assert_eq!(lexer.get(true).unwrap().kind, TokenKind::String("ab".to_string()));
    }

    #[test]
    fn test_lexer_identifier_and_keywords() {
        assert_eq!(
            kinds("let foo in"),
            vec![
                TokenKind::Keyword(Keyword::Let),
                TokenKind::Identifier("foo".to_string()),
                TokenKind::Keyword(Keyword::In),
            ]
        );
    }

    #[test]
    fn test_lexer_numbers() {
        assert_eq!(
            kinds("123.45 0x1F .5 1e3 2.5E-2 010"),
            vec![
                TokenKind::Number(123.45),
                TokenKind::Number(31.0),
                TokenKind::Number(0.5),
                TokenKind::Number(1000.0),
                TokenKind::Number(0.025),
                TokenKind::Number(8.0),
            ]
        );
    }

    #[test]
    fn test_lexer_member_access_on_integer_keeps_dot() {
        assert_eq!(
            kinds("1..toString"),
            vec![
                TokenKind::Number(1.0),
                TokenKind::Punctuator(Punctuator::Dot),
                TokenKind::Identifier("toString".to_string()),
            ]
        );
    }

    #[test]
    fn test_lexer_string_escapes() {
        assert_eq!(
            kinds(r#"'a\nb' "q\"x" '\x41B'"#),
            vec![
                TokenKind::String("a\nb".to_string()),
                TokenKind::String("q\"x".to_string()),
                TokenKind::String("AB".to_string()),
            ]
        );
    }

    #[test]
    fn test_lexer_compound_assignment_subtype() {
        let mut lexer = Lexer::new("x >>>= 2", "test.js", 1);
        lexer.get(true).unwrap();
        let token = lexer.get(false).unwrap();
        assert!(token.is_punctuator(Punctuator::Assign));
        assert_eq!(token.assign_op, Some(Punctuator::GtGtGt));
    }

    #[test]
    fn test_lexer_regexp_in_operand_position() {
        let mut lexer = Lexer::new("/[/]x/gi", "test.js", 1);
        let token = lexer.get(true).unwrap();
        assert_eq!(token.kind, TokenKind::RegExp("/[/]x/gi".to_string()));
    }

    #[test]
    fn test_lexer_division_in_operator_position() {
        assert_eq!(
            kinds("a / b"),
            vec![
                TokenKind::Identifier("a".to_string()),
                TokenKind::Punctuator(Punctuator::Slash),
                TokenKind::Identifier("b".to_string()),
            ]
        );
    }

    #[test]
    fn test_lexer_relex_buffered_slash_as_regexp() {
        let mut lexer = Lexer::new("/ab/.test(x)", "test.js", 1);
        let peeked = lexer.peek(false).unwrap();
        assert!(peeked.is_punctuator(Punctuator::Slash));
        let token = lexer.get(true).unwrap();
        assert_eq!(token.kind, TokenKind::RegExp("/ab/".to_string()));
        assert!(lexer.get(false).unwrap().is_punctuator(Punctuator::Dot));
    }

    #[test]
    fn test_lexer_lookahead_and_unget() {
        let mut lexer = Lexer::new("a b c d", "test.js", 1);
        assert_eq!(lexer.get(true).unwrap().kind, TokenKind::Identifier("a".into()));
        assert_eq!(lexer.get(true).unwrap().kind, TokenKind::Identifier("b".into()));
        assert_eq!(lexer.get(true).unwrap().kind, TokenKind::Identifier("c".into()));
        lexer.unget();
        lexer.unget();
        lexer.unget();
        assert_eq!(lexer.get(true).unwrap().kind, TokenKind::Identifier("a".into()));
        assert_eq!(
            lexer.peek_second(true).unwrap().kind,
            TokenKind::Identifier("c".into())
        );
    }

    #[test]
    fn test_lexer_newline_mode() {
        let mut lexer = Lexer::new("a\nb", "test.js", 1);
        lexer.get(true).unwrap();
        assert_eq!(lexer.peek_on_same_line(false).unwrap().kind, TokenKind::Newline);
        assert_eq!(lexer.get(false).unwrap().kind, TokenKind::Identifier("b".into()));
    }

    #[test]
    fn test_lexer_newline_detected_for_buffered_token() {
        let mut lexer = Lexer::new("a\n++b", "test.js", 1);
        lexer.get(true).unwrap();
        lexer.peek(false).unwrap();
        assert_eq!(lexer.peek_on_same_line(false).unwrap().kind, TokenKind::Newline);
    }

    #[test]
    fn test_lexer_save_and_rewind() {
        let mut lexer = Lexer::new("a /* c */ b c", "test.js", 1);
        lexer.get(true).unwrap();
        let state = lexer.save();
        lexer.get(true).unwrap();
        lexer.get(true).unwrap();
        lexer.rewind(state);
        assert_eq!(lexer.get(true).unwrap().kind, TokenKind::Identifier("b".into()));
        assert_eq!(lexer.take_comments().len(), 1);
    }

    #[test]
    fn test_lexer_comment_contexts() {
        let source = "a;\n\n// section\nb; // inline\n/* block */\nc;\n/* free */\n\nd;";
        let mut lexer = Lexer::new(source, "test.js", 1);
        lexer.tokenize_all().unwrap();
        let contexts: Vec<CommentContext> =
            lexer.take_comments().into_iter().map(|c| c.context).collect();
        assert_eq!(
            contexts,
            vec![
                CommentContext::Section,
                CommentContext::Inline,
                CommentContext::Block,
                CommentContext::Free,
            ]
        );
    }

    #[test]
    fn test_lexer_tracks_lines() {
        let mut lexer = Lexer::new("a\n/* x\ny */\nb", "test.js", 5);
        assert_eq!(lexer.get(true).unwrap().span.line, 5);
        assert_eq!(lexer.get(true).unwrap().span.line, 8);
    }

    #[test]
    fn test_lexer_unterminated_string() {
        let err = Lexer::new("'abc", "bad.js", 1).tokenize_all().unwrap_err();
        assert_eq!(err.kind, core_types::ErrorKind::Lexical);
        assert_eq!(err.file, "bad.js");
    }

    #[test]
    fn test_lexer_unterminated_comment_reports_start_line() {
        let err = Lexer::new("a\n/* open", "bad.js", 1).tokenize_all().unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_lexer_unterminated_regexp() {
        let mut lexer = Lexer::new("/abc\n/", "bad.js", 1);
        assert!(lexer.get(true).is_err());
    }

    #[test]
    fn test_lexer_illegal_character() {
        let err = Lexer::new("a # b", "bad.js", 3).tokenize_all().unwrap_err();
        assert!(err.message.contains("Illegal"));
        assert_eq!(err.line, 3);
    }
}
