//! Script Parser Component
//!
//! Provides the tokenizer, the AST arena, the tree-building seam, the
//! two-phase parser and the scope scanner of the script compiler.
//!
//! # Overview
//!
//! - [`Lexer`] - Tokenizes source text with lookahead and comment capture
//! - [`Parser`] - Recursive descent parser driving a [`TreeBuilder`]
//! - [`Ast`] - Arena of nodes addressed by [`NodeId`]
//! - [`AstBuilder`] - The tree builder producing an [`Ast`]
//! - [`scan`] - Attaches [`Scope`] records to function and script bodies
//!
//! # Example
//!
//! ```
//! use parser::{parse, scan_tree, NodeKind};
//!
//! let mut ast = parse("var x = 42; use(x);", "app.js").unwrap();
//! assert_eq!(ast.kind(ast.root()), NodeKind::Script);
//!
//! let scope = scan_tree(&mut ast);
//! assert!(scope.declared.contains("x"));
//! assert!(scope.shared.contains_key("use"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod builder;
pub mod comment;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod scope;

pub use ast::{Ast, FunctionForm, Node, NodeFlags, NodeId, NodeKind, Rel, Value};
pub use builder::{Accessor, AstBuilder, DeclTarget, FunctionParts, TargetShape, TreeBuilder};
pub use comment::{Comment, CommentContext, CommentVariant};
pub use lexer::{is_reserved_word, Keyword, Lexer, LexerState, Punctuator, Token, TokenKind};
pub use parser::{parse, parse_expression, DeclarationContext, Parser};
pub use scope::{binding_identifiers, dotted_name, scan, scan_tree, Scope};
