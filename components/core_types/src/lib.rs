//! Shared source positions and error types for the script compiler.
//!
//! This crate provides the foundational types used by every compiler stage:
//! source spans and the fatal error taxonomy.
//!
//! # Overview
//!
//! - [`Span`] - Line and byte range of a token or node
//! - [`CompileError`] - Fatal error carrying file and line
//! - [`ErrorKind`] - Lexical, syntax or optimization failure
//!
//! # Examples
//!
//! ```
//! use core_types::{CompileError, ErrorKind, Span};
//!
//! let span = Span::new(3, 10, 14);
//! let error = CompileError::new(ErrorKind::Syntax, "Missing ; after statement", "app.js", span.line);
//!
//! assert_eq!(error.line, 3);
//! assert_eq!(error.to_string(), "SyntaxError in app.js:3: Missing ; after statement");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod source;

pub use error::{CompileError, CompileResult, ErrorKind, UnknownOption};
pub use source::Span;
