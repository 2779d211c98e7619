//! Compiler error types.
//!
//! Every stage reports fatal problems as a [`CompileError`]: the kind of
//! failure, a human-readable message, and the file and line it refers to.

use std::fmt;
use thiserror::Error;

/// The kind of compiler error.
///
/// Lexical and syntax errors abort the compilation of a unit. Optimization
/// errors abort only the pass that raised them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unterminated literal or comment, illegal character
    Lexical,
    /// Grammar violation, invalid destructuring target, misplaced break/continue
    Syntax,
    /// A pass met a construct it cannot transform safely
    Optimization,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Lexical => "LexicalError",
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Optimization => "OptimizationError",
        };
        f.write_str(name)
    }
}

/// A compiler error with file and line information.
///
/// # Examples
///
/// ```
/// use core_types::{CompileError, ErrorKind};
///
/// let error = CompileError::new(ErrorKind::Lexical, "Unterminated string literal", "a.js", 7);
///
/// assert!(error.is_fatal());
/// assert_eq!(error.file, "a.js");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} in {file}:{line}: {message}")]
pub struct CompileError {
    /// The type of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
    /// File id of the unit being compiled
    pub file: String,
    /// Line the error refers to (1-based)
    pub line: u32,
}

impl CompileError {
    /// Create a new error
    pub fn new(
        kind: ErrorKind,
        message: impl Into<String>,
        file: impl Into<String>,
        line: u32,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            file: file.into(),
            line,
        }
    }

    /// Whether the error aborts the whole unit rather than a single pass
    pub fn is_fatal(&self) -> bool {
        !matches!(self.kind, ErrorKind::Optimization)
    }
}

/// Result type for compiler operations
pub type CompileResult<T> = Result<T, CompileError>;

/// An option name that is not recognized when parsing a flag list
/// such as `"declarations,blocks"`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown option: {0}")]
pub struct UnknownOption(pub String);
