//! Parser error types and helpers

use core_types::{CompileError, ErrorKind};

/// Create a lexical error at a given line
pub fn lexical_error(message: impl Into<String>, file: &str, line: u32) -> CompileError {
    CompileError::new(ErrorKind::Lexical, message, file, line)
}

/// Create a syntax error at a given line
pub fn syntax_error(message: impl Into<String>, file: &str, line: u32) -> CompileError {
    CompileError::new(ErrorKind::Syntax, message, file, line)
}

/// Create an unexpected token error
pub fn unexpected_token(expected: &str, got: &str, file: &str, line: u32) -> CompileError {
    syntax_error(format!("Expected {}, got {}", expected, got), file, line)
}

/// Create an unexpected end of input error
pub fn unexpected_eof(file: &str, line: u32) -> CompileError {
    syntax_error("Unexpected end of input", file, line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error() {
        let err = syntax_error("test", "a.js", 4);
        assert!(matches!(err.kind, ErrorKind::Syntax));
        assert_eq!(err.line, 4);
    }

    #[test]
    fn test_unexpected_token() {
        let err = unexpected_token("identifier", "number", "a.js", 1);
        assert!(err.message.contains("Expected"));
    }

    #[test]
    fn test_lexical_error_kind() {
        let err = lexical_error("Unterminated string literal", "b.js", 9);
        assert_eq!(err.kind, ErrorKind::Lexical);
        assert_eq!(err.file, "b.js");
    }
}
