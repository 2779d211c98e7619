//! Unit tests for CompileError and ErrorKind

use core_types::{CompileError, CompileResult, ErrorKind};

#[cfg(test)]
mod error_kind_tests {
    use super::*;

    #[test]
    fn test_error_kind_variants() {
        assert!(matches!(ErrorKind::Lexical, ErrorKind::Lexical));
        assert!(matches!(ErrorKind::Syntax, ErrorKind::Syntax));
        assert!(matches!(ErrorKind::Optimization, ErrorKind::Optimization));
    }

    #[test]
    fn test_error_kind_copy() {
        let kind1 = ErrorKind::Syntax;
        let kind2 = kind1;
        assert_eq!(kind1, kind2);
    }
}

#[cfg(test)]
mod compile_error_tests {
    use super::*;

    #[test]
    fn test_compile_error_fields() {
        let error = CompileError::new(ErrorKind::Syntax, "Invalid label", "main.js", 12);

        assert_eq!(error.kind, ErrorKind::Syntax);
        assert_eq!(error.message, "Invalid label");
        assert_eq!(error.file, "main.js");
        assert_eq!(error.line, 12);
    }

    #[test]
    fn test_compile_error_display_names_file_and_line() {
        let error = CompileError::new(ErrorKind::Lexical, "Illegal token", "lib/a.js", 3);
        assert_eq!(error.to_string(), "LexicalError in lib/a.js:3: Illegal token");
    }

    #[test]
    fn test_fatal_kinds() {
        assert!(CompileError::new(ErrorKind::Lexical, "", "", 0).is_fatal());
        assert!(CompileError::new(ErrorKind::Syntax, "", "", 0).is_fatal());
        assert!(!CompileError::new(ErrorKind::Optimization, "", "", 0).is_fatal());
    }

    #[test]
    fn test_compile_error_is_std_error() {
        fn takes_error(_: &dyn std::error::Error) {}
        let error = CompileError::new(ErrorKind::Syntax, "x", "y", 1);
        takes_error(&error);
    }

    #[test]
    fn test_compile_result_question_mark() {
        fn inner() -> CompileResult<u32> {
            Err(CompileError::new(ErrorKind::Syntax, "boom", "f.js", 2))
        }
        fn outer() -> CompileResult<u32> {
            let value = inner()?;
            Ok(value + 1)
        }
        assert_eq!(outer().unwrap_err().message, "boom");
    }
}
