//! Unit tests for Span

use core_types::Span;

#[cfg(test)]
mod span_tests {
    use super::*;

    #[test]
    fn test_span_creation() {
        let span = Span::new(10, 5, 150);

        assert_eq!(span.line, 10);
        assert_eq!(span.start, 5);
        assert_eq!(span.end, 150);
    }

    #[test]
    fn test_span_default_is_empty() {
        let span = Span::default();
        assert!(span.is_empty());
        assert_eq!(span.line, 0);
    }

    #[test]
    fn test_span_len_never_underflows() {
        let span = Span::new(1, 9, 3);
        assert_eq!(span.len(), 0);
    }

    #[test]
    fn test_span_to_covers_both() {
        let first = Span::new(2, 10, 14);
        let second = Span::new(4, 30, 41);
        let joined = first.to(second);

        assert_eq!(joined, Span::new(2, 10, 41));
    }

    #[test]
    fn test_span_copy_and_eq() {
        let a = Span::new(1, 0, 3);
        let b = a;
        assert_eq!(a, b);
    }
}
