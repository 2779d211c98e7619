//! Comments captured by the lexer outside the token stream

/// Syntactic form of a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentVariant {
    /// `// ...`
    SingleLine,
    /// `/* ... */`
    MultiLine,
    /// `/** ... */`
    Doc,
    /// `/*! ... */`, kept by tools that strip comments
    Protected,
}

/// Placement of a comment relative to the surrounding code.
///
/// Derived from the number of blank lines between the comment and the code
/// before and after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentContext {
    /// Starts on the same line as the preceding code
    Inline,
    /// Directly above the following code, no blank line before it
    Block,
    /// Separated from the preceding code by a blank line, heading the code below
    Section,
    /// Blank lines after it, not attached to any particular code
    Free,
}

/// A comment with its classification and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Raw comment text including delimiters
    pub text: String,
    /// Syntactic form
    pub variant: CommentVariant,
    /// Placement relative to code
    pub context: CommentContext,
    /// Line the comment starts on
    pub line: u32,
    /// Line the comment ends on
    pub end_line: u32,
}

impl Comment {
    /// Create a comment, deriving the variant from its text
    pub fn new(text: String, context: CommentContext, line: u32, end_line: u32) -> Self {
        let variant = if text.starts_with("//") {
            CommentVariant::SingleLine
        } else if text.starts_with("/*!") {
            CommentVariant::Protected
        } else if text.starts_with("/**") && text != "/**/" {
            CommentVariant::Doc
        } else {
            CommentVariant::MultiLine
        };

        Self {
            text,
            variant,
            context,
            line,
            end_line,
        }
    }

    /// Comment body without delimiters and surrounding whitespace
    pub fn body(&self) -> &str {
        let text = self.text.as_str();
        let inner = match self.variant {
            CommentVariant::SingleLine => text.strip_prefix("//").unwrap_or(text),
            CommentVariant::Doc => text
                .strip_prefix("/**")
                .and_then(|t| t.strip_suffix("*/"))
                .unwrap_or(text),
            CommentVariant::Protected => text
                .strip_prefix("/*!")
                .and_then(|t| t.strip_suffix("*/"))
                .unwrap_or(text),
            CommentVariant::MultiLine => text
                .strip_prefix("/*")
                .and_then(|t| t.strip_suffix("*/"))
                .unwrap_or(text),
        };
        inner.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_from_text() {
        let c = |t: &str| Comment::new(t.to_string(), CommentContext::Block, 1, 1).variant;
        assert_eq!(c("// hi"), CommentVariant::SingleLine);
        assert_eq!(c("/* hi */"), CommentVariant::MultiLine);
        assert_eq!(c("/** hi */"), CommentVariant::Doc);
        assert_eq!(c("/*! hi */"), CommentVariant::Protected);
        assert_eq!(c("/**/"), CommentVariant::MultiLine);
    }

    #[test]
    fn test_body_strips_delimiters() {
        let comment = Comment::new("/** Returns x */".to_string(), CommentContext::Block, 1, 1);
        assert_eq!(comment.body(), "Returns x");
    }
}
