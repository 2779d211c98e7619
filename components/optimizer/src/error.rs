//! Optimizer error helpers

use core_types::{CompileError, ErrorKind};
use parser::{Ast, NodeId};

/// Create an optimization error at a given line
pub fn optimization_error(message: impl Into<String>, file: &str, line: u32) -> CompileError {
    CompileError::new(ErrorKind::Optimization, message, file, line)
}

/// Create an optimization error pointing at a node
pub fn node_error(ast: &Ast, id: NodeId, message: impl Into<String>) -> CompileError {
    optimization_error(message, &ast.file, ast.node(id).span.line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimization_error_is_not_fatal() {
        let err = optimization_error("Use of eval", "a.js", 3);
        assert_eq!(err.kind, ErrorKind::Optimization);
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "OptimizationError in a.js:3: Use of eval");
    }
}
