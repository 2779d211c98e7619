//! Operator precedence table
//!
//! Higher numbers bind tighter. The code generator wraps a child in
//! parentheses when its precedence is below what its position requires, and
//! the block reducer uses the same table to prove parentheses unnecessary.

use parser::NodeKind;

/// Comma expression
pub const COMMA: u8 = 1;
/// Assignment, `yield`, let expressions and other right-open forms
pub const ASSIGNMENT: u8 = 2;
/// Conditional operator
pub const CONDITIONAL: u8 = 3;
/// Prefix unary operators and prefix increment/decrement
pub const UNARY: u8 = 14;
/// Postfix increment/decrement
pub const POSTFIX: u8 = 15;
/// `new X` without arguments
pub const NEW: u8 = 16;
/// Member access, calls and `new X()`
pub const MEMBER: u8 = 17;
/// Literals, identifiers and other self-delimiting expressions
pub const PRIMARY: u8 = 18;

/// Precedence of an expression node kind
pub fn precedence(kind: NodeKind) -> u8 {
    match kind {
        NodeKind::Comma => COMMA,
        NodeKind::Assign | NodeKind::Yield | NodeKind::LetBlock => ASSIGNMENT,
        NodeKind::Hook => CONDITIONAL,
        NodeKind::Or => 4,
        NodeKind::And => 5,
        NodeKind::BitwiseOr => 6,
        NodeKind::BitwiseXor => 7,
        NodeKind::BitwiseAnd => 8,
        NodeKind::Eq | NodeKind::Ne | NodeKind::StrictEq | NodeKind::StrictNe => 9,
        NodeKind::Lt
        | NodeKind::Le
        | NodeKind::Gt
        | NodeKind::Ge
        | NodeKind::In
        | NodeKind::Instanceof => 10,
        NodeKind::Lsh | NodeKind::Rsh | NodeKind::Ursh => 11,
        NodeKind::Plus | NodeKind::Minus => 12,
        NodeKind::Mul | NodeKind::Div | NodeKind::Mod => 13,
        NodeKind::Not
        | NodeKind::BitwiseNot
        | NodeKind::UnaryPlus
        | NodeKind::UnaryMinus
        | NodeKind::Typeof
        | NodeKind::Void
        | NodeKind::Delete => UNARY,
        NodeKind::Increment | NodeKind::Decrement => UNARY,
        NodeKind::New => NEW,
        NodeKind::Dot | NodeKind::Index | NodeKind::Call | NodeKind::NewWithArgs => MEMBER,
        _ => PRIMARY,
    }
}

/// Minimum precedence of the operands of a binary operator, left and right.
/// Binary operators are left-associative, so the right operand must bind
/// strictly tighter.
pub fn binary_operands(kind: NodeKind) -> (u8, u8) {
    let own = precedence(kind);
    (own, own + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(precedence(NodeKind::Mul) > precedence(NodeKind::Plus));
        assert!(precedence(NodeKind::Plus) > precedence(NodeKind::Lt));
        assert!(precedence(NodeKind::And) > precedence(NodeKind::Or));
        assert!(precedence(NodeKind::Or) > precedence(NodeKind::Hook));
        assert!(precedence(NodeKind::Hook) > precedence(NodeKind::Assign));
        assert!(precedence(NodeKind::Assign) > precedence(NodeKind::Comma));
        assert!(precedence(NodeKind::Call) > precedence(NodeKind::New));
        assert_eq!(precedence(NodeKind::Identifier), PRIMARY);
    }

    #[test]
    fn test_binary_operands() {
        assert_eq!(binary_operands(NodeKind::Minus), (12, 13));
    }
}
