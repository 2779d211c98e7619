//! Abstract Syntax Tree arena
//!
//! Nodes live in an [`Ast`] arena and refer to each other through [`NodeId`]
//! handles. Every attached node has exactly one parent and appears exactly
//! once among that parent's children. Detached nodes stay in the arena but
//! are unreachable from the root.
//!
//! # Tree shapes
//!
//! | kind | children |
//! |---|---|
//! | `Script`, `Block` | statements |
//! | `Semicolon` | `expression` (absent for the empty statement) |
//! | `If` | `condition`, `thenPart`, `elsePart`? |
//! | `Switch` | `discriminant`, then `Case`/`Default` clauses |
//! | `Case` / `Default` | `label` (case only), `statements` (a `Block`) |
//! | `For` | `setup`?, `condition`?, `update`?, `body` |
//! | `ForIn` | `iterator`, `object`, `body` (no body inside comprehensions) |
//! | `While` | `condition`, `body` |
//! | `Do` | `body`, `condition` |
//! | `Try` | `tryBlock`, `Catch`*, `finallyBlock`? |
//! | `Catch` | `exception`, `guard`?, `block` |
//! | `Throw` | `exception` |
//! | `Return` | `value`? |
//! | `Break`, `Continue` | none, label in the text value |
//! | `Label` | `statement`, label in the text value |
//! | `Var`, `Const`, `Let` | `Declaration`s |
//! | `Declaration` | `names`? (destructuring), `initializer`? |
//! | `LetBlock` | `variables`, then `block` or `expression` |
//! | `Function` | `params` (a `List`), `body` (a `Script`) |
//! | `With` | `object`, `body` |
//! | `Dot` | object, `Identifier` |
//! | `Call`, `NewWithArgs` | callee, `List` of arguments |
//! | `PropertyInit` | key, value |
//! | `ArrayComp`, `Generator` | `expression`, `tail` |
//! | `CompTail` | `ForIn`s, `guard`? |
//!
//! Operators keep their operands as positional children.

use crate::comment::Comment;
use crate::scope::Scope;
use bitflags::bitflags;
use core_types::Span;

/// Handle of a node in an [`Ast`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Arena index of the node
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    // Statements
    /// Top level or function body
    Script,
    /// `{ ... }`
    Block,
    /// Expression statement, or the empty statement without expression
    Semicolon,
    /// `if`
    If,
    /// `switch`
    Switch,
    /// `case` clause
    Case,
    /// `default` clause
    Default,
    /// Classic `for`
    For,
    /// `for-in` and `for each-in`
    ForIn,
    /// `while`
    While,
    /// `do-while`
    Do,
    /// `try`
    Try,
    /// `catch` clause
    Catch,
    /// `throw`
    Throw,
    /// `return`
    Return,
    /// `break`
    Break,
    /// `continue`
    Continue,
    /// Labeled statement
    Label,
    /// `var` declaration
    Var,
    /// `const` declaration
    Const,
    /// `let` declaration
    Let,
    /// `let (...) body` block or expression
    LetBlock,
    /// Single declarator
    Declaration,
    /// Function declaration, expression or accessor
    Function,
    /// `with`
    With,
    /// `debugger`
    Debugger,

    // Primary expressions
    /// Identifier reference or name
    Identifier,
    /// Number literal
    Number,
    /// String literal
    String,
    /// Regular expression literal
    RegExp,
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,
    /// `this`
    This,

    // Operators
    /// Plain or compound assignment
    Assign,
    /// Conditional `?:`
    Hook,
    /// `||`
    Or,
    /// `&&`
    And,
    /// `|`
    BitwiseOr,
    /// `^`
    BitwiseXor,
    /// `&`
    BitwiseAnd,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `===`
    StrictEq,
    /// `!==`
    StrictNe,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `>`
    Gt,
    /// `in`
    In,
    /// `instanceof`
    Instanceof,
    /// `<<`
    Lsh,
    /// `>>`
    Rsh,
    /// `>>>`
    Ursh,
    /// Binary `+`
    Plus,
    /// Binary `-`
    Minus,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `!`
    Not,
    /// `~`
    BitwiseNot,
    /// Unary `+`
    UnaryPlus,
    /// Unary `-`
    UnaryMinus,
    /// `typeof`
    Typeof,
    /// `void`
    Void,
    /// `delete`
    Delete,
    /// `++`
    Increment,
    /// `--`
    Decrement,

    // Member access and calls
    /// `a.b`
    Dot,
    /// `a[b]`
    Index,
    /// `f(...)`
    Call,
    /// `new X` without argument list
    New,
    /// `new X(...)`
    NewWithArgs,
    /// Argument or parameter list
    List,

    // Composite literals
    /// Array literal or pattern
    ArrayInit,
    /// Object literal or pattern
    ObjectInit,
    /// `key: value` entry of an object literal
    PropertyInit,
    /// Comma expression
    Comma,
    /// Array comprehension
    ArrayComp,
    /// Generator expression
    Generator,
    /// `for ... in ... if ...` tail of a comprehension
    CompTail,
    /// `yield`
    Yield,
    /// Elided array slot
    Hole,
}

impl NodeKind {
    /// Whether the kind is `var`, `const` or `let`
    pub fn is_declaration_list(self) -> bool {
        matches!(self, NodeKind::Var | NodeKind::Const | NodeKind::Let)
    }

    /// Whether the children of this kind are plain statements
    pub fn is_statement_list(self) -> bool {
        matches!(self, NodeKind::Script | NodeKind::Block)
    }

    /// Whether the kind is a literal constant
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            NodeKind::Number
                | NodeKind::String
                | NodeKind::RegExp
                | NodeKind::True
                | NodeKind::False
                | NodeKind::Null
        )
    }

    /// Whether the kind is a binary operator with two positional operands
    pub fn is_binary(self) -> bool {
        matches!(
            self,
            NodeKind::Or
                | NodeKind::And
                | NodeKind::BitwiseOr
                | NodeKind::BitwiseXor
                | NodeKind::BitwiseAnd
                | NodeKind::Eq
                | NodeKind::Ne
                | NodeKind::StrictEq
                | NodeKind::StrictNe
                | NodeKind::Lt
                | NodeKind::Le
                | NodeKind::Ge
                | NodeKind::Gt
                | NodeKind::In
                | NodeKind::Instanceof
                | NodeKind::Lsh
                | NodeKind::Rsh
                | NodeKind::Ursh
                | NodeKind::Plus
                | NodeKind::Minus
                | NodeKind::Mul
                | NodeKind::Div
                | NodeKind::Mod
        )
    }

    /// Whether the kind is a prefix unary operator
    pub fn is_unary(self) -> bool {
        matches!(
            self,
            NodeKind::Not
                | NodeKind::BitwiseNot
                | NodeKind::UnaryPlus
                | NodeKind::UnaryMinus
                | NodeKind::Typeof
                | NodeKind::Void
                | NodeKind::Delete
        )
    }

    /// Source text of an operator kind
    pub fn operator(self) -> Option<&'static str> {
        let text = match self {
            NodeKind::Assign => "=",
            NodeKind::Or => "||",
            NodeKind::And => "&&",
            NodeKind::BitwiseOr => "|",
            NodeKind::BitwiseXor => "^",
            NodeKind::BitwiseAnd => "&",
            NodeKind::Eq => "==",
            NodeKind::Ne => "!=",
            NodeKind::StrictEq => "===",
            NodeKind::StrictNe => "!==",
            NodeKind::Lt => "<",
            NodeKind::Le => "<=",
            NodeKind::Ge => ">=",
            NodeKind::Gt => ">",
            NodeKind::In => "in",
            NodeKind::Instanceof => "instanceof",
            NodeKind::Lsh => "<<",
            NodeKind::Rsh => ">>",
            NodeKind::Ursh => ">>>",
            NodeKind::Plus | NodeKind::UnaryPlus => "+",
            NodeKind::Minus | NodeKind::UnaryMinus => "-",
            NodeKind::Mul => "*",
            NodeKind::Div => "/",
            NodeKind::Mod => "%",
            NodeKind::Not => "!",
            NodeKind::BitwiseNot => "~",
            NodeKind::Typeof => "typeof",
            NodeKind::Void => "void",
            NodeKind::Delete => "delete",
            NodeKind::Increment => "++",
            NodeKind::Decrement => "--",
            _ => return None,
        };
        Some(text)
    }
}

/// Relation under which a child is addressable from its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rel {
    /// Loop or `if` condition
    Condition,
    /// `if` consequent
    ThenPart,
    /// `if` alternate
    ElsePart,
    /// Loop, `with` or function body
    Body,
    /// `for` initializer
    Setup,
    /// `for` update
    Update,
    /// `for-in` target
    Iterator,
    /// `for-in` and `with` object
    Object,
    /// Declarator initializer
    Initializer,
    /// Function parameters
    Params,
    /// Expression of a statement, comprehension or let expression
    Expression,
    /// `switch` discriminant
    Discriminant,
    /// `case` label
    Label,
    /// Statements of a clause
    Statements,
    /// `try` block
    TryBlock,
    /// `finally` block
    FinallyBlock,
    /// `catch` variable or `throw` value
    Exception,
    /// `catch` or comprehension guard
    Guard,
    /// Block of a `catch` or let block
    Block,
    /// Comprehension tail
    Tail,
    /// Destructuring pattern of a declarator
    Names,
    /// `return` value
    Value,
    /// Statement of a label
    Statement,
    /// Declarations of a let block
    Variables,
}

/// Literal payload of a node
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No payload
    #[default]
    None,
    /// Identifier name, string contents, regexp source or label
    Text(String),
    /// Number value
    Number(f64),
}

/// How a function was introduced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionForm {
    /// `function f() {}` at statement level of a body
    Declared,
    /// Function in expression position
    Expressed,
    /// Function declaration nested inside a block
    Statement,
}

bitflags! {
    /// Boolean node attributes
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u8 {
        /// Written with explicit parentheses
        const PARENTHESIZED = 1 << 0;
        /// `x++` rather than `++x`
        const POSTFIX = 1 << 1;
        /// Function body is a bare expression
        const EXPRESSION_CLOSURE = 1 << 2;
        /// `for each`
        const EACH = 1 << 3;
        /// Property getter
        const GETTER = 1 << 4;
        /// Property setter
        const SETTER = 1 << 5;
    }
}

/// A node in the arena
#[derive(Debug, Clone)]
pub struct Node {
    /// Node kind
    pub kind: NodeKind,
    /// Relation to the parent
    pub rel: Option<Rel>,
    /// Parent handle, `None` for the root and detached nodes
    pub parent: Option<NodeId>,
    /// Ordered children
    pub children: Vec<NodeId>,
    /// Literal payload
    pub value: Value,
    /// Operator of a compound assignment
    pub assign_op: Option<NodeKind>,
    /// Function form, set on `Function` nodes
    pub form: Option<FunctionForm>,
    /// Boolean attributes
    pub flags: NodeFlags,
    /// Source range
    pub span: Span,
    /// Comments attached in front of the node
    pub comments: Vec<Comment>,
    /// Variable analysis of the body owned by this node
    pub scope: Option<Scope>,
}

impl Node {
    fn new(kind: NodeKind, span: Span) -> Self {
        Self {
            kind,
            rel: None,
            parent: None,
            children: Vec::new(),
            value: Value::None,
            assign_op: None,
            form: None,
            flags: NodeFlags::empty(),
            span,
            comments: Vec::new(),
            scope: None,
        }
    }
}

/// Arena holding the nodes of one compilation unit
#[derive(Debug, Clone, Default)]
pub struct Ast {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    /// File id the tree was parsed from
    pub file: String,
}

impl Ast {
    /// Create an empty arena
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            file: file.into(),
        }
    }

    /// Allocate a detached node
    pub fn add(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(kind, span));
        id
    }

    /// Allocate a detached node carrying a text value
    pub fn add_text(&mut self, kind: NodeKind, text: impl Into<String>, span: Span) -> NodeId {
        let id = self.add(kind, span);
        self.nodes[id.index()].value = Value::Text(text.into());
        id
    }

    /// Allocate a detached number literal
    pub fn add_number(&mut self, value: f64, span: Span) -> NodeId {
        let id = self.add(NodeKind::Number, span);
        self.nodes[id.index()].value = Value::Number(value);
        id
    }

    /// Root node, the first allocated node until a root is set
    pub fn root(&self) -> NodeId {
        self.root.unwrap_or(NodeId(0))
    }

    /// Set the root node
    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// Number of allocated nodes, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node was allocated
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node data
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Mutable node data
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Kind of a node
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.index()].kind
    }

    /// Change the kind of a node in place
    pub fn set_kind(&mut self, id: NodeId, kind: NodeKind) {
        self.nodes[id.index()].kind = kind;
    }

    /// Children of a node
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// Child at position `index`
    pub fn nth(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.nodes[id.index()].children.get(index).copied()
    }

    /// Child addressed by a relation
    pub fn child(&self, id: NodeId, rel: Rel) -> Option<NodeId> {
        self.nodes[id.index()]
            .children
            .iter()
            .copied()
            .find(|c| self.nodes[c.index()].rel == Some(rel))
    }

    /// Relation of a node to its parent
    pub fn rel(&self, id: NodeId) -> Option<Rel> {
        self.nodes[id.index()].rel
    }

    /// Set the relation of a node
    pub fn set_rel(&mut self, id: NodeId, rel: Option<Rel>) {
        self.nodes[id.index()].rel = rel;
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// Position of a node among its parent's children
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    /// Text value, empty when the node carries none
    pub fn text(&self, id: NodeId) -> &str {
        match &self.nodes[id.index()].value {
            Value::Text(text) => text,
            _ => "",
        }
    }

    /// Text value when present
    pub fn text_opt(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.index()].value {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Replace the text value
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        self.nodes[id.index()].value = Value::Text(text.into());
    }

    /// Number value of a number literal
    pub fn number(&self, id: NodeId) -> Option<f64> {
        match self.nodes[id.index()].value {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Flags of a node
    pub fn flags(&self, id: NodeId) -> NodeFlags {
        self.nodes[id.index()].flags
    }

    /// Whether a node has all of the given flags
    pub fn has_flag(&self, id: NodeId, flag: NodeFlags) -> bool {
        self.nodes[id.index()].flags.contains(flag)
    }

    /// Set or clear flags
    pub fn set_flag(&mut self, id: NodeId, flag: NodeFlags, on: bool) {
        self.nodes[id.index()].flags.set(flag, on);
    }

    /// Append a child without relation
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    /// Append a child under a relation
    pub fn append_rel(&mut self, parent: NodeId, rel: Rel, child: NodeId) {
        self.append(parent, child);
        self.nodes[child.index()].rel = Some(rel);
    }

    /// Insert a child at position `index`
    pub fn insert(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        self.nodes[child.index()].parent = Some(parent);
        let children = &mut self.nodes[parent.index()].children;
        let index = index.min(children.len());
        children.insert(index, child);
    }

    /// Insert `child` right after `sibling`
    pub fn insert_after(&mut self, sibling: NodeId, child: NodeId) {
        if let (Some(parent), Some(index)) = (self.parent(sibling), self.index_of(sibling)) {
            self.insert(parent, index + 1, child);
        }
    }

    /// Insert `child` right before `sibling`
    pub fn insert_before(&mut self, sibling: NodeId, child: NodeId) {
        if let (Some(parent), Some(index)) = (self.parent(sibling), self.index_of(sibling)) {
            self.insert(parent, index, child);
        }
    }

    /// Detach a node from its parent, keeping its relation
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.index()].parent.take() {
            self.nodes[parent.index()].children.retain(|c| *c != id);
        }
    }

    /// Detach a node and clear its relation
    pub fn remove(&mut self, id: NodeId) {
        self.detach(id);
        self.nodes[id.index()].rel = None;
    }

    /// Put `new` where `old` is, taking over its relation. `old` is detached.
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        if old == new {
            return;
        }
        self.detach(new);
        let rel = self.nodes[old.index()].rel;
        self.nodes[new.index()].rel = rel;
        match self.nodes[old.index()].parent.take() {
            Some(parent) => {
                let children = &mut self.nodes[parent.index()].children;
                if let Some(pos) = children.iter().position(|c| *c == old) {
                    children[pos] = new;
                }
                self.nodes[new.index()].parent = Some(parent);
            }
            None => {
                if self.root == Some(old) {
                    self.root = Some(new);
                }
            }
        }
    }

    /// Move all children of `from` to the end of `to`
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        let children = std::mem::take(&mut self.nodes[from.index()].children);
        for child in children {
            self.nodes[child.index()].parent = Some(to);
            self.nodes[to.index()].children.push(child);
        }
    }

    /// Nearest ancestor (including the node itself) of one of the given kinds
    pub fn ancestor(&self, id: NodeId, kinds: &[NodeKind]) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if kinds.contains(&self.kind(node)) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Nodes of the subtree in pre-order, starting with `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Whether `id` is `ancestor` or lies inside its subtree
    pub fn is_inside(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Deep copy a subtree of this arena, the copy is detached
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let src = self.nodes[id.index()].clone();
        let copy = self.add(src.kind, src.span);
        {
            let node = &mut self.nodes[copy.index()];
            node.rel = src.rel;
            node.value = src.value;
            node.assign_op = src.assign_op;
            node.form = src.form;
            node.flags = src.flags;
            node.comments = src.comments;
        }
        for child in src.children {
            let child_copy = self.clone_subtree(child);
            let rel = self.nodes[child_copy.index()].rel;
            self.append(copy, child_copy);
            self.nodes[child_copy.index()].rel = rel;
        }
        copy
    }

    /// Deep copy a subtree of another arena into this one, the copy is detached
    pub fn graft(&mut self, other: &Ast, id: NodeId) -> NodeId {
        let src = other.node(id);
        let copy = self.add(src.kind, src.span);
        {
            let node = &mut self.nodes[copy.index()];
            node.rel = src.rel;
            node.value = src.value.clone();
            node.assign_op = src.assign_op;
            node.form = src.form;
            node.flags = src.flags;
            node.comments = src.comments.clone();
        }
        for child in other.children(id).to_vec() {
            let child_copy = self.graft(other, child);
            let rel = self.nodes[child_copy.index()].rel;
            self.append(copy, child_copy);
            self.nodes[child_copy.index()].rel = rel;
        }
        copy
    }

    /// Drop all scope records of a subtree
    pub fn clear_scopes(&mut self, id: NodeId) {
        for node in self.descendants(id) {
            self.nodes[node.index()].scope = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::new(1, 0, 0)
    }

    #[test]
    fn test_append_and_lookup_by_relation() {
        let mut ast = Ast::new("test.js");
        let node = ast.add(NodeKind::If, span());
        let cond = ast.add(NodeKind::True, span());
        let then = ast.add(NodeKind::Block, span());
        ast.append_rel(node, Rel::Condition, cond);
        ast.append_rel(node, Rel::ThenPart, then);

        assert_eq!(ast.child(node, Rel::ThenPart), Some(then));
        assert_eq!(ast.child(node, Rel::ElsePart), None);
        assert_eq!(ast.parent(cond), Some(node));
        assert_eq!(ast.index_of(then), Some(1));
    }

    #[test]
    fn test_replace_keeps_relation_and_position() {
        let mut ast = Ast::new("test.js");
        let node = ast.add(NodeKind::If, span());
        let cond = ast.add(NodeKind::True, span());
        let then = ast.add(NodeKind::Block, span());
        ast.append_rel(node, Rel::Condition, cond);
        ast.append_rel(node, Rel::ThenPart, then);

        let other = ast.add(NodeKind::False, span());
        ast.replace(cond, other);
        assert_eq!(ast.children(node), &[other, then]);
        assert_eq!(ast.rel(other), Some(Rel::Condition));
        assert_eq!(ast.parent(cond), None);
    }

    #[test]
    fn test_append_moves_child_between_parents() {
        let mut ast = Ast::new("test.js");
        let a = ast.add(NodeKind::Block, span());
        let b = ast.add(NodeKind::Block, span());
        let c = ast.add(NodeKind::Debugger, span());
        ast.append(a, c);
        ast.append(b, c);
        assert!(ast.children(a).is_empty());
        assert_eq!(ast.children(b), &[c]);
    }

    #[test]
    fn test_replace_root() {
        let mut ast = Ast::new("test.js");
        let a = ast.add(NodeKind::Script, span());
        ast.set_root(a);
        let b = ast.add(NodeKind::Script, span());
        ast.replace(a, b);
        assert_eq!(ast.root(), b);
    }

    #[test]
    fn test_graft_copies_subtree() {
        let mut src = Ast::new("a.js");
        let dot = src.add(NodeKind::Dot, span());
        let obj = src.add_text(NodeKind::Identifier, "a", span());
        let prop = src.add_text(NodeKind::Identifier, "b", span());
        src.append(dot, obj);
        src.append(dot, prop);

        let mut dst = Ast::new("b.js");
        let copy = dst.graft(&src, dot);
        assert_eq!(dst.kind(copy), NodeKind::Dot);
        let names: Vec<&str> = dst.children(copy).iter().map(|c| dst.text(*c)).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_descendants_pre_order() {
        let mut ast = Ast::new("test.js");
        let root = ast.add(NodeKind::Script, span());
        let a = ast.add(NodeKind::Block, span());
        let b = ast.add(NodeKind::Debugger, span());
        let c = ast.add(NodeKind::Debugger, span());
        ast.append(root, a);
        ast.append(a, b);
        ast.append(root, c);
        assert_eq!(ast.descendants(root), vec![root, a, b, c]);
    }

    #[test]
    fn test_operator_text() {
        assert_eq!(NodeKind::Ursh.operator(), Some(">>>"));
        assert_eq!(NodeKind::UnaryMinus.operator(), Some("-"));
        assert_eq!(NodeKind::Block.operator(), None);
    }
}
