//! Variable analysis of function and script bodies
//!
//! [`scan`] walks one body and attaches a [`Scope`] record to the node owning
//! it: the `Script` at top level, the `Function` node otherwise. Nested
//! functions are scanned recursively and their shared names count as accesses
//! of the enclosing scope.
//!
//! The analysis is not incremental. Passes that add, remove or rename
//! declarations or references must scan again before relying on it.

use std::collections::{BTreeMap, BTreeSet};

use crate::ast::{Ast, FunctionForm, NodeFlags, NodeId, NodeKind, Rel};
use tracing::trace;

/// Variable usage of one body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    /// Names declared by `var`, `let`, `const`, functions and `catch`
    pub declared: BTreeSet<String>,
    /// Parameter names in order
    pub params: Vec<String>,
    /// Number of accesses per identifier
    pub accessed: BTreeMap<String, usize>,
    /// Names that are assigned or updated
    pub modified: BTreeSet<String>,
    /// Accessed names that are not declared in this scope, with access counts
    pub shared: BTreeMap<String, usize>,
    /// Declared or parameter names that are never accessed
    pub unused: BTreeSet<String>,
    /// Dotted chains rooted at a shared identifier, like `core.Env.select`
    pub packages: BTreeSet<String>,
    /// `eval` is referenced in this body or a nested one
    pub uses_eval: bool,
    /// A `with` statement appears in this body or a nested one
    pub has_with: bool,
}

impl Scope {
    /// Whether `name` is declared or a parameter of this scope
    pub fn is_local(&self, name: &str) -> bool {
        self.declared.contains(name) || self.params.iter().any(|p| p == name)
    }

    /// Access count of `name`
    pub fn accesses(&self, name: &str) -> usize {
        self.accessed.get(name).copied().unwrap_or(0)
    }

    fn access(&mut self, name: &str, count: usize) {
        *self.accessed.entry(name.to_string()).or_insert(0) += count;
        if name == "eval" {
            self.uses_eval = true;
        }
    }

    fn finish(&mut self) {
        let mut shared = BTreeMap::new();
        for (name, count) in &self.accessed {
            if !self.is_local(name) {
                shared.insert(name.clone(), *count);
            }
        }
        self.shared = shared;

        let locals: Vec<String> = self
            .declared
            .iter()
            .cloned()
            .chain(self.params.iter().cloned())
            .collect();
        self.unused = locals
            .into_iter()
            .filter(|name| self.accesses(name) == 0)
            .collect();

        let packages = std::mem::take(&mut self.packages);
        self.packages = packages
            .into_iter()
            .filter(|package| {
                let root = package.split('.').next().unwrap_or_default();
                !self.is_local(root)
            })
            .collect();
    }
}

/// Scan the whole tree from its root
pub fn scan_tree(ast: &mut Ast) -> Scope {
    let root = ast.root();
    scan(ast, root)
}

/// Scan the body owned by `owner` (a `Script` or a `Function`), attach the
/// resulting scope to it and return a copy
pub fn scan(ast: &mut Ast, owner: NodeId) -> Scope {
    let mut scope = Scope::default();

    let body = if ast.kind(owner) == NodeKind::Function {
        if let Some(params) = ast.child(owner, Rel::Params) {
            for param in ast.children(params).to_vec() {
                for name in binding_identifiers(ast, param) {
                    scope.params.push(ast.text(name).to_string());
                }
            }
        }
        let accessor = ast.has_flag(owner, NodeFlags::GETTER) || ast.has_flag(owner, NodeFlags::SETTER);
        if ast.node(owner).form == Some(FunctionForm::Expressed) && !accessor {
            if let Some(name) = ast.text_opt(owner) {
                scope.declared.insert(name.to_string());
            }
        }
        ast.child(owner, Rel::Body)
    } else {
        Some(owner)
    };

    if let Some(body) = body {
        for child in ast.children(body).to_vec() {
            walk(ast, child, &mut scope);
        }
    }
    scope.finish();

    trace!(
        declared = scope.declared.len(),
        shared = scope.shared.len(),
        unused = scope.unused.len(),
        "scanned scope"
    );
    ast.node_mut(owner).scope = Some(scope.clone());
    scope
}

/// Identifier nodes bound by a declaration target: a plain identifier, or
/// the leaves of an array/object destructuring pattern
pub fn binding_identifiers(ast: &Ast, target: NodeId) -> Vec<NodeId> {
    let mut found = Vec::new();
    collect_bindings(ast, target, &mut found);
    found
}

fn collect_bindings(ast: &Ast, id: NodeId, found: &mut Vec<NodeId>) {
    match ast.kind(id) {
        NodeKind::Identifier => found.push(id),
        NodeKind::ArrayInit => {
            for child in ast.children(id) {
                collect_bindings(ast, *child, found);
            }
        }
        NodeKind::ObjectInit => {
            for property in ast.children(id) {
                if let Some(value) = ast.nth(*property, 1) {
                    collect_bindings(ast, value, found);
                }
            }
        }
        _ => {}
    }
}

/// Dotted text of a member chain made only of identifiers, like `a.b.c`
pub fn dotted_name(ast: &Ast, id: NodeId) -> Option<String> {
    match ast.kind(id) {
        NodeKind::Identifier => Some(ast.text(id).to_string()),
        NodeKind::Dot => {
            let object = ast.nth(id, 0)?;
            let property = ast.nth(id, 1)?;
            let prefix = dotted_name(ast, object)?;
            Some(format!("{}.{}", prefix, ast.text(property)))
        }
        _ => None,
    }
}

fn walk(ast: &mut Ast, id: NodeId, scope: &mut Scope) {
    match ast.kind(id) {
        NodeKind::Identifier => {
            let name = ast.text(id).to_string();
            scope.access(&name, 1);
        }
        NodeKind::Function => {
            let is_declaration = matches!(
                ast.node(id).form,
                Some(FunctionForm::Declared) | Some(FunctionForm::Statement)
            );
            if is_declaration {
                if let Some(name) = ast.text_opt(id) {
                    scope.declared.insert(name.to_string());
                }
            }
            let nested = scan(ast, id);
            for (name, count) in &nested.shared {
                scope.access(name, *count);
            }
            scope.packages.extend(nested.packages);
            scope.uses_eval |= nested.uses_eval;
            scope.has_with |= nested.has_with;
        }
        NodeKind::Dot => {
            let is_chain_end = !(ast.parent(id).map(|p| ast.kind(p)) == Some(NodeKind::Dot)
                && ast.index_of(id) == Some(0));
            if is_chain_end {
                if let Some(package) = dotted_name(ast, id) {
                    scope.packages.insert(package);
                }
            }
            if let Some(object) = ast.nth(id, 0) {
                walk(ast, object, scope);
            }
        }
        NodeKind::PropertyInit => {
            if let Some(value) = ast.nth(id, 1) {
                walk(ast, value, scope);
            }
        }
        NodeKind::Declaration => {
            if let Some(name) = ast.text_opt(id) {
                scope.declared.insert(name.to_string());
            }
            if let Some(names) = ast.child(id, Rel::Names) {
                for binding in binding_identifiers(ast, names) {
                    scope.declared.insert(ast.text(binding).to_string());
                }
            }
            if let Some(initializer) = ast.child(id, Rel::Initializer) {
                walk(ast, initializer, scope);
            }
        }
        NodeKind::Catch => {
            if let Some(exception) = ast.child(id, Rel::Exception) {
                for binding in binding_identifiers(ast, exception) {
                    scope.declared.insert(ast.text(binding).to_string());
                }
            }
            for rel in [Rel::Guard, Rel::Block] {
                if let Some(child) = ast.child(id, rel) {
                    walk(ast, child, scope);
                }
            }
        }
        NodeKind::Assign | NodeKind::Increment | NodeKind::Decrement => {
            if let Some(target) = ast.nth(id, 0) {
                mark_modified(ast, target, scope);
            }
            walk_children(ast, id, scope);
        }
        NodeKind::ForIn => {
            let in_comprehension = ast.parent(id).map(|p| ast.kind(p)) == Some(NodeKind::CompTail);
            if let Some(iterator) = ast.child(id, Rel::Iterator) {
                if in_comprehension {
                    for binding in binding_identifiers(ast, iterator) {
                        scope.declared.insert(ast.text(binding).to_string());
                    }
                } else {
                    mark_modified(ast, iterator, scope);
                }
            }
            walk_children(ast, id, scope);
        }
        NodeKind::With => {
            scope.has_with = true;
            walk_children(ast, id, scope);
        }
        _ => walk_children(ast, id, scope),
    }
}

fn walk_children(ast: &mut Ast, id: NodeId, scope: &mut Scope) {
    for child in ast.children(id).to_vec() {
        walk(ast, child, scope);
    }
}

fn mark_modified(ast: &Ast, target: NodeId, scope: &mut Scope) {
    match ast.kind(target) {
        NodeKind::Identifier | NodeKind::ArrayInit | NodeKind::ObjectInit => {
            for binding in binding_identifiers(ast, target) {
                scope.modified.insert(ast.text(binding).to_string());
            }
        }
        _ => {}
    }
}
