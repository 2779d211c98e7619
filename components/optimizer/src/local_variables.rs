//! Local variable renaming
//!
//! Every function below the top level gets short names for its parameters
//! and declarations. Names are handed out shortest first, the most accessed
//! variable taking the first one. A scope never receives a name that one of
//! its shared variables is already known under, so references to outer
//! variables keep resolving to the same binding.

use std::collections::{BTreeSet, HashMap};

use core_types::CompileResult;
use parser::{is_reserved_word, scan_tree, Ast, FunctionForm, NodeFlags, NodeId, NodeKind, Scope};
use tracing::{debug, trace};

use crate::error::node_error;

const ALPHABET: &[u8; 52] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Global names a generated name must not shadow
const INTRINSICS: &[&str] = &["NaN", "Infinity", "undefined", "arguments", "eval"];

/// Generated name with the given index, shortest names first
///
/// # Examples
///
/// ```
/// use optimizer::local_variables::base52;
///
/// assert_eq!(base52(0), "a");
/// assert_eq!(base52(51), "Z");
/// assert_eq!(base52(52), "aa");
/// assert_eq!(base52(53), "ba");
/// ```
pub fn base52(mut index: usize) -> String {
    let mut length = 1;
    let mut count = ALPHABET.len();
    while index >= count {
        index -= count;
        length += 1;
        count *= ALPHABET.len();
    }
    let mut name = String::with_capacity(length);
    for _ in 0..length {
        name.push(ALPHABET[index % ALPHABET.len()] as char);
        index /= ALPHABET.len();
    }
    name
}

fn is_usable(name: &str) -> bool {
    !is_reserved_word(name) && !INTRINSICS.contains(&name)
}

/// Rename function local variables, returns whether anything changed
///
/// Fails without touching the tree when a function uses `eval` or `with`.
pub fn optimize(ast: &mut Ast) -> CompileResult<bool> {
    scan_tree(ast);
    let root = ast.root();
    for id in ast.descendants(root) {
        if ast.kind(id) != NodeKind::Function {
            continue;
        }
        if let Some(scope) = &ast.node(id).scope {
            if scope.uses_eval {
                return Err(node_error(ast, id, "Local variables can not be renamed in a scope using eval"));
            }
            if scope.has_with {
                return Err(node_error(ast, id, "Local variables can not be renamed in a scope using with"));
            }
        }
    }

    let mut renamer = Renamer { changed: false };
    renamer.visit(ast, root, &HashMap::new());
    if renamer.changed {
        debug!(file = %ast.file, "renamed local variables");
    }
    Ok(renamer.changed)
}

/// Translations of one function scope
fn translate_scope(scope: &Scope, outer: &HashMap<String, String>) -> HashMap<String, String> {
    let blocked: BTreeSet<&str> = scope
        .shared
        .keys()
        .map(|name| outer.get(name).map_or(name.as_str(), String::as_str))
        .collect();

    let mut locals: Vec<&String> = scope.declared.iter().chain(scope.params.iter()).collect();
    locals.sort_by(|a, b| scope.accesses(b).cmp(&scope.accesses(a)).then_with(|| a.cmp(b)));
    locals.dedup();

    let mut translations = outer.clone();
    let mut next = 0;
    for local in locals {
        let name = loop {
            let candidate = base52(next);
            next += 1;
            if is_usable(&candidate) && !blocked.contains(candidate.as_str()) {
                break candidate;
            }
        };
        trace!(from = %local, to = %name, "renaming local");
        translations.insert(local.clone(), name);
    }
    translations
}

struct Renamer {
    changed: bool,
}

impl Renamer {
    fn rename(&mut self, ast: &mut Ast, id: NodeId, translations: &HashMap<String, String>) {
        let Some(name) = ast.text_opt(id) else {
            return;
        };
        if let Some(translated) = translations.get(name) {
            if translated != name {
                let translated = translated.clone();
                ast.set_text(id, translated);
                self.changed = true;
            }
        }
    }

    fn visit(&mut self, ast: &mut Ast, id: NodeId, translations: &HashMap<String, String>) {
        match ast.kind(id) {
            NodeKind::Function => self.visit_function(ast, id, translations),
            NodeKind::Identifier => {
                if !is_property_name(ast, id) {
                    self.rename(ast, id, translations);
                }
            }
            NodeKind::Declaration => {
                self.rename(ast, id, translations);
                self.visit_children(ast, id, translations);
            }
            _ => self.visit_children(ast, id, translations),
        }
    }

    fn visit_children(&mut self, ast: &mut Ast, id: NodeId, translations: &HashMap<String, String>) {
        for child in ast.children(id).to_vec() {
            self.visit(ast, child, translations);
        }
    }

    fn visit_function(&mut self, ast: &mut Ast, id: NodeId, outer: &HashMap<String, String>) {
        let accessor = ast.has_flag(id, NodeFlags::GETTER) || ast.has_flag(id, NodeFlags::SETTER);
        let declared = matches!(
            ast.node(id).form,
            Some(FunctionForm::Declared) | Some(FunctionForm::Statement)
        );
        if declared && !accessor {
            self.rename(ast, id, outer);
        }

        let inner = match &ast.node(id).scope {
            Some(scope) => translate_scope(scope, outer),
            None => outer.clone(),
        };
        if !declared && !accessor {
            self.rename(ast, id, &inner);
        }
        self.visit_children(ast, id, &inner);
    }
}

/// Whether an identifier names a property rather than a variable
fn is_property_name(ast: &Ast, id: NodeId) -> bool {
    match ast.parent(id) {
        Some(parent) => match ast.kind(parent) {
            NodeKind::Dot => ast.index_of(id) == Some(1),
            NodeKind::PropertyInit => ast.index_of(id) == Some(0),
            _ => false,
        },
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegen::{compress, GeneratorOptions};
    use core_types::ErrorKind;
    use parser::parse;
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> String {
        let mut ast = parse(source, "test.js").unwrap();
        optimize(&mut ast).unwrap();
        compress(&ast, &GeneratorOptions::default())
    }

    #[test]
    fn test_base52_enumeration() {
        let names: Vec<String> = (0..3).map(base52).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(base52(52 + 52 * 52), "aaa");
    }

    #[test]
    fn test_reserved_words_are_not_generated() {
        assert!(!is_usable("do"));
        assert!(!is_usable("in"));
        assert!(!is_usable("NaN"));
        assert!(is_usable("ab"));
    }

    #[test]
    fn test_most_accessed_first() {
        assert_eq!(
            run("function f(first, second) { return second + second + first; }"),
            "function f(b,a){return a+a+b}"
        );
    }

    #[test]
    fn test_top_level_names_are_kept() {
        assert_eq!(run("var value = 1; function f() {}"), "var value=1;function f(){}");
    }

    #[test]
    fn test_shared_names_are_blocked() {
        assert_eq!(
            run("function f(longName, other) { return longName + a + other; }"),
            "function f(b,c){return b+a+c}"
        );
    }

    #[test]
    fn test_nested_scopes_see_outer_translations() {
        assert_eq!(
            run("function outer(value) { return function inner(x) { return value + x; }; }"),
            "function outer(a){return function c(b){return a+b}}"
        );
    }

    #[test]
    fn test_declarations_catch_and_properties() {
        assert_eq!(
            run("function f() { var result = {key: 1}; try { g(result.key); } catch (error) { h(error); } }"),
            "function f(){var b={key:1};try{g(b.key)}catch(a){h(a)}}"
        );
    }

    #[test]
    fn test_nested_function_declaration_name() {
        assert_eq!(
            run("function f() { function helper() {} helper(); helper(); }"),
            "function f(){function a(){}a();a()}"
        );
    }

    #[test]
    fn test_eval_prevents_renaming() {
        let mut ast = parse("function f(x) { eval('x'); }", "test.js").unwrap();
        let err = optimize(&mut ast).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Optimization);
        assert!(err.message.contains("eval"));
        assert_eq!(compress(&ast, &GeneratorOptions::default()), "function f(x){eval(\"x\")}");
    }

    #[test]
    fn test_with_prevents_renaming() {
        let mut ast = parse("function f(o, x) { with (o) { x(); } }", "test.js").unwrap();
        let err = optimize(&mut ast).unwrap_err();
        assert!(err.message.contains("with"));
    }
}
