//! Private member obfuscation
//!
//! Members named like `__name` are private by convention. They are renamed
//! to a hash of the name salted with a context id, so the same private name
//! gets the same replacement everywhere inside one context.

use std::collections::BTreeMap;

use core_types::CompileResult;
use parser::{Ast, NodeFlags, NodeId, NodeKind};
use regex::Regex;
use sha1::{Digest, Sha1};
use tracing::{debug, trace};

use crate::error::node_error;

const PRIVATE_NAME: &str = r"^__[a-zA-Z0-9]+$";

const BASE62: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Base62 digits of a number, most significant first
pub fn base62(mut value: u32) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE62[(value % 62) as usize]);
        value /= 62;
    }
    digits.iter().rev().map(|d| *d as char).collect()
}

/// Replacement of a private name inside a context
///
/// # Examples
///
/// ```
/// use optimizer::crypt_privates::encode;
///
/// let name = encode("42", "__secret");
/// assert!(name.starts_with("__"));
/// assert_eq!(name, encode("42", "__secret"));
/// assert_ne!(name, encode("43", "__secret"));
/// ```
pub fn encode(context_id: &str, name: &str) -> String {
    let digest = Sha1::digest(format!("{}.{}", context_id, name).as_bytes());
    let value = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    format!("__{}", base62(value))
}

/// Rename private members, returns whether anything changed
///
/// Fails without touching the tree when a private name is used as a
/// variable, or when two private names hash to the same replacement.
///
/// Replacements match the private name pattern themselves, so the pass must
/// run once per tree: a second run hashes them again. Computed access such
/// as `o["__name"]` is a string, not a member name, and is left as is.
pub fn optimize(ast: &mut Ast, context_id: &str) -> CompileResult<bool> {
    let root = ast.root();
    let pattern = Regex::new(PRIVATE_NAME)
        .map_err(|e| node_error(ast, root, format!("Failed to compile private name pattern: {}", e)))?;

    let mut members = Vec::new();
    for id in ast.descendants(root) {
        let Some(name) = private_name(ast, id) else {
            continue;
        };
        if !pattern.is_match(name) {
            continue;
        }
        if !is_member_position(ast, id) {
            return Err(node_error(
                ast,
                id,
                format!("Private name {} is not used as a member", name),
            ));
        }
        members.push(id);
    }

    let mut replacements: BTreeMap<String, String> = BTreeMap::new();
    let mut owners: BTreeMap<String, String> = BTreeMap::new();
    for id in &members {
        let name = ast.text(*id);
        if replacements.contains_key(name) {
            continue;
        }
        let replacement = encode(context_id, name);
        if let Some(other) = owners.get(&replacement) {
            return Err(node_error(
                ast,
                *id,
                format!("Private names {} and {} map to the same name {}", other, name, replacement),
            ));
        }
        owners.insert(replacement.clone(), name.to_string());
        replacements.insert(name.to_string(), replacement);
    }

    for id in &members {
        if let Some(replacement) = replacements.get(ast.text(*id)) {
            trace!(from = ast.text(*id), to = %replacement, "renaming private member");
            let replacement = replacement.clone();
            ast.set_text(*id, replacement);
        }
    }

    if !members.is_empty() {
        debug!(file = %ast.file, count = replacements.len(), "obfuscated private members");
    }
    Ok(!members.is_empty())
}

/// Name carried by a node that can hold a private name
fn private_name(ast: &Ast, id: NodeId) -> Option<&str> {
    match ast.kind(id) {
        NodeKind::Identifier | NodeKind::Declaration | NodeKind::Function => ast.text_opt(id),
        _ => None,
    }
}

fn is_member_position(ast: &Ast, id: NodeId) -> bool {
    match ast.kind(id) {
        NodeKind::Identifier => match ast.parent(id) {
            Some(parent) => match ast.kind(parent) {
                NodeKind::Dot => ast.index_of(id) == Some(1),
                NodeKind::PropertyInit => ast.index_of(id) == Some(0),
                _ => false,
            },
            None => false,
        },
        NodeKind::Function => ast.has_flag(id, NodeFlags::GETTER) || ast.has_flag(id, NodeFlags::SETTER),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegen::{compress, GeneratorOptions};
    use core_types::ErrorKind;
    use parser::parse;

    fn run(source: &str, context: &str) -> String {
        let mut ast = parse(source, "test.js").unwrap();
        optimize(&mut ast, context).unwrap();
        compress(&ast, &GeneratorOptions::default())
    }

    #[test]
    fn test_base62() {
        assert_eq!(base62(0), "0");
        assert_eq!(base62(61), "Z");
        assert_eq!(base62(62), "10");
        assert_eq!(base62(u32::MAX), "4GFfc3");
    }

    #[test]
    fn test_members_and_keys_share_a_name() {
        let name = encode("42", "__secret");
        assert_eq!(
            run("x = {__secret: 1}; y = obj.__secret;", "42"),
            format!("x={{{}:1}};y=obj.{};", name, name)
        );
    }

    #[test]
    fn test_context_changes_the_name() {
        assert_ne!(run("obj.__secret;", "42"), run("obj.__secret;", "other"));
    }

    #[test]
    fn test_plain_and_dunder_only_names_are_kept() {
        assert_eq!(run("a.__ = b.x__y; c.__proto_x;", "42"), "a.__=b.x__y;c.__proto_x;");
    }

    #[test]
    fn test_private_variable_is_an_error() {
        let mut ast = parse("var __secret = 1; obj.__secret;", "test.js").unwrap();
        let err = optimize(&mut ast, "42").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Optimization);
        assert!(err.message.contains("__secret"));
        assert_eq!(compress(&ast, &GeneratorOptions::default()), "var __secret=1;obj.__secret;");
    }

    #[test]
    fn test_string_keyed_access_is_not_renamed() {
        let name = encode("42", "__secret");
        assert_eq!(
            run("o.__secret = o['__secret'];", "42"),
            format!("o.{}=o[\"__secret\"];", name)
        );
    }

    #[test]
    fn test_second_run_hashes_again() {
        let once = encode("42", "__secret");
        let twice = encode("42", &once);
        assert_eq!(run(&run("o.__secret;", "42"), "42"), format!("o.{};", twice));
    }

    #[test]
    fn test_reports_change() {
        let mut ast = parse("obj.visible;", "test.js").unwrap();
        assert!(!optimize(&mut ast, "42").unwrap());
    }
}
