//! Build permutations
//!
//! A permutation fixes the values of build-time settings for one output
//! variant, like `{"debug": false, "engine": "webkit"}`. Equal permutations
//! are interned by a [`PermutationRegistry`] owned by the caller, so one
//! compile run shares a single instance per distinct content.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha1::{Digest, Sha1};

/// Immutable mapping of setting names to JSON values
///
/// # Examples
///
/// ```
/// use optimizer::Permutation;
/// use serde_json::json;
///
/// let permutation = Permutation::from_pairs([("debug", json!(false)), ("engine", json!("webkit"))]);
/// assert_eq!(permutation.key(), "debug:false;engine:\"webkit\"");
/// assert_eq!(permutation.checksum().len(), 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Value>", into = "BTreeMap<String, Value>")]
pub struct Permutation {
    values: BTreeMap<String, Value>,
    key: String,
    checksum: String,
}

impl Permutation {
    /// Create a permutation from a map of values
    pub fn new(values: BTreeMap<String, Value>) -> Self {
        let key = values
            .iter()
            .map(|(name, value)| format!("{}:{}", name, value))
            .collect::<Vec<_>>()
            .join(";");
        let checksum = short_sha1(&key);
        Self { values, key, checksum }
    }

    /// Create a permutation from name/value pairs
    pub fn from_pairs<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::new(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Canonical key string, `name:json` pairs sorted by name and joined by `;`
    pub fn key(&self) -> &str {
        &self.key
    }

    /// First 8 hex digits of the SHA-1 of the key string
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    /// Value of a setting
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Whether a setting has a value
    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Whether no setting has a value
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All settings in name order
    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    /// The permutation restricted to `names`
    pub fn filter(&self, names: &[&str]) -> Permutation {
        Permutation::new(
            self.values
                .iter()
                .filter(|(name, _)| names.contains(&name.as_str()))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        )
    }
}

impl Default for Permutation {
    fn default() -> Self {
        Permutation::new(BTreeMap::new())
    }
}

impl From<BTreeMap<String, Value>> for Permutation {
    fn from(values: BTreeMap<String, Value>) -> Self {
        Permutation::new(values)
    }
}

impl From<Permutation> for BTreeMap<String, Value> {
    fn from(permutation: Permutation) -> Self {
        permutation.values
    }
}

fn short_sha1(text: &str) -> String {
    let digest = Sha1::digest(text.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        let _ = write!(hex, "{:02x}", byte);
    }
    hex
}

/// Interns permutations by content
#[derive(Debug, Default)]
pub struct PermutationRegistry {
    interned: HashMap<String, Rc<Permutation>>,
}

impl PermutationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared instance for a permutation's content
    pub fn intern(&mut self, permutation: Permutation) -> Rc<Permutation> {
        Rc::clone(
            self.interned
                .entry(permutation.key.clone())
                .or_insert_with(|| Rc::new(permutation)),
        )
    }

    /// The shared instance for a map of values
    pub fn get_or_create(&mut self, values: BTreeMap<String, Value>) -> Rc<Permutation> {
        self.intern(Permutation::new(values))
    }

    /// The shared instance of `permutation` restricted to `names`
    pub fn filter(&mut self, permutation: &Permutation, names: &[&str]) -> Rc<Permutation> {
        self.intern(permutation.filter(names))
    }

    /// Number of distinct permutations
    pub fn len(&self) -> usize {
        self.interned.len()
    }

    /// Whether nothing was interned yet
    pub fn is_empty(&self) -> bool {
        self.interned.is_empty()
    }
}
