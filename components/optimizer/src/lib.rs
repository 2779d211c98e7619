//! Optimizer Component
//!
//! Tree-to-tree passes over parsed units and the pipeline running them.
//!
//! # Overview
//!
//! - [`Permutation`], [`PermutationRegistry`] - Build settings and their interning
//! - [`substitution`] - Replace `core.Env` queries by permutation values
//! - [`dead_code`] - Drop branches with constant conditions
//! - [`unused`] - Remove unused declarations, parameters and function names
//! - [`combine_declarations`] - One `var` statement per body
//! - [`block_reduce`] - Peephole reduction of blocks, statements and expressions
//! - [`local_variables`] - Short names for function locals
//! - [`crypt_privates`] - Hashed names for `__private` members
//! - [`Pipeline`] - All of the above in order, followed by code generation
//!
//! Passes mutate the tree in place and return whether they changed it. Passes
//! that can not be applied to a unit return an optimization error without
//! touching the tree.
//!
//! # Example
//!
//! ```
//! use optimizer::{Permutation, Pipeline, PipelineOptions};
//! use serde_json::json;
//!
//! let permutation = Permutation::from_pairs([("debug", json!(true))]);
//! let output = Pipeline::new(PipelineOptions::new())
//!     .compile("if (core.Env.getValue('debug')) { trace(); }", "app.js", &permutation)
//!     .unwrap();
//! assert_eq!(output.code, "trace();");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod block_reduce;
pub mod combine_declarations;
pub mod crypt_privates;
pub mod dead_code;
pub mod error;
pub mod local_variables;
pub mod options;
pub mod permutation;
pub mod pipeline;
pub mod substitution;
mod tree;
pub mod unused;

pub use error::optimization_error;
pub use options::{Optimization, PipelineOptions};
pub use permutation::{Permutation, PermutationRegistry};
pub use pipeline::{CompileOutput, Pipeline};
