//! Code Generator Component
//!
//! Turns a syntax tree back into the most compact source text that parses to
//! the same tree.
//!
//! # Overview
//!
//! - [`compress`] - Generate code for a whole tree
//! - [`Compressor`] - Generator state, usable on any subtree
//! - [`GeneratorOptions`] - Formatting features and string escaping
//! - [`format_number`], [`quote_string`] - Literal printing
//!
//! # Example
//!
//! ```
//! use codegen::{compress, GeneratorOptions};
//! use parser::parse;
//!
//! let ast = parse("if (a) { b(1000); }", "app.js").unwrap();
//! assert_eq!(compress(&ast, &GeneratorOptions::default()), "if(a){b(1e3)}");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compressor;
pub mod literals;
pub mod options;
pub mod precedence;

pub use compressor::{compress, Compressor};
pub use literals::{format_number, quote_string};
pub use options::{Formatting, GeneratorOptions};
