//! Optimization switches and pipeline configuration

use std::str::FromStr;

use bitflags::bitflags;
use codegen::{Formatting, GeneratorOptions};
use core_types::UnknownOption;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Optional optimization steps. Permutation substitution, dead code and
    /// unused declaration removal always run.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Optimization: u8 {
        /// Combine `var` statements per body
        const DECLARATIONS = 1 << 0;
        /// Block and statement reduction
        const BLOCKS = 1 << 1;
        /// Rename function local variables
        const VARIABLES = 1 << 2;
        /// Obfuscate `__private` members
        const PRIVATES = 1 << 3;
    }
}

impl Default for Optimization {
    fn default() -> Self {
        Optimization::all()
    }
}

impl FromStr for Optimization {
    type Err = UnknownOption;

    /// Parse a comma separated list of names, like `"declarations,blocks"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut optimization = Optimization::empty();
        for name in s.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            optimization |= match name.to_ascii_lowercase().as_str() {
                "declarations" => Optimization::DECLARATIONS,
                "blocks" => Optimization::BLOCKS,
                "variables" => Optimization::VARIABLES,
                "privates" => Optimization::PRIVATES,
                _ => return Err(UnknownOption(name.to_string())),
            };
        }
        Ok(optimization)
    }
}

/// Configuration of one [`Pipeline`](crate::Pipeline) run
///
/// # Examples
///
/// ```
/// use optimizer::{Optimization, PipelineOptions};
///
/// let options = PipelineOptions::new()
///     .with_optimization(Optimization::DECLARATIONS | Optimization::BLOCKS)
///     .with_context_id("app");
/// assert!(!options.optimization.contains(Optimization::PRIVATES));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Enabled optional steps
    pub optimization: Optimization,
    /// Output formatting features
    pub formatting: Formatting,
    /// Salt of generated private member names
    pub context_id: String,
    /// Escape threshold of generated strings
    pub ascii_threshold: u32,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            optimization: Optimization::all(),
            formatting: Formatting::empty(),
            context_id: String::new(),
            ascii_threshold: GeneratorOptions::default().ascii_threshold,
        }
    }
}

impl PipelineOptions {
    /// All optimizations, compact output
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the enabled optimizations
    pub fn with_optimization(mut self, optimization: Optimization) -> Self {
        self.optimization = optimization;
        self
    }

    /// Set the formatting features
    pub fn with_formatting(mut self, formatting: Formatting) -> Self {
        self.formatting = formatting;
        self
    }

    /// Set the private name salt
    pub fn with_context_id(mut self, context_id: impl Into<String>) -> Self {
        self.context_id = context_id.into();
        self
    }

    /// Set the escape threshold
    pub fn with_ascii_threshold(mut self, threshold: u32) -> Self {
        self.ascii_threshold = threshold;
        self
    }

    /// Options of the code generation step
    pub fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions::new()
            .with_formatting(self.formatting)
            .with_ascii_threshold(self.ascii_threshold)
    }
}
