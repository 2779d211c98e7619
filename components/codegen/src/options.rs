//! Output formatting options

use std::str::FromStr;

use bitflags::bitflags;
use core_types::UnknownOption;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Optional output features, all off for the most compact output
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Formatting: u8 {
        /// Keep the `;` of the last statement before `}`
        const SEMICOLON = 1 << 0;
        /// Write `, ` instead of `,` between list items
        const COMMA = 1 << 1;
    }
}

impl FromStr for Formatting {
    type Err = UnknownOption;

    /// Parse a comma separated list of names, like `"semicolon,comma"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut formatting = Formatting::empty();
        for name in s.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            formatting |= match name.to_ascii_lowercase().as_str() {
                "semicolon" => Formatting::SEMICOLON,
                "comma" => Formatting::COMMA,
                _ => return Err(UnknownOption(name.to_string())),
            };
        }
        Ok(formatting)
    }
}

/// Code generator configuration
///
/// # Examples
///
/// ```
/// use codegen::{Formatting, GeneratorOptions};
///
/// let options = GeneratorOptions::new()
///     .with_formatting(Formatting::COMMA)
///     .with_ascii_threshold(256);
/// assert_eq!(options.ascii_threshold, 256);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorOptions {
    /// Optional output features
    pub formatting: Formatting,
    /// Characters with a code point below this value are written raw inside
    /// strings, all others as escapes
    pub ascii_threshold: u32,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            formatting: Formatting::empty(),
            ascii_threshold: 128,
        }
    }
}

impl GeneratorOptions {
    /// Compact output with the default escape threshold
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the formatting features
    pub fn with_formatting(mut self, formatting: Formatting) -> Self {
        self.formatting = formatting;
        self
    }

    /// Set the escape threshold
    pub fn with_ascii_threshold(mut self, threshold: u32) -> Self {
        self.ascii_threshold = threshold;
        self
    }
}
