//! Parser configuration.

use std::fmt;
use std::str::FromStr;

/// When the safe-filename rule is enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SafeMode {
    /// Enforce only once an `ffconcat version 1.0` header has been seen.
    #[default]
    Auto,
    /// Never enforce.
    Off,
    /// Always enforce.
    On,
}

impl SafeMode {
    /// Whether checks are active, given whether a version header was seen.
    pub fn is_active(self, header_seen: bool) -> bool {
        match self {
            SafeMode::Auto => header_seen,
            SafeMode::Off => false,
            SafeMode::On => true,
        }
    }
}

impl fmt::Display for SafeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Off => write!(f, "off"),
            Self::On => write!(f, "on"),
        }
    }
}

impl FromStr for SafeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" | "-1" => Ok(Self::Auto),
            "off" | "0" => Ok(Self::Off),
            "on" | "1" => Ok(Self::On),
            _ => Err(format!("invalid safe mode: {}", s)),
        }
    }
}

/// Configuration for the parser.
///
/// Use the builder pattern to create a configuration:
///
/// ```
/// use segcat_parser::config::{ParserConfig, SafeMode};
///
/// let config = ParserConfig::builder()
///     .safe(SafeMode::On)
///     .base("/media/show/list.ffconcat")
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParserConfig {
    /// Safe-filename enforcement.
    /// Default: Auto
    pub safe: SafeMode,

    /// Location of the descriptor itself.
    /// File names are resolved relative to it; `None` keeps them as written.
    pub base: Option<String>,
}

impl ParserConfig {
    /// Create a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration builder.
    pub fn builder() -> ParserConfigBuilder {
        ParserConfigBuilder::default()
    }
}

/// Builder for `ParserConfig`.
#[derive(Debug, Clone, Default)]
pub struct ParserConfigBuilder {
    safe: Option<SafeMode>,
    base: Option<String>,
}

impl ParserConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the safe-filename mode.
    pub fn safe(mut self, mode: SafeMode) -> Self {
        self.safe = Some(mode);
        self
    }

    /// Set the descriptor location used to resolve relative file names.
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ParserConfig {
        ParserConfig {
            safe: self.safe.unwrap_or_default(),
            base: self.base,
        }
    }
}
