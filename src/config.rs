//! Caller-supplied options for the entry points

use crate::defaults;
use crate::model::Color;

/// Configuration for loading, analyzing and rendering models
///
/// # Example
///
/// ```
/// use printsight::{Color, Config};
///
/// let config = Config::new()
///     .with_max_input_bytes(50 * 1024 * 1024)
///     .with_default_color(Color::rgb(0xCC, 0xCC, 0xCC));
///
/// assert_eq!(config.max_input_bytes(), Some(50 * 1024 * 1024));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Inputs larger than this are rejected before decoding
    max_input_bytes: Option<usize>,
    /// Color for legacy scenes and unresolved groups
    default_color: Color,
}

impl Config {
    /// Create a configuration with no size limit and the mid-gray default color
    pub fn new() -> Self {
        Self {
            max_input_bytes: None,
            default_color: defaults::DEFAULT_DISPLAY_COLOR,
        }
    }

    /// Reject inputs larger than `limit` bytes with `InputTooLarge`
    pub fn with_max_input_bytes(mut self, limit: usize) -> Self {
        self.max_input_bytes = Some(limit);
        self
    }

    /// Use `color` for legacy-format scenes and groups with no material
    pub fn with_default_color(mut self, color: Color) -> Self {
        self.default_color = color;
        self
    }

    /// Input size ceiling, if any
    pub fn max_input_bytes(&self) -> Option<usize> {
        self.max_input_bytes
    }

    /// Fallback display color
    pub fn default_color(&self) -> Color {
        self.default_color
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
