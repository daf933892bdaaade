//! Named defaults for every optional value
//!
//! Any rule of the form "falls back to X when absent" reads its X from here.

use crate::model::Color;

/// Display color used when a material has no usable `displaycolor`, and for
/// scene groups that resolve to no material
pub const DEFAULT_DISPLAY_COLOR: Color = Color::rgb(0x80, 0x80, 0x80);

/// Prefix for generated material names (`"Material 1"`, `"Material 2"`, ...)
pub const DEFAULT_MATERIAL_NAME_PREFIX: &str = "Material";

/// Prefix for generated object names
pub const DEFAULT_OBJECT_NAME_PREFIX: &str = "Object";

/// Object type when the `type` attribute is absent
pub const DEFAULT_OBJECT_TYPE: &str = "model";

/// Model unit when the root element has no `unit` attribute
pub const DEFAULT_UNIT: &str = "millimeter";

/// Label given to unpainted triangles in an object that has painted siblings,
/// and the scene key of triangles with no color information at all
pub const DEFAULT_COLOR_LABEL: &str = "default";

/// Scene key prefix for triangles carrying a paint color
pub const PAINT_KEY_PREFIX: &str = "paint_";

/// Upper bound on the recommended number of print colors
pub const MAX_RECOMMENDED_COLORS: usize = 4;

/// Length of the longest bounding-box axis after scene normalization
pub const NORMALIZED_EXTENT: f32 = 2.0;

/// Fallback colors for paint labels with no registered material
///
/// Indexed by a stable hash of the label, so a given label always renders the
/// same color.
pub const PAINT_PALETTE: [Color; 8] = [
    Color::rgb(0xE5, 0x39, 0x35),
    Color::rgb(0x1E, 0x88, 0xE5),
    Color::rgb(0x43, 0xA0, 0x47),
    Color::rgb(0xFD, 0xD8, 0x35),
    Color::rgb(0x8E, 0x24, 0xAA),
    Color::rgb(0xFB, 0x8C, 0x00),
    Color::rgb(0x00, 0xAC, 0xC1),
    Color::rgb(0x6D, 0x4C, 0x41),
];

/// Generated name for the material at 1-based position `n`
pub fn material_name(n: usize) -> String {
    format!("{} {}", DEFAULT_MATERIAL_NAME_PREFIX, n)
}

/// Generated name for an object without a `name` attribute
pub fn object_name(id: &str) -> String {
    format!("{} {}", DEFAULT_OBJECT_NAME_PREFIX, id)
}
