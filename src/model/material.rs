//! Material records from `basematerial`, `basematerials` and `colorgroup`

use serde::Serialize;

use super::color::Color;

/// Which listing a material record came from
///
/// Records from different listings are never merged, even when their ids
/// or colors coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MaterialOrigin {
    /// A `basematerial` element or a `base` entry of a `basematerials` group
    BaseMaterial,
    /// A `color` entry of a `colorgroup`
    ColorGroup,
}

/// Material definition with display color
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    /// Material ID, unique within its origin
    pub id: String,
    /// Material name
    pub name: String,
    /// Display color
    pub display_color: Color,
    /// Listing this record came from
    pub origin: MaterialOrigin,
}

impl Material {
    /// Create a new base material
    pub fn base(id: impl Into<String>, name: impl Into<String>, display_color: Color) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            display_color,
            origin: MaterialOrigin::BaseMaterial,
        }
    }

    /// Create a new color-group entry
    pub fn color_group(
        id: impl Into<String>,
        name: impl Into<String>,
        display_color: Color,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            display_color,
            origin: MaterialOrigin::ColorGroup,
        }
    }
}

/// Id of entry `index` within group `group_id`
pub fn group_entry_id(group_id: &str, index: usize) -> String {
    format!("{}:{}", group_id, index)
}

/// Find the material a property reference resolves to
///
/// An exact id match wins, base materials before color-group entries. A key
/// naming a whole group resolves to that group's first entry.
pub fn find_material<'a>(materials: &'a [Material], key: &str) -> Option<&'a Material> {
    let by_id = |id: &str| {
        materials
            .iter()
            .filter(|m| m.id == id)
            .min_by_key(|m| m.origin == MaterialOrigin::ColorGroup)
    };

    by_id(key).or_else(|| by_id(&group_entry_id(key, 0)))
}
