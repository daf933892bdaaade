//! Material extraction
//!
//! Base materials and color-group entries are emitted as two separate lists and
//! concatenated, base materials first. Nothing is merged across the two, even
//! when ids or colors coincide.

use crate::defaults;
use crate::model::{Color, Element, ElementTree, Material, group_entry_id};

/// Parse an optional color attribute, falling back to the default display color
fn display_color(element: &Element, attribute: &str) -> Color {
    match element.attr(attribute) {
        Some(raw) => Color::from_hex(raw).unwrap_or_else(|| {
            tracing::warn!(
                element = element.local_name(),
                attribute,
                "unparseable color, using default"
            );
            defaults::DEFAULT_DISPLAY_COLOR
        }),
        None => defaults::DEFAULT_DISPLAY_COLOR,
    }
}

/// Id attribute of a group element, or its position among groups of its kind
fn group_id(element: &Element, position: usize) -> String {
    element
        .attr("id")
        .map(str::to_string)
        .unwrap_or_else(|| position.to_string())
}

/// Base materials from `basematerial` elements and `basematerials/base` entries
///
/// A `basematerial` is keyed by its `id`, or by its position among
/// `basematerial` elements when absent. A `base` entry is keyed
/// `"{group id}:{index}"`. Names default to `"Material {n}"`, `n` counting all
/// base materials from 1.
pub fn extract_base_materials(tree: &ElementTree) -> Vec<Material> {
    let mut materials = Vec::new();

    for (position, (_, element)) in tree.elements_named("basematerial").enumerate() {
        let id = group_id(element, position);
        let name = element
            .attr("name")
            .map(str::to_string)
            .unwrap_or_else(|| defaults::material_name(materials.len() + 1));
        materials.push(Material::base(id, name, display_color(element, "displaycolor")));
    }

    for (position, (group, group_element)) in tree.elements_named("basematerials").enumerate() {
        let gid = group_id(group_element, position);
        for (index, (_, element)) in tree.children_named(group, "base").enumerate() {
            let name = element
                .attr("name")
                .map(str::to_string)
                .unwrap_or_else(|| defaults::material_name(materials.len() + 1));
            materials.push(Material::base(
                group_entry_id(&gid, index),
                name,
                display_color(element, "displaycolor"),
            ));
        }
    }

    materials
}

/// Color-group entries as synthetic materials
///
/// Each `color` child of a `colorgroup` becomes one material keyed
/// `"{group id}:{index}"` and named `"Color Group {group id} #{index + 1}"`.
pub fn extract_color_groups(tree: &ElementTree) -> Vec<Material> {
    tree.elements_named("colorgroup")
        .enumerate()
        .flat_map(move |(position, (group, group_element))| {
            let gid = group_id(group_element, position);
            tree.children_named(group, "color")
                .enumerate()
                .map(move |(index, (_, element))| {
                    Material::color_group(
                        group_entry_id(&gid, index),
                        format!("Color Group {} #{}", gid, index + 1),
                        display_color(element, "color"),
                    )
                })
        })
        .collect()
}

/// All materials: base materials followed by color-group entries
pub fn extract_materials(tree: &ElementTree) -> Vec<Material> {
    let mut materials = extract_base_materials(tree);
    materials.extend(extract_color_groups(tree));
    materials
}
