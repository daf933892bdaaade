//! Data structures representing parsed models

mod color;
mod core;
pub mod document;
mod material;

pub use color::Color;
pub use core::{Mesh, Object, Triangle, Vertex};
pub use document::{Element, ElementId, ElementTree, ModelDocument, materials_of, objects_of};
pub use material::{Material, MaterialOrigin, find_material, group_entry_id};
