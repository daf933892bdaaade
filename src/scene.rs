//! Renderable scene building
//!
//! A [`Scene`] is one shared vertex buffer plus an index buffer partitioned
//! into [`SceneGroup`]s, one per material key. Container models are grouped by
//! a per-triangle key; legacy geometry becomes a single group. In both cases
//! the combined geometry is centered on the origin and scaled so its longest
//! axis is [`NORMALIZED_EXTENT`] long.

use std::collections::HashMap;
use std::fmt;

use nalgebra::{Point3, Vector3};
use serde::Serialize;

use crate::config::Config;
use crate::defaults::{DEFAULT_COLOR_LABEL, NORMALIZED_EXTENT, PAINT_KEY_PREFIX, PAINT_PALETTE};
use crate::error::{Error, Result};
use crate::model::{Color, Material, Mesh, ModelDocument, Object, Triangle, find_material, materials_of, objects_of};
use crate::stl::Geometry;

/// A contiguous run of the index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRange {
    /// First index
    pub start: usize,
    /// Number of indices, three per triangle
    pub count: usize,
}

/// One material's share of the index buffer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneGroup {
    /// Synthetic material key (`paint_{label}`, a reference id, or `default`)
    pub material_key: String,
    /// Indices drawn with this group's material
    pub index_range: IndexRange,
    /// Resolved display color
    pub display_color: Color,
    /// Name of the material the key resolved to, if any
    pub material_name: Option<String>,
}

/// Normalized geometry ready for a rendering engine
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Vertex positions, `x y z` per vertex
    pub positions: Vec<f32>,
    /// Vertex normals, `x y z` per vertex
    pub normals: Vec<f32>,
    /// Triangle indices into the vertex buffer
    pub indices: Vec<u32>,
    /// Index-buffer partition, in order of first appearance
    pub groups: Vec<SceneGroup>,
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner
    pub min: Point3<f32>,
    /// Maximum corner
    pub max: Point3<f32>,
}

impl BoundingBox {
    /// Bounds of a flat `x y z` position buffer, `None` when it is empty
    pub fn from_positions(positions: &[f32]) -> Option<Self> {
        let mut points = positions
            .chunks_exact(3)
            .map(|p| Point3::new(p[0], p[1], p[2]));
        let first = points.next()?;

        Some(points.fold(Self { min: first, max: first }, |bounds, p| Self {
            min: bounds.min.inf(&p),
            max: bounds.max.sup(&p),
        }))
    }

    /// Center point
    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Extent along each axis
    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Length of the longest axis
    pub fn max_extent(&self) -> f32 {
        self.size().max()
    }
}

impl Scene {
    /// Number of triangles across all groups
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of vertices in the shared buffer
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Bounds of the (normalized) vertex buffer
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_positions(&self.positions)
    }

    /// Indices belonging to one group
    pub fn group_indices(&self, group: &SceneGroup) -> &[u32] {
        let range = group.index_range;
        &self.indices[range.start..range.start + range.count]
    }
}

/// Which material a triangle is drawn with
///
/// Paint labels and reference ids are separate key spaces: `pid="paint_red"`
/// and `paint_color="red"` format the same but never share a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MaterialKey {
    /// Vendor paint label
    Paint(String),
    /// Triangle or object `pid`
    Reference(String),
    /// No color information
    Default,
}

impl fmt::Display for MaterialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaterialKey::Paint(label) => write!(f, "{}{}", PAINT_KEY_PREFIX, label),
            MaterialKey::Reference(id) => f.write_str(id),
            MaterialKey::Default => f.write_str(DEFAULT_COLOR_LABEL),
        }
    }
}

/// Material key of one triangle
///
/// The paint label when painted, else the triangle's `pid`, else the owning
/// object's `pid`, else [`MaterialKey::Default`].
pub fn material_key(triangle: &Triangle, object: &Object) -> MaterialKey {
    if let Some(label) = &triangle.paint_color {
        MaterialKey::Paint(label.clone())
    } else if let Some(pid) = triangle.pid.as_ref().or(object.pid.as_ref()) {
        MaterialKey::Reference(pid.clone())
    } else {
        MaterialKey::Default
    }
}

/// 32-bit FNV-1a
fn fnv1a(label: &str) -> u32 {
    label
        .bytes()
        .fold(0x811c_9dc5, |hash, byte| (hash ^ u32::from(byte)).wrapping_mul(0x0100_0193))
}

/// Palette color for a paint label with no registered material
///
/// The same label always maps to the same color, across runs and platforms.
pub fn palette_color(label: &str) -> Color {
    PAINT_PALETTE[fnv1a(label) as usize % PAINT_PALETTE.len()]
}

/// Display color and material name for a group key
fn resolve_group_color(key: &MaterialKey, materials: &[Material], config: &Config) -> (Color, Option<String>) {
    let (lookup, fallback) = match key {
        MaterialKey::Paint(label) => (label.as_str(), palette_color(label)),
        MaterialKey::Reference(id) => (id.as_str(), config.default_color()),
        MaterialKey::Default => (DEFAULT_COLOR_LABEL, config.default_color()),
    };

    match find_material(materials, lookup) {
        Some(material) => (material.display_color, Some(material.name.clone())),
        None => (fallback, None),
    }
}

/// Area-weighted vertex normals of a mesh
///
/// Each triangle adds its unnormalized face normal (twice its area) to its three
/// vertices. Vertices touched only by degenerate or invalid triangles, or whose
/// sum overflows, get a zero normal.
pub fn vertex_normals(mesh: &Mesh) -> Vec<Vector3<f64>> {
    let mut normals: Vec<Vector3<f64>> = vec![Vector3::zeros(); mesh.vertices.len()];
    let point = |i: usize| {
        let v = &mesh.vertices[i];
        Point3::new(v.x, v.y, v.z)
    };

    for triangle in &mesh.triangles {
        let [a, b, c] = triangle.indices();
        if a >= normals.len() || b >= normals.len() || c >= normals.len() {
            continue;
        }

        let face = (point(b) - point(a)).cross(&(point(c) - point(a)));
        for i in [a, b, c] {
            normals[i] += face;
        }
    }

    normals
        .into_iter()
        .map(|n| {
            n.try_normalize(0.0)
                .filter(|n| n.iter().all(|c| c.is_finite()))
                .unwrap_or_else(Vector3::zeros)
        })
        .collect()
}

/// Triangles collected per key, in order of first appearance
#[derive(Default)]
struct Grouping {
    keys: HashMap<MaterialKey, usize>,
    groups: Vec<(MaterialKey, Vec<u32>)>,
}

impl Grouping {
    fn push(&mut self, key: MaterialKey, indices: [u32; 3]) {
        let slot = match self.keys.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.groups.len();
                self.keys.insert(key.clone(), slot);
                self.groups.push((key, Vec::new()));
                slot
            }
        };
        self.groups[slot].1.extend_from_slice(&indices);
    }
}

fn vertex_index(offset: usize, index: usize) -> Result<u32> {
    u32::try_from(offset + index).map_err(|_| {
        Error::MalformedGeometry("model has more vertices than a 32-bit index buffer can address".to_string())
    })
}

/// Build a scene from a parsed container model
///
/// # Errors
///
/// `EmptyModel` when no object contributes a drawable triangle.
pub fn build_from_document(doc: &ModelDocument, config: &Config) -> Result<Scene> {
    let mut positions: Vec<f64> = Vec::new();
    let mut normals = Vec::new();
    let mut grouping = Grouping::default();

    for object in objects_of(doc) {
        let Some(mesh) = &object.mesh else {
            continue;
        };
        let offset = positions.len() / 3;

        for vertex in &mesh.vertices {
            positions.extend_from_slice(&[vertex.x, vertex.y, vertex.z]);
        }
        for normal in vertex_normals(mesh) {
            normals.extend_from_slice(&[normal.x as f32, normal.y as f32, normal.z as f32]);
        }

        let mut skipped = 0usize;
        for triangle in &mesh.triangles {
            let [a, b, c] = triangle.indices();
            if a >= mesh.vertices.len() || b >= mesh.vertices.len() || c >= mesh.vertices.len() {
                skipped += 1;
                continue;
            }
            grouping.push(
                material_key(triangle, object),
                [
                    vertex_index(offset, a)?,
                    vertex_index(offset, b)?,
                    vertex_index(offset, c)?,
                ],
            );
        }

        if skipped > 0 {
            tracing::warn!(
                object = %object.id,
                skipped,
                "skipped triangles referencing out-of-range vertices"
            );
        }
    }

    if grouping.groups.is_empty() {
        return Err(Error::EmptyModel(
            "no object contains a drawable triangle".to_string(),
        ));
    }

    let materials = materials_of(doc);
    let mut indices = Vec::new();
    let mut groups = Vec::with_capacity(grouping.groups.len());
    for (key, group_indices) in grouping.groups {
        let (display_color, material_name) = resolve_group_color(&key, materials, config);
        groups.push(SceneGroup {
            index_range: IndexRange {
                start: indices.len(),
                count: group_indices.len(),
            },
            material_key: key.to_string(),
            display_color,
            material_name,
        });
        indices.extend(group_indices);
    }

    let scene = Scene {
        positions: normalize(&positions),
        normals,
        indices,
        groups,
    };

    tracing::debug!(
        vertices = scene.vertex_count(),
        triangles = scene.triangle_count(),
        groups = scene.groups.len(),
        "built container scene"
    );

    Ok(scene)
}

/// Build a single-group scene from legacy geometry
///
/// # Errors
///
/// - `EmptyModel` when the geometry has no triangles
/// - `MalformedGeometry` when the position and normal buffers disagree in
///   length or a position is not finite
pub fn build_from_geometry(geometry: &Geometry, config: &Config) -> Result<Scene> {
    if geometry.triangle_count() == 0 {
        return Err(Error::EmptyModel("STL file contains no triangles".to_string()));
    }

    let vertex_count = geometry.triangle_count() * 3;
    let used = vertex_count * 3;
    if geometry.normals.len() < used {
        return Err(Error::MalformedGeometry(format!(
            "{} normal components for {} vertices",
            geometry.normals.len(),
            vertex_count
        )));
    }
    let positions: Vec<f64> = geometry.positions[..used].iter().map(|&v| f64::from(v)).collect();
    if positions.iter().any(|v| !v.is_finite()) {
        return Err(Error::MalformedGeometry(
            "STL vertex coordinates must be finite".to_string(),
        ));
    }

    let indices = (0..vertex_count)
        .map(|i| vertex_index(0, i))
        .collect::<Result<Vec<u32>>>()?;

    let scene = Scene {
        positions: normalize(&positions),
        normals: geometry.normals[..used].to_vec(),
        groups: vec![SceneGroup {
            material_key: DEFAULT_COLOR_LABEL.to_string(),
            index_range: IndexRange {
                start: 0,
                count: indices.len(),
            },
            display_color: config.default_color(),
            material_name: None,
        }],
        indices,
    };

    tracing::debug!(triangles = scene.triangle_count(), "built legacy scene");

    Ok(scene)
}

/// Center positions on the origin and scale the longest axis to the fixed extent
///
/// Bounds are taken over halved `f64` coordinates so that values near the
/// `f64` range cannot overflow, and the result is cast to `f32` only once it
/// lies in `[-1, 1]`. A buffer with zero extent (a single point) collapses
/// onto the origin.
pub fn normalize(positions: &[f64]) -> Vec<f32> {
    let halved = |p: &[f64]| Vector3::new(p[0], p[1], p[2]) * 0.5;
    let mut points = positions.chunks_exact(3).map(halved);
    let Some(first) = points.next() else {
        return Vec::new();
    };
    let (min, max) = points.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p)));

    let center = min + (max - min) * 0.5;
    let half_extent = (max - min).max();
    let extent = f64::from(NORMALIZED_EXTENT);

    positions
        .chunks_exact(3)
        .flat_map(|p| {
            let moved = if half_extent > 0.0 {
                (halved(p) - center) / half_extent * extent
            } else {
                Vector3::zeros()
            };
            [moved.x as f32, moved.y as f32, moved.z as f32]
        })
        .collect()
}
