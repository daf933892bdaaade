//! Object, mesh, vertex and triangle records

use crate::defaults;

/// A vertex in 3D space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate
    pub z: f64,
}

impl Vertex {
    /// Create a new vertex
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A triangle defined by three vertex indices
///
/// Property references are kept as the literal attribute strings: they are
/// only ever compared and collected, never resolved numerically.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Triangle {
    /// Index of first vertex
    pub v1: usize,
    /// Index of second vertex
    pub v2: usize,
    /// Index of third vertex
    pub v3: usize,
    /// Optional property group reference
    pub pid: Option<String>,
    /// Optional property reference for vertex 1
    pub p1: Option<String>,
    /// Optional property reference for vertex 2
    pub p2: Option<String>,
    /// Optional property reference for vertex 3
    pub p3: Option<String>,
    /// Vendor paint annotation (`paint_color` attribute)
    pub paint_color: Option<String>,
}

impl Triangle {
    /// Create a new triangle
    pub fn new(v1: usize, v2: usize, v3: usize) -> Self {
        Self {
            v1,
            v2,
            v3,
            ..Default::default()
        }
    }

    /// Set the property group reference
    pub fn with_pid(mut self, pid: impl Into<String>) -> Self {
        self.pid = Some(pid.into());
        self
    }

    /// Set the paint annotation
    pub fn with_paint_color(mut self, paint_color: impl Into<String>) -> Self {
        self.paint_color = Some(paint_color.into());
        self
    }

    /// All present `pid`/`p1`/`p2`/`p3` values
    pub fn reference_ids(&self) -> impl Iterator<Item = &str> {
        [&self.pid, &self.p1, &self.p2, &self.p3]
            .into_iter()
            .filter_map(|r| r.as_deref())
    }

    /// Vertex indices as an array
    pub fn indices(&self) -> [usize; 3] {
        [self.v1, self.v2, self.v3]
    }
}

/// A triangle mesh
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    /// List of vertices
    pub vertices: Vec<Vertex>,
    /// List of triangles
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new mesh with pre-allocated capacity
    pub fn with_capacity(vertices: usize, triangles: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            triangles: Vec::with_capacity(triangles),
        }
    }
}

/// A resource object from the model
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    /// Object ID (attribute value, or positional index when absent)
    pub id: String,
    /// Object name
    pub name: String,
    /// Object type (`model`, `support`, ...)
    pub object_type: String,
    /// Default property reference for triangles without their own
    pub pid: Option<String>,
    /// Mesh data, absent for component-only objects
    pub mesh: Option<Mesh>,
}

impl Object {
    /// Create a new object with default name and type
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: defaults::object_name(&id),
            id,
            object_type: defaults::DEFAULT_OBJECT_TYPE.to_string(),
            pid: None,
            mesh: None,
        }
    }

    /// Triangles of the mesh, empty when there is no mesh
    pub fn triangles(&self) -> &[Triangle] {
        self.mesh.as_ref().map_or(&[], |m| m.triangles.as_slice())
    }

    /// Number of triangles in the mesh
    pub fn triangle_count(&self) -> usize {
        self.triangles().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_ids_skips_missing() {
        let mut tri = Triangle::new(0, 1, 2).with_pid("5");
        tri.p2 = Some("7".to_string());
        let ids: Vec<&str> = tri.reference_ids().collect();
        assert_eq!(ids, vec!["5", "7"]);
    }

    #[test]
    fn test_object_defaults() {
        let obj = Object::new("3");
        assert_eq!(obj.name, "Object 3");
        assert_eq!(obj.object_type, "model");
        assert_eq!(obj.triangle_count(), 0);
    }
}
