//! Object and mesh extraction
//!
//! Reads `object` elements with their `mesh/vertices/vertex` and
//! `mesh/triangles/triangle` children from an element tree.

use crate::error::{Error, Result};
use crate::model::{Element, ElementTree, Mesh, Object, Triangle, Vertex};

/// Non-empty attribute value as an owned string
fn optional_attr(element: &Element, name: &str) -> Option<String> {
    element
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required_attr<'a>(element: &'a Element, name: &str) -> Result<&'a str> {
    element
        .attr(name)
        .ok_or_else(|| Error::missing_attribute(element.local_name(), name))
}

/// Parse vertex element attributes
pub fn parse_vertex(element: &Element) -> Result<Vertex> {
    let coordinate = |name: &str| -> Result<f64> {
        let raw = required_attr(element, name)?;
        let value = raw.trim().parse::<f64>().map_err(|_| {
            Error::parse_error_with_context(
                &format!("vertex {}", name),
                raw,
                "floating-point number",
            )
        })?;
        // Reject NaN and Infinity
        if !value.is_finite() {
            return Err(Error::InvalidXml(format!(
                "Vertex {} coordinate must be finite (got {})",
                name, value
            )));
        }
        Ok(value)
    };

    Ok(Vertex::new(coordinate("x")?, coordinate("y")?, coordinate("z")?))
}

/// Parse triangle element attributes
///
/// `v1`/`v2`/`v3` are required indices. `pid`, `p1`, `p2`, `p3` and the vendor
/// `paint_color` attribute are optional and kept verbatim.
pub fn parse_triangle(element: &Element) -> Result<Triangle> {
    let index = |name: &str| -> Result<usize> {
        let raw = required_attr(element, name)?;
        raw.trim().parse::<usize>().map_err(|_| {
            Error::parse_error_with_context(
                &format!("triangle {}", name),
                raw,
                "non-negative integer",
            )
        })
    };

    Ok(Triangle {
        v1: index("v1")?,
        v2: index("v2")?,
        v3: index("v3")?,
        pid: optional_attr(element, "pid"),
        p1: optional_attr(element, "p1"),
        p2: optional_attr(element, "p2"),
        p3: optional_attr(element, "p3"),
        paint_color: optional_attr(element, "paint_color"),
    })
}

/// Extract every `object` element, in document order
///
/// An object without an `id` attribute is identified by its position. Objects
/// without a `mesh` child (component assemblies) have `mesh: None`.
pub fn extract_objects(tree: &ElementTree) -> Result<Vec<Object>> {
    tree.elements_named("object")
        .enumerate()
        .map(|(position, (id, element))| -> Result<Object> {
            let mut object = Object::new(
                optional_attr(element, "id").unwrap_or_else(|| position.to_string()),
            );
            if let Some(name) = optional_attr(element, "name") {
                object.name = name;
            }
            if let Some(object_type) = optional_attr(element, "type") {
                object.object_type = object_type;
            }
            object.pid = optional_attr(element, "pid");

            if tree.children_named(id, "mesh").next().is_some() {
                let vertices = tree.descend(id, &["mesh", "vertices", "vertex"]);
                let triangles = tree.descend(id, &["mesh", "triangles", "triangle"]);

                let mut mesh = Mesh::with_capacity(vertices.len(), triangles.len());
                for (_, vertex) in vertices {
                    mesh.vertices.push(parse_vertex(vertex)?);
                }
                for (_, triangle) in triangles {
                    mesh.triangles.push(parse_triangle(triangle)?);
                }
                object.mesh = Some(mesh);
            }

            Ok(object)
        })
        .collect()
}
