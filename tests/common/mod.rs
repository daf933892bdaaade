//! Shared fixtures for integration tests
//!
//! Builds 3MF containers and STL buffers in memory so tests never touch disk.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const CONTENT_TYPES: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="model" ContentType="application/vnd.ms-package.3dmanufacturing-3dmodel+xml"/>
</Types>"##;

pub const RELS: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Target="/3D/3dmodel.model" Id="rel0" Type="http://schemas.microsoft.com/3dmanufacturing/2013/01/3dmodel"/>
</Relationships>"##;

/// Zip the given entries, in order
pub fn zip_entries(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut buffer = Vec::new();
    let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
    let options = SimpleFileOptions::default();

    for (name, contents) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(contents.as_bytes()).unwrap();
    }

    zip.finish().unwrap();
    buffer
}

/// A complete 3MF container around a model payload
pub fn create_3mf(model_xml: &str) -> Vec<u8> {
    zip_entries(&[
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", RELS),
        ("3D/3dmodel.model", model_xml),
    ])
}

/// Wrap resources in a `model` root
pub fn model_xml(resources: &str) -> String {
    format!(
        r##"<?xml version="1.0" encoding="UTF-8"?>
<model unit="millimeter" xml:lang="en-US" xmlns="http://schemas.microsoft.com/3dmanufacturing/core/2015/02" xmlns:m="http://schemas.microsoft.com/3dmanufacturing/material/2015/02">
  <resources>
{}
  </resources>
  <build/>
</model>"##,
        resources
    )
}

/// An object element holding a tetrahedron, one `triangle` per attribute string
///
/// Each entry of `triangle_attrs` is extra attribute text for one face, e.g.
/// `pid="1"` or `paint_color="4"`. At most four faces are emitted.
pub fn tetra_object(id: usize, offset: f64, triangle_attrs: &[&str]) -> String {
    let faces = [(0, 1, 2), (0, 1, 3), (1, 2, 3), (2, 0, 3)];
    let triangles: String = faces
        .iter()
        .zip(triangle_attrs)
        .map(|((a, b, c), attrs)| {
            format!(
                r#"          <triangle v1="{}" v2="{}" v3="{}" {}/>"#,
                a, b, c, attrs
            ) + "\n"
        })
        .collect();

    format!(
        r#"    <object id="{id}" type="model">
      <mesh>
        <vertices>
          <vertex x="{x0}" y="0" z="0"/>
          <vertex x="{x1}" y="0" z="0"/>
          <vertex x="{x2}" y="10" z="0"/>
          <vertex x="{x2}" y="5" z="10"/>
        </vertices>
        <triangles>
{triangles}        </triangles>
      </mesh>
    </object>"#,
        id = id,
        x0 = offset,
        x1 = offset + 10.0,
        x2 = offset + 5.0,
        triangles = triangles,
    )
}

/// A binary STL with the given `(normal, [v1, v2, v3])` facets
pub fn binary_stl(triangles: &[([f32; 3], [[f32; 3]; 3])]) -> Vec<u8> {
    let mut data = vec![0u8; 80];
    data.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
    for (normal, vertices) in triangles {
        for v in std::iter::once(normal).chain(vertices.iter()) {
            for c in v {
                data.extend_from_slice(&c.to_le_bytes());
            }
        }
        data.extend_from_slice(&0u16.to_le_bytes());
    }
    data
}

/// A binary STL of a unit cube's twelve facets
pub fn cube_stl(size: f32) -> Vec<u8> {
    let s = size;
    let p = |x: f32, y: f32, z: f32| [x * s, y * s, z * s];
    let quads = [
        ([0.0, 0.0, -1.0], [p(0., 0., 0.), p(0., 1., 0.), p(1., 1., 0.), p(1., 0., 0.)]),
        ([0.0, 0.0, 1.0], [p(0., 0., 1.), p(1., 0., 1.), p(1., 1., 1.), p(0., 1., 1.)]),
        ([0.0, -1.0, 0.0], [p(0., 0., 0.), p(1., 0., 0.), p(1., 0., 1.), p(0., 0., 1.)]),
        ([0.0, 1.0, 0.0], [p(0., 1., 0.), p(0., 1., 1.), p(1., 1., 1.), p(1., 1., 0.)]),
        ([-1.0, 0.0, 0.0], [p(0., 0., 0.), p(0., 0., 1.), p(0., 1., 1.), p(0., 1., 0.)]),
        ([1.0, 0.0, 0.0], [p(1., 0., 0.), p(1., 1., 0.), p(1., 1., 1.), p(1., 0., 1.)]),
    ];

    let facets: Vec<([f32; 3], [[f32; 3]; 3])> = quads
        .iter()
        .flat_map(|(n, [a, b, c, d])| [(*n, [*a, *b, *c]), (*n, [*a, *c, *d])])
        .collect();
    binary_stl(&facets)
}
