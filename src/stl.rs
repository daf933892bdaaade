//! STL (Stereolithography) decoding
//!
//! Decodes both variants into flat triangle-soup buffers: one position
//! triplet and one normal triplet per emitted vertex, three vertices per
//! triangle, in file order. No scaling, centering or mesh validation happens
//! here.
//!
//! # Format Detection
//!
//! A buffer is binary exactly when its length equals `84 + 50 * n`, where `n`
//! is the little-endian `u32` at offset 80. Everything else is parsed as ASCII
//! when, after an optional UTF-8 byte order mark and leading whitespace, it
//! starts with `solid` or `facet`.
//!
//! # Binary Format
//!
//! ```text
//! UINT8[80]    – Header (ignored)
//! UINT32       – Number of triangles
//! foreach triangle
//!     REAL32[3] – Normal vector
//!     REAL32[3] – Vertex 1
//!     REAL32[3] – Vertex 2
//!     REAL32[3] – Vertex 3
//!     UINT16    – Attribute byte count (ignored)
//! end
//! ```
//!
//! # ASCII Format
//!
//! ```text
//! solid name
//!   facet normal ni nj nk
//!     outer loop
//!       vertex v1x v1y v1z
//!       vertex v2x v2y v2z
//!       vertex v3x v3y v3z
//!     endloop
//!   endfacet
//! endsolid name
//! ```

use crate::error::{Error, Result};

/// STL binary header size in bytes
pub const HEADER_SIZE: usize = 80;

/// Size of one triangle in binary STL (normal + 3 vertices + attribute)
pub const TRIANGLE_SIZE: usize = 50;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Triangle-soup geometry decoded from an STL file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Geometry {
    /// Vertex positions, `x y z` per vertex
    pub positions: Vec<f32>,
    /// Per-vertex normals, the facet normal repeated for each of its vertices
    pub normals: Vec<f32>,
}

impl Geometry {
    /// Create geometry with room for `triangles` triangles
    pub fn with_capacity(triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(triangles * 9),
            normals: Vec::with_capacity(triangles * 9),
        }
    }

    /// Number of emitted vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 9
    }

    /// Whether there is no geometry at all
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn push_vertex(&mut self, position: [f32; 3], normal: [f32; 3]) {
        self.positions.extend_from_slice(&position);
        self.normals.extend_from_slice(&normal);
    }
}

/// Triangle count declared in a binary header, if the buffer is long enough
fn declared_triangle_count(bytes: &[u8]) -> Option<u32> {
    let count = bytes.get(HEADER_SIZE..HEADER_SIZE + 4)?;
    Some(u32::from_le_bytes([count[0], count[1], count[2], count[3]]))
}

/// Whether the buffer is a binary STL
///
/// Requires the exact length `84 + 50 * n` for the declared count `n`.
pub fn is_binary(bytes: &[u8]) -> bool {
    match declared_triangle_count(bytes) {
        Some(count) => {
            let expected = (HEADER_SIZE as u64 + 4) + TRIANGLE_SIZE as u64 * u64::from(count);
            bytes.len() as u64 == expected
        }
        None => false,
    }
}

/// Decode an STL buffer
///
/// # Errors
///
/// - `MalformedGeometry` for input that starts like STL text but is not UTF-8,
///   has unparseable numbers or ends in an incomplete triangle
/// - `UnsupportedFormat` for bytes that are neither binary STL nor STL text
pub fn decode(bytes: &[u8]) -> Result<Geometry> {
    if is_binary(bytes) {
        let geometry = decode_binary(bytes);
        tracing::debug!(
            triangles = geometry.triangle_count(),
            "decoded binary STL"
        );
        return Ok(geometry);
    }

    let body = ascii_body(bytes).ok_or_else(|| {
        Error::UnsupportedFormat(
            "bytes are neither a length-consistent binary STL nor STL text".to_string(),
        )
    })?;
    let text = std::str::from_utf8(body).map_err(|e| {
        Error::MalformedGeometry(format!(
            "STL text is not valid UTF-8 at byte {}",
            e.valid_up_to()
        ))
    })?;

    let geometry = decode_ascii(text)?;
    tracing::debug!(
        triangles = geometry.triangle_count(),
        "decoded ASCII STL"
    );
    Ok(geometry)
}

/// The buffer without a leading byte order mark, if it starts with an ASCII
/// STL keyword
fn ascii_body(bytes: &[u8]) -> Option<&[u8]> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let head = body.trim_ascii_start();
    let starts_with = |keyword: &[u8]| {
        head.get(..keyword.len())
            .is_some_and(|h| h.eq_ignore_ascii_case(keyword))
    };
    (starts_with(b"solid") || starts_with(b"facet")).then_some(body)
}

/// Read three little-endian f32s from 12 bytes
fn read_vec3(buf: &[u8]) -> [f32; 3] {
    let f = |i: usize| f32::from_le_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]);
    [f(0), f(4), f(8)]
}

/// Decode a buffer already known to satisfy [`is_binary`]
fn decode_binary(bytes: &[u8]) -> Geometry {
    let body = &bytes[HEADER_SIZE + 4..];
    let mut geometry = Geometry::with_capacity(body.len() / TRIANGLE_SIZE);

    for triangle in body.chunks_exact(TRIANGLE_SIZE) {
        let normal = read_vec3(&triangle[0..12]);
        geometry.push_vertex(read_vec3(&triangle[12..24]), normal);
        geometry.push_vertex(read_vec3(&triangle[24..36]), normal);
        geometry.push_vertex(read_vec3(&triangle[36..48]), normal);
        // Bytes 48..50 are the attribute byte count, ignored
    }

    geometry
}

/// Parse three floats following a keyword
fn parse_triplet(parts: &[&str], line_number: usize, what: &str) -> Result<[f32; 3]> {
    if parts.len() < 3 {
        return Err(Error::MalformedGeometry(format!(
            "line {}: {} needs three coordinates, found {}",
            line_number,
            what,
            parts.len()
        )));
    }

    let mut out = [0.0f32; 3];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part.parse::<f32>().map_err(|_| {
            Error::MalformedGeometry(format!(
                "line {}: {} coordinate '{}' is not a number",
                line_number, what, part
            ))
        })?;
    }
    Ok(out)
}

/// Decode ASCII STL text
///
/// A `facet normal` line sets the current normal; every `vertex` line emits a
/// position paired with that normal. Other lines (`outer loop`, `endloop`,
/// `endfacet`, `endsolid`) carry no data.
fn decode_ascii(text: &str) -> Result<Geometry> {
    let mut geometry = Geometry::default();
    let mut normal = [0.0f32; 3];

    for (index, line) in text.lines().enumerate() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(keyword) = parts.first() else {
            continue;
        };

        if keyword.eq_ignore_ascii_case("facet")
            && parts.get(1).is_some_and(|p| p.eq_ignore_ascii_case("normal"))
        {
            normal = parse_triplet(&parts[2..], index + 1, "facet normal")?;
        } else if keyword.eq_ignore_ascii_case("vertex") {
            let position = parse_triplet(&parts[1..], index + 1, "vertex")?;
            geometry.push_vertex(position, normal);
        }
    }

    if geometry.vertex_count() % 3 != 0 {
        return Err(Error::MalformedGeometry(format!(
            "{} vertices do not form whole triangles",
            geometry.vertex_count()
        )));
    }

    Ok(geometry)
}
