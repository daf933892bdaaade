//! # printsight
//!
//! Model ingestion for 3D-print files: decodes 3MF containers and STL meshes,
//! counts the color zones a model uses, and prepares normalized geometry for a
//! preview renderer.
//!
//! Two independent paths share one parsed representation:
//!
//! - **Analysis**: how many distinct colors a model uses and how many print
//!   colors to offer ([`analyze_asset`], [`analysis`]).
//! - **Preview**: a centered, unit-scaled scene with one index-buffer range per
//!   material ([`build_scene`], [`scene`]).
//!
//! ## Features
//!
//! - Pure Rust implementation with no unsafe code
//! - 3MF archives: base materials, color groups and vendor paint colors
//! - Binary and ASCII STL
//! - Serializable diagnostic output
//!
//! ## Example
//!
//! ```no_run
//! use printsight::{Config, RawAsset, analyze_asset};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("model.3mf")?;
//! let asset = RawAsset::new("model.3mf", bytes);
//! let analysis = analyze_asset(&asset, &Config::default())?;
//!
//! let recommendation = analysis.recommendation();
//! println!("{} colors: {}", recommendation.number_of_colors, recommendation.reason);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod analysis;
pub mod config;
pub mod defaults;
pub mod error;
pub mod model;
pub mod opc;
pub mod parser;
pub mod scene;
pub mod stl;

pub use analysis::{
    AnalysisReport, AnalysisResult, AnalysisSummary, MeshSummary, ObjectRecord, Recommendation,
    analyze, analyze_geometry,
};
pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use model::{Color, Material, MaterialOrigin, Mesh, ModelDocument, Object, Triangle, Vertex};
pub use scene::{BoundingBox, IndexRange, MaterialKey, Scene, SceneGroup};
pub use stl::Geometry;

use std::path::Path;

/// An uploaded file: its declared name and raw bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAsset {
    /// Declared filename, used for format selection
    pub filename: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl RawAsset {
    /// Create an asset
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Supported model formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelFormat {
    /// STL, binary or ASCII
    Stl,
    /// 3MF container
    ThreeMf,
}

impl ModelFormat {
    /// Select the format from a filename extension, case-insensitively
    ///
    /// # Errors
    ///
    /// `UnsupportedFormat` for any extension other than `.stl` or `.3mf`.
    pub fn from_filename(filename: &str) -> Result<Self> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        if extension.eq_ignore_ascii_case("stl") {
            Ok(Self::Stl)
        } else if extension.eq_ignore_ascii_case("3mf") {
            Ok(Self::ThreeMf)
        } else {
            Err(Error::UnsupportedFormat(format!(
                "'{}' is neither a .stl nor a .3mf file",
                filename
            )))
        }
    }
}

/// A decoded model of either format
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedModel {
    /// Parsed 3MF document
    Container(ModelDocument),
    /// Decoded STL triangle soup
    Legacy(Geometry),
}

impl LoadedModel {
    /// Format this model was decoded from
    pub fn format(&self) -> ModelFormat {
        match self {
            Self::Container(_) => ModelFormat::ThreeMf,
            Self::Legacy(_) => ModelFormat::Stl,
        }
    }

    /// Analyze the model's color topology
    pub fn analyze(&self) -> AnalysisResult {
        match self {
            Self::Container(doc) => analysis::analyze(doc),
            Self::Legacy(geometry) => analysis::analyze_geometry(geometry),
        }
    }

    /// Build a normalized preview scene
    pub fn build_scene(&self, config: &Config) -> Result<Scene> {
        match self {
            Self::Container(doc) => scene::build_from_document(doc, config),
            Self::Legacy(geometry) => scene::build_from_geometry(geometry, config),
        }
    }
}

/// Select a format by filename and decode the asset
///
/// # Errors
///
/// - `InputTooLarge` when the asset exceeds [`Config::max_input_bytes`]
/// - `UnsupportedFormat` for unknown extensions or unrecognizable STL bytes
/// - any archive, XML or geometry error from the selected decoder
pub fn load(asset: &RawAsset, config: &Config) -> Result<LoadedModel> {
    if let Some(limit) = config.max_input_bytes()
        && asset.size() > limit
    {
        return Err(Error::InputTooLarge {
            size: asset.size(),
            limit,
        });
    }

    let format = ModelFormat::from_filename(&asset.filename)?;
    tracing::debug!(size = asset.size(), ?format, "loading asset");

    match format {
        ModelFormat::Stl => stl::decode(&asset.bytes).map(LoadedModel::Legacy),
        ModelFormat::ThreeMf => parser::parse_3mf(&asset.bytes).map(LoadedModel::Container),
    }
}

/// Decode an asset and analyze its color topology
pub fn analyze_asset(asset: &RawAsset, config: &Config) -> Result<AnalysisResult> {
    Ok(load(asset, config)?.analyze())
}

/// Decode an asset and build its preview scene
pub fn build_scene(asset: &RawAsset, config: &Config) -> Result<Scene> {
    load(asset, config)?.build_scene(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_filename() {
        assert_eq!(ModelFormat::from_filename("a.stl").unwrap(), ModelFormat::Stl);
        assert_eq!(ModelFormat::from_filename("A.STL").unwrap(), ModelFormat::Stl);
        assert_eq!(ModelFormat::from_filename("dir/b.3MF").unwrap(), ModelFormat::ThreeMf);

        for name in ["model.obj", "model", "stl", "model.3mf.zip"] {
            assert_eq!(
                ModelFormat::from_filename(name).unwrap_err().kind(),
                ErrorKind::UnsupportedFormat
            );
        }
    }

    #[test]
    fn test_size_limit_checked_first() {
        let asset = RawAsset::new("model.obj", vec![0u8; 16]);
        let config = Config::new().with_max_input_bytes(8);
        let err = load(&asset, &config).unwrap_err();
        assert!(matches!(err, Error::InputTooLarge { size: 16, limit: 8 }));
    }

    #[test]
    fn test_load_ascii_stl() {
        let text = "solid t\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\nvertex 1 0 0\nvertex 0 1 0\nendloop\nendfacet\nendsolid t\n";
        let model = load(&RawAsset::new("t.stl", text), &Config::default()).unwrap();
        assert_eq!(model.format(), ModelFormat::Stl);

        let analysis = model.analyze();
        assert_eq!(analysis.mesh_count(), 1);
        assert!(!analysis.supports_multi_color());
    }

    #[test]
    fn test_3mf_garbage_is_corrupt_archive() {
        let asset = RawAsset::new("model.3mf", b"not a zip".to_vec());
        assert_eq!(
            analyze_asset(&asset, &Config::default()).unwrap_err().kind(),
            ErrorKind::CorruptArchive
        );
    }
}
