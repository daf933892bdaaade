//! Error types for model ingestion
//!
//! Every stage returns a tagged result. Errors are terminal: no stage hands back
//! a partially decoded model alongside an error.
//!
//! # Error Codes
//!
//! Error codes follow the pattern: `E<category><number>`
//!
//! Categories:
//! - **E1xxx**: Input and archive errors
//! - **E2xxx**: XML parsing errors
//! - **E3xxx**: Geometry errors
//! - **E4xxx**: Unsupported input
//!
//! ## Error Codes
//!
//! - `E1002`: ZIP archive unreadable or truncated
//! - `E1003`: Archive has no `3D/3dmodel.model` entry
//! - `E1004`: Input exceeds the configured size ceiling
//! - `E2003`: Model payload is not well-formed XML or has no root element
//! - `E3001`: Model parsed but contains no renderable triangles
//! - `E3002`: STL bytes failed structural or numeric parsing
//! - `E4001`: File extension or content not recognized

use thiserror::Error;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding, analyzing or preparing a model
#[derive(Error, Debug)]
pub enum Error {
    /// The filename extension or byte content is not a supported model format
    ///
    /// **Error Code**: E4001
    #[error("[E4001] Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// ZIP archive error
    ///
    /// **Error Code**: E1002
    ///
    /// **Common Causes**:
    /// - Corrupted or truncated ZIP file
    /// - Unsupported compression method
    /// - A non-3MF file renamed to `.3mf`
    #[error("[E1002] Corrupt archive: {0}")]
    CorruptArchive(String),

    /// The archive is readable but has no model payload at the canonical path
    ///
    /// **Error Code**: E1003
    #[error("[E1003] Missing model entry: {0}")]
    MissingModelEntry(String),

    /// The input is larger than the configured ceiling
    ///
    /// **Error Code**: E1004
    #[error("[E1004] Input too large: {size} bytes exceeds limit of {limit} bytes")]
    InputTooLarge {
        /// Size of the rejected input
        size: usize,
        /// Configured ceiling
        limit: usize,
    },

    /// Invalid XML structure
    ///
    /// **Error Code**: E2003
    ///
    /// **Common Causes**:
    /// - Malformed XML syntax or invalid encoding
    /// - Empty document (no root element)
    /// - Non-numeric vertex coordinates or vertex indices
    #[error("[E2003] Invalid XML: {0}")]
    InvalidXml(String),

    /// Parse succeeded but nothing renderable was found
    ///
    /// **Error Code**: E3001
    ///
    /// Only the scene-building path raises this. Analysis of an empty model is
    /// a valid single-color result.
    #[error("[E3001] Empty model: {0}")]
    EmptyModel(String),

    /// STL bytes failed structural or numeric parsing
    ///
    /// **Error Code**: E3002
    ///
    /// **Common Causes**:
    /// - Unparseable floats in an ASCII `facet normal` or `vertex` line
    /// - Vertex count that is not a multiple of three
    #[error("[E3002] Malformed geometry: {0}")]
    MalformedGeometry(String),
}

/// Discriminant of an [`Error`], stable for logging and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::UnsupportedFormat`]
    UnsupportedFormat,
    /// See [`Error::CorruptArchive`]
    CorruptArchive,
    /// See [`Error::MissingModelEntry`]
    MissingModelEntry,
    /// See [`Error::InputTooLarge`]
    InputTooLarge,
    /// See [`Error::InvalidXml`]
    InvalidXml,
    /// See [`Error::EmptyModel`]
    EmptyModel,
    /// See [`Error::MalformedGeometry`]
    MalformedGeometry,
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::CorruptArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::InvalidXml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::InvalidXml(format!("Attribute parsing failed: {}", err))
    }
}

impl From<std::num::ParseFloatError> for Error {
    fn from(err: std::num::ParseFloatError) -> Self {
        Error::InvalidXml(format!("Failed to parse floating-point number: {}", err))
    }
}

impl From<std::num::ParseIntError> for Error {
    fn from(err: std::num::ParseIntError) -> Self {
        Error::InvalidXml(format!("Failed to parse integer: {}", err))
    }
}

impl Error {
    /// The kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            Error::CorruptArchive(_) => ErrorKind::CorruptArchive,
            Error::MissingModelEntry(_) => ErrorKind::MissingModelEntry,
            Error::InputTooLarge { .. } => ErrorKind::InputTooLarge,
            Error::InvalidXml(_) => ErrorKind::InvalidXml,
            Error::EmptyModel(_) => ErrorKind::EmptyModel,
            Error::MalformedGeometry(_) => ErrorKind::MalformedGeometry,
        }
    }

    /// A message safe to show to an end user
    ///
    /// The detail carried by the variant can quote file content, so it is
    /// reserved for logs. This text depends on the kind only.
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::UnsupportedFormat => "This file type is not supported. Upload an STL or 3MF file.",
            ErrorKind::CorruptArchive => "The 3MF file could not be opened. It may be damaged or incomplete.",
            ErrorKind::MissingModelEntry => "The 3MF file does not contain a 3D model.",
            ErrorKind::InputTooLarge => "The file is too large to process.",
            ErrorKind::InvalidXml => "The 3MF model data could not be read.",
            ErrorKind::EmptyModel => "The file does not contain any printable geometry.",
            ErrorKind::MalformedGeometry => "The STL file could not be read. It may be damaged.",
        }
    }

    /// Create an InvalidXml error for a missing required attribute
    ///
    /// # Example
    /// ```ignore
    /// Error::missing_attribute("triangle", "v1")
    /// ```
    pub fn missing_attribute(element: &str, attribute: &str) -> Self {
        Error::InvalidXml(format!(
            "Element '<{}>' is missing required attribute '{}'",
            element, attribute
        ))
    }

    /// Create an InvalidXml error for an attribute whose value failed to parse
    ///
    /// # Arguments
    /// * `field_name` - The name of the field being parsed (e.g., "vertex x")
    /// * `value` - The value that failed to parse
    /// * `expected_type` - The expected type (e.g., "floating-point number")
    pub fn parse_error_with_context(field_name: &str, value: &str, expected_type: &str) -> Self {
        Error::InvalidXml(format!(
            "Failed to parse '{}': expected {}, got '{}'",
            field_name, expected_type, value
        ))
    }
}
