//! Archive reading for 3MF containers
//!
//! 3MF files are ZIP archives. The only part this crate needs is the model
//! payload at a fixed path; relationships and content types are not consulted.

use crate::error::{Error, Result};
use std::io::{Cursor, Read, Seek};
use zip::ZipArchive;
use zip::result::ZipError;

/// Main 3D model file path within the 3MF archive (case-sensitive)
pub const MODEL_PATH: &str = "3D/3dmodel.model";

/// A file extracted from the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path within the archive
    pub path: String,
    /// Uncompressed payload
    pub data: Vec<u8>,
}

impl ArchiveEntry {
    /// The payload as UTF-8 text
    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.data).map_err(|e| {
            Error::InvalidXml(format!("'{}' is not valid UTF-8: {}", self.path, e))
        })
    }
}

/// An opened ZIP container
pub struct Package<R: Read> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> Package<R> {
    /// Open a package from a reader
    ///
    /// Fails with `CorruptArchive` if the central directory cannot be read.
    pub fn open(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)?;
        tracing::debug!(entries = archive.len(), "opened archive");
        Ok(Self { archive })
    }

    /// Check if a file exists in the archive
    pub fn has_file(&mut self, name: &str) -> bool {
        self.archive.by_name(name).is_ok()
    }

    /// Get the number of files in the archive
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    /// Check if the archive is empty
    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }

    /// List all file names in the archive
    pub fn file_names(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_string).collect()
    }

    /// Read a file from the archive
    ///
    /// An absent entry is `MissingModelEntry`; an entry that exists but cannot
    /// be decompressed is `CorruptArchive`.
    pub fn read_entry(&mut self, name: &str) -> Result<ArchiveEntry> {
        let mut file = self.archive.by_name(name).map_err(|e| match e {
            ZipError::FileNotFound => Error::MissingModelEntry(name.to_string()),
            other => Error::from(other),
        })?;

        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data).map_err(|e| {
            Error::CorruptArchive(format!("Failed to decompress '{}': {}", name, e))
        })?;

        Ok(ArchiveEntry {
            path: name.to_string(),
            data,
        })
    }

    /// Read the model payload at [`MODEL_PATH`]
    pub fn model_entry(&mut self) -> Result<ArchiveEntry> {
        self.read_entry(MODEL_PATH)
    }
}

/// Open a ZIP byte buffer and extract the model payload
pub fn open(bytes: &[u8]) -> Result<ArchiveEntry> {
    Package::open(Cursor::new(bytes))?.model_entry()
}
