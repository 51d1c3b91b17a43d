//! Classification: decide from the extension alone whether a file is already
//! OCR-friendly.
//!
//! The mapping lives in an explicit [`FormatTable`] value rather than inline
//! `match` arms so discovery and classification always agree and callers can
//! extend it (e.g. treat `pbm` as already OK) without touching the pipeline.
//! File content is never inspected here.

use crate::error::FileError;
use crate::output::ImageCandidate;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Two-valued classification of a supported extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatClass {
    /// PNG/TIFF: left untouched.
    AlreadyOk,
    /// Any other supported raster format.
    NeedsConversion,
}

/// Extensions that are already OCR-friendly containers.
pub const ALREADY_OK_EXTENSIONS: &[&str] = &["png", "tif", "tiff"];

/// Supported extensions that must be converted.
pub const NEEDS_CONVERSION_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "bmp", "webp", "heic", "heif"];

/// The built-in table: `ALREADY_OK_EXTENSIONS` + `NEEDS_CONVERSION_EXTENSIONS`.
pub static DEFAULT_FORMAT_TABLE: Lazy<FormatTable> = Lazy::new(|| {
    let ok = ALREADY_OK_EXTENSIONS
        .iter()
        .map(|e| (*e, FormatClass::AlreadyOk));
    let convert = NEEDS_CONVERSION_EXTENSIONS
        .iter()
        .map(|e| (*e, FormatClass::NeedsConversion));
    FormatTable::from_entries(ok.chain(convert))
});

/// Lower-cased extension → [`FormatClass`]. Absent extensions are unsupported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatTable {
    entries: BTreeMap<String, FormatClass>,
}

impl Default for FormatTable {
    fn default() -> Self {
        DEFAULT_FORMAT_TABLE.clone()
    }
}

impl FormatTable {
    /// An empty table; every extension is unsupported.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, FormatClass)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(ext, class)| (normalise(ext), class))
                .collect(),
        }
    }

    /// Add or replace one entry.
    pub fn with_entry(mut self, extension: &str, class: FormatClass) -> Self {
        self.entries.insert(normalise(extension), class);
        self
    }

    /// Pure lookup; case-insensitive, leading dot ignored.
    pub fn class_of(&self, extension: &str) -> Option<FormatClass> {
        self.entries.get(&normalise(extension)).copied()
    }

    pub fn is_supported(&self, extension: &str) -> bool {
        self.class_of(extension).is_some()
    }

    /// All supported extensions in sorted order.
    pub fn supported_extensions(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Classify a discovered candidate.
    ///
    /// An extension missing from the table is a per-file
    /// [`FileError::UnsupportedFormat`], never a fatal error.
    pub fn classify(&self, candidate: &ImageCandidate) -> Result<FormatClass, FileError> {
        self.class_of(&candidate.extension)
            .ok_or_else(|| FileError::UnsupportedFormat {
                path: candidate.path.clone(),
                extension: candidate.extension.clone(),
                detail: "extension is not in the supported format table".into(),
            })
    }
}

fn normalise(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}
