//! Error types for the ocrprep library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`OcrPrepError`] — **Fatal**: the run cannot start at all (scan root
//!   unset, missing, or not a directory; invalid configuration). Returned as
//!   `Err(OcrPrepError)` from [`crate::convert::run`] before any traversal.
//!
//! * [`FileError`] — **Non-fatal**: a single file could not be converted
//!   (corrupt input, no decoder compiled in, write refused). Stored inside
//!   [`crate::output::ConversionResult::Failed`] and counted in the summary;
//!   the run moves on to the next candidate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the ocrprep library.
///
/// Per-file failures use [`FileError`] and never abort a run.
#[derive(Debug, Error)]
pub enum OcrPrepError {
    // ── Configuration errors ─────────────────────────────────────────────
    /// No scan root was supplied.
    #[error(
        "WORKING_DIR is not set.\n\
Export WORKING_DIR=/absolute/path in your shell or pass --root <DIR>."
    )]
    RootNotSet,

    /// The scan root does not exist.
    #[error("WORKING_DIR does not exist: '{path}'")]
    RootNotFound { path: PathBuf },

    /// The scan root exists but is not a directory.
    #[error("WORKING_DIR is not a directory: '{path}'")]
    RootNotADirectory { path: PathBuf },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// The scan root could not be read at all.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OcrPrepError {
    /// True for errors caused by the scan-root configuration value.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            OcrPrepError::RootNotSet
                | OcrPrepError::RootNotFound { .. }
                | OcrPrepError::RootNotADirectory { .. }
                | OcrPrepError::InvalidConfig(_)
        )
    }
}

/// Coarse category of a per-file failure, used in console output and tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    UnsupportedFormatError,
    DecodeError,
    WriteError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::UnsupportedFormatError => "UnsupportedFormatError",
            ErrorKind::DecodeError => "DecodeError",
            ErrorKind::WriteError => "WriteError",
        };
        f.write_str(s)
    }
}

/// A non-fatal error for a single file.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum FileError {
    /// The extension is not in the format table, or no decoder for it is
    /// compiled into this build (HEIC/HEIF).
    #[error("'{path}': unsupported format '{extension}': {detail}")]
    UnsupportedFormat {
        path: PathBuf,
        extension: String,
        detail: String,
    },

    /// The file could not be read or decoded.
    #[error("'{path}': decode failed: {detail}")]
    Decode { path: PathBuf, detail: String },

    /// The converted image could not be encoded or written.
    #[error("'{path}': write failed: {detail}")]
    Write { path: PathBuf, detail: String },
}

impl FileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FileError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormatError,
            FileError::Decode { .. } => ErrorKind::DecodeError,
            FileError::Write { .. } => ErrorKind::WriteError,
        }
    }

    /// The path the failure is attributed to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            FileError::UnsupportedFormat { path, .. }
            | FileError::Decode { path, .. }
            | FileError::Write { path, .. } => path,
        }
    }

    /// Human-readable reason without the path prefix.
    pub fn detail(&self) -> String {
        match self {
            FileError::UnsupportedFormat {
                extension, detail, ..
            } => format!("unsupported format '{extension}': {detail}"),
            FileError::Decode { detail, .. } => detail.clone(),
            FileError::Write { detail, .. } => detail.clone(),
        }
    }
}
