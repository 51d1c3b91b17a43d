//! Result types produced by a conversion run.

use crate::error::FileError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A file found by discovery whose extension is in the format table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageCandidate {
    /// Absolute path (the scan root is canonical, so every child is too).
    pub path: PathBuf,
    /// Lower-cased extension without the dot.
    pub extension: String,
    /// Byte size at discovery time, when metadata was readable.
    pub size: Option<u64>,
}

impl ImageCandidate {
    /// Build a candidate from a path, lower-casing its extension.
    ///
    /// Returns `None` when the path has no UTF-8 extension.
    pub fn from_path(path: impl Into<PathBuf>, size: Option<u64>) -> Option<Self> {
        let path = path.into();
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        Some(Self {
            path,
            extension,
            size,
        })
    }
}

/// Why a candidate was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Already PNG/TIFF.
    AlreadyOk,
}

/// Outcome of processing one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ConversionResult {
    /// A new file was written.
    Converted {
        source: PathBuf,
        destination: PathBuf,
    },
    /// Dry-run only: the file would have been converted to `destination`.
    WouldConvert {
        source: PathBuf,
        destination: PathBuf,
    },
    /// Bypassed the converter.
    Skipped { source: PathBuf, reason: SkipReason },
    /// Conversion failed; the run continued.
    Failed { source: PathBuf, error: FileError },
}

impl ConversionResult {
    pub fn source(&self) -> &Path {
        match self {
            ConversionResult::Converted { source, .. }
            | ConversionResult::WouldConvert { source, .. }
            | ConversionResult::Skipped { source, .. }
            | ConversionResult::Failed { source, .. } => source,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ConversionResult::Failed { .. })
    }
}

/// Aggregate counters for one run.
///
/// Invariant: `scanned == converted + already_ok + failed`. In dry-run mode
/// `converted` counts files that *would* be converted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub scanned: usize,
    pub converted: usize,
    pub already_ok: usize,
    pub failed: usize,
    pub dry_run: bool,
    pub duration_ms: u64,
}

impl RunSummary {
    /// Fold one result into the counters.
    pub fn record(&mut self, result: &ConversionResult) {
        self.scanned += 1;
        match result {
            ConversionResult::Converted { .. } | ConversionResult::WouldConvert { .. } => {
                self.converted += 1
            }
            ConversionResult::Skipped { .. } => self.already_ok += 1,
            ConversionResult::Failed { .. } => self.failed += 1,
        }
    }

    pub fn is_balanced(&self) -> bool {
        self.scanned == self.converted + self.already_ok + self.failed
    }

    /// The final console line: `Done. scanned=N, converted=N, already_ok=N`,
    /// with `, failed=N` appended only when something failed.
    pub fn done_line(&self) -> String {
        let mut line = format!(
            "Done. scanned={}, converted={}, already_ok={}",
            self.scanned, self.converted, self.already_ok
        );
        if self.failed > 0 {
            line.push_str(&format!(", failed={}", self.failed));
        }
        line
    }
}
