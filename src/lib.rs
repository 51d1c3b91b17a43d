//! # ocrprep
//!
//! Walk a directory tree and make sure every raster image in it has an
//! OCR-friendly sibling: PNG or TIFF with a resolution tag (300 DPI by
//! default). JPEG, BMP, WebP and friends are re-encoded next to the original;
//! PNG and TIFF files are left alone. Nothing is ever overwritten or deleted.
//!
//! ## Pipeline Overview
//!
//! ```text
//! WORKING_DIR
//!  │
//!  ├─ 1. Discover  recursive walk, lexical order, supported extensions only
//!  ├─ 2. Classify  png/tif/tiff → AlreadyOk, everything else → NeedsConversion
//!  ├─ 3. Decode    capability check, decode, apply EXIF orientation
//!  ├─ 4. Name      photo.jpg → photo.png, or photo (1).png if taken
//!  ├─ 5. Encode    PNG pHYs / TIFF XResolution, create-only write
//!  └─ 6. Tally     scanned = converted + already_ok + failed
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ocrprep::{run, ConversionConfig, OutputFormat};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .root_from_env()
//!         .format(OutputFormat::Png)
//!         .build()?;
//!     let summary = run(&config)?;
//!     println!("{}", summary.done_line());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ocrprep` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! HEIC/HEIF files are discovered but have no decoder in this build; they are
//! reported as `UnsupportedFormatError` failures rather than attempted.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    resolve_root, ConversionConfig, ConversionConfigBuilder, ConversionTarget, OutputFormat,
    DEFAULT_DPI, WORKING_DIR_ENV,
};
pub use convert::{convert_file, plan_file, process_candidate, run, run_with_candidates, scan};
pub use error::{ErrorKind, FileError, OcrPrepError};
pub use output::{ConversionResult, ImageCandidate, RunSummary, SkipReason};
pub use pipeline::classify::{FormatClass, FormatTable};
pub use progress::{NoopProgressCallback, ProgressCallback, RunProgressCallback};
