//! Configuration types for a conversion run.
//!
//! All run behaviour is controlled through [`ConversionConfig`], built via its
//! [`ConversionConfigBuilder`]. The scan root is resolved exactly once, in
//! [`resolve_root`], and then carried in the config; no pipeline stage reads
//! the environment on its own.

use crate::error::OcrPrepError;
use crate::pipeline::classify::FormatTable;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable holding the scan root.
pub const WORKING_DIR_ENV: &str = "WORKING_DIR";

/// Resolution written into every converted file unless overridden.
pub const DEFAULT_DPI: u32 = 300;

/// Accepted DPI range for [`ConversionConfigBuilder::dpi`].
pub const MIN_DPI: u32 = 72;
pub const MAX_DPI: u32 = 1200;

/// Configuration for one conversion run.
///
/// # Example
/// ```rust,no_run
/// use ocrprep::{ConversionConfig, OutputFormat};
///
/// let config = ConversionConfig::builder()
///     .root("/data/scans")
///     .format(OutputFormat::Tiff)
///     .dry_run(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.target.dpi, 300);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Canonical, existing directory to scan.
    pub root: PathBuf,

    /// Output encoding and resolution, constant for the whole run.
    pub target: ConversionTarget,

    /// Classify and report only; never decode, encode, or write. Default: false.
    pub dry_run: bool,

    /// Extension → class mapping used by both discovery and classification.
    pub format_table: FormatTable,

    /// Optional per-file event sink (progress bars, status lines).
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("root", &self.root)
            .field("target", &self.target)
            .field("dry_run", &self.dry_run)
            .field("format_table", &self.format_table)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn RunProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder::default()
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Default)]
pub struct ConversionConfigBuilder {
    root: Option<String>,
    format: OutputFormat,
    dpi: Option<u32>,
    dry_run: bool,
    format_table: Option<FormatTable>,
    progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for ConversionConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfigBuilder")
            .field("root", &self.root)
            .field("format", &self.format)
            .field("dpi", &self.dpi)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl ConversionConfigBuilder {
    /// Raw scan-root value; resolved and validated in [`Self::build`].
    pub fn root(mut self, root: impl AsRef<Path>) -> Self {
        self.root = Some(root.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Take the scan root from [`WORKING_DIR_ENV`]. Leaves the root unset if
    /// the variable is missing, so [`Self::build`] reports `RootNotSet`.
    pub fn root_from_env(mut self) -> Self {
        self.root = std::env::var(WORKING_DIR_ENV).ok();
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.dpi = Some(dpi);
        self
    }

    pub fn dry_run(mut self, v: bool) -> Self {
        self.dry_run = v;
        self
    }

    pub fn format_table(mut self, table: FormatTable) -> Self {
        self.format_table = Some(table);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// Fails with a configuration error when the root is unset, missing, or
    /// not a directory, or when the DPI is outside `MIN_DPI..=MAX_DPI`.
    pub fn build(self) -> Result<ConversionConfig, OcrPrepError> {
        let dpi = self.dpi.unwrap_or(DEFAULT_DPI);
        if !(MIN_DPI..=MAX_DPI).contains(&dpi) {
            return Err(OcrPrepError::InvalidConfig(format!(
                "DPI must be {MIN_DPI}–{MAX_DPI}, got {dpi}"
            )));
        }

        let root = resolve_root(self.root.as_deref())?;

        Ok(ConversionConfig {
            root,
            target: ConversionTarget {
                format: self.format,
                dpi,
            },
            dry_run: self.dry_run,
            format_table: self.format_table.unwrap_or_default(),
            progress_callback: self.progress_callback,
        })
    }
}

/// Turn a raw scan-root value into a canonical directory path.
///
/// The value is trimmed and a leading `~` is expanded from `HOME`. An unset
/// or blank value is `RootNotSet`.
pub fn resolve_root(raw: Option<&str>) -> Result<PathBuf, OcrPrepError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(OcrPrepError::RootNotSet);
    }

    let path = expand_home(raw);
    if !path.exists() {
        return Err(OcrPrepError::RootNotFound { path });
    }
    if !path.is_dir() {
        return Err(OcrPrepError::RootNotADirectory { path });
    }

    path.canonicalize()
        .map_err(|source| OcrPrepError::Io { path, source })
}

fn expand_home(raw: &str) -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    match (raw, home) {
        ("~", Some(home)) => home,
        (s, Some(home)) if s.starts_with("~/") => home.join(&s[2..]),
        (s, _) => PathBuf::from(s),
    }
}

// ── Target ───────────────────────────────────────────────────────────────

/// OCR-friendly container written for every converted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Lossless PNG with a `pHYs` chunk. (default)
    #[default]
    Png,
    /// Deflate-compressed TIFF with X/Y resolution tags.
    Tiff,
}

impl OutputFormat {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Tiff => "tiff",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Png => "PNG",
            OutputFormat::Tiff => "TIFF",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = OcrPrepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "tif" | "tiff" => Ok(OutputFormat::Tiff),
            other => Err(OcrPrepError::InvalidConfig(format!(
                "Unknown output format '{other}' (expected PNG or TIFF)"
            ))),
        }
    }
}

/// Requested output encoding and resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionTarget {
    pub format: OutputFormat,
    /// Dots per inch, written to both axes.
    pub dpi: u32,
}

impl Default for ConversionTarget {
    fn default() -> Self {
        Self {
            format: OutputFormat::Png,
            dpi: DEFAULT_DPI,
        }
    }
}

impl fmt::Display for ConversionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}DPI", self.format, self.dpi)
    }
}
