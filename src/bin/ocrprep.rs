//! CLI binary for ocrprep.
//!
//! A thin shim over the library crate that maps CLI flags and environment
//! variables to `ConversionConfig` and prints the console report.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use ocrprep::config::{MAX_DPI, MIN_DPI};
use ocrprep::convert::FILE_LOG_TARGET;
use ocrprep::pipeline::discover::count_files;
use ocrprep::{
    run_with_candidates, scan, ConversionConfig, ConversionResult, ConversionTarget,
    OutputFormat, ProgressCallback, RunProgressCallback, RunSummary,
};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal reporter: a progress bar on stderr plus the per-file status lines.
///
/// Status lines go to stdout (verbose only); failure lines always go to
/// stderr. Both are printed with the bar suspended so they never interleave
/// with it.
struct CliReporter {
    bar: ProgressBar,
    verbose: bool,
    target: ConversionTarget,
    color: bool,
}

impl CliReporter {
    fn new(show_progress: bool, verbose: bool, target: ConversionTarget) -> Arc<Self> {
        let bar = if show_progress {
            ProgressBar::new(0)
        } else {
            ProgressBar::hidden()
        };
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>4}/{len} files  {wide_msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Converting");

        Arc::new(Self {
            bar,
            verbose,
            target,
            color: io::stderr().is_terminal(),
        })
    }

    fn status(&self, line: String) {
        if self.verbose {
            self.bar.suspend(|| println!("{line}"));
        }
    }

    fn failure(&self, line: String) {
        let line = if self.color { red(&line) } else { line };
        self.bar.suspend(|| eprintln!("{line}"));
    }
}

impl RunProgressCallback for CliReporter {
    fn on_run_start(&self, _root: &Path, candidates: usize) {
        self.bar.set_length(candidates as u64);
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn on_file_start(&self, _index: usize, _total: usize, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar.set_message(if self.color { dim(&name) } else { name });
    }

    fn on_file_done(&self, _index: usize, _total: usize, result: &ConversionResult) {
        match result {
            ConversionResult::Skipped { source, .. } => {
                self.status(format!("SKIP (already OCR-friendly): {}", source.display()))
            }
            ConversionResult::Converted {
                source,
                destination,
            } => self.status(format!(
                "CONVERTED: {} -> {}",
                source.display(),
                destination.display()
            )),
            ConversionResult::WouldConvert { source, .. } => self.status(format!(
                "CONVERT (dry-run): {} -> {}",
                source.display(),
                self.target
            )),
            ConversionResult::Failed { source, error } => self.failure(format!(
                "FAILED ({}): {}: {}",
                error.kind(),
                source.display(),
                error.detail()
            )),
        }
        self.bar.inc(1);
    }

    fn on_run_complete(&self, _summary: &RunSummary) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert everything under WORKING_DIR to 300-DPI PNG
  WORKING_DIR=~/scans ocrprep

  # Same, naming the directory explicitly and listing every file
  ocrprep --root ~/scans --verbose

  # TIFF output instead of PNG
  ocrprep --root ~/scans --format tiff

  # See what would happen without writing anything
  ocrprep --root ~/scans --dry-run --verbose

  # Machine-readable summary
  ocrprep --root ~/scans --json

INPUT FORMATS:
  Already OCR-friendly (left alone):  png, tif, tiff
  Converted:                          jpg, jpeg, bmp, webp
  Discovered but unsupported here:    heic, heif  (reported as failures)

OUTPUT NAMING:
  photo.jpg → photo.png; if photo.png exists → photo (1).png, photo (2).png, …
  Existing files are never overwritten, sources are never modified.

ENVIRONMENT VARIABLES:
  WORKING_DIR      Directory to scan (same as --root)
  OCRPREP_FORMAT   Output format: png or tiff
  OCRPREP_DPI      Resolution written to converted files
  RUST_LOG         Override log filter (e.g. ocrprep=debug)

EXIT STATUS:
  0  the scan completed (individual files may still have failed)
  1  configuration error: WORKING_DIR unset, missing, or not a directory
"#;

/// Convert images under a directory to OCR-friendly PNG/TIFF at a fixed DPI.
#[derive(Parser, Debug)]
#[command(
    name = "ocrprep",
    version,
    about = "Convert images under a directory to OCR-friendly PNG/TIFF at a fixed DPI",
    long_about = "Recursively scan a directory for raster images. PNG and TIFF files are \
left alone; JPEG, BMP and WebP files are re-encoded next to the original as PNG or TIFF \
with a 300-DPI resolution tag. Existing files are never overwritten.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory to scan.
    #[arg(long, env = "WORKING_DIR")]
    root: Option<PathBuf>,

    /// Output format.
    #[arg(long, env = "OCRPREP_FORMAT", value_enum, default_value = "png", ignore_case = true)]
    format: FormatArg,

    /// Resolution written to converted files (72–1200).
    #[arg(long, env = "OCRPREP_DPI", default_value_t = ocrprep::DEFAULT_DPI,
          value_parser = clap::value_parser!(u32).range(i64::from(MIN_DPI)..=i64::from(MAX_DPI)))]
    dpi: u32,

    /// Only list actions; write nothing.
    #[arg(short = 'n', long, env = "OCRPREP_DRY_RUN")]
    dry_run: bool,

    /// Print a status line per file plus DEBUG-level logs.
    #[arg(short, long, env = "OCRPREP_VERBOSE")]
    verbose: bool,

    /// Print the run summary as JSON instead of the `Done.` line.
    ///
    /// Stdout then carries only the JSON document; `--verbose` still raises
    /// the log level but no status lines are printed.
    #[arg(long)]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "OCRPREP_NO_PROGRESS")]
    no_progress: bool,

    /// Suppress everything except failures and the summary.
    #[arg(short, long, env = "OCRPREP_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Png,
    Tiff,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Png => OutputFormat::Png,
            FormatArg::Tiff => OutputFormat::Tiff,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && io::stderr().is_terminal();
    // Status lines share stdout with the `Done.` line, so they are off for --json.
    let status_lines = cli.verbose && !cli.quiet && !cli.json;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(default_log_filter(cli.verbose, cli.quiet, show_progress))
        }))
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let target = ConversionTarget {
        format: cli.format.into(),
        dpi: cli.dpi,
    };
    let reporter = CliReporter::new(show_progress, status_lines, target);
    let config = build_config(&cli, Arc::clone(&reporter) as ProgressCallback)
        .context("Configuration error")?;

    // ── Discover ─────────────────────────────────────────────────────────
    let candidates = scan(&config).context("Configuration error")?;

    if status_lines {
        let total_files = count_files(&config.root).context("Failed to count files")?;
        println!("WORKING_DIR={}", config.root.display());
        println!(
            "Found {} files; {} candidate image files",
            total_files,
            candidates.len()
        );
        if candidates.is_empty() {
            let exts: Vec<String> = config
                .format_table
                .supported_extensions()
                .map(|e| format!(".{e}"))
                .collect();
            println!(
                "No candidate images found. Supported input extensions: {}",
                exts.join(", ")
            );
        }
    }

    // ── Run ──────────────────────────────────────────────────────────────
    let summary = run_with_candidates(&config, candidates);

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else {
        println!("{}", summary.done_line());
    }

    Ok(())
}

/// Log filter used when `RUST_LOG` is not set.
///
/// Per-file failures are always printed by [`CliReporter`], so their log
/// target is switched off to avoid reporting each one twice.
fn default_log_filter(verbose: bool, quiet: bool, show_progress: bool) -> String {
    let level = if verbose {
        "debug"
    } else if quiet || show_progress {
        "error"
    } else {
        "info"
    };
    format!("{level},{FILE_LOG_TARGET}=off")
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: ProgressCallback) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .format(cli.format.into())
        .dpi(cli.dpi)
        .dry_run(cli.dry_run)
        .progress_callback(progress);

    if let Some(ref root) = cli.root {
        builder = builder.root(root);
    }

    Ok(builder.build()?)
}
