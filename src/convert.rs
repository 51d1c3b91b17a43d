//! Run entry points: the per-file converter and the whole-tree orchestrator.
//!
//! [`run`] discovers every candidate first, then classifies and converts them
//! one at a time. Materialising the candidate list up front means files this
//! run creates are never picked up by the same run.
//!
//! Failures on one file are recorded as [`ConversionResult::Failed`] and the
//! loop continues; only an unusable scan root makes [`run`] return `Err`.

use crate::config::{ConversionConfig, ConversionTarget};
use crate::error::OcrPrepError;
use crate::output::{ConversionResult, ImageCandidate, RunSummary, SkipReason};
use crate::pipeline::classify::FormatClass;
use crate::pipeline::{decode, destination, discover, encode};
use crate::progress::{NoopProgressCallback, RunProgressCallback};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Scan the configured root and convert every candidate that needs it.
///
/// # Returns
/// `Ok(RunSummary)` once every candidate has been visited, even if some
/// failed (check `summary.failed`).
///
/// # Errors
/// Returns `Err(OcrPrepError)` only if the root is missing or not a
/// directory; nothing is scanned in that case.
pub fn run(config: &ConversionConfig) -> Result<RunSummary, OcrPrepError> {
    let candidates = scan(config)?;
    Ok(run_with_candidates(config, candidates))
}

/// Log target for per-file failure events.
///
/// Front ends that already report failures themselves can filter it out
/// (`ocrprep::file=off`).
pub const FILE_LOG_TARGET: &str = "ocrprep::file";

/// Discover candidates under `config.root` without classifying them.
pub fn scan(config: &ConversionConfig) -> Result<Vec<ImageCandidate>, OcrPrepError> {
    let candidates: Vec<ImageCandidate> =
        discover::discover(&config.root, &config.format_table)?.collect();
    info!(
        "Found {} candidate image files under {}",
        candidates.len(),
        config.root.display()
    );
    Ok(candidates)
}

/// Classify and convert an already-discovered candidate list.
pub fn run_with_candidates(
    config: &ConversionConfig,
    candidates: Vec<ImageCandidate>,
) -> RunSummary {
    let started = Instant::now();
    let noop = NoopProgressCallback;
    let cb: &dyn RunProgressCallback = config.progress_callback.as_deref().unwrap_or(&noop);

    let total = candidates.len();
    info!(
        "Starting {}run: {} candidates → {}",
        if config.dry_run { "dry " } else { "" },
        total,
        config.target
    );
    cb.on_run_start(&config.root, total);

    let mut summary = RunSummary {
        dry_run: config.dry_run,
        ..RunSummary::default()
    };

    for (index, candidate) in candidates.iter().enumerate() {
        cb.on_file_start(index, total, &candidate.path);
        let result = process_candidate(candidate, config);
        if let ConversionResult::Failed { error, .. } = &result {
            warn!(target: FILE_LOG_TARGET, "{} ({})", error, error.kind());
        }
        summary.record(&result);
        cb.on_file_done(index, total, &result);
    }

    summary.duration_ms = started.elapsed().as_millis() as u64;
    debug_assert!(summary.is_balanced());
    info!(
        "Run complete: scanned={} converted={} already_ok={} failed={} in {}ms",
        summary.scanned,
        summary.converted,
        summary.already_ok,
        summary.failed,
        summary.duration_ms
    );
    cb.on_run_complete(&summary);
    summary
}

/// Classify one candidate and, if needed, convert (or plan) it.
pub fn process_candidate(candidate: &ImageCandidate, config: &ConversionConfig) -> ConversionResult {
    let class = match config.format_table.classify(candidate) {
        Ok(class) => class,
        Err(error) => {
            return ConversionResult::Failed {
                source: candidate.path.clone(),
                error,
            }
        }
    };

    match class {
        FormatClass::AlreadyOk => {
            debug!("Already OCR-friendly: {}", candidate.path.display());
            ConversionResult::Skipped {
                source: candidate.path.clone(),
                reason: SkipReason::AlreadyOk,
            }
        }
        FormatClass::NeedsConversion if config.dry_run => plan_file(candidate, &config.target),
        FormatClass::NeedsConversion => convert_file(candidate, &config.target),
    }
}

/// Dry-run counterpart of [`convert_file`]: capability check and destination
/// choice only. Reads no pixel data and writes nothing.
pub fn plan_file(candidate: &ImageCandidate, target: &ConversionTarget) -> ConversionResult {
    let source = candidate.path.clone();
    let planned = decode::ensure_decodable(candidate)
        .and_then(|()| destination::free_destination(&candidate.path, target.format));
    match planned {
        Ok(destination) => ConversionResult::WouldConvert {
            source,
            destination,
        },
        Err(error) => ConversionResult::Failed { source, error },
    }
}

/// Convert one `NeedsConversion` candidate to `target`.
///
/// Decodes the source, picks the first free sibling name, and writes the
/// re-encoded image there. The source is only ever read.
pub fn convert_file(candidate: &ImageCandidate, target: &ConversionTarget) -> ConversionResult {
    let source = candidate.path.clone();
    let converted = decode::ensure_decodable(candidate)
        .and_then(|()| decode::decode(candidate))
        .and_then(|img| {
            let dest = destination::free_destination(&candidate.path, target.format)?;
            encode::write_image(&img, &dest, target)?;
            Ok(dest)
        });

    match converted {
        Ok(destination) => {
            copy_permissions(&source, &destination);
            debug!("Converted {} → {}", source.display(), destination.display());
            ConversionResult::Converted {
                source,
                destination,
            }
        }
        Err(error) => ConversionResult::Failed { source, error },
    }
}

/// Give a new output the source's permission bits (temp files start as 0600).
fn copy_permissions(source: &Path, destination: &Path) {
    let applied = std::fs::metadata(source)
        .and_then(|m| std::fs::set_permissions(destination, m.permissions()));
    if let Err(e) = applied {
        warn!(
            "Could not copy permissions to {}: {}",
            destination.display(),
            e
        );
    }
}
