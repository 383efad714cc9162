#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Batch pipeline turning a directory of incident report files into one
//! timeline summary row per incident.
//!
//! [`run_batch`] is the single entry point. It scans the input directory,
//! processes every report file independently, pools the records, groups
//! and summarizes them, and hands the rows to a [`sink::SummarySink`].
//! A file that fails is logged and skipped. Only an unreadable input
//! directory or an unwritable output aborts the run.

pub mod sink;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use incident_timeline_incident_models::{IncidentSummary, RawRecord};
use incident_timeline_source::progress::ProgressCallback;
use incident_timeline_source::{Decoder, ExtractOptions, ExtractedFile, SourceError, scan};
use incident_timeline_timeline::{BatchSummaries, TimelineOptions, build_summaries};

pub use incident_timeline_ingest_models::{BatchReport, ConfigError, PipelineConfig};

use crate::sink::{CsvSummaryWriter, SummarySink};

/// Errors that abort a batch run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// I/O error while writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The configuration is unusable.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A single report file could not be processed.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// The input directory could not be listed.
    #[error("Cannot read input directory {}: {source}", path.display())]
    InputDirectory {
        /// The configured directory.
        path: PathBuf,
        /// Why listing failed.
        source: SourceError,
    },
}

/// Extraction settings derived from `config`.
#[must_use]
pub fn extract_options(config: &PipelineConfig) -> ExtractOptions {
    ExtractOptions {
        message_tag: config.message_tag.clone(),
        tags: config.tags.clone(),
        placeholder: config.placeholder,
    }
}

/// Timeline settings derived from `config`.
#[must_use]
pub fn timeline_options(config: &PipelineConfig) -> TimelineOptions {
    TimelineOptions {
        max_detail_chars: config.max_detail_chars,
        truncation_marker: config.truncation_marker.clone(),
        repeat_policy: config.repeat_policy,
    }
}

/// Records pooled from a set of files, with per-file tallies.
#[derive(Debug, Default)]
pub struct PooledRecords {
    /// Records of every successful file, in file-then-document order.
    pub records: Vec<RawRecord>,
    /// Files that failed to read or parse.
    pub files_failed: u64,
    /// Files decoded with the lossy fallback.
    pub files_lossy: u64,
}

/// Processes each file in order and pools the records of those that
/// succeed. Failures are logged and counted, never propagated.
pub fn pool_records(
    files: &[PathBuf],
    decoder: &Decoder,
    options: &ExtractOptions,
    progress: &dyn ProgressCallback,
) -> PooledRecords {
    let mut pooled = PooledRecords::default();
    progress.set_total(files.len() as u64);

    for path in files {
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        progress.set_message(name.clone());
        log::info!("Processing {name}...");

        match incident_timeline_source::process_file(path, decoder, options) {
            Ok(ExtractedFile {
                records, lossy, ..
            }) => {
                log::info!("{name}: {} record(s)", records.len());
                if lossy {
                    pooled.files_lossy += 1;
                }
                pooled.records.extend(records);
            }
            Err(e) => {
                log::error!("Failed to process {name}: {e}");
                pooled.files_failed += 1;
            }
        }

        progress.inc(1);
    }

    progress.finish(format!("{} file(s) read", files.len()));
    pooled
}

/// Runs one full batch as described by `config`.
///
/// When no row survives (no report files, or no record with a parsable
/// date) nothing is written and the returned report has no output path.
///
/// # Errors
///
/// Returns [`PipelineError::Config`] for an invalid configuration,
/// [`PipelineError::InputDirectory`] if the input directory cannot be
/// listed, or an I/O or CSV error if the output cannot be written.
pub fn run_batch(
    config: &PipelineConfig,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<BatchReport, PipelineError> {
    let start = Instant::now();
    config.validate()?;

    let decoder = Decoder::from_labels(&config.encodings)?;
    let files = scan::list_xml_files(&config.input_dir).map_err(|source| {
        PipelineError::InputDirectory {
            path: config.input_dir.clone(),
            source,
        }
    })?;

    log::info!(
        "Found {} report file(s) in {}",
        files.len(),
        config.input_dir.display()
    );

    let pooled = pool_records(
        &files,
        &decoder,
        &extract_options(config),
        progress.as_ref(),
    );

    let raw_records = pooled.records.len() as u64;
    let synthesized_ids = pooled.records.iter().filter(|r| r.is_synthesized()).count() as u64;

    let BatchSummaries {
        summaries,
        invalid_dates,
    } = build_summaries(pooled.records, config.date_order, &timeline_options(config));

    let mut report = BatchReport {
        files_scanned: files.len() as u64,
        files_failed: pooled.files_failed,
        files_lossy: pooled.files_lossy,
        raw_records,
        synthesized_ids,
        invalid_dates: invalid_dates as u64,
        incidents: summaries.len() as u64,
        output_path: None,
        elapsed: start.elapsed(),
    };

    if summaries.is_empty() {
        log::warn!("No data found.");
        return Ok(report);
    }

    write_csv(&config.output_path, &summaries)?;

    report.output_path = Some(config.output_path.clone());
    report.elapsed = start.elapsed();

    log::info!(
        "Wrote {} incident(s) from {raw_records} row(s) to {} in {:.1}s",
        report.incidents,
        config.output_path.display(),
        report.elapsed.as_secs_f64()
    );

    Ok(report)
}

fn write_csv(path: &Path, summaries: &[IncidentSummary]) -> Result<(), PipelineError> {
    let mut writer = CsvSummaryWriter::create(path)?;
    writer.write_summaries(summaries)?;
    writer.finish()?;
    Ok(())
}

/// Decodes and extracts a single file with the settings in `config`.
///
/// # Errors
///
/// Returns [`PipelineError::Config`] for an invalid configuration or
/// [`PipelineError::Source`] if the file cannot be processed.
pub fn inspect_file(path: &Path, config: &PipelineConfig) -> Result<ExtractedFile, PipelineError> {
    config.validate()?;
    let decoder = Decoder::from_labels(&config.encodings)?;
    Ok(incident_timeline_source::process_file(
        path,
        &decoder,
        &extract_options(config),
    )?)
}
