//! Summary row output.
//!
//! Rows are written as comma-separated UTF-8 with a leading byte-order mark
//! so spreadsheet tools pick the right encoding for non-Latin text.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use incident_timeline_incident_models::{IncidentSummary, TIMESTAMP_FORMAT};
use serde::Serialize;

use crate::PipelineError;

/// UTF-8 byte-order mark.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Accepts the finished summary rows of a batch.
pub trait SummarySink {
    /// Writes every row, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows cannot be written.
    fn write_summaries(&mut self, summaries: &[IncidentSummary]) -> Result<(), PipelineError>;
}

/// One CSV row. Field order is the column order.
#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    incident_number: &'a str,
    llm_timeline: &'a str,
    first_announcement: String,
    last_announcement: String,
    duration_minutes: String,
    final_status: &'a str,
    initial_heading: &'a str,
    main_location: &'a str,
    main_direction: &'a str,
    near_landmark: &'a str,
    first_file: &'a str,
}

impl<'a> From<&'a IncidentSummary> for SummaryRow<'a> {
    fn from(summary: &'a IncidentSummary) -> Self {
        let format_ts = |ts: Option<chrono::NaiveDateTime>| {
            ts.map(|t| t.format(TIMESTAMP_FORMAT).to_string())
                .unwrap_or_default()
        };

        Self {
            incident_number: &summary.incident_id,
            llm_timeline: &summary.timeline,
            first_announcement: format_ts(summary.first_announcement),
            last_announcement: format_ts(summary.last_announcement),
            duration_minutes: format_duration(summary),
            final_status: &summary.final_status,
            initial_heading: &summary.initial_heading,
            main_location: &summary.main_location,
            main_direction: &summary.main_direction,
            near_landmark: &summary.near_landmark,
            first_file: &summary.first_file,
        }
    }
}

/// `0` for incidents with at most one update, otherwise minutes with one
/// decimal place.
#[must_use]
pub fn format_duration(summary: &IncidentSummary) -> String {
    if summary.update_count <= 1 {
        "0".to_string()
    } else {
        format!("{:.1}", summary.duration_minutes)
    }
}

/// Writes summary rows as BOM-prefixed CSV.
pub struct CsvSummaryWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvSummaryWriter<BufWriter<File>> {
    /// Creates (or truncates) the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Io`] if the file cannot be created.
    pub fn create(path: &Path) -> Result<Self, PipelineError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::new(BufWriter::new(File::create(path)?))
    }
}

impl<W: Write> CsvSummaryWriter<W> {
    /// Wraps `inner`, writing the byte-order mark immediately.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Io`] if the byte-order mark cannot be
    /// written.
    pub fn new(mut inner: W) -> Result<Self, PipelineError> {
        inner.write_all(UTF8_BOM)?;

        let writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(inner);

        Ok(Self { writer })
    }

    /// Flushes and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Io`] if the final flush fails.
    pub fn finish(self) -> Result<W, PipelineError> {
        self.writer
            .into_inner()
            .map_err(|e| PipelineError::Io(e.into_error()))
    }
}

impl<W: Write> SummarySink for CsvSummaryWriter<W> {
    fn write_summaries(&mut self, summaries: &[IncidentSummary]) -> Result<(), PipelineError> {
        for summary in summaries {
            self.writer.serialize(SummaryRow::from(summary))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
