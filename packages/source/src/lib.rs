#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident report file reading: decoding, tolerant XML extraction, and
//! text normalization.
//!
//! Each report file is handled independently by [`process_file`], which
//! returns either an [`ExtractedFile`] or a typed [`SourceError`]. Callers
//! pool the records of every successful file and never let a single file's
//! failure abort the batch.

pub mod decode;
pub mod extract;
pub mod normalize;
pub mod parsing;
pub mod progress;
pub mod scan;
pub mod xml;

use std::path::Path;

use incident_timeline_incident_models::RawRecord;

pub use decode::{Decoded, Decoder};
pub use extract::ExtractOptions;

/// Errors that can occur while reading a report file.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// I/O error (directory scan or file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configured encoding label is not a known WHATWG label.
    #[error("Unknown encoding label: {label}")]
    UnknownEncoding {
        /// The label as configured.
        label: String,
    },

    /// The decoder was given no candidate encodings.
    #[error("No candidate encodings configured")]
    NoEncodings,

    /// The file's markup did not contain a single recoverable element.
    #[error("No recoverable XML structure in {file}")]
    NoRecoverableStructure {
        /// Name of the offending file.
        file: String,
    },
}

/// The records read from one report file, plus how it was decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFile {
    /// File name (no directory).
    pub file_name: String,
    /// Name of the encoding the text was decoded with.
    pub encoding: &'static str,
    /// Whether every candidate failed and the lossy fallback was used.
    pub lossy: bool,
    /// One record per update element, in document order.
    pub records: Vec<RawRecord>,
}

/// Reads, decodes, and extracts a single report file.
///
/// # Errors
///
/// Returns [`SourceError::Io`] if the file cannot be read, or
/// [`SourceError::NoRecoverableStructure`] if nothing element-shaped could
/// be recovered from it.
pub fn process_file(
    path: &Path,
    decoder: &Decoder,
    options: &ExtractOptions,
) -> Result<ExtractedFile, SourceError> {
    let file_name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

    let bytes = std::fs::read(path)?;
    let decoded = decoder.decode(&bytes);

    if decoded.lossy {
        log::warn!(
            "{file_name}: no candidate encoding decoded cleanly, fell back to lossy {}",
            decoded.encoding.name()
        );
    } else {
        log::info!("{file_name}: decoded as {}", decoded.encoding.name());
    }

    let records = extract::extract_records(&decoded.text, &file_name, options)?;

    Ok(ExtractedFile {
        file_name,
        encoding: decoded.encoding.name(),
        lossy: decoded.lossy,
        records,
    })
}
