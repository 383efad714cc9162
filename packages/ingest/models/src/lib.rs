#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pipeline configuration and batch result types.

use std::path::{Path, PathBuf};
use std::time::Duration;

use incident_timeline_incident_models::{
    DEFAULT_MAX_DETAIL_CHARS, DEFAULT_MESSAGE_TAG, DEFAULT_PLACEHOLDER,
    DEFAULT_TRUNCATION_MARKER, DateOrder, FieldTags, RecordField, RepeatPolicy,
};
use serde::{Deserialize, Serialize};

/// Default directory scanned for report files.
pub const DEFAULT_INPUT_DIR: &str = "./dataset";

/// Default CSV destination.
pub const DEFAULT_OUTPUT_PATH: &str = "grouped_incidents_clean.csv";

/// Default candidate encodings, in trial order.
pub const DEFAULT_ENCODINGS: &[&str] = &["big5", "utf-8"];

/// Errors from loading or validating a [`PipelineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for this schema.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A value is well-formed but unusable.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Everything one batch run needs.
///
/// Every field has a default, so a TOML file only lists what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory scanned (non-recursively) for `*.xml` files.
    pub input_dir: PathBuf,
    /// Where the summary CSV is written.
    pub output_path: PathBuf,
    /// WHATWG encoding labels tried in order. The first is also the lossy
    /// fallback.
    pub encodings: Vec<String>,
    /// Replacement for garbled glyphs.
    pub placeholder: char,
    /// Timeline display text budget, in characters.
    pub max_detail_chars: usize,
    /// Appended after truncated display text.
    pub truncation_marker: String,
    /// Which adjacent timeline entries count as repeats.
    pub repeat_policy: RepeatPolicy,
    /// How ambiguous numeric dates are read.
    pub date_order: DateOrder,
    /// Name of the update element.
    pub message_tag: String,
    /// Source tag for each record field.
    pub tags: FieldTags,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            encodings: DEFAULT_ENCODINGS.iter().map(ToString::to_string).collect(),
            placeholder: DEFAULT_PLACEHOLDER,
            max_detail_chars: DEFAULT_MAX_DETAIL_CHARS,
            truncation_marker: DEFAULT_TRUNCATION_MARKER.to_string(),
            repeat_policy: RepeatPolicy::default(),
            date_order: DateOrder::default(),
            message_tag: DEFAULT_MESSAGE_TAG.to_string(),
            tags: FieldTags::default(),
        }
    }
}

impl PipelineConfig {
    /// Parses a configuration from TOML text, filling gaps with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the text does not parse, or
    /// [`ConfigError::Invalid`] if a value fails [`Self::validate`].
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise
    /// see [`Self::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        log::debug!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Renders the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a value cannot be represented
    /// in TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Rejects settings the pipeline cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an empty or unknown encoding
    /// list, a zero truncation budget, or a blank element tag.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.encodings.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one encoding is required".to_string(),
            ));
        }

        if let Some(label) = self
            .encodings
            .iter()
            .find(|l| encoding_rs::Encoding::for_label(l.trim().as_bytes()).is_none())
        {
            return Err(ConfigError::Invalid(format!("unknown encoding label {label:?}")));
        }

        if self.max_detail_chars == 0 {
            return Err(ConfigError::Invalid(
                "max_detail_chars must be greater than zero".to_string(),
            ));
        }

        if self.message_tag.trim().is_empty() {
            return Err(ConfigError::Invalid("message_tag must not be blank".to_string()));
        }

        if let Some(field) = RecordField::all()
            .iter()
            .find(|&&f| self.tags.tag(f).trim().is_empty())
        {
            return Err(ConfigError::Invalid(format!("tag for {field} must not be blank")));
        }

        Ok(())
    }
}

/// What one batch run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Report files found in the input directory.
    pub files_scanned: u64,
    /// Files that could not be read or held no recoverable markup.
    pub files_failed: u64,
    /// Files decoded with the lossy fallback.
    pub files_lossy: u64,
    /// Records pooled from every successful file.
    pub raw_records: u64,
    /// Records whose incident number was synthesized.
    pub synthesized_ids: u64,
    /// Records dropped for an unparsable announcement date.
    pub invalid_dates: u64,
    /// Summary rows written.
    pub incidents: u64,
    /// Where the CSV went, or `None` when nothing was written.
    pub output_path: Option<PathBuf>,
    /// Wall time of the run.
    pub elapsed: Duration,
}

impl BatchReport {
    /// Whether the run produced an output file.
    #[must_use]
    pub const fn wrote_output(&self) -> bool {
        self.output_path.is_some()
    }
}
