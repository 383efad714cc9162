//! Update element extraction.
//!
//! Reads every update element directly under the document root and maps
//! its children onto a [`RawRecord`] through the [`FieldTags`] lookup
//! table. Missing children become empty strings. Blank incident numbers
//! are replaced with a `MISSING_ID_<file>` placeholder.

use incident_timeline_incident_models::{
    DEFAULT_MESSAGE_TAG, DEFAULT_PLACEHOLDER, FieldTags, IdentifierOrigin, RawRecord, RecordField,
    synthesized_id,
};

use crate::SourceError;
use crate::normalize::normalize_text;
use crate::xml::{XmlNode, parse_lenient};

/// What to extract and how to clean it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Name of the update element.
    pub message_tag: String,
    /// Child tag for each record field.
    pub tags: FieldTags,
    /// Placeholder for garbled glyphs.
    pub placeholder: char,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            message_tag: DEFAULT_MESSAGE_TAG.to_string(),
            tags: FieldTags::default(),
            placeholder: DEFAULT_PLACEHOLDER,
        }
    }
}

/// Extracts one [`RawRecord`] per update element in `text`.
///
/// # Errors
///
/// Returns [`SourceError::NoRecoverableStructure`] when no element at all
/// can be recovered from `text`. A document with a root but no update
/// elements yields an empty list instead.
pub fn extract_records(
    text: &str,
    file_name: &str,
    options: &ExtractOptions,
) -> Result<Vec<RawRecord>, SourceError> {
    let root = parse_lenient(text).ok_or_else(|| SourceError::NoRecoverableStructure {
        file: file_name.to_string(),
    })?;

    Ok(root
        .children_named(&options.message_tag)
        .map(|message| extract_record(message, file_name, options))
        .collect())
}

fn extract_record(message: &XmlNode, file_name: &str, options: &ExtractOptions) -> RawRecord {
    let mut record = RawRecord::new(file_name);

    for &field in RecordField::all() {
        let raw = message.child_text(options.tags.tag(field)).unwrap_or_default();
        *record.field_mut(field) = normalize_text(raw, options.placeholder);
    }

    if record.incident_id.is_empty() {
        record.incident_id = synthesized_id(file_name);
        record.id_origin = IdentifierOrigin::Synthesized;
        log::info!(
            "{file_name}: update without incident number, using {}",
            record.incident_id
        );
    }

    record
}
