#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident update record, grouping, and summary types.
//!
//! Every report file is reduced to [`RawRecord`]s, one per update element.
//! Records whose announcement date parses become [`ParsedRecord`]s, which
//! are partitioned into [`IncidentGroup`]s and finally reduced to one
//! [`IncidentSummary`] row per incident.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Prefix of identifiers synthesized for updates that carry no incident
/// number.
pub const MISSING_ID_PREFIX: &str = "MISSING_ID_";

/// Canonical `strftime` layout for timestamps in timelines and output rows.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default name of the repeated update element.
pub const DEFAULT_MESSAGE_TAG: &str = "message";

/// Default placeholder substituted for garbled glyphs.
pub const DEFAULT_PLACEHOLDER: char = '?';

/// Default maximum timeline display text length, in characters.
pub const DEFAULT_MAX_DETAIL_CHARS: usize = 800;

/// Default marker appended to truncated display text.
pub const DEFAULT_TRUNCATION_MARKER: &str = "... [truncated]";

/// Builds the deterministic placeholder identifier for an update from
/// `file_name` that has no incident number.
#[must_use]
pub fn synthesized_id(file_name: &str) -> String {
    format!("{MISSING_ID_PREFIX}{file_name}")
}

/// Whether an incident identifier came from the source file or was
/// substituted.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentifierOrigin {
    /// The update element carried a non-blank incident number.
    #[default]
    Reported,
    /// The incident number was absent or blank and a `MISSING_ID_<file>`
    /// placeholder was substituted.
    Synthesized,
}

/// The fixed set of fields read from every update element.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecordField {
    /// Key used to merge updates across files.
    IncidentNumber,
    /// Short incident heading.
    Heading,
    /// Longer free-text detail.
    Detail,
    /// Road or place name.
    Location,
    /// Traffic direction.
    Direction,
    /// Per-update timestamp, unparsed.
    AnnouncementDate,
    /// Incident status at the time of the update.
    Status,
    /// Nearby landmark.
    NearLandmark,
    /// Full update content.
    Content,
}

impl RecordField {
    /// Returns all variants of this enum, in extraction order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::IncidentNumber,
            Self::Heading,
            Self::Detail,
            Self::Location,
            Self::Direction,
            Self::AnnouncementDate,
            Self::Status,
            Self::NearLandmark,
            Self::Content,
        ]
    }
}

/// Lookup table mapping each [`RecordField`] to the child tag it is read
/// from.
///
/// Defaults to the English-language tags of the incident feed. Any tag may
/// be overridden from configuration, e.g. to read the Chinese variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldTags {
    /// Tag for [`RecordField::IncidentNumber`].
    pub incident_number: String,
    /// Tag for [`RecordField::Heading`].
    pub heading: String,
    /// Tag for [`RecordField::Detail`].
    pub detail: String,
    /// Tag for [`RecordField::Location`].
    pub location: String,
    /// Tag for [`RecordField::Direction`].
    pub direction: String,
    /// Tag for [`RecordField::AnnouncementDate`].
    pub announcement_date: String,
    /// Tag for [`RecordField::Status`].
    pub status: String,
    /// Tag for [`RecordField::NearLandmark`].
    pub near_landmark: String,
    /// Tag for [`RecordField::Content`].
    pub content: String,
}

impl Default for FieldTags {
    fn default() -> Self {
        Self {
            incident_number: "INCIDENT_NUMBER".to_string(),
            heading: "INCIDENT_HEADING_EN".to_string(),
            detail: "INCIDENT_DETAIL_EN".to_string(),
            location: "LOCATION_EN".to_string(),
            direction: "DIRECTION_EN".to_string(),
            announcement_date: "ANNOUNCEMENT_DATE".to_string(),
            status: "INCIDENT_STATUS_EN".to_string(),
            near_landmark: "NEAR_LANDMARK_EN".to_string(),
            content: "CONTENT_EN".to_string(),
        }
    }
}

impl FieldTags {
    /// Returns the source tag name for `field`.
    #[must_use]
    pub fn tag(&self, field: RecordField) -> &str {
        match field {
            RecordField::IncidentNumber => &self.incident_number,
            RecordField::Heading => &self.heading,
            RecordField::Detail => &self.detail,
            RecordField::Location => &self.location,
            RecordField::Direction => &self.direction,
            RecordField::AnnouncementDate => &self.announcement_date,
            RecordField::Status => &self.status,
            RecordField::NearLandmark => &self.near_landmark,
            RecordField::Content => &self.content,
        }
    }
}

/// One update element's fields as text.
///
/// Absent fields are empty strings. `incident_id` is never empty: when the
/// source omits it, [`synthesized_id`] supplies one and `id_origin` records
/// the substitution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    /// Name (not path) of the file the update came from.
    pub source_file: String,
    /// Incident identifier, genuine or synthesized.
    pub incident_id: String,
    /// Whether `incident_id` was synthesized.
    pub id_origin: IdentifierOrigin,
    /// Incident heading.
    pub heading: String,
    /// Incident detail.
    pub detail: String,
    /// Location.
    pub location: String,
    /// Direction.
    pub direction: String,
    /// Announcement date exactly as found in the file (after normalization).
    pub announcement_date: String,
    /// Status.
    pub status: String,
    /// Nearby landmark.
    pub near_landmark: String,
    /// Update content.
    pub content: String,
}

impl RawRecord {
    /// Creates an empty record for an update read from `source_file`.
    #[must_use]
    pub fn new(source_file: &str) -> Self {
        Self {
            source_file: source_file.to_string(),
            ..Self::default()
        }
    }

    /// Mutable access to the text slot backing `field`.
    pub const fn field_mut(&mut self, field: RecordField) -> &mut String {
        match field {
            RecordField::IncidentNumber => &mut self.incident_id,
            RecordField::Heading => &mut self.heading,
            RecordField::Detail => &mut self.detail,
            RecordField::Location => &mut self.location,
            RecordField::Direction => &mut self.direction,
            RecordField::AnnouncementDate => &mut self.announcement_date,
            RecordField::Status => &mut self.status,
            RecordField::NearLandmark => &mut self.near_landmark,
            RecordField::Content => &mut self.content,
        }
    }

    /// Returns `true` if the identifier was substituted.
    #[must_use]
    pub fn is_synthesized(&self) -> bool {
        self.id_origin == IdentifierOrigin::Synthesized
    }
}

/// A [`RawRecord`] whose announcement date parsed successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRecord {
    /// The extracted fields.
    pub raw: RawRecord,
    /// Parsed announcement timestamp (wall-clock, no timezone).
    pub announced_at: NaiveDateTime,
}

/// All updates for one incident identifier, ordered by `announced_at`.
///
/// Ties keep pooling order (file name order, then element order within the
/// file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentGroup {
    /// Group key.
    pub incident_id: String,
    /// Time-sorted members.
    pub records: Vec<ParsedRecord>,
}

impl IncidentGroup {
    /// Chronologically first member.
    #[must_use]
    pub fn first(&self) -> Option<&ParsedRecord> {
        self.records.first()
    }

    /// Chronologically last member.
    #[must_use]
    pub fn last(&self) -> Option<&ParsedRecord> {
        self.records.last()
    }

    /// Number of members.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the group has no members.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One output row per incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentSummary {
    /// Incident identifier (the group key).
    pub incident_id: String,
    /// Formatted narrative timeline.
    pub timeline: String,
    /// Earliest announcement. `None` only for the empty sentinel.
    pub first_announcement: Option<NaiveDateTime>,
    /// Latest announcement. `None` only for the empty sentinel.
    pub last_announcement: Option<NaiveDateTime>,
    /// Minutes between first and last announcement, one decimal place.
    pub duration_minutes: f64,
    /// Number of updates the summary was built from.
    pub update_count: usize,
    /// Status of the chronologically last update.
    pub final_status: String,
    /// Heading of the first update.
    pub initial_heading: String,
    /// Location of the first update.
    pub main_location: String,
    /// Direction of the first update.
    pub main_direction: String,
    /// Landmark of the first update.
    pub near_landmark: String,
    /// Source file of the first update.
    pub first_file: String,
    /// Set when the summary was built from an empty group.
    pub is_empty: bool,
}

/// How ambiguous all-numeric dates like `01/02/2024` are read.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DateOrder {
    /// `01/02/2024` is January 2nd.
    #[default]
    MonthFirst,
    /// `01/02/2024` is February 1st.
    DayFirst,
}

/// Which adjacent timeline entries count as repeats of each other.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RepeatPolicy {
    /// An entry repeats its predecessor when their normalized display texts
    /// match.
    #[default]
    SameText,
    /// An entry repeats its predecessor only when both the formatted
    /// timestamp and the normalized display text match.
    SameTimestampAndText,
}
