//! Narrative timeline building.
//!
//! Turns one time-sorted [`IncidentGroup`] into a readable narrative:
//!
//! 1. Only the first update at any exact timestamp is kept
//! 2. Each update shows its content, or its detail when content is blank,
//!    truncated to the configured budget
//! 3. An update that repeats the entry just before it (see
//!    [`RepeatPolicy`]) is skipped. Only adjacent entries are compared, so
//!    an update that recurs later in the timeline is kept
//! 4. A header naming the incident, location, and heading is prepended

use std::collections::HashSet;

use chrono::NaiveDateTime;
use incident_timeline_incident_models::{
    DEFAULT_MAX_DETAIL_CHARS, DEFAULT_TRUNCATION_MARKER, IncidentGroup, ParsedRecord,
    RepeatPolicy, TIMESTAMP_FORMAT,
};

/// Shown when an update has neither content nor detail.
pub const NO_DETAIL: &str = "No detail provided";

/// Timeline text for a group with no updates.
pub const NO_UPDATES: &str = "No updates available.";

/// Timeline text when deduplication leaves nothing.
pub const NO_MEANINGFUL_UPDATES: &str = "No meaningful updates after deduplication.";

/// How timelines are rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineOptions {
    /// Display text budget, in characters.
    pub max_detail_chars: usize,
    /// Appended after text cut to the budget.
    pub truncation_marker: String,
    /// Which adjacent entries count as repeats.
    pub repeat_policy: RepeatPolicy,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self {
            max_detail_chars: DEFAULT_MAX_DETAIL_CHARS,
            truncation_marker: DEFAULT_TRUNCATION_MARKER.to_string(),
            repeat_policy: RepeatPolicy::default(),
        }
    }
}

/// One rendered update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    /// Timestamp in [`TIMESTAMP_FORMAT`].
    pub timestamp: String,
    /// Status at the time of the update.
    pub status: String,
    /// Display text, possibly truncated.
    pub text: String,
}

impl TimelineEntry {
    /// Renders the entry as `[timestamp] Status: status` followed by the
    /// indented text on its own line.
    #[must_use]
    pub fn render(&self) -> String {
        format!("[{}] Status: {}\n    {}", self.timestamp, self.status, self.text)
    }
}

/// Identity of an entry for adjacent-repeat detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonKey {
    /// Formatted timestamp.
    pub timestamp: String,
    /// Display text, lowercased, without spaces, periods, or commas.
    pub text: String,
}

impl ComparisonKey {
    /// Builds the key for `entry`.
    #[must_use]
    pub fn of(entry: &TimelineEntry) -> Self {
        Self {
            timestamp: entry.timestamp.clone(),
            text: comparison_text(&entry.text),
        }
    }

    /// Whether an entry with this key repeats one keyed `previous`.
    #[must_use]
    pub fn repeats(&self, previous: &Self, policy: RepeatPolicy) -> bool {
        match policy {
            RepeatPolicy::SameText => self.text == previous.text,
            RepeatPolicy::SameTimestampAndText => self == previous,
        }
    }
}

/// Lowercases `text` and strips spaces, periods, and commas.
#[must_use]
pub fn comparison_text(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | '.' | ','))
        .collect()
}

/// Cuts `text` to `max_chars` characters and appends `marker`, leaving
/// text at or under the budget untouched.
#[must_use]
pub fn truncate(text: &str, max_chars: usize, marker: &str) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{marker}", &text[..cut]),
        None => text.to_string(),
    }
}

/// Content when present, else detail, else [`NO_DETAIL`].
#[must_use]
pub fn display_text(record: &ParsedRecord) -> &str {
    [record.raw.content.trim(), record.raw.detail.trim()]
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or(NO_DETAIL)
}

/// Renders a timestamp in [`TIMESTAMP_FORMAT`].
#[must_use]
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Keeps the first record at each exact timestamp.
fn first_per_timestamp(records: &[ParsedRecord]) -> impl Iterator<Item = &ParsedRecord> {
    let mut seen = HashSet::new();
    records.iter().filter(move |r| seen.insert(r.announced_at))
}

/// Produces the deduplicated entries for a time-sorted record slice.
#[must_use]
pub fn build_entries(records: &[ParsedRecord], options: &TimelineOptions) -> Vec<TimelineEntry> {
    let mut entries = Vec::new();
    let mut previous: Option<ComparisonKey> = None;

    for record in first_per_timestamp(records) {
        let entry = TimelineEntry {
            timestamp: format_timestamp(&record.announced_at),
            status: record.raw.status.trim().to_string(),
            text: truncate(
                display_text(record),
                options.max_detail_chars,
                &options.truncation_marker,
            ),
        };
        let key = ComparisonKey::of(&entry);

        if previous
            .as_ref()
            .is_some_and(|prev| key.repeats(prev, options.repeat_policy))
        {
            continue;
        }

        entries.push(entry);
        previous = Some(key);
    }

    entries
}

/// Builds the full narrative for one incident.
#[must_use]
pub fn build_timeline(group: &IncidentGroup, options: &TimelineOptions) -> String {
    let Some(first) = group.first() else {
        return NO_UPDATES.to_string();
    };

    let entries = build_entries(&group.records, options);
    if entries.is_empty() {
        return NO_MEANINGFUL_UPDATES.to_string();
    }

    let or_na = |s: &str| if s.is_empty() { "N/A".to_string() } else { s.to_string() };

    let header = format!(
        "Incident: {}\nLocation: {}\nHeading: {}\nTimeline of updates (oldest to newest):\n\n",
        group.incident_id,
        or_na(&first.raw.location),
        or_na(&first.raw.heading),
    );

    let body = entries
        .iter()
        .map(TimelineEntry::render)
        .collect::<Vec<_>>()
        .join("\n\n");

    header + &body
}

#[cfg(test)]
mod tests {
    use incident_timeline_incident_models::RawRecord;

    use super::*;

    fn record(ts: &str, status: &str, content: &str, detail: &str) -> ParsedRecord {
        ParsedRecord {
            raw: RawRecord {
                incident_id: "INC1".to_string(),
                status: status.to_string(),
                content: content.to_string(),
                detail: detail.to_string(),
                location: "Tuen Mun Road".to_string(),
                heading: "Traffic Accident".to_string(),
                ..RawRecord::new("a.xml")
            },
            announced_at: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
        }
    }

    fn group(records: Vec<ParsedRecord>) -> IncidentGroup {
        IncidentGroup {
            incident_id: "INC1".to_string(),
            records,
        }
    }

    fn update_lines(timeline: &str) -> usize {
        timeline.lines().filter(|l| l.starts_with('[')).count()
    }

    #[test]
    fn collapses_adjacent_repeats() {
        let timeline = build_timeline(
            &group(vec![
                record("2024-01-15 10:00:00", "NEW", "Lane 1 closed", ""),
                record("2024-01-15 10:05:00", "UPDATE", "Lanes 1 and 2 closed.", ""),
                record("2024-01-15 10:10:00", "UPDATE", "lanes 1 and 2, closed", ""),
            ]),
            &TimelineOptions::default(),
        );
        assert_eq!(update_lines(&timeline), 2);
        assert!(timeline.contains("[2024-01-15 10:00:00] Status: NEW\n    Lane 1 closed"));
        assert!(timeline.contains("[2024-01-15 10:05:00] Status: UPDATE"));
        assert!(!timeline.contains("10:10:00"));
    }

    #[test]
    fn keeps_non_adjacent_repeats() {
        let entries = build_entries(
            &[
                record("2024-01-15 10:00:00", "NEW", "Lane 1 closed", ""),
                record("2024-01-15 10:05:00", "UPDATE", "All lanes reopened", ""),
                record("2024-01-15 10:10:00", "UPDATE", "Lane 1 closed", ""),
            ],
            &TimelineOptions::default(),
        );
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn timestamp_and_text_policy_keeps_distinct_times() {
        let options = TimelineOptions {
            repeat_policy: RepeatPolicy::SameTimestampAndText,
            ..TimelineOptions::default()
        };
        let entries = build_entries(
            &[
                record("2024-01-15 10:00:00", "NEW", "Lane 1 closed", ""),
                record("2024-01-15 10:05:00", "NEW", "Lane 1 closed", ""),
            ],
            &options,
        );
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn no_consecutive_entries_share_a_key() {
        let records = vec![
            record("2024-01-15 10:00:00", "NEW", "A", ""),
            record("2024-01-15 10:01:00", "NEW", "a.", ""),
            record("2024-01-15 10:02:00", "NEW", "B", ""),
            record("2024-01-15 10:03:00", "NEW", "b", ""),
            record("2024-01-15 10:04:00", "NEW", "A", ""),
        ];
        for policy in [RepeatPolicy::SameText, RepeatPolicy::SameTimestampAndText] {
            let options = TimelineOptions {
                repeat_policy: policy,
                ..TimelineOptions::default()
            };
            let keys: Vec<_> = build_entries(&records, &options)
                .iter()
                .map(ComparisonKey::of)
                .collect();
            assert!(keys.windows(2).all(|w| w[0] != w[1]));
        }
    }

    #[test]
    fn keeps_first_update_per_exact_timestamp() {
        let entries = build_entries(
            &[
                record("2024-01-15 10:00:00", "NEW", "first", ""),
                record("2024-01-15 10:00:00", "NEW", "second", ""),
            ],
            &TimelineOptions::default(),
        );
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "first");
    }

    #[test]
    fn falls_back_from_content_to_detail_to_literal() {
        assert_eq!(
            display_text(&record("2024-01-15 10:00:00", "", "content", "detail")),
            "content"
        );
        assert_eq!(
            display_text(&record("2024-01-15 10:00:00", "", "  ", "detail")),
            "detail"
        );
        assert_eq!(
            display_text(&record("2024-01-15 10:00:00", "", "", "")),
            NO_DETAIL
        );
    }

    #[test]
    fn truncates_only_over_budget() {
        assert_eq!(truncate("abcdef", 6, "..."), "abcdef");
        assert_eq!(truncate("abcdefg", 6, "..."), "abcdef...");
        assert_eq!(truncate("", 6, "..."), "");
        assert_eq!(truncate("事故事故事故", 2, "…"), "事故…");
    }

    #[test]
    fn truncates_long_text_to_exact_budget() {
        let long = "x".repeat(DEFAULT_MAX_DETAIL_CHARS + 50);
        let entries = build_entries(
            &[record("2024-01-15 10:00:00", "NEW", &long, "")],
            &TimelineOptions::default(),
        );
        let text = &entries[0].text;
        let kept = text.strip_suffix(DEFAULT_TRUNCATION_MARKER).unwrap();
        assert_eq!(kept.chars().count(), DEFAULT_MAX_DETAIL_CHARS);
    }

    #[test]
    fn renders_header_and_blank_line_separated_entries() {
        let timeline = build_timeline(
            &group(vec![
                record("2024-01-15 10:00:00", "NEW", "Lane 1 closed", ""),
                record("2024-01-15 11:00:00", "CLOSED", "", "Reopened"),
            ]),
            &TimelineOptions::default(),
        );
        assert_eq!(
            timeline,
            "Incident: INC1\n\
             Location: Tuen Mun Road\n\
             Heading: Traffic Accident\n\
             Timeline of updates (oldest to newest):\n\n\
             [2024-01-15 10:00:00] Status: NEW\n    Lane 1 closed\n\n\
             [2024-01-15 11:00:00] Status: CLOSED\n    Reopened"
        );
    }

    #[test]
    fn uses_na_for_blank_header_fields() {
        let mut only = record("2024-01-15 10:00:00", "NEW", "x", "");
        only.raw.location.clear();
        only.raw.heading.clear();
        let timeline = build_timeline(&group(vec![only]), &TimelineOptions::default());
        assert!(timeline.contains("Location: N/A\nHeading: N/A\n"));
        assert_eq!(update_lines(&timeline), 1);
    }

    #[test]
    fn empty_group_has_placeholder_text() {
        assert_eq!(
            build_timeline(&group(Vec::new()), &TimelineOptions::default()),
            NO_UPDATES
        );
    }
}
