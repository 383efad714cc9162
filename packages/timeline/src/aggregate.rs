//! Reduction of one incident group to its summary row.

use incident_timeline_incident_models::{IncidentGroup, IncidentSummary};

/// Timeline text of the sentinel built for an empty group.
pub const EMPTY_GROUP_TIMELINE: &str = "Empty group - no data";

/// Builds the summary row for a time-sorted group and its timeline.
///
/// An empty group yields [`empty_summary`] rather than failing.
#[must_use]
pub fn summarize(group: IncidentGroup, timeline: String) -> IncidentSummary {
    let (Some(first), Some(last)) = (group.first(), group.last()) else {
        log::warn!("Incident {} has no updates", group.incident_id);
        return empty_summary(group.incident_id);
    };

    let first_announcement = group.records.iter().map(|r| r.announced_at).min();
    let last_announcement = group.records.iter().map(|r| r.announced_at).max();

    let duration_minutes = match (first_announcement, last_announcement) {
        (Some(start), Some(end)) if group.len() > 1 => {
            #[allow(clippy::cast_precision_loss)]
            let seconds = (end - start).num_milliseconds() as f64 / 1000.0;
            round_one_decimal(seconds / 60.0)
        }
        _ => 0.0,
    };

    IncidentSummary {
        timeline,
        first_announcement,
        last_announcement,
        duration_minutes,
        update_count: group.len(),
        final_status: last.raw.status.clone(),
        initial_heading: first.raw.heading.clone(),
        main_location: first.raw.location.clone(),
        main_direction: first.raw.direction.clone(),
        near_landmark: first.raw.near_landmark.clone(),
        first_file: first.raw.source_file.clone(),
        is_empty: false,
        incident_id: group.incident_id,
    }
}

/// The sentinel summary for an incident with no surviving updates.
#[must_use]
pub fn empty_summary(incident_id: String) -> IncidentSummary {
    IncidentSummary {
        incident_id,
        timeline: EMPTY_GROUP_TIMELINE.to_string(),
        first_announcement: None,
        last_announcement: None,
        duration_minutes: 0.0,
        update_count: 0,
        final_status: String::new(),
        initial_heading: String::new(),
        main_location: String::new(),
        main_direction: String::new(),
        near_landmark: String::new(),
        first_file: String::new(),
        is_empty: true,
    }
}

/// Rounds to one decimal place, ties to even.
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}
