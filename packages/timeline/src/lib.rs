#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident grouping, narrative timeline building, and summary aggregation.
//!
//! The pooled [`RawRecord`]s of a batch are partitioned into
//! [`IncidentGroup`]s by [`group::group_records`]. Each group is then
//! reduced independently: [`timeline::build_timeline`] renders its
//! narrative and [`aggregate::summarize`] turns group and narrative into an
//! [`IncidentSummary`].

pub mod aggregate;
pub mod group;
pub mod timeline;

use incident_timeline_incident_models::{DateOrder, IncidentGroup, IncidentSummary, RawRecord};

pub use group::GroupingOutcome;
pub use timeline::TimelineOptions;

/// Reduces every group to its summary row, keeping group order.
#[must_use]
pub fn summarize_groups(groups: Vec<IncidentGroup>, options: &TimelineOptions) -> Vec<IncidentSummary> {
    groups
        .into_iter()
        .map(|group| {
            let narrative = timeline::build_timeline(&group, options);
            aggregate::summarize(group, narrative)
        })
        .collect()
}

/// Summaries for a batch plus the invalid-date count from grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummaries {
    /// One row per incident, ascending by identifier.
    pub summaries: Vec<IncidentSummary>,
    /// Records dropped for an unparsable date.
    pub invalid_dates: usize,
}

/// Groups the pooled records of a batch and summarizes every incident.
#[must_use]
pub fn build_summaries(
    records: Vec<RawRecord>,
    order: DateOrder,
    options: &TimelineOptions,
) -> BatchSummaries {
    let GroupingOutcome {
        groups,
        invalid_dates,
    } = group::group_records(records, order);

    log::debug!("Partitioned into {} incident group(s)", groups.len());

    BatchSummaries {
        summaries: summarize_groups(groups, options),
        invalid_dates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(file: &str, id: &str, date: &str, content: &str) -> RawRecord {
        RawRecord {
            incident_id: id.to_string(),
            announcement_date: date.to_string(),
            content: content.to_string(),
            status: "UPDATE".to_string(),
            ..RawRecord::new(file)
        }
    }

    #[test]
    fn merges_files_and_collapses_repeated_updates() {
        let batch = build_summaries(
            vec![
                raw("a.xml", "INC1", "2024-01-15 10:00:00", "Lane 1 closed"),
                raw("a.xml", "INC1", "2024-01-15 10:20:00", "All lanes closed."),
                raw("b.xml", "INC1", "2024-01-15 10:40:00", "all lanes closed"),
            ],
            DateOrder::MonthFirst,
            &TimelineOptions::default(),
        );

        assert_eq!(batch.summaries.len(), 1);
        let summary = &batch.summaries[0];
        let updates = summary
            .timeline
            .lines()
            .filter(|l| l.starts_with('['))
            .count();
        assert_eq!(updates, 2);
        assert!((summary.duration_minutes - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unparsable_dates_never_reach_output() {
        let batch = build_summaries(
            vec![
                raw("a.xml", "INC1", "2024-01-15 10:00:00", "ok"),
                raw("a.xml", "INC2", "not-a-date", "dropped"),
            ],
            DateOrder::MonthFirst,
            &TimelineOptions::default(),
        );
        assert_eq!(batch.invalid_dates, 1);
        assert_eq!(batch.summaries.len(), 1);
        assert!(batch.summaries.iter().all(|s| s.incident_id != "INC2"));
        assert!(batch.summaries.iter().all(|s| !s.timeline.contains("dropped")));
    }

    #[test]
    fn orders_summaries_by_identifier() {
        let batch = build_summaries(
            vec![
                raw("a.xml", "INC9", "2024-01-15 10:00:00", "x"),
                raw("a.xml", "INC10", "2024-01-15 10:00:00", "y"),
                raw("a.xml", "INC1", "2024-01-15 10:00:00", "z"),
            ],
            DateOrder::MonthFirst,
            &TimelineOptions::default(),
        );
        let ids: Vec<_> = batch.summaries.iter().map(|s| s.incident_id.as_str()).collect();
        assert_eq!(ids, ["INC1", "INC10", "INC9"]);
    }
}
