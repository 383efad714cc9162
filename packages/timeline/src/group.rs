//! Partitioning pooled records into per-incident groups.
//!
//! Runs in two phases. [`parse_records`] converts announcement dates and
//! drops the records whose date does not parse. [`partition`] then
//! buckets the survivors by incident identifier and stable-sorts each
//! bucket by timestamp, so updates sharing a timestamp keep pooling order.

use std::collections::BTreeMap;

use incident_timeline_incident_models::{DateOrder, IncidentGroup, ParsedRecord, RawRecord};
use incident_timeline_source::parsing::parse_announcement_date;

/// Groups built from one batch, plus the number of records dropped for an
/// unparsable date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupingOutcome {
    /// One group per incident identifier, in ascending identifier order.
    pub groups: Vec<IncidentGroup>,
    /// Records whose announcement date could not be parsed.
    pub invalid_dates: usize,
}

/// Parses every record's announcement date, keeping pooling order.
///
/// Returns the parsed records and the count of dropped ones.
#[must_use]
pub fn parse_records(records: Vec<RawRecord>, order: DateOrder) -> (Vec<ParsedRecord>, usize) {
    let mut parsed = Vec::with_capacity(records.len());
    let mut invalid = 0;

    for raw in records {
        if let Some(announced_at) = parse_announcement_date(&raw.announcement_date, order) {
            parsed.push(ParsedRecord { raw, announced_at });
        } else {
            log::debug!(
                "{}: dropping update for {} with unparsable date {:?}",
                raw.source_file,
                raw.incident_id,
                raw.announcement_date
            );
            invalid += 1;
        }
    }

    (parsed, invalid)
}

/// Buckets records by incident identifier and time-sorts each bucket.
#[must_use]
pub fn partition(records: Vec<ParsedRecord>) -> Vec<IncidentGroup> {
    let mut buckets: BTreeMap<String, Vec<ParsedRecord>> = BTreeMap::new();
    for record in records {
        buckets
            .entry(record.raw.incident_id.clone())
            .or_default()
            .push(record);
    }

    buckets
        .into_iter()
        .map(|(incident_id, mut records)| {
            records.sort_by_key(|r| r.announced_at);
            IncidentGroup {
                incident_id,
                records,
            }
        })
        .collect()
}

/// Parses dates and partitions the full record pool of a batch.
#[must_use]
pub fn group_records(records: Vec<RawRecord>, order: DateOrder) -> GroupingOutcome {
    let (parsed, invalid_dates) = parse_records(records, order);
    if invalid_dates > 0 {
        log::warn!("{invalid_dates} rows with unparsable dates, removed");
    }

    GroupingOutcome {
        groups: partition(parsed),
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
            ..RawRecord::new(file)
        }
    }

    #[test]
    fn drops_and_counts_unparsable_dates() {
        let outcome = group_records(
            vec![
                raw("a.xml", "INC1", "2024-01-15 10:00:00", "ok"),
                raw("a.xml", "INC2", "not-a-date", "bad"),
            ],
            DateOrder::MonthFirst,
        );
        assert_eq!(outcome.invalid_dates, 1);
        assert_eq!(outcome.groups.len(), 1);
        assert_eq!(outcome.groups[0].incident_id, "INC1");
        assert!(
            outcome
                .groups
                .iter()
                .flat_map(|g| &g.records)
                .all(|r| r.raw.content != "bad")
        );
    }

    #[test]
    fn merges_across_files_sorted_by_time() {
        let outcome = group_records(
            vec![
                raw("a.xml", "INC1", "2024-01-15 12:00:00", "third"),
                raw("a.xml", "INC2", "2024-01-15 09:00:00", "other"),
                raw("b.xml", "INC1", "2024-01-15 10:00:00", "first"),
                raw("b.xml", "INC1", "2024-01-15 11:00:00", "second"),
            ],
            DateOrder::MonthFirst,
        );

        let ids: Vec<_> = outcome.groups.iter().map(|g| g.incident_id.as_str()).collect();
        assert_eq!(ids, ["INC1", "INC2"]);

        let contents: Vec<_> = outcome.groups[0]
            .records
            .iter()
            .map(|r| r.raw.content.as_str())
            .collect();
        assert_eq!(contents, ["first", "second", "third"]);
    }

    #[test]
    fn keeps_pooling_order_for_equal_timestamps() {
        let outcome = group_records(
            vec![
                raw("a.xml", "INC1", "2024-01-15 10:00:00", "from a"),
                raw("b.xml", "INC1", "2024-01-15 09:00:00", "earliest"),
                raw("b.xml", "INC1", "2024-01-15 10:00:00", "from b"),
            ],
            DateOrder::MonthFirst,
        );
        let contents: Vec<_> = outcome.groups[0]
            .records
            .iter()
            .map(|r| r.raw.content.as_str())
            .collect();
        assert_eq!(contents, ["earliest", "from a", "from b"]);
    }

    #[test]
    fn timestamps_never_decrease_within_a_group() {
        let dates = [
            "2024-03-01 08:00:00",
            "02/28/2024 23:59:00",
            "2024-02-29T12:00:00",
            "2024/03/01 07:59:59",
        ];
        let records = dates
            .iter()
            .map(|d| raw("a.xml", "INC1", d, ""))
            .collect();
        let outcome = group_records(records, DateOrder::MonthFirst);
        let group = &outcome.groups[0];
        assert_eq!(group.len(), 4);
        assert!(
            group
                .records
                .windows(2)
                .all(|w| w[0].announced_at <= w[1].announced_at)
        );
    }

    #[test]
    fn empty_pool_yields_no_groups() {
        let outcome = group_records(Vec::new(), DateOrder::MonthFirst);
        assert!(outcome.groups.is_empty());
        assert_eq!(outcome.invalid_dates, 0);
    }
}
