//! Mock filter engine: filtering, sorting and paging of in-memory records.
//!
//! Used for fixture-backed sections and for backends that return their full
//! collection. Filter keys are bridged to record fields through
//! [`datagate_core::candidate_keys`], so callers, fixtures and descriptors
//! may each use their own naming convention.

pub mod dates;
pub mod matcher;
pub mod sort;

pub use matcher::{compile, resolve_match_mode, Criterion};

use crate::pagination::sort_and_paginate;
use datagate_core::{FilterDescriptor, FilterSet, PaginationSpec, Record, ResultEnvelope};

/// Keep the records satisfying every filter, preserving input order.
pub fn filter_records(
    records: Vec<Record>,
    filters: &FilterSet,
    descriptors: &[FilterDescriptor],
) -> Vec<Record> {
    let criteria = compile(filters, descriptors);
    if criteria.is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|record| criteria.iter().all(|criterion| criterion.matches(record)))
        .collect()
}

/// Filter, sort and cut one page.
pub fn run(
    records: Vec<Record>,
    filters: &FilterSet,
    pagination: &PaginationSpec,
    descriptors: &[FilterDescriptor],
) -> ResultEnvelope {
    let before = records.len();
    let matched = filter_records(records, filters, descriptors);
    tracing::debug!(before, matched = matched.len(), "filtered records locally");
    sort_and_paginate(matched, pagination)
}

/// Number of records satisfying the filters.
pub fn count_matching(
    records: &[Record],
    filters: &FilterSet,
    descriptors: &[FilterDescriptor],
) -> u64 {
    let criteria = compile(filters, descriptors);
    records
        .iter()
        .filter(|record| criteria.iter().all(|criterion| criterion.matches(record)))
        .count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use datagate_core::{Cursor, FilterType};
    use serde_json::json;

    fn orders() -> Vec<Record> {
        (0..25)
            .map(|i| {
                json!({
                    "id": i,
                    "status": if i % 5 < 2 { "Active" } else { "Inactive" },
                })
            })
            .collect()
    }

    #[test]
    fn filters_then_pages() {
        let descriptors = vec![FilterDescriptor::new("status", FilterType::Select)];
        let filters = FilterSet::new().with("status", "Active");
        let page = run(orders(), &filters, &PaginationSpec::new(5), &descriptors);
        assert_eq!(page.len(), 5);
        assert_eq!(page.total, Some(10));
        assert_eq!(page.next_cursor, Some(Cursor::Offset(5)));
        assert!(page.items.iter().all(|r| r["status"] == "Active"));
    }

    #[test]
    fn empty_filters_keep_everything() {
        let page = run(orders(), &FilterSet::new(), &PaginationSpec::new(100), &[]);
        assert_eq!(page.total, Some(25));
        assert_eq!(page.len(), 25);
    }

    #[test]
    fn count_agrees_with_run() {
        let records = orders();
        let descriptors = vec![FilterDescriptor::new("status", FilterType::Select)];
        let filters = FilterSet::new().with("status", "inactive");
        let page = run(records.clone(), &filters, &PaginationSpec::new(1), &descriptors);
        assert_eq!(page.total, Some(count_matching(&records, &filters, &descriptors)));
        assert_eq!(page.total, Some(15));
    }

    #[test]
    fn filtering_is_order_preserving() {
        let filters = FilterSet::new().with("status", "Active");
        let kept = filter_records(orders(), &filters, &[]);
        let ids: Vec<i64> = kept.iter().map(|r| r["id"].as_i64().unwrap()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}
