//! DATAGATE Test Utilities
//!
//! Shared test infrastructure for the DATAGATE workspace:
//! - Proptest generators for records, filter sets and pagination
//! - Fixture collections and on-disk fixture directories
//! - Custom assertions for result envelopes

pub use datagate_core::{
    Cursor, DataGateConfig, FilterDescriptor, FilterRegistry, FilterSet, FilterType, ListQuery,
    MatchMode, PaginationSpec, Record, ResultEnvelope, Section, SortDirection,
};

use chrono::{Duration, NaiveDate};
use serde_json::{json, Value};

/// Statuses used by generated and fixture records.
pub const STATUSES: &[&str] = &["Active", "Inactive", "Pending"];

/// Countries used by generated and fixture records.
pub const COUNTRIES: &[&str] = &["DE", "FR", "US", "BR"];

fn day(offset: i64) -> String {
    let base = NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date");
    (base + Duration::days(offset)).format("%Y-%m-%d").to_string()
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating DATAGATE inputs.

    use super::*;
    use proptest::prelude::*;

    // === Naming ===

    /// A lowercase identifier word.
    pub fn arb_word() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9]{0,7}".prop_map(|s| s)
    }

    /// A multi-word field name in snake_case.
    pub fn arb_snake_key() -> impl Strategy<Value = String> {
        prop::collection::vec(arb_word(), 1..4).prop_map(|words| words.join("_"))
    }

    // === Records ===

    /// An order-like record; `id` is assigned by [`arb_records`].
    pub fn arb_record() -> impl Strategy<Value = Record> {
        (
            prop::sample::select(STATUSES),
            prop::sample::select(COUNTRIES),
            0u32..10_000,
            0i64..60,
            any::<bool>(),
            prop::option::of(prop::sample::select(vec!["vip", "beta", "trial"])),
        )
            .prop_map(|(status, country, amount, created, verified, tag)| {
                let mut record = json!({
                    "status": status,
                    "country": country,
                    "amount": amount,
                    "created_at": day(created),
                    "verified": verified,
                });
                if let (Some(tag), Some(map)) = (tag, record.as_object_mut()) {
                    map.insert("tags".to_string(), json!([tag]));
                }
                record
            })
    }

    /// A collection of records with unique sequential ids.
    pub fn arb_records(max: usize) -> impl Strategy<Value = Vec<Record>> {
        prop::collection::vec(arb_record(), 0..=max).prop_map(|records| {
            records
                .into_iter()
                .enumerate()
                .map(|(i, mut record)| {
                    if let Some(map) = record.as_object_mut() {
                        map.insert("id".to_string(), json!(i + 1));
                    }
                    record
                })
                .collect()
        })
    }

    // === Queries ===

    /// A filter set over the generated record fields. The date bounds mix
    /// camelCase and snake_case keys.
    pub fn arb_filter_set() -> impl Strategy<Value = FilterSet> {
        (
            prop::option::of(prop::sample::select(STATUSES)),
            prop::option::of(prop::sample::select(COUNTRIES)),
            prop::option::of(any::<bool>()),
            prop::option::of((0i64..60, 0i64..30)),
        )
            .prop_map(|(status, country, verified, window)| {
                let mut filters = FilterSet::new();
                if let Some(status) = status {
                    filters.insert("status", status);
                }
                if let Some(country) = country {
                    filters.insert("country", country);
                }
                if let Some(verified) = verified {
                    filters.insert("verified", verified);
                }
                if let Some((from, span)) = window {
                    filters.insert("createdAt_from", day(from));
                    filters.insert("created_at_to", day(from + span));
                }
                filters
            })
    }

    /// Offset/limit pagination, optionally sorted.
    pub fn arb_pagination() -> impl Strategy<Value = PaginationSpec> {
        (
            1usize..12,
            0usize..40,
            prop::option::of((
                prop::sample::select(vec!["amount", "created_at", "status", "missing"]),
                prop_oneof![Just(SortDirection::Asc), Just(SortDirection::Desc)],
            )),
        )
            .prop_map(|(limit, offset, sort)| {
                let page = PaginationSpec::new(limit).with_offset(offset);
                match sort {
                    Some((field, direction)) => page.with_sort(field, direction),
                    None => page,
                }
            })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built fixture collections for common scenarios.

    use super::*;
    use std::path::Path;

    /// 25 orders, 10 of them `Active`, created on consecutive days from
    /// 2024-03-01.
    pub fn orders() -> Vec<Record> {
        (0..25)
            .map(|i: i64| {
                let status = match i % 5 {
                    0 | 1 => "Active",
                    2 | 3 => "Inactive",
                    _ => "Pending",
                };
                let tags = if i % 4 == 0 { json!(["vip"]) } else { json!([]) };
                json!({
                    "id": i + 1,
                    "orderNumber": format!("ORD-{:04}", i + 1),
                    "status": status,
                    "customerEmail": format!("customer{}@example.com", i + 1),
                    "country": COUNTRIES[(i as usize) % COUNTRIES.len()],
                    "amount": 100 + i * 7,
                    "createdAt": day(i),
                    "verified": i % 3 == 0,
                    "tags": tags,
                })
            })
            .collect()
    }

    /// Users keyed in snake_case; booleans stored as strings on some rows.
    pub fn users() -> Vec<Record> {
        vec![
            json!({"id": 1, "user_name": "abc", "email": "abc@example.com", "is_admin": true}),
            json!({"id": 2, "user_name": "ada", "email": "ada@example.org", "is_admin": "false"}),
            json!({"id": 3, "user_name": "grace", "email": "grace@example.com", "is_admin": "true"}),
            json!({"id": 4, "user_name": "linus", "email": null, "is_admin": false}),
        ]
    }

    /// Descriptors for the `orders` fixture.
    pub fn order_descriptors() -> Vec<FilterDescriptor> {
        vec![
            FilterDescriptor::new("status", FilterType::Select),
            FilterDescriptor::new("verified", FilterType::Boolean),
            FilterDescriptor::new("tags", FilterType::Checks),
            FilterDescriptor::new("createdAt", FilterType::Date),
        ]
    }

    /// Registry with the `orders` descriptors.
    pub fn filter_registry() -> FilterRegistry {
        FilterRegistry::new().with_section("orders", order_descriptors())
    }

    /// Write `<section>.json` files into a fresh temporary directory.
    pub fn fixture_dir(sections: &[(&str, Vec<Record>)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (section, records) in sections {
            write_fixture(dir.path(), section, &Value::Array(records.clone()));
        }
        dir
    }

    pub fn write_fixture(dir: &Path, section: &str, content: &Value) {
        let path = dir.join(format!("{section}.json"));
        std::fs::write(path, serde_json::to_string_pretty(content).unwrap()).unwrap();
    }

    /// Fixture-only configuration reading from `dir`.
    pub fn fixture_config(dir: &Path) -> DataGateConfig {
        DataGateConfig {
            fixtures_dir: dir.to_path_buf(),
            filters: filter_registry(),
            ..DataGateConfig::default()
        }
    }

    /// Configuration pointing `section` at `base_url` in the `local`
    /// environment.
    pub fn remote_config(base_url: &str, section: &str) -> DataGateConfig {
        DataGateConfig::default()
            .with_base_url("local", base_url)
            .with_endpoint(section, "local", format!("/{section}"))
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over result envelopes.

    use super::*;

    /// Assert the page holds exactly `len` items.
    #[track_caller]
    pub fn assert_page_len(page: &ResultEnvelope, len: usize) {
        assert_eq!(page.items.len(), len, "unexpected page size: {:?}", page.items);
    }

    #[track_caller]
    pub fn assert_total(page: &ResultEnvelope, total: Option<u64>) {
        assert_eq!(page.total, total, "unexpected total");
    }

    /// Assert the next cursor is the given offset.
    #[track_caller]
    pub fn assert_next_offset(page: &ResultEnvelope, offset: Option<usize>) {
        let actual = page.next_cursor.as_ref().and_then(Cursor::as_offset);
        assert_eq!(actual, offset, "unexpected next cursor: {:?}", page.next_cursor);
    }

    /// Assert every item has `field` equal to `expected`.
    #[track_caller]
    pub fn assert_all_have(page: &ResultEnvelope, field: &str, expected: &Value) {
        for item in &page.items {
            assert_eq!(item.get(field), Some(expected), "item does not match: {item}");
        }
    }

    /// Assert no two records share an `id`.
    #[track_caller]
    pub fn assert_unique_ids(records: &[Record]) {
        let mut seen = std::collections::HashSet::new();
        for record in records {
            let id = record.get("id").cloned().unwrap_or(Value::Null).to_string();
            assert!(seen.insert(id.clone()), "duplicate id {id}");
        }
    }
}
