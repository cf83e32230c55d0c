//! Single-field sort over loosely-typed records.

use datagate_core::{resolve_field, SortDirection};
use serde_json::Value;
use std::cmp::Ordering;

/// Stable sort by one field. Records missing the field (or holding null)
/// go last in either direction.
pub fn sort_records(records: &mut [Value], field: &str, direction: SortDirection) {
    records.sort_by(|a, b| {
        match (resolve_field(a, field), resolve_field(b, field)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => {
                let ordering = compare_values(x, y);
                match direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            }
        }
    });
}

/// Total order over JSON values: numbers, then strings, then booleans, then
/// everything else. Strings compare case-insensitively with the raw string
/// as tie-breaker.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x
            .to_lowercase()
            .cmp(&y.to_lowercase())
            .then_with(|| x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (x, y) if rank(x) != rank(y) => rank(x).cmp(&rank(y)),
        (x, y) => x.to_string().cmp(&y.to_string()),
    }
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Number(_) => 0,
        Value::String(_) => 1,
        Value::Bool(_) => 2,
        Value::Array(_) => 3,
        Value::Object(_) => 4,
        Value::Null => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(records: &[Value]) -> Vec<&str> {
        records.iter().map(|r| r["name"].as_str().unwrap()).collect()
    }

    #[test]
    fn sorts_numbers_ascending_and_descending() {
        let mut records = vec![
            json!({"name": "b", "amount": 20}),
            json!({"name": "a", "amount": 3.5}),
            json!({"name": "c", "amount": 100}),
        ];
        sort_records(&mut records, "amount", SortDirection::Asc);
        assert_eq!(names(&records), vec!["a", "b", "c"]);
        sort_records(&mut records, "amount", SortDirection::Desc);
        assert_eq!(names(&records), vec!["c", "b", "a"]);
    }

    #[test]
    fn missing_values_sort_last_both_ways() {
        let mut records = vec![
            json!({"name": "none"}),
            json!({"name": "b", "rank": 2}),
            json!({"name": "null", "rank": null}),
            json!({"name": "a", "rank": 1}),
        ];
        sort_records(&mut records, "rank", SortDirection::Asc);
        assert_eq!(names(&records), vec!["a", "b", "none", "null"]);
        sort_records(&mut records, "rank", SortDirection::Desc);
        assert_eq!(names(&records), vec!["b", "a", "none", "null"]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let mut records = vec![
            json!({"name": "first", "status": "Active"}),
            json!({"name": "second", "status": "active"}),
            json!({"name": "third", "status": "Active"}),
        ];
        sort_records(&mut records, "status", SortDirection::Asc);
        assert_eq!(names(&records), vec!["first", "third", "second"]);
    }

    #[test]
    fn sort_field_bridges_naming() {
        let mut records = vec![
            json!({"name": "late", "created_at": "2024-05-01"}),
            json!({"name": "early", "created_at": "2024-01-01"}),
        ];
        sort_records(&mut records, "createdAt", SortDirection::Asc);
        assert_eq!(names(&records), vec!["early", "late"]);
    }

    #[test]
    fn mixed_types_have_a_total_order() {
        assert_eq!(compare_values(&json!(5), &json!("5")), Ordering::Less);
        assert_eq!(compare_values(&json!("x"), &json!(true)), Ordering::Less);
        assert_eq!(compare_values(&json!(false), &json!(true)), Ordering::Less);
        assert_eq!(compare_values(&json!([1]), &json!({"a": 1})), Ordering::Less);
        assert_eq!(compare_values(&json!("Apple"), &json!("banana")), Ordering::Less);
    }
}
