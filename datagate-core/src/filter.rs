//! Filter descriptors and the per-section descriptor registry.
//!
//! Descriptors are declarative metadata owned by the hosting UI. They are
//! consumed read-only here to decide how a filter value is matched when
//! records are filtered locally.

use crate::naming::candidate_keys;
use crate::Section;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keys that never act as record filters: request envelope and pagination
/// parameters that callers sometimes pass alongside real filters.
pub const IGNORED_KEYS: &[&str] = &[
    "env",
    "section",
    "pagination",
    "limit",
    "offset",
    "nextToken",
    "next_token",
    "sortField",
    "sort_field",
    "sortDirection",
    "sort_direction",
    "sortBy",
    "sortOrder",
];

pub fn is_ignored_key(key: &str) -> bool {
    IGNORED_KEYS.contains(&key)
}

/// Widget type of a filter field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// Free-text input
    Text,
    /// Single choice from a fixed list
    Select,
    /// Yes/no toggle
    #[serde(alias = "checkbox")]
    Boolean,
    /// Date or date range picker
    Date,
    /// Multiple choice checklist
    Checks,
    /// Numeric input
    Number,
}

/// How a filter value is compared against a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Case-insensitive equality of the string forms
    Exact,
    /// Case-insensitive substring
    Contains,
    /// Inclusive date range
    Range,
    /// Boolean equality (`"true"`/`"false"` strings accepted)
    Equals,
    /// Non-empty intersection with a set of values
    Any,
}

/// Metadata describing one filter field of a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    #[serde(default, alias = "match_mode", skip_serializing_if = "Option::is_none")]
    pub match_mode: Option<MatchMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl FilterDescriptor {
    pub fn new(name: impl Into<String>, filter_type: FilterType) -> Self {
        Self {
            name: name.into(),
            filter_type,
            match_mode: None,
            label: None,
        }
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = Some(mode);
        self
    }

    /// Match mode implied by the descriptor alone: the explicit hint first,
    /// then the widget type. `None` leaves the choice to the value's shape.
    pub fn implied_match_mode(&self) -> Option<MatchMode> {
        self.match_mode.or(match self.filter_type {
            FilterType::Select => Some(MatchMode::Exact),
            FilterType::Date => Some(MatchMode::Range),
            FilterType::Boolean => Some(MatchMode::Equals),
            FilterType::Checks => Some(MatchMode::Any),
            FilterType::Text | FilterType::Number => None,
        })
    }

    /// Whether this descriptor describes the filter key `key` under any
    /// naming convention.
    pub fn describes(&self, key: &str) -> bool {
        self.name == key || candidate_keys(key).iter().any(|candidate| *candidate == self.name)
    }
}

/// Section → ordered filter descriptors. Read-only after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterRegistry(BTreeMap<String, Vec<FilterDescriptor>>);

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_section(
        mut self,
        section: impl Into<String>,
        descriptors: Vec<FilterDescriptor>,
    ) -> Self {
        self.0.insert(section.into(), descriptors);
        self
    }

    /// Descriptors for a section, looked up under the full key and then the
    /// reduced key. Unknown sections have none.
    pub fn descriptors(&self, section: &Section) -> &[FilterDescriptor] {
        self.0
            .get(section.as_str())
            .or_else(|| self.0.get(section.reduced()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The descriptor for one filter key of a section.
    pub fn descriptor(&self, section: &Section, key: &str) -> Option<&FilterDescriptor> {
        find_descriptor(self.descriptors(section), key)
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&String, &Vec<FilterDescriptor>)> {
        self.0.iter()
    }
}

/// Find the descriptor describing `key` within a section's descriptor list.
pub fn find_descriptor<'a>(descriptors: &'a [FilterDescriptor], key: &str) -> Option<&'a FilterDescriptor> {
    descriptors
        .iter()
        .find(|descriptor| descriptor.name == key)
        .or_else(|| descriptors.iter().find(|descriptor| descriptor.describes(key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignored_keys_cover_pagination() {
        for key in ["limit", "offset", "nextToken", "next_token", "env", "section"] {
            assert!(is_ignored_key(key), "{key} should be ignored");
        }
        assert!(!is_ignored_key("status"));
        assert!(!is_ignored_key("q"));
    }

    #[test]
    fn implied_match_mode_by_type() {
        let select = FilterDescriptor::new("status", FilterType::Select);
        assert_eq!(select.implied_match_mode(), Some(MatchMode::Exact));

        let date = FilterDescriptor::new("createdAt", FilterType::Date);
        assert_eq!(date.implied_match_mode(), Some(MatchMode::Range));

        let flag = FilterDescriptor::new("verified", FilterType::Boolean);
        assert_eq!(flag.implied_match_mode(), Some(MatchMode::Equals));

        let text = FilterDescriptor::new("email", FilterType::Text);
        assert_eq!(text.implied_match_mode(), None);
    }

    #[test]
    fn explicit_match_mode_wins() {
        let descriptor =
            FilterDescriptor::new("status", FilterType::Select).with_match_mode(MatchMode::Contains);
        assert_eq!(descriptor.implied_match_mode(), Some(MatchMode::Contains));
    }

    #[test]
    fn checkbox_is_boolean_alias() {
        let descriptor: FilterDescriptor =
            serde_json::from_str(r#"{"name": "active", "type": "checkbox"}"#).unwrap();
        assert_eq!(descriptor.filter_type, FilterType::Boolean);

        let descriptor: FilterDescriptor =
            serde_json::from_str(r#"{"name": "tier", "type": "text", "matchMode": "exact"}"#).unwrap();
        assert_eq!(descriptor.match_mode, Some(MatchMode::Exact));
    }

    #[test]
    fn registry_looks_up_full_then_reduced_key() {
        let registry = FilterRegistry::new()
            .with_section("orders", vec![FilterDescriptor::new("status", FilterType::Select)])
            .with_section(
                "admin/orders",
                vec![FilterDescriptor::new("region", FilterType::Text)],
            );

        let nested = Section::new("admin/orders");
        assert_eq!(registry.descriptors(&nested)[0].name, "region");

        let other = Section::new("reports/orders");
        assert_eq!(registry.descriptors(&other)[0].name, "status");

        assert!(registry.descriptors(&Section::new("unknown")).is_empty());
    }

    #[test]
    fn descriptor_lookup_bridges_naming() {
        let registry = FilterRegistry::new().with_section(
            "users",
            vec![FilterDescriptor::new("user_status", FilterType::Select)],
        );
        let section = Section::new("users");
        assert!(registry.descriptor(&section, "userStatus").is_some());
        assert!(registry.descriptor(&section, "user_status").is_some());
        assert!(registry.descriptor(&section, "status").is_none());
    }
}
