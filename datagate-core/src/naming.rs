//! Field-name bridging between naming conventions.
//!
//! Callers, backends and fixture files rarely agree on how a field is spelled
//! (`userName`, `user_name`, `user-name`). Every field lookup against a
//! [`Record`](crate::Record) goes through [`candidate_keys`] so that a filter
//! key written in one convention finds a field written in another.

use serde_json::Value;

/// Convert `camelCase` / `kebab-case` to `snake_case`, starting a segment at
/// every capital (`isABTest` → `is_a_b_test`).
///
/// This is the inverse of [`to_camel_case`] for keys whose segments start with
/// a lowercase letter.
pub fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_uppercase() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else if ch == '-' {
            out.push('_');
        } else {
            out.push(ch);
        }
    }
    out
}

/// `snake_case` with capital runs kept together as one segment
/// (`userID` → `user_id`, `isABTest` → `is_ab_test`).
pub fn to_snake_case_grouped(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);
    for (i, &ch) in chars.iter().enumerate() {
        if ch == '-' {
            out.push('_');
            continue;
        }
        if !ch.is_uppercase() {
            out.push(ch);
            continue;
        }
        let prev = i.checked_sub(1).map(|p| chars[p]);
        let next = chars.get(i + 1).copied();
        let boundary = match prev {
            Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
            Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
            _ => false,
        };
        if boundary && !out.ends_with('_') {
            out.push('_');
        }
        out.extend(ch.to_lowercase());
    }
    out
}

/// Separate digit runs from a preceding letter (`address_line1` →
/// `address_line_1`).
pub fn split_digit_runs(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 2);
    let mut prev: Option<char> = None;
    for ch in key.chars() {
        if ch.is_ascii_digit() && prev.is_some_and(char::is_alphabetic) {
            out.push('_');
        }
        out.push(ch);
        prev = Some(ch);
    }
    out
}

/// Convert `snake_case` / `kebab-case` to `camelCase`.
///
/// Leading separators are preserved (`_id` stays `_id`).
pub fn to_camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for ch in key.chars() {
        if (ch == '_' || ch == '-') && !out.is_empty() {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Spellings to try for `key`, in priority order, without duplicates:
/// as-is, snake_case (per capital, capital runs grouped, digit runs split),
/// camelCase, hyphen→underscore, underscore→hyphen.
pub fn candidate_keys(key: &str) -> Vec<String> {
    let snake = to_snake_case(key);
    let variants = [
        key.to_string(),
        snake.clone(),
        to_snake_case_grouped(key),
        split_digit_runs(&snake),
        to_camel_case(key),
        key.replace('-', "_"),
        key.replace('_', "-"),
    ];
    let mut candidates: Vec<String> = Vec::with_capacity(variants.len());
    for variant in variants {
        if !variant.is_empty() && !candidates.contains(&variant) {
            candidates.push(variant);
        }
    }
    candidates
}

/// Look a field up on a record under every candidate spelling of `key`.
///
/// Returns the first candidate holding a non-null value. Non-object records
/// have no fields.
pub fn resolve_field<'a>(record: &'a Value, key: &str) -> Option<&'a Value> {
    let object = record.as_object()?;
    candidate_keys(key)
        .iter()
        .filter_map(|candidate| object.get(candidate))
        .find(|value| !value.is_null())
}
