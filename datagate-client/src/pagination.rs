//! Page windows and cursors.

use crate::engine::sort::sort_records;
use datagate_core::{Cursor, PaginationSpec, Record, ResultEnvelope};

/// Cut one page out of an already-filtered collection.
///
/// `total` is the full collection size. The next cursor is present exactly
/// when records remain past the window; the previous cursor whenever the
/// window does not start at zero.
pub fn paginate(records: Vec<Record>, pagination: &PaginationSpec) -> ResultEnvelope {
    let total = records.len();
    let limit = pagination.effective_limit();
    let offset = pagination.offset;
    let end = offset.saturating_add(limit);

    let items: Vec<Record> = records.into_iter().skip(offset).take(limit).collect();
    ResultEnvelope {
        items,
        total: Some(total as u64),
        next_cursor: (end < total).then_some(Cursor::Offset(end)),
        prev_cursor: previous_offset(pagination),
    }
}

/// Apply the optional sort field, then [`paginate`].
pub fn sort_and_paginate(mut records: Vec<Record>, pagination: &PaginationSpec) -> ResultEnvelope {
    if let Some(field) = pagination.sort_field.as_deref().filter(|f| !f.trim().is_empty()) {
        sort_records(&mut records, field, pagination.sort_direction);
    }
    paginate(records, pagination)
}

/// Cursors for a page served by a remote backend.
///
/// A backend token always wins. Otherwise the next offset is emitted when the
/// known total has more records, or, with no total, when the page came back
/// full.
pub fn remote_cursors(
    pagination: &PaginationSpec,
    received: usize,
    total: Option<u64>,
    token: Option<String>,
) -> (Option<Cursor>, Option<Cursor>) {
    let next_offset = pagination.offset.saturating_add(received);
    let next = match (token, total) {
        (Some(token), _) => Some(Cursor::Token(token)),
        (None, Some(total)) => ((next_offset as u64) < total && received > 0).then_some(Cursor::Offset(next_offset)),
        (None, None) => (received > 0 && received >= pagination.effective_limit()).then_some(Cursor::Offset(next_offset)),
    };
    (next, previous_offset(pagination))
}

fn previous_offset(pagination: &PaginationSpec) -> Option<Cursor> {
    (pagination.offset > 0).then(|| {
        Cursor::Offset(pagination.offset.saturating_sub(pagination.effective_limit()))
    })
}
