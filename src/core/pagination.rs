//! Offset-based pagination helpers shared by every selection mode.

use std::collections::HashSet;

use crate::domain::model::NamedRef;

/// `ceil(total_count / page_size)`, zero for an empty candidate set.
pub fn total_pages(total_count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(page_size)
}

/// Index of the first candidate on a 1-based page.
pub fn window_offset(page: u32, page_size: usize) -> usize {
    (page.max(1) as usize - 1).saturating_mul(page_size)
}

/// Parses a raw page parameter; anything missing, non-numeric or below 1 becomes page 1.
pub fn normalize_page(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|page| *page >= 1)
        .map(|page| u32::try_from(page).unwrap_or(u32::MAX))
        .unwrap_or(1)
}

/// Entries of `first` whose name also appears in `second`, in `first`'s order.
pub fn intersect_ordered(first: Vec<NamedRef>, second: &[NamedRef]) -> Vec<NamedRef> {
    let names: HashSet<&str> = second.iter().map(|entry| entry.name.as_str()).collect();
    first
        .into_iter()
        .filter(|entry| names.contains(entry.name.as_str()))
        .collect()
}

/// The `[offset, offset + page_size)` slice of the candidate set, clamped to its bounds.
pub fn window<T: Clone>(candidates: &[T], page: u32, page_size: usize) -> Vec<T> {
    let offset = window_offset(page, page_size);
    if offset >= candidates.len() {
        return Vec::new();
    }
    let end = offset.saturating_add(page_size).min(candidates.len());
    candidates[offset..end].to_vec()
}
