//! Client-side pagination of search results.

use serde::Serialize;

/// Results shown per page unless configured otherwise.
pub const DEFAULT_PER_PAGE: usize = 10;

/// One page of a result list. Pages are numbered from 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<'_, T> {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Slices `items` into page `page` of `per_page` entries.
///
/// Page 0 is treated as page 1 and a zero page size as 1. A page past the end
/// is empty but still reports the real totals.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> Page<'_, T> {
    let page = page.max(1);
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);

    let start = (page - 1).saturating_mul(per_page).min(total_items);
    let end = start.saturating_add(per_page).min(total_items);

    Page {
        items: &items[start..end],
        page,
        per_page,
        total_items,
        total_pages,
    }
}
