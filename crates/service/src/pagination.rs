//! Pagination utilities for service layer
//!
//! `Pagination` normalizes list inputs. [`select_page`] and [`page_window`]
//! drive the numbered navigation of the order list: at most
//! [`WINDOW_SIZE`] page links, centred on the current page where possible.

/// Number of page links rendered at most.
pub const WINDOW_SIZE: u64 = 5;
const HALF: u64 = WINDOW_SIZE / 2;

/// Pagination parameters
#[derive(Clone, Copy, Debug)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl Pagination {
    /// Clamp to sane defaults and convert to a 0-based page index and page size
    pub fn normalize(self) -> (u64, u64) {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, 100);
        ((page - 1) as u64, per_page as u64)
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: 20 } }
}

/// Resolve the page to display from raw user input.
///
/// Unparseable input, pages below 1 and pages past `total_pages` all fall
/// back to page 1. Out-of-range requests are not clamped to the last page.
pub fn select_page(total_pages: u64, requested: &str) -> u64 {
    let page = match requested.trim().parse::<i64>() {
        Ok(p) if p >= 1 => p as u64,
        _ => return 1,
    };
    if page > total_pages { 1 } else { page }
}

/// Page numbers to render as navigation links.
///
/// ```
/// use service::pagination::page_window;
/// assert_eq!(page_window(3, 2), vec![1, 2, 3]);
/// assert_eq!(page_window(10, 5), vec![3, 4, 5, 6, 7]);
/// assert_eq!(page_window(10, 9), vec![6, 7, 8, 9, 10]);
/// ```
pub fn page_window(total_pages: u64, page: u64) -> Vec<u64> {
    let range = if total_pages < WINDOW_SIZE {
        1..=total_pages
    } else if page <= HALF + 1 {
        1..=WINDOW_SIZE
    } else if total_pages.saturating_sub(page) <= HALF {
        total_pages - (WINDOW_SIZE - 1)..=total_pages
    } else {
        page - HALF..=page + HALF
    };
    range.collect()
}
