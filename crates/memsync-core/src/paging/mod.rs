//! Paginated traversal of remote listings
//!
//! Remote collections are only observable one bounded page at a time. This
//! module turns a page-fetch function into one ordered item stream:
//!
//! - **for_each**: visit every item in server order, aborting on the first error
//! - **fetch_all**: collect every item in server order
//!
//! End of results is detected from the page contents (a short or empty page),
//! never from the server's reported total alone.

mod scanner;

pub use scanner::{fetch_all, fetch_all_with, for_each, for_each_with};

use serde::{Deserialize, Serialize};

/// Index/size pair sent with each page request
///
/// Indexes start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageOptions {
    pub index: u32,
    pub size: u32,
}

impl PageOptions {
    /// Offset of the first item on this page, for stores addressed by position
    pub fn offset(&self) -> usize {
        (self.index.saturating_sub(1) as usize).saturating_mul(self.size as usize)
    }
}

/// One batch of results returned by a listing call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items in server order
    pub items: Vec<T>,
    /// Total the server claims to hold; may be stale
    pub reported_total: u64,
}

impl<T> Page<T> {
    /// Create a page from its items and the server-reported total
    pub fn new(items: Vec<T>, reported_total: u64) -> Self {
        Self {
            items,
            reported_total,
        }
    }

    /// An empty page reporting no items
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }

    /// Slice a page out of a fully materialized listing
    pub fn slice(all: &[T], options: PageOptions) -> Self
    where
        T: Clone,
    {
        let start = options.offset().min(all.len());
        let end = start.saturating_add(options.size as usize).min(all.len());
        Self::new(all[start..end].to_vec(), all.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_starts_at_zero_for_first_page() {
        assert_eq!(PageOptions { index: 1, size: 50 }.offset(), 0);
        assert_eq!(PageOptions { index: 3, size: 50 }.offset(), 100);
    }

    #[test]
    fn slice_clamps_to_listing_end() {
        let all = vec!["a", "b", "c", "d", "e"];

        let page = Page::slice(&all, PageOptions { index: 2, size: 2 });
        assert_eq!(page.items, vec!["c", "d"]);
        assert_eq!(page.reported_total, 5);

        let page = Page::slice(&all, PageOptions { index: 3, size: 2 });
        assert_eq!(page.items, vec!["e"]);

        let page = Page::slice(&all, PageOptions { index: 9, size: 2 });
        assert!(page.items.is_empty());
    }
}
