//! Page-by-page traversal loop

use crate::config::ScanConfig;
use crate::error::{BoxError, Error, Result};

use super::{Page, PageOptions};

/// Visit every item of a paginated listing in server order.
///
/// Uses [`ScanConfig::default`]. See [`for_each_with`].
pub fn for_each<T, E, F, V>(fetch_page: F, visit: V) -> Result<()>
where
    F: FnMut(PageOptions) -> std::result::Result<Page<T>, E>,
    E: Into<BoxError>,
    V: FnMut(T) -> Result<()>,
{
    for_each_with(&ScanConfig::default(), fetch_page, visit)
}

/// Visit every item of a paginated listing in server order.
///
/// Pages are requested with increasing index starting at 1. The scan stops
/// after a page holding fewer items than `config.page_size`, or no items at
/// all. `reported_total` is only used for diagnostics.
///
/// # Errors
///
/// - [`Error::Fetch`] if `fetch_page` fails; nothing is retried
/// - whatever `visit` returns, unchanged
/// - [`Error::PageLimitExceeded`] if `config.max_pages` full pages were
///   received and the listing still has not ended
pub fn for_each_with<T, E, F, V>(config: &ScanConfig, mut fetch_page: F, mut visit: V) -> Result<()>
where
    F: FnMut(PageOptions) -> std::result::Result<Page<T>, E>,
    E: Into<BoxError>,
    V: FnMut(T) -> Result<()>,
{
    let size = config.page_size;
    let mut index: u32 = 1;
    let mut seen: u64 = 0;

    loop {
        if let Some(max_pages) = config.max_pages
            && index > max_pages
        {
            tracing::warn!(max_pages, seen, "Listing did not end within the page limit");
            return Err(Error::PageLimitExceeded { max_pages });
        }

        let page = fetch_page(PageOptions { index, size }).map_err(|e| Error::Fetch {
            page: index,
            source: e.into(),
        })?;

        let count = page.items.len();
        let reported_total = page.reported_total;
        tracing::debug!(page = index, items = count, reported_total, "Fetched page");

        for item in page.items {
            visit(item)?;
        }
        seen += count as u64;

        if count == 0 || count < size as usize {
            if reported_total != seen {
                tracing::debug!(
                    seen,
                    reported_total,
                    "Server-reported total disagrees with items received"
                );
            }
            return Ok(());
        }

        index = index.saturating_add(1);
    }
}

/// Collect every item of a paginated listing in server order.
///
/// Uses [`ScanConfig::default`]. See [`fetch_all_with`].
pub fn fetch_all<T, E, F>(fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(PageOptions) -> std::result::Result<Page<T>, E>,
    E: Into<BoxError>,
{
    fetch_all_with(&ScanConfig::default(), fetch_page)
}

/// Collect every item of a paginated listing in server order.
///
/// An empty first page yields an empty vector. Errors are those of
/// [`for_each_with`].
pub fn fetch_all_with<T, E, F>(config: &ScanConfig, fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(PageOptions) -> std::result::Result<Page<T>, E>,
    E: Into<BoxError>,
{
    let mut items = Vec::new();
    for_each_with(config, fetch_page, |item| {
        items.push(item);
        Ok(())
    })?;
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pages_of(sizes: &[usize]) -> Vec<Vec<u32>> {
        let mut next = 0;
        sizes
            .iter()
            .map(|&n| {
                let page: Vec<u32> = (next..next + n as u32).collect();
                next += n as u32;
                page
            })
            .collect()
    }

    fn scripted(
        pages: Vec<Vec<u32>>,
    ) -> impl FnMut(PageOptions) -> std::result::Result<Page<u32>, String> {
        let total: usize = pages.iter().map(Vec::len).sum();
        move |options| {
            let items = pages
                .get(options.index as usize - 1)
                .cloned()
                .unwrap_or_default();
            Ok(Page::new(items, total as u64))
        }
    }

    #[test]
    fn collects_items_across_pages_in_order() {
        let config = ScanConfig::new(2).unwrap();
        let items = fetch_all_with(&config, scripted(pages_of(&[2, 2, 1]))).unwrap();
        assert_eq!(items, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn empty_first_page_yields_nothing() {
        let mut calls = 0;
        let items: Vec<u32> = fetch_all(|_| {
            calls += 1;
            Ok::<_, String>(Page::empty())
        })
        .unwrap();
        assert!(items.is_empty());
        assert_eq!(calls, 1);
    }

    #[test]
    fn exact_multiple_of_page_size_needs_one_empty_page() {
        let config = ScanConfig::new(2).unwrap();
        let mut requested = Vec::new();
        let mut source = scripted(pages_of(&[2, 2]));
        let items = fetch_all_with(&config, |options| {
            requested.push(options.index);
            source(options)
        })
        .unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(requested, vec![1, 2, 3]);
    }

    #[test]
    fn stale_reported_total_does_not_end_scan() {
        let config = ScanConfig::new(2).unwrap();
        let pages = pages_of(&[2, 2, 1]);
        let items = fetch_all_with(&config, |options: PageOptions| {
            let items = pages.get(options.index as usize - 1).cloned().unwrap_or_default();
            // server claims only two items exist
            Ok::<_, String>(Page::new(items, 2))
        })
        .unwrap();
        assert_eq!(items.len(), 5);
    }

    #[test]
    fn fetch_error_aborts_with_page_index() {
        let config = ScanConfig::new(2).unwrap();
        let result = fetch_all_with(&config, |options: PageOptions| {
            if options.index == 2 {
                Err("503 service unavailable".to_string())
            } else {
                Ok(Page::new(vec![1, 2], 10))
            }
        });
        match result {
            Err(Error::Fetch { page, source }) => {
                assert_eq!(page, 2);
                assert_eq!(source.to_string(), "503 service unavailable");
            }
            other => panic!("expected fetch error, got {:?}", other),
        }
    }

    #[test]
    fn visit_error_stops_traversal() {
        let config = ScanConfig::new(2).unwrap();
        let mut visited = Vec::new();
        let result = for_each_with(&config, scripted(pages_of(&[2, 2, 1])), |item| {
            if item == 2 {
                return Err(Error::NotFound {
                    identity: "stop".to_string(),
                });
            }
            visited.push(item);
            Ok(())
        });
        assert!(matches!(result, Err(Error::NotFound { .. })));
        assert_eq!(visited, vec![0, 1]);
    }

    #[test]
    fn page_limit_stops_endless_full_pages() {
        let config = ScanConfig::new(3).unwrap().with_max_pages(4);
        let mut calls = 0;
        let result = fetch_all_with(&config, |_| {
            calls += 1;
            Ok::<_, String>(Page::new(vec![1, 2, 3], 3))
        });
        assert!(matches!(
            result,
            Err(Error::PageLimitExceeded { max_pages: 4 })
        ));
        assert_eq!(calls, 4);
    }

    #[test]
    fn oversized_pages_keep_the_scan_going() {
        let config = ScanConfig::new(2).unwrap();
        let items = fetch_all_with(&config, scripted(vec![vec![1, 2, 3], vec![4]])).unwrap();
        assert_eq!(items, vec![1, 2, 3, 4]);
    }
}
