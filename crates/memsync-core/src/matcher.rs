//! Single-match identity resolution
//!
//! Every lookup here has the same contract: exactly one match succeeds, zero
//! matches is [`Error::NotFound`], and more than one is
//! [`Error::AmbiguousMatch`]. The first of several matches is never returned.

use std::fmt;

use crate::config::ScanConfig;
use crate::error::{BoxError, Error, PREDICATE_IDENTITY, Result};
use crate::paging::{self, Page, PageOptions};

/// Every item matching the predicate, in sequence order
pub fn filter<'a, T, P>(items: &'a [T], mut predicate: P) -> Vec<&'a T>
where
    P: FnMut(&T) -> bool,
{
    items.iter().filter(|item| predicate(item)).collect()
}

/// Resolve exactly one item of an in-memory sequence.
///
/// # Errors
///
/// [`Error::NotFound`] for zero matches, [`Error::AmbiguousMatch`] for more
/// than one. Attach a readable identity with [`Error::with_identity`].
pub fn find<'a, T, P>(items: &'a [T], predicate: P) -> Result<&'a T>
where
    P: FnMut(&T) -> bool,
{
    let matches = filter(items, predicate);
    match matches.as_slice() {
        [] => Err(not_found(PREDICATE_IDENTITY)),
        [item] => Ok(*item),
        many => Err(ambiguous(PREDICATE_IDENTITY, many.len())),
    }
}

/// Resolve exactly one item by comparing a projected key.
///
/// Errors name `key`.
pub fn find_by_key<'a, T, Q, F>(items: &'a [T], key: &Q, key_of: F) -> Result<&'a T>
where
    Q: PartialEq + fmt::Display + ?Sized,
    F: Fn(&T) -> &Q,
{
    find(items, |item| key_of(item) == key).map_err(|e| e.with_identity(key.to_string()))
}

/// Resolve exactly one item from a paginated listing.
///
/// Scans every page with [`ScanConfig::default`]; see [`find_paged_with`].
pub fn find_paged<T, E, F, P>(fetch_page: F, predicate: P) -> Result<T>
where
    F: FnMut(PageOptions) -> std::result::Result<Page<T>, E>,
    E: Into<BoxError>,
    P: FnMut(&T) -> bool,
{
    find_paged_with(&ScanConfig::default(), fetch_page, predicate)
}

/// Resolve exactly one item from a paginated listing.
///
/// For listings with no server-side filter on the needed identity fields, so
/// the full traversal is unavoidable. Every page is read even after a first
/// match, since a later page may hold a second one.
///
/// # Errors
///
/// Scan errors abort the lookup; otherwise as [`find`].
pub fn find_paged_with<T, E, F, P>(
    config: &ScanConfig,
    fetch_page: F,
    mut predicate: P,
) -> Result<T>
where
    F: FnMut(PageOptions) -> std::result::Result<Page<T>, E>,
    E: Into<BoxError>,
    P: FnMut(&T) -> bool,
{
    let mut found = None;
    let mut count = 0usize;

    paging::for_each_with(config, fetch_page, |item| {
        if predicate(&item) {
            count += 1;
            if found.is_none() {
                found = Some(item);
            }
        }
        Ok(())
    })?;

    match (found, count) {
        (Some(item), 1) => Ok(item),
        (None, _) => Err(not_found(PREDICATE_IDENTITY)),
        (Some(_), n) => Err(ambiguous(PREDICATE_IDENTITY, n)),
    }
}

/// Resolve exactly one item of a paginated listing by a projected key.
pub fn find_paged_by_key<T, E, F, Q, K>(
    config: &ScanConfig,
    fetch_page: F,
    key: &Q,
    key_of: K,
) -> Result<T>
where
    F: FnMut(PageOptions) -> std::result::Result<Page<T>, E>,
    E: Into<BoxError>,
    Q: PartialEq + fmt::Display + ?Sized,
    K: Fn(&T) -> &Q,
{
    find_paged_with(config, fetch_page, |item| key_of(item) == key)
        .map_err(|e| e.with_identity(key.to_string()))
}

fn not_found(identity: &str) -> Error {
    Error::NotFound {
        identity: identity.to_string(),
    }
}

fn ambiguous(identity: &str, count: usize) -> Error {
    Error::AmbiguousMatch {
        identity: identity.to_string(),
        count,
    }
}
