//! The capability triple a remote membership collection provides
//!
//! Projects-by-tag, policies-by-tag and permissions-by-team differ only in
//! how they list, add and remove members. [`Collection`] captures exactly
//! those three calls; [`FnCollection`] builds one from closures.

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::error::BoxError;
use crate::paging::{Page, PageOptions};

/// A remote membership that can only be listed page by page
///
/// `add` and `remove` return the full membership the server reports after
/// the call. That echo is treated as authoritative.
pub trait Collection {
    /// Identity of one member
    type Key: Eq + Hash + Clone + fmt::Display;

    /// Error reported by the transport
    type Error: Into<BoxError>;

    /// Fetch one page of current members
    fn fetch_page(&mut self, page: PageOptions) -> Result<Page<Self::Key>, Self::Error>;

    /// Add one member, returning the updated membership
    fn add(&mut self, key: &Self::Key) -> Result<Vec<Self::Key>, Self::Error>;

    /// Remove one member, returning the updated membership
    fn remove(&mut self, key: &Self::Key) -> Result<Vec<Self::Key>, Self::Error>;
}

/// A [`Collection`] assembled from three closures
///
/// ```
/// use memsync_core::{Collection, FnCollection, Page, PageOptions};
///
/// let mut collection = FnCollection::new(
///     |options| Ok::<_, String>(Page::slice(&["checkout".to_string()], options)),
///     |key: &String| Ok(vec!["checkout".to_string(), key.clone()]),
///     |_key: &String| Ok(Vec::new()),
/// );
///
/// let page = collection.fetch_page(PageOptions { index: 1, size: 10 }).unwrap();
/// assert_eq!(page.items, vec!["checkout"]);
/// ```
pub struct FnCollection<K, E, F, A, R> {
    fetch: F,
    add: A,
    remove: R,
    _marker: PhantomData<fn() -> (K, E)>,
}

impl<K, E, F, A, R> FnCollection<K, E, F, A, R>
where
    F: FnMut(PageOptions) -> Result<Page<K>, E>,
    A: FnMut(&K) -> Result<Vec<K>, E>,
    R: FnMut(&K) -> Result<Vec<K>, E>,
{
    /// Bundle fetch, add and remove closures into a collection
    pub fn new(fetch: F, add: A, remove: R) -> Self {
        Self {
            fetch,
            add,
            remove,
            _marker: PhantomData,
        }
    }
}

impl<K, E, F, A, R> Collection for FnCollection<K, E, F, A, R>
where
    K: Eq + Hash + Clone + fmt::Display,
    E: Into<BoxError>,
    F: FnMut(PageOptions) -> Result<Page<K>, E>,
    A: FnMut(&K) -> Result<Vec<K>, E>,
    R: FnMut(&K) -> Result<Vec<K>, E>,
{
    type Key = K;
    type Error = E;

    fn fetch_page(&mut self, page: PageOptions) -> Result<Page<K>, E> {
        (self.fetch)(page)
    }

    fn add(&mut self, key: &K) -> Result<Vec<K>, E> {
        (self.add)(key)
    }

    fn remove(&mut self, key: &K) -> Result<Vec<K>, E> {
        (self.remove)(key)
    }
}

impl<K, E, F, A, R> fmt::Debug for FnCollection<K, E, F, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCollection").finish_non_exhaustive()
    }
}
