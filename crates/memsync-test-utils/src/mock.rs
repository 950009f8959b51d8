//! [`MockCollection`]: an in-memory stand-in for a paginated remote membership.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use memsync_core::{Collection, Page, PageOptions};

/// Error returned by a scripted failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockError(pub String);

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for MockError {}

/// A call received by the mock, in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call<K> {
    Fetch(PageOptions),
    Add(K),
    Remove(K),
}

/// A remote membership held in memory, with scriptable misbehaviour.
///
/// # Example
///
/// ```rust
/// use memsync_core::Reconciler;
/// use memsync_test_utils::MockCollection;
///
/// let mut remote = MockCollection::with_members(["A", "B"]).reject_add("C");
/// let result = Reconciler::default()
///     .run(&mut remote, &["B".to_string(), "C".to_string()])
///     .unwrap();
/// assert!(result.error.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct MockCollection<K = String> {
    members: Vec<K>,
    reject_add: HashSet<K>,
    reject_remove: HashSet<K>,
    fail_fetch_on: Option<u32>,
    reported_total: Option<u64>,
    aliases: HashMap<K, K>,
    calls: Vec<Call<K>>,
}

impl<K> Default for MockCollection<K> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
            reject_add: HashSet::new(),
            reject_remove: HashSet::new(),
            fail_fetch_on: None,
            reported_total: None,
            aliases: HashMap::new(),
            calls: Vec::new(),
        }
    }
}

impl MockCollection<String> {
    /// Create a string-keyed collection holding the given members in order
    pub fn with_members<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_keys(members.into_iter().map(Into::into).collect())
    }
}

impl<K> MockCollection<K>
where
    K: Eq + Hash + Clone,
{
    /// Create a collection holding the given keys in order
    pub fn from_keys(members: Vec<K>) -> Self {
        Self {
            members,
            ..Self::default()
        }
    }

    /// Fail every add of `key`
    pub fn reject_add(mut self, key: impl Into<K>) -> Self {
        self.reject_add.insert(key.into());
        self
    }

    /// Fail every remove of `key`
    pub fn reject_remove(mut self, key: impl Into<K>) -> Self {
        self.reject_remove.insert(key.into());
        self
    }

    /// Fail the fetch of the given page index
    pub fn fail_fetch_on(mut self, page: u32) -> Self {
        self.fail_fetch_on = Some(page);
        self
    }

    /// Report this total on every page instead of the real count
    pub fn stale_total(mut self, total: u64) -> Self {
        self.reported_total = Some(total);
        self
    }

    /// Store `stored` whenever `requested` is added, like a server that
    /// normalizes identities
    pub fn normalize(mut self, requested: impl Into<K>, stored: impl Into<K>) -> Self {
        self.aliases.insert(requested.into(), stored.into());
        self
    }

    /// Current members in stored order
    pub fn members(&self) -> &[K] {
        &self.members
    }

    /// Every call received so far
    pub fn calls(&self) -> &[Call<K>] {
        &self.calls
    }

    /// Only the mutating calls, in order
    pub fn mutations(&self) -> Vec<&Call<K>> {
        self.calls
            .iter()
            .filter(|c| !matches!(c, Call::Fetch(_)))
            .collect()
    }

    /// Number of page fetches received
    pub fn fetch_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Fetch(_)))
            .count()
    }
}

impl<K> Collection for MockCollection<K>
where
    K: Eq + Hash + Clone + fmt::Display,
{
    type Key = K;
    type Error = MockError;

    fn fetch_page(&mut self, page: PageOptions) -> Result<Page<K>, MockError> {
        self.calls.push(Call::Fetch(page));
        if self.fail_fetch_on == Some(page.index) {
            return Err(MockError(format!("page {} unavailable", page.index)));
        }
        let mut result = Page::slice(&self.members, page);
        if let Some(total) = self.reported_total {
            result.reported_total = total;
        }
        Ok(result)
    }

    fn add(&mut self, key: &K) -> Result<Vec<K>, MockError> {
        self.calls.push(Call::Add(key.clone()));
        if self.reject_add.contains(key) {
            return Err(MockError(format!("cannot add {}", key)));
        }
        let stored = self.aliases.get(key).cloned().unwrap_or_else(|| key.clone());
        if !self.members.contains(&stored) {
            self.members.push(stored);
        }
        Ok(self.members.clone())
    }

    fn remove(&mut self, key: &K) -> Result<Vec<K>, MockError> {
        self.calls.push(Call::Remove(key.clone()));
        if self.reject_remove.contains(key) {
            return Err(MockError(format!("cannot remove {}", key)));
        }
        self.members.retain(|m| m != key);
        Ok(self.members.clone())
    }
}
