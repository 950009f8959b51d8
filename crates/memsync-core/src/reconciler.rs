//! Full reconciliation cycle against a [`Collection`]
//!
//! The Reconciler fetches the current membership fresh on every call, then
//! hands it to the applier. Nothing is cached between cycles.

use crate::Result;
use crate::apply::{Reconciliation, reconcile};
use crate::collection::Collection;
use crate::config::ScanConfig;
use crate::delta::{Delta, dedup, list_deltas};
use crate::paging;

/// Options for a reconciliation cycle
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    /// If true, compute the delta but issue no add/remove calls
    pub dry_run: bool,
}

/// Runs fetch, delta and apply for one collection at a time
///
/// Callers must not run two cycles against the same remote collection
/// concurrently.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    scan: ScanConfig,
    options: ReconcileOptions,
}

impl Reconciler {
    /// Create a reconciler that lists memberships with the given scan settings
    pub fn new(scan: ScanConfig) -> Self {
        Self {
            scan,
            options: ReconcileOptions::default(),
        }
    }

    /// Replace the cycle options
    pub fn with_options(mut self, options: ReconcileOptions) -> Self {
        self.options = options;
        self
    }

    /// Scan settings used for FETCH_CURRENT
    pub fn scan_config(&self) -> &ScanConfig {
        &self.scan
    }

    /// Cycle options
    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// List the full current membership of a collection
    ///
    /// # Errors
    ///
    /// Any scan error; the cycle cannot proceed without current state.
    pub fn fetch_current<C: Collection>(&self, collection: &mut C) -> Result<Vec<C::Key>> {
        paging::fetch_all_with(&self.scan, |page| collection.fetch_page(page))
    }

    /// Fetch current state and compute the delta, without mutating anything
    pub fn plan<C: Collection>(
        &self,
        collection: &mut C,
        desired: &[C::Key],
    ) -> Result<Delta<C::Key>> {
        let desired = unique_desired(desired);
        let current = self.fetch_current(collection)?;
        Ok(list_deltas(&current, &desired))
    }

    /// Run one complete reconciliation cycle.
    ///
    /// Per-call failures do not make this return `Err`; they are carried in
    /// [`Reconciliation::error`] together with the partial membership.
    ///
    /// # Errors
    ///
    /// Only errors that prevent the cycle from starting, i.e. a failed scan
    /// of the current membership.
    pub fn run<C: Collection>(
        &self,
        collection: &mut C,
        desired: &[C::Key],
    ) -> Result<Reconciliation<C::Key>> {
        let desired = unique_desired(desired);
        let current = self.fetch_current(collection)?;
        tracing::debug!(
            current = current.len(),
            desired = desired.len(),
            dry_run = self.options.dry_run,
            "Fetched current membership"
        );

        if self.options.dry_run {
            let delta = list_deltas(&current, &desired);
            tracing::info!(
                to_add = delta.to_add.len(),
                to_remove = delta.to_remove.len(),
                "[dry-run] Would apply membership delta"
            );
            return Ok(Reconciliation {
                final_membership: desired,
                delta,
                diverged: false,
                error: None,
            });
        }

        Ok(reconcile(&current, &desired, collection))
    }
}

fn unique_desired<K>(desired: &[K]) -> Vec<K>
where
    K: Eq + std::hash::Hash + Clone + std::fmt::Display,
{
    let (unique, repeated) = dedup(desired);
    for key in &repeated {
        tracing::warn!(%key, "Dropping duplicate desired member");
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::FnCollection;
    use crate::error::Error;
    use crate::paging::{Page, PageOptions};
    use std::cell::RefCell;

    #[test]
    fn fetch_failure_aborts_before_any_mutation() {
        let mutated = RefCell::new(false);
        let mut collection = FnCollection::new(
            |_options: PageOptions| Err::<Page<String>, _>("connection refused".to_string()),
            |_key: &String| {
                *mutated.borrow_mut() = true;
                Ok(Vec::new())
            },
            |_key: &String| {
                *mutated.borrow_mut() = true;
                Ok(Vec::new())
            },
        );

        let err = Reconciler::default()
            .run(&mut collection, &["a".to_string()])
            .unwrap_err();
        assert!(matches!(err, Error::Fetch { page: 1, .. }));
        assert!(!*mutated.borrow());
    }

    #[test]
    fn dry_run_plans_without_calls() {
        let calls = RefCell::new(0);
        let current = vec!["a".to_string(), "b".to_string()];
        let mut collection = FnCollection::new(
            |options: PageOptions| Ok::<_, String>(Page::slice(&current, options)),
            |_key: &String| {
                *calls.borrow_mut() += 1;
                Ok(Vec::new())
            },
            |_key: &String| {
                *calls.borrow_mut() += 1;
                Ok(Vec::new())
            },
        );

        let reconciler = Reconciler::default().with_options(ReconcileOptions { dry_run: true });
        let result = reconciler
            .run(&mut collection, &["b".to_string(), "c".to_string()])
            .unwrap();

        assert_eq!(*calls.borrow(), 0);
        assert_eq!(result.delta.to_add, vec!["c".to_string()]);
        assert_eq!(result.delta.to_remove, vec!["a".to_string()]);
        assert_eq!(result.final_membership, vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn duplicate_desired_members_are_added_once() {
        let added = RefCell::new(Vec::new());
        let mut collection = FnCollection::new(
            |_options: PageOptions| Ok::<_, String>(Page::empty()),
            |key: &String| {
                added.borrow_mut().push(key.clone());
                Ok(added.borrow().clone())
            },
            |_key: &String| Ok(Vec::new()),
        );

        let desired = vec!["x".to_string(), "x".to_string(), "y".to_string()];
        let result = Reconciler::default().run(&mut collection, &desired).unwrap();

        assert_eq!(*added.borrow(), vec!["x".to_string(), "y".to_string()]);
        assert_eq!(result.final_membership, vec!["x".to_string(), "y".to_string()]);
    }
}
