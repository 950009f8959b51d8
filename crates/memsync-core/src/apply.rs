//! Delta application with partial-failure tolerance
//!
//! One cycle runs `COMPUTE_DELTA -> APPLY_ADDS -> APPLY_REMOVES ->
//! RESOLVE_FINAL_STATE` exactly once:
//!
//! - every add is attempted before any remove
//! - a failed call is recorded and the remaining calls still run
//! - the final membership is the last successful call's server echo
//! - if that echo matches desired as a set, desired's order is reported

use std::fmt;
use std::hash::Hash;

use crate::collection::Collection;
use crate::delta::{Delta, list_deltas, same_members};
use crate::error::{BoxError, Operation, OperationFailure, PartialApplyError, Result};

/// Outcome of one reconciliation cycle
#[derive(Debug)]
pub struct Reconciliation<K> {
    /// Best-known membership after the cycle
    pub final_membership: Vec<K>,
    /// The delta that was planned
    pub delta: Delta<K>,
    /// Every call succeeded but the server's membership differs from desired
    pub diverged: bool,
    /// Set when one or more calls failed
    pub error: Option<PartialApplyError>,
}

impl<K> Reconciliation<K> {
    /// Whether every planned call succeeded
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Convert into the final membership, or the aggregate error
    ///
    /// The error still carries the partial membership in
    /// [`PartialApplyError::final_membership`].
    pub fn into_result(self) -> Result<Vec<K>> {
        match self.error {
            Some(err) => Err(err.into()),
            None => Ok(self.final_membership),
        }
    }
}

/// Apply the delta between `current` and `desired` through two closures.
///
/// `add` and `remove` return the membership the server reports after the
/// call. Keys in `desired` are expected to be unique.
pub fn apply<K, E, A, R>(
    current: &[K],
    desired: &[K],
    mut add: A,
    mut remove: R,
) -> Reconciliation<K>
where
    K: Eq + Hash + Clone + fmt::Display,
    E: Into<BoxError>,
    A: FnMut(&K) -> std::result::Result<Vec<K>, E>,
    R: FnMut(&K) -> std::result::Result<Vec<K>, E>,
{
    apply_operations(current, desired, |operation, key| match operation {
        Operation::Add => add(key).map_err(Into::into),
        Operation::Remove => remove(key).map_err(Into::into),
    })
}

/// Apply the delta between `current` and `desired` to a [`Collection`].
pub fn reconcile<C>(
    current: &[C::Key],
    desired: &[C::Key],
    collection: &mut C,
) -> Reconciliation<C::Key>
where
    C: Collection,
{
    apply_operations(current, desired, |operation, key| match operation {
        Operation::Add => collection.add(key).map_err(Into::into),
        Operation::Remove => collection.remove(key).map_err(Into::into),
    })
}

fn apply_operations<K, M>(current: &[K], desired: &[K], mut mutate: M) -> Reconciliation<K>
where
    K: Eq + Hash + Clone + fmt::Display,
    M: FnMut(Operation, &K) -> std::result::Result<Vec<K>, BoxError>,
{
    let delta = list_deltas(current, desired);
    tracing::info!(
        to_add = delta.to_add.len(),
        to_remove = delta.to_remove.len(),
        "Applying membership delta"
    );

    let planned = delta
        .to_add
        .iter()
        .map(|key| (Operation::Add, key))
        .chain(delta.to_remove.iter().map(|key| (Operation::Remove, key)));

    let mut last_echo: Option<Vec<K>> = None;
    let mut failures = Vec::new();

    for (operation, key) in planned {
        match mutate(operation, key) {
            Ok(membership) => {
                tracing::debug!(
                    %operation,
                    %key,
                    members = membership.len(),
                    "Membership change applied"
                );
                last_echo = Some(membership);
            }
            Err(cause) => {
                tracing::warn!(%operation, %key, error = %cause, "Membership change failed");
                failures.push(OperationFailure {
                    operation,
                    key: key.to_string(),
                    cause,
                });
            }
        }
    }

    let reported = last_echo.unwrap_or_else(|| current.to_vec());
    let (final_membership, diverged) = resolve_final_state(reported, desired, failures.is_empty());

    let error = if failures.is_empty() {
        tracing::info!(members = final_membership.len(), "Membership reconciled");
        None
    } else {
        tracing::warn!(
            failed = failures.len(),
            members = final_membership.len(),
            "Membership reconciled with errors"
        );
        Some(PartialApplyError {
            failures,
            final_membership: final_membership.iter().map(ToString::to_string).collect(),
        })
    };

    Reconciliation {
        final_membership,
        delta,
        diverged,
        error,
    }
}

/// Pick the reported ordering and flag unexplained divergence.
fn resolve_final_state<K>(reported: Vec<K>, desired: &[K], all_succeeded: bool) -> (Vec<K>, bool)
where
    K: Eq + Hash + Clone + fmt::Display,
{
    if same_members(&reported, desired) {
        return (desired.to_vec(), false);
    }
    if !all_succeeded {
        return (reported, false);
    }

    // Server accepted every call yet holds something else; its state wins.
    let drift = list_deltas(desired, &reported);
    tracing::warn!(
        unexpected = %render(&drift.to_add),
        missing = %render(&drift.to_remove),
        "Server membership diverged from desired after a clean apply"
    );
    (reported, true)
}

fn render<K: fmt::Display>(keys: &[K]) -> String {
    keys.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}
