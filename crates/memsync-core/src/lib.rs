//! Membership reconciliation against paginated remote collections
//!
//! A remote collection (projects of a tag, permissions of a team, policies of
//! a tag) can only be observed through page-by-page listing calls and changed
//! one member at a time. This crate synchronizes a declared desired
//! membership against such a collection:
//!
//! - **paging**: exhaustive, order-preserving traversal of a paginated listing
//! - **matcher**: resolve an identity to exactly one item, in memory or paged
//! - **delta**: minimal add/remove delta between current and desired
//! - **apply**: adds before removes, per-call fault tolerance, server echo as
//!   the authoritative final state
//! - **reconciler**: one full fetch/delta/apply cycle against a [`Collection`]
//!
//! # Architecture
//!
//! ```text
//!   desired (Manifest) ----------------------+
//!                                            v
//!   Collection::fetch_page --> paging --> delta --> apply --> Reconciliation
//!                                                     |
//!                                  Collection::add / Collection::remove
//! ```
//!
//! # Example
//!
//! ```
//! use memsync_core::{apply, list_deltas};
//!
//! let current = vec!["A".to_string(), "B".to_string()];
//! let desired = vec!["B".to_string(), "C".to_string()];
//!
//! let delta = list_deltas(&current, &desired);
//! assert_eq!(delta.to_add, vec!["C"]);
//! assert_eq!(delta.to_remove, vec!["A"]);
//!
//! let result = apply(
//!     &current,
//!     &desired,
//!     |_key| Ok::<_, String>(vec!["A".into(), "B".into(), "C".into()]),
//!     |_key| Ok(vec!["C".into(), "B".into()]),
//! );
//! assert_eq!(result.final_membership, vec!["B", "C"]);
//! ```

pub mod apply;
pub mod collection;
pub mod config;
pub mod delta;
pub mod error;
pub mod logging;
pub mod matcher;
pub mod paging;
pub mod reconciler;
pub mod report;

pub use apply::{Reconciliation, apply, reconcile};
pub use collection::{Collection, FnCollection};
pub use config::{Manifest, MembershipSpec, ScanConfig};
pub use delta::{Delta, dedup, list_deltas, list_deltas_by, same_members};
pub use error::{BoxError, Error, Operation, OperationFailure, PartialApplyError, Result};
pub use matcher::{filter, find, find_by_key, find_paged, find_paged_by_key, find_paged_with};
pub use paging::{Page, PageOptions, fetch_all, fetch_all_with, for_each, for_each_with};
pub use reconciler::{ReconcileOptions, Reconciler};
pub use report::{FailureEntry, ReconcileReport};
