//! Command implementations for memsync-cli

pub mod find;
pub mod reconcile;

pub use find::run_find;
pub use reconcile::{run_apply, run_plan};
