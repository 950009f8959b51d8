//! Shared test utilities for the memsync workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`mock`]: [`MockCollection`], a scriptable in-memory remote collection
//! - [`fixtures`]: records with name/UUID identities and workspace files

pub mod fixtures;
pub mod mock;

pub use mock::{Call, MockCollection, MockError};
