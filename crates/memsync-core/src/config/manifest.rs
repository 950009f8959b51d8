//! Manifest parsing for memsync.toml files
//!
//! The manifest declares, per container, the membership that should exist
//! remotely. It is supplied wholesale on every reconciliation cycle.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ScanConfig;
use crate::{Error, Result};

/// Desired membership of one container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipSpec {
    /// Container identity, e.g. "tag:production" or "team:ops"
    pub container: String,

    /// Desired members in declaration order
    #[serde(default)]
    pub members: Vec<String>,
}

/// Membership manifest parsed from memsync.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Paging settings used when listing current memberships
    #[serde(default)]
    pub scan: ScanConfig,

    /// Declared memberships, one table per container
    #[serde(default, rename = "membership")]
    pub memberships: Vec<MembershipSpec>,
}

impl Manifest {
    /// Parse and validate a manifest from TOML content
    ///
    /// # Example
    ///
    /// ```
    /// use memsync_core::config::Manifest;
    ///
    /// let manifest = Manifest::parse(r#"
    /// [scan]
    /// page_size = 50
    ///
    /// [[membership]]
    /// container = "tag:production"
    /// members = ["checkout", "billing"]
    /// "#).unwrap();
    ///
    /// assert_eq!(manifest.scan.page_size, 50);
    /// assert_eq!(manifest.memberships[0].members, vec!["checkout", "billing"]);
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        let manifest: Manifest = toml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load a manifest from disk
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] if the file does not exist, or a
    /// parse/validation error otherwise.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path)?;
        tracing::debug!(?path, "Loading membership manifest");
        Self::parse(&content)
    }

    /// Serialize the manifest back to TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Look up the declared membership of a container
    pub fn membership(&self, container: &str) -> Option<&MembershipSpec> {
        self.memberships.iter().find(|m| m.container == container)
    }

    /// Check scan settings and container names
    pub fn validate(&self) -> Result<()> {
        self.scan.validate()?;

        let mut seen = HashSet::new();
        for spec in &self.memberships {
            if spec.container.trim().is_empty() {
                return Err(Error::invalid_config("membership container must not be empty"));
            }
            if !seen.insert(spec.container.as_str()) {
                return Err(Error::invalid_config(format!(
                    "membership container '{}' is declared more than once",
                    spec.container
                )));
            }
        }
        Ok(())
    }
}
