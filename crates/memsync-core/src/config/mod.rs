//! Configuration for scans and declared memberships
//!
//! - [`ScanConfig`]: page size and runaway-scan cap for paginated listings
//! - [`Manifest`]: the TOML file declaring desired memberships per container

mod manifest;

pub use manifest::{Manifest, MembershipSpec};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

fn default_page_size() -> u32 {
    ScanConfig::DEFAULT_PAGE_SIZE
}

/// Settings for one paginated traversal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Number of items requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Give up after this many full pages; `None` scans until the listing ends
    #[serde(default)]
    pub max_pages: Option<u32>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            page_size: Self::DEFAULT_PAGE_SIZE,
            max_pages: None,
        }
    }
}

impl ScanConfig {
    /// Page size used when none is configured
    pub const DEFAULT_PAGE_SIZE: u32 = 100;

    /// Create a scan configuration with the given page size
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `page_size` is zero.
    pub fn new(page_size: u32) -> Result<Self> {
        let config = Self {
            page_size,
            max_pages: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Cap the number of pages a scan may request
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Check that the values describe a scan that can terminate
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::invalid_config("scan.page_size must be at least 1"));
        }
        if self.max_pages == Some(0) {
            return Err(Error::invalid_config("scan.max_pages must be at least 1"));
        }
        Ok(())
    }
}
