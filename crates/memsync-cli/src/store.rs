//! File-backed membership store
//!
//! The store is a TOML file mapping each container to its ordered member
//! list. It stands in for a remote collection: it is only read through
//! [`StoreCollection`] pages, and changed one member at a time.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Read;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use memsync_core::{Collection, Page, PageOptions};
use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};

/// Member rejected by the store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Member identities must be non-empty and contain no whitespace
    #[error("invalid member identity '{key}'")]
    InvalidMember { key: String },
}

/// Memberships persisted in memsync-store.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipStore {
    /// Store format version for forward compatibility
    version: String,
    /// Members per container, in insertion order
    #[serde(default)]
    containers: BTreeMap<String, Vec<String>>,
}

impl Default for MembershipStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MembershipStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            version: "1.0".to_string(),
            containers: BTreeMap::new(),
        }
    }

    /// Load a store from a TOML file with shared lock
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, locked, or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        file.lock_shared()?;

        // Read through the locked handle
        let mut content = String::new();
        (&file).read_to_string(&mut content)?;
        let store: MembershipStore = toml::from_str(&content)?;

        Ok(store)
    }

    /// Load the store, or start empty if the file does not exist yet
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(?path, "No store file yet, starting empty");
            Ok(Self::new())
        }
    }

    /// Save the store to a TOML file atomically with exclusive lock
    ///
    /// Writes to a temporary file and renames it over the target.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        lock_file.lock_exclusive()?;

        let temp_path = path.with_extension("toml.tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Members of a container, empty if the container is unknown
    pub fn members(&self, container: &str) -> &[String] {
        self.containers
            .get(container)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// View one container as a paginated [`Collection`]
    pub fn collection(&mut self, container: &str) -> StoreCollection<'_> {
        StoreCollection {
            store: self,
            container: container.to_string(),
        }
    }
}

/// One container of a [`MembershipStore`], behaving like a remote collection
#[derive(Debug)]
pub struct StoreCollection<'a> {
    store: &'a mut MembershipStore,
    container: String,
}

impl StoreCollection<'_> {
    fn members_mut(&mut self) -> &mut Vec<String> {
        self.store
            .containers
            .entry(self.container.clone())
            .or_default()
    }
}

impl Collection for StoreCollection<'_> {
    type Key = String;
    type Error = StoreError;

    fn fetch_page(&mut self, page: PageOptions) -> std::result::Result<Page<String>, StoreError> {
        Ok(Page::slice(self.store.members(&self.container), page))
    }

    fn add(&mut self, key: &String) -> std::result::Result<Vec<String>, StoreError> {
        if key.is_empty() || key.chars().any(char::is_whitespace) {
            return Err(StoreError::InvalidMember { key: key.clone() });
        }
        let members = self.members_mut();
        if !members.contains(key) {
            members.push(key.clone());
        }
        Ok(members.clone())
    }

    fn remove(&mut self, key: &String) -> std::result::Result<Vec<String>, StoreError> {
        let members = self.members_mut();
        members.retain(|m| m != key);
        Ok(members.clone())
    }
}

/// Exclusive advisory lock serializing reconciliations of one store
///
/// Held for a whole apply run; released on drop.
#[derive(Debug)]
pub struct StoreLock {
    _file: File,
    path: PathBuf,
}

impl StoreLock {
    /// Take the lock next to `store_path`, failing fast if it is held
    pub fn acquire(store_path: &Path) -> Result<Self> {
        let path = store_path.with_extension("toml.lock");
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        if let Err(e) = file.try_lock_exclusive() {
            if e.kind() == fs2::lock_contended_error().kind() {
                return Err(CliError::StoreLocked {
                    path: store_path.to_path_buf(),
                });
            }
            return Err(e.into());
        }

        Ok(Self { _file: file, path })
    }

    /// Path of the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
