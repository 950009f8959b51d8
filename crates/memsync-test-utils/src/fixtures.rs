//! Record fixtures and temporary workspaces.

use std::fs;
use std::path::Path;

use memsync_core::{Page, PageOptions};
use tempfile::TempDir;
use uuid::Uuid;

/// A remote record identified by UUID, name, or group + name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub uuid: Uuid,
    pub group: String,
    pub name: String,
}

impl Record {
    /// Create a record with a fresh random UUID
    pub fn new(group: &str, name: &str) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            group: group.to_string(),
            name: name.to_string(),
        }
    }
}

/// Records as `(group, name)` pairs, each with its own UUID
pub fn records(pairs: &[(&str, &str)]) -> Vec<Record> {
    pairs.iter().map(|(g, n)| Record::new(g, n)).collect()
}

/// A fetch function that serves `items` page by page, counting requests
pub fn paged<T: Clone>(
    items: &[T],
    requests: &mut Vec<PageOptions>,
) -> impl FnMut(PageOptions) -> Result<Page<T>, String> {
    move |options| {
        requests.push(options);
        Ok(Page::slice(items, options))
    }
}

/// A temporary directory with helpers for memsync manifest/store files
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    /// Create an empty temporary directory
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Root of the temporary directory
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `memsync.toml` with the given contents
    pub fn write_manifest(&self, content: &str) {
        self.write("memsync.toml", content);
    }

    /// Write `memsync-store.toml` with the given contents
    pub fn write_store(&self, content: &str) {
        self.write("memsync-store.toml", content);
    }

    /// Write a file relative to the root, creating parent directories
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    /// Read a file relative to the root
    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root().join(relative)).unwrap()
    }
}
