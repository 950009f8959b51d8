//! Find command implementation

use std::path::Path;

use colored::Colorize;

use memsync_core::{Collection, Manifest, ScanConfig, find_paged_by_key};

use crate::error::Result;
use crate::store::MembershipStore;

/// Run the find command
///
/// Scans the container page by page and requires exactly one member to
/// match. Uses the manifest's scan settings when a manifest is present.
pub fn run_find(
    manifest_path: &Path,
    store_path: &Path,
    container: &str,
    member: &str,
) -> Result<()> {
    let scan = if manifest_path.exists() {
        Manifest::load(manifest_path)?.scan
    } else {
        ScanConfig::default()
    };

    let mut store = MembershipStore::load_or_default(store_path)?;
    let mut collection = store.collection(container);

    let found = find_paged_by_key(
        &scan,
        |page| collection.fetch_page(page),
        member,
        |key: &String| key.as_str(),
    )
    .map_err(|e| e.with_identity(format!("{} in {}", member, container)))?;

    println!("{} {} is a member of {}", "OK".green().bold(), found, container.cyan());
    Ok(())
}
