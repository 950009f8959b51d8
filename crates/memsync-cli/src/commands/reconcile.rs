//! Plan and apply command implementations
//!
//! Both commands walk every container declared in the manifest, fetch its
//! current membership from the store page by page, and reconcile it against
//! the declared members.

use std::path::Path;

use colored::Colorize;

use memsync_core::{Manifest, ReconcileOptions, ReconcileReport, Reconciler};

use crate::error::{CliError, Result};
use crate::store::{MembershipStore, StoreLock};

/// Run the plan command
///
/// Computes the delta for every container without changing the store.
pub fn run_plan(manifest_path: &Path, store_path: &Path, json: bool) -> Result<()> {
    let manifest = Manifest::load(manifest_path)?;
    let mut store = MembershipStore::load_or_default(store_path)?;

    let reports = reconcile_all(&manifest, &mut store, true);

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        println!("{} Planning membership changes...", "=>".blue().bold());
        for report in &reports {
            print_report(report);
        }
    }

    let failed = reports.iter().filter(|r| !r.success).count();
    if failed > 0 {
        return Err(CliError::user(format!(
            "{} container(s) could not be planned",
            failed
        )));
    }
    Ok(())
}

/// Run the apply command
///
/// Holds the store lock for the whole run. A container that cannot be
/// scanned or has rejected changes does not stop the others; the state
/// reached is always saved before the command fails.
pub fn run_apply(manifest_path: &Path, store_path: &Path, json: bool) -> Result<()> {
    let manifest = Manifest::load(manifest_path)?;
    let lock = StoreLock::acquire(store_path)?;
    tracing::debug!(lock = ?lock.path(), "Acquired store lock");
    let mut store = MembershipStore::load_or_default(store_path)?;

    let reports = reconcile_all(&manifest, &mut store, false);
    store.save(store_path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        println!("{} Applying membership changes...", "=>".blue().bold());
        for report in &reports {
            print_report(report);
        }
    }

    let failed = reports.iter().filter(|r| !r.success).count();
    if failed > 0 {
        return Err(CliError::user(format!(
            "{} container(s) reconciled with errors; partial state was saved",
            failed
        )));
    }
    Ok(())
}

fn reconcile_all(
    manifest: &Manifest,
    store: &mut MembershipStore,
    dry_run: bool,
) -> Vec<ReconcileReport> {
    let reconciler =
        Reconciler::new(manifest.scan.clone()).with_options(ReconcileOptions { dry_run });
    tracing::debug!(
        containers = manifest.memberships.len(),
        page_size = reconciler.scan_config().page_size,
        max_pages = ?reconciler.scan_config().max_pages,
        dry_run = reconciler.options().dry_run,
        "Reconciling memberships"
    );

    let mut reports = Vec::with_capacity(manifest.memberships.len());
    for spec in &manifest.memberships {
        let _span = tracing::info_span!("container", container = %spec.container).entered();
        let mut collection = store.collection(&spec.container);
        let report = match reconciler.run(&mut collection, &spec.members) {
            Ok(reconciliation) => ReconcileReport::from_reconciliation(
                spec.container.as_str(),
                &reconciliation,
                reconciler.options().dry_run,
            ),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping container, current membership unavailable");
                ReconcileReport::scan_failed(
                    spec.container.as_str(),
                    &e,
                    reconciler.options().dry_run,
                )
            }
        };
        reports.push(report);
    }
    reports
}

fn print_report(report: &ReconcileReport) {
    let verb = if report.dry_run { "would " } else { "" };

    if let Some(error) = &report.scan_error {
        println!("{} {}", "FAILED".red().bold(), report.container.cyan());
        println!("   {} scan failed: {}", "!".red(), error);
        return;
    }

    if !report.has_changes() && report.failures.is_empty() {
        println!(
            "{} {} already in sync ({} members)",
            "OK".green().bold(),
            report.container.cyan(),
            report.final_membership.len()
        );
        return;
    }

    let status = if report.success {
        "OK".green().bold()
    } else {
        "PARTIAL".yellow().bold()
    };
    println!("{} {}", status, report.container.cyan());
    for key in &report.added {
        println!("   {} {}add {}", "+".green(), verb, key);
    }
    for key in &report.removed {
        println!("   {} {}remove {}", "-".red(), verb, key);
    }
    for failure in &report.failures {
        println!(
            "   {} {} {} failed: {}",
            "!".red(),
            failure.operation,
            failure.key,
            failure.cause
        );
    }
    if report.diverged {
        println!(
            "   {} store holds [{}], which differs from the declared members",
            "!".yellow(),
            report.final_membership.join(", ")
        );
    }
}
