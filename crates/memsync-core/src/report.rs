//! Serializable summary of a reconciliation cycle

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::apply::Reconciliation;
use crate::error::{Error, Operation};

/// One rejected add or remove, rendered for output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureEntry {
    pub operation: Operation,
    pub key: String,
    pub cause: String,
}

/// Report for one container after plan or apply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Container the membership belongs to
    pub container: String,
    /// Whether the scan and every planned call succeeded
    pub success: bool,
    /// Whether this was a plan only
    pub dry_run: bool,
    /// Server state differs from desired although nothing failed
    pub diverged: bool,
    /// Members added (or that would be added)
    pub added: Vec<String>,
    /// Members removed (or that would be removed)
    pub removed: Vec<String>,
    /// Calls the server rejected
    pub failures: Vec<FailureEntry>,
    /// Error that stopped the cycle before any call was made
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_error: Option<String>,
    /// Membership after the cycle, empty if the scan failed
    pub final_membership: Vec<String>,
}

impl ReconcileReport {
    /// Summarize a reconciliation for a container
    ///
    /// `added` and `removed` only list calls that went through.
    pub fn from_reconciliation<K: fmt::Display>(
        container: impl Into<String>,
        reconciliation: &Reconciliation<K>,
        dry_run: bool,
    ) -> Self {
        let failures: Vec<FailureEntry> = reconciliation
            .error
            .iter()
            .flat_map(|err| err.failures.iter())
            .map(|f| FailureEntry {
                operation: f.operation,
                key: f.key.clone(),
                cause: f.cause.to_string(),
            })
            .collect();

        let failed: HashSet<(Operation, &str)> = failures
            .iter()
            .map(|f| (f.operation, f.key.as_str()))
            .collect();
        let succeeded = |operation: Operation, keys: &[K]| -> Vec<String> {
            keys.iter()
                .map(ToString::to_string)
                .filter(|key| !failed.contains(&(operation, key.as_str())))
                .collect()
        };

        Self {
            container: container.into(),
            success: failures.is_empty(),
            dry_run,
            diverged: reconciliation.diverged,
            added: succeeded(Operation::Add, &reconciliation.delta.to_add),
            removed: succeeded(Operation::Remove, &reconciliation.delta.to_remove),
            final_membership: reconciliation
                .final_membership
                .iter()
                .map(ToString::to_string)
                .collect(),
            failures,
            scan_error: None,
        }
    }

    /// Report a container whose current membership could not be listed
    ///
    /// Nothing was changed, so the report lists no additions or removals.
    pub fn scan_failed(container: impl Into<String>, error: &Error, dry_run: bool) -> Self {
        Self {
            container: container.into(),
            success: false,
            dry_run,
            diverged: false,
            added: Vec::new(),
            removed: Vec::new(),
            failures: Vec::new(),
            scan_error: Some(error.to_string()),
            final_membership: Vec::new(),
        }
    }

    /// Whether the cycle changed (or would change) anything
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::apply;

    #[test]
    fn report_separates_applied_and_failed_calls() {
        let current: Vec<String> = vec!["A".into()];
        let desired: Vec<String> = vec!["X".into(), "Y".into()];
        let reconciliation = apply(
            &current,
            &desired,
            |key: &String| {
                if key == "Y" {
                    Err("quota exceeded".to_string())
                } else {
                    Ok(vec!["A".to_string(), key.clone()])
                }
            },
            |_key: &String| Ok(vec!["X".to_string()]),
        );

        let report = ReconcileReport::from_reconciliation("tag:prod", &reconciliation, false);
        assert!(!report.success);
        assert_eq!(report.added, vec!["X"]);
        assert_eq!(report.removed, vec!["A"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].key, "Y");
        assert_eq!(report.failures[0].cause, "quota exceeded");
        assert_eq!(report.final_membership, vec!["X"]);
        assert!(report.has_changes());
    }

    #[test]
    fn scan_failure_is_unsuccessful_and_changes_nothing() {
        let error = Error::PageLimitExceeded { max_pages: 3 };
        let report = ReconcileReport::scan_failed("team:ops", &error, false);

        assert!(!report.success);
        assert!(!report.has_changes());
        assert!(report.failures.is_empty());
        assert_eq!(report.scan_error.as_deref(), Some(error.to_string().as_str()));

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["scan_error"].as_str().unwrap().contains("after 3 pages"));
    }

    #[test]
    fn scan_error_is_omitted_from_json_when_absent() {
        let reconciliation = apply(
            &["A".to_string()],
            &["A".to_string()],
            |_key: &String| Ok::<_, String>(Vec::new()),
            |_key: &String| Ok(Vec::new()),
        );
        let report = ReconcileReport::from_reconciliation("tag:prod", &reconciliation, false);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("scan_error").is_none());
        assert_eq!(json["success"], true);
    }

    #[test]
    fn report_serializes_operation_in_lowercase() {
        let entry = FailureEntry {
            operation: Operation::Remove,
            key: "A".to_string(),
            cause: "gone".to_string(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["operation"], "remove");
    }
}
