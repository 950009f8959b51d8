//! Membership delta computation
//!
//! A delta is the pair of additions and removals that turns the current
//! membership into the desired one. Membership tests go through hash sets, so
//! computing a delta is linear in the size of both sides.

use std::collections::HashSet;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Changes needed to move a membership from current to desired
///
/// Invariant: `(current ∪ to_add) \ to_remove == desired` as sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta<T> {
    /// Desired members missing from current, in desired's order
    pub to_add: Vec<T>,
    /// Current members absent from desired, in current's order
    pub to_remove: Vec<T>,
}

impl<T> Default for Delta<T> {
    fn default() -> Self {
        Self {
            to_add: Vec::new(),
            to_remove: Vec::new(),
        }
    }
}

impl<T> Delta<T> {
    /// Whether current already equals desired
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Number of add and remove calls this delta plans
    pub fn operation_count(&self) -> usize {
        self.to_add.len() + self.to_remove.len()
    }
}

/// Compute the delta between two key sequences.
///
/// `list_deltas(d, d)` is always empty. A member whose identity changed shows
/// up as one removal plus one addition.
pub fn list_deltas<K>(current: &[K], desired: &[K]) -> Delta<K>
where
    K: Eq + Hash + Clone,
{
    let current_keys: HashSet<&K> = current.iter().collect();
    let desired_keys: HashSet<&K> = desired.iter().collect();

    Delta {
        to_add: desired
            .iter()
            .filter(|k| !current_keys.contains(k))
            .cloned()
            .collect(),
        to_remove: current
            .iter()
            .filter(|k| !desired_keys.contains(k))
            .cloned()
            .collect(),
    }
}

/// Compute the delta between two item sequences through a key projection.
///
/// Items whose keys compare equal are the same member, whatever their other
/// attributes.
pub fn list_deltas_by<T, K, F>(current: &[T], desired: &[T], key_of: F) -> Delta<T>
where
    T: Clone,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let current_keys: HashSet<K> = current.iter().map(&key_of).collect();
    let desired_keys: HashSet<K> = desired.iter().map(&key_of).collect();

    Delta {
        to_add: desired
            .iter()
            .filter(|item| !current_keys.contains(&key_of(item)))
            .cloned()
            .collect(),
        to_remove: current
            .iter()
            .filter(|item| !desired_keys.contains(&key_of(item)))
            .cloned()
            .collect(),
    }
}

/// Whether two sequences hold the same members, ignoring order and repeats
pub fn same_members<K>(a: &[K], b: &[K]) -> bool
where
    K: Eq + Hash,
{
    let a: HashSet<&K> = a.iter().collect();
    let b: HashSet<&K> = b.iter().collect();
    a == b
}

/// Drop repeated keys, keeping the first occurrence.
///
/// Returns the unique keys in original order and the dropped repeats.
pub fn dedup<K>(keys: &[K]) -> (Vec<K>, Vec<K>)
where
    K: Eq + Hash + Clone,
{
    let mut seen = HashSet::with_capacity(keys.len());
    let mut unique = Vec::with_capacity(keys.len());
    let mut repeated = Vec::new();

    for key in keys {
        if seen.insert(key) {
            unique.push(key.clone());
        } else {
            repeated.push(key.clone());
        }
    }
    (unique, repeated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn replaces_one_member() {
        let delta = list_deltas(&["A", "B"], &["B", "C"]);
        assert_eq!(delta.to_add, vec!["C"]);
        assert_eq!(delta.to_remove, vec!["A"]);
        assert_eq!(delta.operation_count(), 2);
    }

    #[test]
    fn keeps_side_order() {
        let delta = list_deltas(&["z", "keep", "y", "x"], &["c", "keep", "a", "b"]);
        assert_eq!(delta.to_add, vec!["c", "a", "b"]);
        assert_eq!(delta.to_remove, vec!["z", "y", "x"]);
    }

    #[test]
    fn empty_sides() {
        let none: [&str; 0] = [];
        assert!(list_deltas(&none, &none).is_empty());
        assert_eq!(list_deltas(&none, &["a"]).to_add, vec!["a"]);
        assert_eq!(list_deltas(&["a"], &none).to_remove, vec!["a"]);
    }

    #[test]
    fn by_key_ignores_other_attributes() {
        #[derive(Debug, Clone, PartialEq)]
        struct Permission {
            name: &'static str,
            description: &'static str,
        }

        let current = vec![
            Permission {
                name: "VIEW",
                description: "old text",
            },
            Permission {
                name: "ADMIN",
                description: "",
            },
        ];
        let desired = vec![
            Permission {
                name: "VIEW",
                description: "new text",
            },
            Permission {
                name: "EDIT",
                description: "",
            },
        ];

        let delta = list_deltas_by(&current, &desired, |p| p.name);
        assert_eq!(delta.to_add, vec![desired[1].clone()]);
        assert_eq!(delta.to_remove, vec![current[1].clone()]);
    }

    #[test]
    fn same_members_ignores_order() {
        assert!(same_members(&["B", "C"], &["C", "B"]));
        assert!(!same_members(&["B", "C"], &["B"]));
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let (unique, repeated) = dedup(&["a", "b", "a", "c", "b"]);
        assert_eq!(unique, vec!["a", "b", "c"]);
        assert_eq!(repeated, vec!["a", "b"]);
    }
}
