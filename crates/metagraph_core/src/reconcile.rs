//! Classification reconciliation.
//!
//! Pure value-in/value-out computation of the minimal edit set that moves
//! a set of existing classifications to a desired set, scoped to a
//! caller-supplied "relevant" subset. No I/O, no state, no errors.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::Classification;

/// Three disjoint edit lists. A classification name appears in at most
/// one of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileResult {
    /// Present in desired but not existing.
    pub to_add: Vec<Classification>,
    /// Present in both with a differing payload; desired's wins.
    pub to_update: Vec<Classification>,
    /// Names present in existing-and-relevant but absent from desired.
    pub to_remove: Vec<String>,
}

impl ReconcileResult {
    pub fn is_noop(&self) -> bool {
        self.to_add.is_empty() && self.to_update.is_empty() && self.to_remove.is_empty()
    }

    pub fn len(&self) -> usize {
        self.to_add.len() + self.to_update.len() + self.to_remove.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Compute the {add, update, remove} edit set from existing to desired.
///
/// Only names in `relevant` are ever removed — existing classifications
/// outside the relevant scope are owned by other concerns and left
/// untouched when absent from `desired`. Names present in both sets are
/// updated with desired's payload only when the payloads (properties or
/// effectivity) differ, relevant or not; a converged name produces no
/// edit, so reconciling an applied state is a no-op.
///
/// Duplicate names within one input set collapse to the last-seen entry
/// (last-one-wins). Output lists are name-ordered, so the result is
/// deterministic for any input order.
pub fn reconcile(
    relevant: &BTreeSet<String>,
    existing: &[Classification],
    desired: &[Classification],
) -> ReconcileResult {
    let existing_by_name: BTreeMap<&str, &Classification> = existing
        .iter()
        .map(|c| (c.type_name.as_str(), c))
        .collect();
    let desired_by_name: BTreeMap<&str, &Classification> = desired
        .iter()
        .map(|c| (c.type_name.as_str(), c))
        .collect();

    let mut result = ReconcileResult::default();

    for (name, classification) in &desired_by_name {
        match existing_by_name.get(name) {
            Some(current) if current == classification => {}
            Some(_) => result.to_update.push((*classification).clone()),
            None => result.to_add.push((*classification).clone()),
        }
    }

    for name in existing_by_name.keys() {
        if !desired_by_name.contains_key(name) && relevant.contains(*name) {
            result.to_remove.push((*name).to_string());
        }
    }

    result
}
