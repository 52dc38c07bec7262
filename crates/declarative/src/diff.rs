//! Diff computation for resources

use crate::planner::PlanDecision;
use crate::resource::Resource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One attribute that changes between observed and desired state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// Attribute name
    pub attribute: String,
    /// Observed value, `None` when unset
    pub from: Option<String>,
    /// Desired value, `None` when unset
    pub to: Option<String>,
    /// Whether this change alone forces replacement
    pub forces_replace: bool,
}

/// A diff between current and desired state of a resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDiff {
    /// Host-side address of the resource
    pub address: String,
    /// Type of the resource
    pub resource_type: String,
    /// Action label ("create", "update", "replace", "delete")
    pub action: String,
    /// Attribute rows, empty for create and delete
    pub changes: Vec<AttributeChange>,
}

impl ResourceDiff {
    /// Describe a decision, returning None if no changes needed
    pub fn from_decision<R: Resource>(
        address: &str,
        observed: Option<&R>,
        desired: Option<&R>,
        decision: &PlanDecision<R::Attribute>,
    ) -> Option<Self> {
        if !decision.has_changes() {
            return None;
        }

        let changes = decision
            .changed()
            .map(|changed| {
                changed
                    .iter()
                    .map(|attr| AttributeChange {
                        attribute: attr.to_string(),
                        from: observed.and_then(|o| o.attribute_value(*attr)),
                        to: desired.and_then(|d| d.attribute_value(*attr)),
                        forces_replace: R::change_kind(*attr).forces_replace(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            address: address.to_string(),
            resource_type: R::RESOURCE_TYPE.to_string(),
            action: decision.action().to_string(),
            changes,
        })
    }

    /// Check if this diff represents an addition
    pub fn is_addition(&self) -> bool {
        self.action == "create"
    }

    /// Check if this diff represents a removal
    pub fn is_removal(&self) -> bool {
        self.action == "delete"
    }

    /// Check if this diff represents a destroy-then-create
    pub fn is_replacement(&self) -> bool {
        self.action == "replace"
    }
}

/// Diff summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSummary {
    /// Number of resources to add
    pub additions: usize,
    /// Number of resources to update in place
    pub modifications: usize,
    /// Number of resources to destroy and recreate
    pub replacements: usize,
    /// Number of resources to remove
    pub removals: usize,
}

impl DiffSummary {
    /// Create a summary from a list of diffs
    pub fn from_diffs(diffs: &[ResourceDiff]) -> Self {
        let mut summary = Self::default();
        for diff in diffs {
            if diff.is_addition() {
                summary.additions += 1;
            } else if diff.is_removal() {
                summary.removals += 1;
            } else if diff.is_replacement() {
                summary.replacements += 1;
            } else {
                summary.modifications += 1;
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.modifications + self.replacements + self.removals
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}

/// Attributes where a fresh read diverges from the stored observed state
///
/// Compared in both directions so that a value appearing or disappearing
/// remotely is reported either way.
pub fn detect_drift<R: Resource>(stored: &R, fresh: &R) -> BTreeSet<R::Attribute> {
    let stored = stored.clone().normalize();
    let fresh = fresh.clone().normalize();
    stored
        .changed_attributes(&fresh)
        .into_iter()
        .chain(fresh.changed_attributes(&stored))
        .collect()
}
