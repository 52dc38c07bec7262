//! Plan engine - classifies the delta between observed and desired state

use crate::resource::Resource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// What the executor must do to converge one resource instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanDecision<A: Ord> {
    /// Observed already matches desired
    NoOp,
    /// Nothing observed; create from desired
    Create,
    /// Modify the existing object; carries the changed attributes
    UpdateInPlace(BTreeSet<A>),
    /// Destroy the existing object, then create a new one
    ///
    /// Carries every changed attribute, including the ones that forced it.
    Replace(BTreeSet<A>),
    /// Desired is absent; remove the observed object
    Delete,
}

impl<A: Ord> PlanDecision<A> {
    /// Check if executing this decision would touch the remote side
    pub fn has_changes(&self) -> bool {
        !matches!(self, Self::NoOp)
    }

    /// Attributes that differ, empty for create/delete/no-op
    pub fn changed(&self) -> Option<&BTreeSet<A>> {
        match self {
            Self::UpdateInPlace(changed) | Self::Replace(changed) => Some(changed),
            _ => None,
        }
    }

    /// Short action label
    pub fn action(&self) -> &'static str {
        match self {
            Self::NoOp => "no-op",
            Self::Create => "create",
            Self::UpdateInPlace(_) => "update",
            Self::Replace(_) => "replace",
            Self::Delete => "delete",
        }
    }
}

impl<A: Ord + fmt::Display> fmt::Display for PlanDecision<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.changed() {
            Some(changed) => {
                let names: Vec<String> = changed.iter().map(ToString::to_string).collect();
                write!(f, "{} ({})", self.action(), names.join(", "))
            }
            None => write!(f, "{}", self.action()),
        }
    }
}

/// Decide how to converge `observed` to `desired`
///
/// Both sides are normalized before comparison, so reordering an
/// order-insensitive collection never produces a change. Validation is
/// not part of planning; run [`crate::ResourceExt::prepare`] first.
pub fn plan<R: Resource>(observed: Option<&R>, desired: Option<&R>) -> PlanDecision<R::Attribute> {
    let (observed, desired) = match (observed, desired) {
        (None, None) => return PlanDecision::NoOp,
        (None, Some(_)) => return PlanDecision::Create,
        (Some(_), None) => return PlanDecision::Delete,
        (Some(o), Some(d)) => (o.clone().normalize(), d.clone().normalize()),
    };

    let changed: BTreeSet<R::Attribute> = observed
        .changed_attributes(&desired)
        .into_iter()
        .collect();

    // The remote API keys on the id, so a new id is always a new object.
    if observed.id() != desired.id() {
        return PlanDecision::Replace(changed);
    }

    if changed.is_empty() {
        return PlanDecision::NoOp;
    }

    if changed.iter().any(|a| R::change_kind(*a).forces_replace()) {
        PlanDecision::Replace(changed)
    } else {
        PlanDecision::UpdateInPlace(changed)
    }
}
