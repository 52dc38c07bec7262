//! Build the reconciliation set from config and stored state

use anyhow::{Result, bail};
use declarative::{Executor, Provider, Reconciliation, detect_drift};
use platform::Group;
use std::collections::{BTreeMap, BTreeSet};

use crate::state::GroupState;

/// Pair declared groups with their stored observed state
///
/// Every address in either the config or the state is included: an
/// address only in the config is a create, one only in the state a
/// delete. `target` restricts the set to one address.
pub fn build(
    desired: &BTreeMap<String, Group>,
    state: &GroupState,
    target: Option<&str>,
) -> Result<Vec<Reconciliation<Group>>> {
    let addresses: BTreeSet<&str> = desired
        .keys()
        .map(String::as_str)
        .chain(state.groups.keys().map(String::as_str))
        .collect();

    if let Some(target) = target
        && !addresses.contains(target)
    {
        bail!(
            "Unknown group address '{}': not declared in config and not in state",
            target
        );
    }

    Ok(addresses
        .into_iter()
        .filter(|address| target.is_none_or(|t| t == *address))
        .map(|address| Reconciliation {
            address: address.to_string(),
            observed: state.observed(address).cloned(),
            desired: desired.get(address).cloned(),
        })
        .collect())
}

/// Drift found while refreshing one address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drift {
    /// The group no longer exists remotely
    Deleted,
    /// These attributes changed outside groupctl
    Changed(Vec<String>),
}

/// Re-read every observed group, updating `items` and `state` in place
///
/// Groups deleted outside groupctl are dropped from state so the next
/// plan recreates them. Returns the drift per address.
pub fn refresh<P>(
    items: &mut [Reconciliation<Group>],
    provider: &P,
    state: &mut GroupState,
) -> Result<Vec<(String, Drift)>>
where
    P: Provider<Group> + ?Sized,
{
    let executor = Executor::<Group, P>::new(provider);
    let mut drift = Vec::new();

    for item in items.iter_mut() {
        let Some(stored) = item.observed.as_ref() else {
            continue;
        };

        let fresh = executor.read(&stored.name)?;
        match fresh {
            None => {
                log::warn!(
                    "{}: group '{}' was deleted outside groupctl",
                    item.address,
                    stored.name
                );
                drift.push((item.address.clone(), Drift::Deleted));
                state.remove(&item.address);
                item.observed = None;
            }
            Some(fresh) => {
                let changed = detect_drift(stored, &fresh);
                if !changed.is_empty() {
                    let names: Vec<String> = changed.iter().map(ToString::to_string).collect();
                    log::warn!("{}: drift in {}", item.address, names.join(", "));
                    drift.push((item.address.clone(), Drift::Changed(names)));
                }
                state.record_observed(&item.address, fresh.clone());
                item.observed = Some(fresh);
            }
        }
    }

    Ok(drift)
}
