//! `import`, `refresh` and `show`

use anyhow::{Context as AnyhowContext, Result, bail};
use colored::Colorize;
use declarative::{Executor, Provider};
use platform::Group;

use super::plan::report_drift;
use super::{connect, load_config, load_state};
use crate::Context;
use crate::config::GroupsConfig;
use crate::engine::planner::{Drift, build, refresh as refresh_items};
use crate::state::{GroupState, ManagedGroup};
use crate::{progress, ui};

/// Start managing an existing remote group
pub fn import(ctx: &Context, address: &str, name: &str) -> Result<()> {
    let config = load_config(ctx)?;
    let mut state = load_state(ctx)?;
    let client = connect(&config)?;

    let group = import_with(&config, &mut state, &client, address, name)?;

    if !ctx.quiet {
        ui::success(&format!("Imported group '{}' as {}", group.name, address));
        print_group(address, &group);
    }
    Ok(())
}

/// Read `name` through `provider` and record it under `address`
pub fn import_with<P>(
    config: &GroupsConfig,
    state: &mut GroupState,
    provider: &P,
    address: &str,
    name: &str,
) -> Result<Group>
where
    P: Provider<Group> + ?Sized,
{
    if let Some(existing) = state.observed(address) {
        bail!(
            "{} is already managed (group '{}'); destroy it or pick another address",
            address,
            existing.name
        );
    }

    let group = Executor::<Group, P>::new(provider)
        .import(name)
        .with_context(|| format!("Could not import group '{}'", name))?;

    if !config.groups.contains_key(address) {
        ui::warn(&format!(
            "{} is not declared in the config; the next apply will delete it",
            address
        ));
    }

    state.record_observed(address, group.clone());
    state.save()?;
    Ok(group)
}

/// Re-read managed groups, report drift and save
pub fn refresh(ctx: &Context) -> Result<()> {
    let config = load_config(ctx)?;
    let mut state = load_state(ctx)?;
    let client = connect(&config)?;

    let spinner = (!ctx.quiet).then(|| progress::spinner("Refreshing managed groups"));
    let drift = refresh_with(&mut state, &client);
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let drift = drift?;

    if drift.is_empty() && !ctx.quiet {
        ui::success(&format!(
            "{} up to date",
            ui::plural(state.groups.len(), "group")
        ));
    }
    Ok(())
}

/// Refresh every group in `state` through `provider`
pub fn refresh_with<P>(state: &mut GroupState, provider: &P) -> Result<Vec<(String, Drift)>>
where
    P: Provider<Group> + ?Sized,
{
    let mut items = build(&Default::default(), state, None)?;
    let drift = refresh_items(&mut items, provider, state)?;
    report_drift(&drift);
    state.save()?;
    Ok(drift)
}

/// Print stored state
pub fn show(ctx: &Context, address: Option<&str>, json: bool) -> Result<()> {
    let state = load_state(ctx)?;

    let selected: Vec<(&String, &ManagedGroup)> = state
        .groups
        .iter()
        .filter(|(a, _)| address.is_none_or(|t| t == a.as_str()))
        .collect();

    if let Some(address) = address
        && selected.is_empty()
    {
        bail!("'{}' is not managed", address);
    }

    if json {
        let map: std::collections::BTreeMap<&String, &ManagedGroup> =
            selected.into_iter().collect();
        println!("{}", serde_json::to_string_pretty(&map)?);
        return Ok(());
    }

    if selected.is_empty() {
        ui::info("No managed groups");
        return Ok(());
    }

    ui::header("Managed groups");
    for (address, managed) in selected {
        print_group(address, &managed.group);
        if let Some(at) = managed.last_applied {
            ui::kv("last applied", &at.to_rfc3339());
        }
    }
    if ctx.verbose > 0 {
        println!();
        ui::dim(&format!("state file: {}", state.path().display()));
    }
    Ok(())
}

fn print_group(address: &str, group: &Group) {
    println!();
    println!("{} {}", address.bold(), format!("({})", group.name).dimmed());
    if let Some(description) = &group.description {
        ui::kv("description", description);
    }
    if let Some(external_id) = &group.external_id {
        ui::kv("external_id", external_id);
    }
    ui::kv("auto_join", &group.auto_join.to_string());
    ui::kv("admin_privileges", &group.admin_privileges.to_string());
    ui::kv("members", &ui::list(group.member_list()));
    if let Some(realm) = &group.realm {
        ui::kv("realm", realm);
    }
    if let Some(attrs) = &group.realm_attributes {
        ui::kv("realm_attributes", attrs);
    }
}
