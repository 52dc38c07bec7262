//! `apply` and `destroy`

use anyhow::{Result, bail};
use declarative::{ExecuteSummary, Provider, Reconciliation};
use platform::Group;

use super::plan::report_drift;
use super::{connect, load_config, load_state};
use crate::Context;
use crate::cli::{ApplyArgs, DestroyArgs};
use crate::config::GroupsConfig;
use crate::engine::planner::{build, refresh};
use crate::engine::{ApplyOptions, apply};
use crate::state::GroupState;
use crate::ui;

/// Make the platform match the config
pub fn run(ctx: &Context, args: &ApplyArgs) -> Result<()> {
    let config = load_config(ctx)?;
    let mut state = load_state(ctx)?;
    let client = connect(&config)?;

    let opts = ApplyOptions {
        dry_run: args.dry_run,
        jobs: usize::from(args.jobs),
        yes: args.yes,
        quiet: ctx.quiet,
    };
    let summary = apply_with(
        &config,
        &mut state,
        &client,
        args.target.as_deref(),
        !args.no_refresh,
        &opts,
    )?;

    finish(&summary)
}

/// Apply config against `provider`, saving state afterwards
///
/// State is saved even when some groups failed, so successful changes
/// are never forgotten.
pub fn apply_with<P>(
    config: &GroupsConfig,
    state: &mut GroupState,
    provider: &P,
    target: Option<&str>,
    refresh_first: bool,
    opts: &ApplyOptions,
) -> Result<ExecuteSummary>
where
    P: Provider<Group> + ?Sized,
{
    let mut items = build(&config.desired(), state, target)?;
    if refresh_first {
        let drift = refresh(&mut items, provider, state)?;
        report_drift(&drift);
    }

    let summary = apply(items, provider, state, opts)?;

    if !opts.dry_run {
        state.save()?;
    }
    Ok(summary)
}

/// Delete managed groups and forget them
pub fn destroy(ctx: &Context, args: &DestroyArgs) -> Result<()> {
    let config = load_config(ctx)?;
    let mut state = load_state(ctx)?;
    let client = connect(&config)?;

    let opts = ApplyOptions {
        yes: args.yes,
        quiet: ctx.quiet,
        ..Default::default()
    };
    let summary = destroy_with(&mut state, &client, args.target.as_deref(), &opts)?;

    finish(&summary)
}

/// Delete every group in `state` (or just `target`) through `provider`
pub fn destroy_with<P>(
    state: &mut GroupState,
    provider: &P,
    target: Option<&str>,
    opts: &ApplyOptions,
) -> Result<ExecuteSummary>
where
    P: Provider<Group> + ?Sized,
{
    if let Some(target) = target
        && state.observed(target).is_none()
    {
        bail!("'{}' is not managed", target);
    }

    let items: Vec<Reconciliation<Group>> = state
        .groups
        .iter()
        .filter(|(address, _)| target.is_none_or(|t| t == address.as_str()))
        .map(|(address, managed)| Reconciliation {
            address: address.clone(),
            observed: Some(managed.group.clone()),
            desired: None,
        })
        .collect();

    if items.is_empty() {
        ui::info("Nothing to destroy");
        return Ok(ExecuteSummary::default());
    }

    let summary = apply(items, provider, state, opts)?;
    state.save()?;
    Ok(summary)
}

fn finish(summary: &ExecuteSummary) -> Result<()> {
    if !summary.is_success() {
        bail!("{} failed", ui::plural(summary.failed, "group"));
    }
    Ok(())
}
