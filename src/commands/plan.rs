//! `validate` and `plan`

use anyhow::{Result, bail};
use declarative::{Provider, ResourceDiff};
use platform::{Group, HttpClient};

use super::{connect, load_config, load_state};
use crate::Context;
use crate::cli::PlanArgs;
use crate::config::GroupsConfig;
use crate::engine::differ::{compute_diffs, display_diff, display_invalid};
use crate::engine::planner::{Drift, build, refresh};
use crate::state::GroupState;
use crate::ui;

/// Validate every declared group offline
pub fn validate(ctx: &Context) -> Result<()> {
    let config = load_config(ctx)?;
    let invalid = config.validate();

    if invalid.is_empty() {
        if !ctx.quiet {
            ui::success(&format!(
                "{} valid",
                ui::plural(config.groups.len(), "declared group")
            ));
        }
        return Ok(());
    }

    display_invalid(&invalid);
    bail!("{} invalid", ui::plural(invalid.len(), "group"));
}

/// Show what apply would change
pub fn run(ctx: &Context, args: &PlanArgs) -> Result<()> {
    let config = load_config(ctx)?;
    let mut state = load_state(ctx)?;

    let diffs = if args.no_refresh {
        plan_with(&config, &mut state, None::<&HttpClient>, args.target.as_deref())?
    } else {
        let client = connect(&config)?;
        plan_with(&config, &mut state, Some(&client), args.target.as_deref())?
    };

    if ctx.verbose > 0 {
        ui::dim(&format!("{} with changes", ui::plural(diffs.len(), "group")));
    }
    Ok(())
}

/// Plan against `state`, refreshing through `provider` when given
///
/// The refreshed state is not saved; only apply and refresh persist it.
pub fn plan_with<P>(
    config: &GroupsConfig,
    state: &mut GroupState,
    provider: Option<&P>,
    target: Option<&str>,
) -> Result<Vec<ResourceDiff>>
where
    P: Provider<Group> + ?Sized,
{
    let mut items = build(&config.desired(), state, target)?;

    if let Some(provider) = provider {
        let drift = refresh(&mut items, provider, state)?;
        report_drift(&drift);
    }

    let (diffs, invalid) = compute_diffs(&items);
    display_diff(&diffs);
    if !invalid.is_empty() {
        println!();
        display_invalid(&invalid);
        bail!("{} invalid", ui::plural(invalid.len(), "group"));
    }
    Ok(diffs)
}

pub(crate) fn report_drift(drift: &[(String, Drift)]) {
    for (address, d) in drift {
        match d {
            Drift::Deleted => ui::warn(&format!("{}: deleted outside groupctl", address)),
            Drift::Changed(fields) => ui::warn(&format!(
                "{}: changed outside groupctl ({})",
                address,
                fields.join(", ")
            )),
        }
    }
}
