//! Execution engine - runs the batch executor with terminal UI and records state

use anyhow::Result;
use colored::Colorize;
use declarative::{
    Applied, AutoConfirm, ConfirmCallback, ExecuteSummary, Provider, Reconciliation, execute,
};
use platform::Group;

use crate::progress::BarProgress;
use crate::state::GroupState;

use super::differ::{compute_diffs, display_diff, display_invalid};

/// Options for execution (includes `yes` for confirmation skip)
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    /// Don't make changes, just show what would happen
    pub dry_run: bool,
    /// Number of groups reconciled concurrently
    pub jobs: usize,
    /// Skip confirmation prompts
    pub yes: bool,
    /// Hide progress output
    pub quiet: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            jobs: 4,
            yes: false,
            quiet: false,
        }
    }
}

/// Asks once on the terminal before any change is made
pub struct PromptConfirm;

impl ConfirmCallback for PromptConfirm {
    fn confirm(&mut self, changes: &[(String, String)]) -> anyhow::Result<bool> {
        confirm_proceed(changes.len())
    }
}

/// Confirm with user
fn confirm_proceed(count: usize) -> Result<bool> {
    use dialoguer::Confirm;

    println!();
    let confirmed = Confirm::new()
        .with_prompt(format!("Apply {}?", crate::ui::plural(count, "change")))
        .default(false)
        .interact()?;

    Ok(confirmed)
}

/// Show the plan, confirm, execute, and record results in `state`
///
/// State is updated for every group that reached a definite outcome,
/// including partial batches; the caller saves it.
pub fn apply<P>(
    items: Vec<Reconciliation<Group>>,
    provider: &P,
    state: &mut GroupState,
    opts: &ApplyOptions,
) -> Result<ExecuteSummary>
where
    P: Provider<Group> + ?Sized,
{
    let (diffs, invalid) = compute_diffs(&items);
    display_diff(&diffs);
    if !invalid.is_empty() {
        println!();
        display_invalid(&invalid);
    }

    if opts.dry_run {
        println!();
        println!("  {} Dry run - no changes made", "ℹ".blue());
    }

    let exec_opts = declarative::ExecuteOptions {
        dry_run: opts.dry_run,
        jobs: opts.jobs.max(1),
    };
    let mut progress = BarProgress::new(opts.quiet);
    let report = if opts.yes {
        execute(items, provider, exec_opts, &mut progress, &mut AutoConfirm)?
    } else {
        execute(items, provider, exec_opts, &mut progress, &mut PromptConfirm)?
    };

    for applied in &report.applied {
        record(state, applied);
    }

    if !opts.dry_run {
        print_summary(&report.summary, &report.applied);
    }

    Ok(report.summary)
}

/// Fold one outcome into state
fn record(state: &mut GroupState, applied: &Applied<Group>) {
    match &applied.outcome {
        Ok(outcome) if outcome.result.is_change() => match &outcome.state {
            Some(group) => state.record_applied(&applied.address, group.clone()),
            None => {
                state.remove(&applied.address);
            }
        },
        Ok(_) => {}
        // The old group is already gone; keeping it in state would plan a
        // replace against nothing
        Err(e) if e.is_fatal() => {
            log::error!("{}: {}", applied.address, e);
            state.remove(&applied.address);
        }
        Err(e) => log::debug!("{}: {}", applied.address, e),
    }
}

/// Print final summary
fn print_summary(summary: &ExecuteSummary, applied: &[Applied<Group>]) {
    let failures: Vec<(&str, &declarative::Error)> = applied
        .iter()
        .filter_map(|a| a.outcome.as_ref().err().map(|e| (a.address.as_str(), e)))
        .collect();

    if !failures.is_empty() {
        println!();
        for (address, error) in &failures {
            crate::ui::error(&format!("{}: {}", address.bold(), error));
            crate::ui::dim(error.category().advice());
        }
    }

    if summary.total_changes() == 0 && summary.failed == 0 && summary.skipped == 0 {
        return;
    }

    println!();
    if summary.is_success() {
        println!("  {} Groups applied successfully!", "✓".green().bold());
    } else {
        println!("  {} Groups applied with errors", "⚠".yellow().bold());
    }

    if summary.created > 0 {
        println!("    • {} created", crate::ui::plural(summary.created, "group"));
    }
    if summary.modified > 0 {
        println!("    • {} updated", crate::ui::plural(summary.modified, "group"));
    }
    if summary.replaced > 0 {
        println!("    • {} replaced", crate::ui::plural(summary.replaced, "group"));
    }
    if summary.removed > 0 {
        println!("    • {} deleted", crate::ui::plural(summary.removed, "group"));
    }
    if summary.skipped > 0 {
        println!("    • {} skipped", crate::ui::plural(summary.skipped, "group"));
    }
    if summary.failed > 0 {
        println!("    • {} {}", summary.failed, "failed".red());
    }
}
