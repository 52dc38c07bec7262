//! Plan computation and display

use colored::{ColoredString, Colorize};
use declarative::{DiffSummary, Reconciliation, ResourceDiff, plan, prepare};
use platform::Group;

/// Plan every item, producing diffs for those that would change
///
/// Items whose desired state fails validation are returned separately;
/// they never reach the remote side.
pub fn compute_diffs(
    items: &[Reconciliation<Group>],
) -> (Vec<ResourceDiff>, Vec<(String, declarative::Error)>) {
    let mut diffs = Vec::new();
    let mut invalid = Vec::new();

    for item in items {
        let desired = match item.desired.clone().map(prepare).transpose() {
            Ok(desired) => desired,
            Err(e) => {
                invalid.push((item.address.clone(), e));
                continue;
            }
        };

        let decision = plan(item.observed.as_ref(), desired.as_ref());
        log::debug!("{}: {}", item.address, decision);

        if let Some(diff) = ResourceDiff::from_decision(
            &item.address,
            item.observed.as_ref(),
            desired.as_ref(),
            &decision,
        ) {
            diffs.push(diff);
        }
    }

    (diffs, invalid)
}

/// Symbol for a diff action
pub fn action_symbol(diff: &ResourceDiff) -> ColoredString {
    match diff.action.as_str() {
        "create" => "+".green(),
        "update" => "~".yellow(),
        "replace" => "-/+".red(),
        "delete" => "-".red(),
        _ => "?".dimmed(),
    }
}

fn format_value(value: Option<&str>) -> String {
    value.map_or_else(|| "(none)".to_string(), |v| format!("\"{}\"", v))
}

/// Display a list of diffs in a user-friendly format
pub fn display_diff(diffs: &[ResourceDiff]) {
    if diffs.is_empty() {
        println!();
        println!("  {} No changes. Groups match the configuration.", "✓".green());
        return;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Group Plan".bold()
    );
    println!("│");

    for diff in diffs {
        let note = match diff.action.as_str() {
            "create" => "(will be created)".to_string(),
            "delete" => "(will be deleted)".to_string(),
            "replace" => "(must be replaced)".to_string(),
            _ => "(updated in place)".to_string(),
        };
        println!(
            "│ {} {:<30} {}",
            action_symbol(diff),
            diff.address.bold(),
            note.dimmed()
        );

        for change in &diff.changes {
            let marker = if change.forces_replace {
                " # forces replacement".red().to_string()
            } else {
                String::new()
            };
            println!(
                "│       {}: {} → {}{}",
                change.attribute,
                format_value(change.from.as_deref()).dimmed(),
                format_value(change.to.as_deref()),
                marker
            );
        }
    }

    let summary = DiffSummary::from_diffs(diffs);
    println!("│");
    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Plan: {} to create, {} to update, {} to replace, {} to delete",
        summary.additions.to_string().green(),
        summary.modifications.to_string().yellow(),
        summary.replacements.to_string().red(),
        summary.removals.to_string().red()
    );
    println!("└─────────────────────────────────────────────────────┘");
}

/// Display validation failures
pub fn display_invalid(invalid: &[(String, declarative::Error)]) {
    for (address, e) in invalid {
        println!("  {} {}: {}", "✗".red(), address.bold(), e);
    }
}
