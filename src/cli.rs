use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "groupctl")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declarative management of platform access groups", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file declaring the groups [default: <config dir>/groups.toml]
    #[arg(long, global = true, env = "GROUPCTL_CONFIG")]
    pub config: Option<String>,

    /// State file [default: <state dir>/state.toml]
    #[arg(long, global = true, env = "GROUPCTL_STATE")]
    pub state: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check every declared group without contacting the platform
    Validate,

    /// Show what apply would change
    Plan(PlanArgs),

    /// Make the platform match the config
    Apply(ApplyArgs),

    /// Delete managed groups and forget them
    Destroy(DestroyArgs),

    /// Start managing an existing group
    Import {
        /// Config address to record the group under
        address: String,
        /// Name of the group on the platform
        name: String,
    },

    /// Re-read managed groups and report drift
    Refresh,

    /// Show stored state
    Show {
        /// Only this address
        address: Option<String>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Default)]
pub struct PlanArgs {
    /// Only plan this address
    #[arg(short, long)]
    pub target: Option<String>,

    /// Use stored state without re-reading the platform
    #[arg(long)]
    pub no_refresh: bool,
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Only apply this address
    #[arg(short, long)]
    pub target: Option<String>,

    /// Show what would change without making changes
    #[arg(long)]
    pub dry_run: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Number of groups applied concurrently
    #[arg(short, long, default_value = "4")]
    pub jobs: u16,

    /// Use stored state without re-reading the platform
    #[arg(long)]
    pub no_refresh: bool,
}

#[derive(Args, Debug)]
pub struct DestroyArgs {
    /// Only destroy this address
    #[arg(short, long)]
    pub target: Option<String>,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}
