//! Subcommand implementations
//!
//! Each command has a thin entry point that loads config and state and
//! connects to the platform, and a `*_with` core that takes those as
//! arguments so it can run against [`platform::MockClient`] in tests.

pub mod apply;
pub mod inspect;
pub mod plan;

use anyhow::{Context as AnyhowContext, Result};
use platform::HttpClient;

use crate::Context;
use crate::config::GroupsConfig;
use crate::state::GroupState;

/// Load the config file named by the context
pub(crate) fn load_config(ctx: &Context) -> Result<GroupsConfig> {
    GroupsConfig::load(&ctx.config_path)
}

/// Load the state file named by the context
pub(crate) fn load_state(ctx: &Context) -> Result<GroupState> {
    GroupState::load(&ctx.state_path)
}

/// Build an HTTP client from the `[platform]` settings
pub(crate) fn connect(config: &GroupsConfig) -> Result<HttpClient> {
    let client_config = config.platform.client_config()?;
    let client = HttpClient::new(client_config).context("Could not set up platform client")?;
    log::debug!("Using platform at {}", client.base_url());
    Ok(client)
}
