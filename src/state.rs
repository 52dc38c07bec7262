use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use platform::Group;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// State Structures
// ============================================================================

/// Last observed remote state of every managed group
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GroupState {
    /// Last time the state was updated
    pub last_updated: DateTime<Utc>,

    /// Managed groups keyed by config address
    #[serde(default)]
    pub groups: BTreeMap<String, ManagedGroup>,

    #[serde(skip)]
    path: PathBuf,
}

/// State for a single managed group
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ManagedGroup {
    /// Last time groupctl changed this group
    #[serde(default)]
    pub last_applied: Option<DateTime<Utc>>,

    /// Group as the platform last reported it
    pub group: Group,
}

// ============================================================================
// GroupState Implementation
// ============================================================================

impl GroupState {
    /// Empty state that will be saved to `path`
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            last_updated: Utc::now(),
            groups: BTreeMap::new(),
            path: path.into(),
        }
    }

    /// Load state from disk, or return empty state if the file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("State file {} does not exist, starting empty", path.display());
            return Ok(Self::empty(path));
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        let mut state: GroupState = toml::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;
        state.path = path.to_path_buf();

        log::debug!(
            "Loaded state for {} groups from {}",
            state.groups.len(),
            path.display()
        );
        Ok(state)
    }

    /// Save state to disk
    ///
    /// Writes to a sibling temp file first so a crash never leaves a
    /// truncated state file behind.
    pub fn save(&mut self) -> Result<()> {
        self.last_updated = Utc::now();

        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        let content = toml::to_string_pretty(&self).context("Failed to serialize state to TOML")?;
        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, &content)
            .with_context(|| format!("Failed to write state file: {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to write state file: {}", self.path.display()))?;

        log::debug!("Saved state to {}", self.path.display());
        Ok(())
    }

    /// Path the state is saved to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Observed group at `address`, if managed
    pub fn observed(&self, address: &str) -> Option<&Group> {
        self.groups.get(address).map(|m| &m.group)
    }

    /// Record the group observed at `address` after a change
    pub fn record_applied(&mut self, address: &str, group: Group) {
        self.groups.insert(
            address.to_string(),
            ManagedGroup {
                last_applied: Some(Utc::now()),
                group,
            },
        );
    }

    /// Record a refreshed observation, keeping `last_applied`
    pub fn record_observed(&mut self, address: &str, group: Group) {
        let last_applied = self.groups.get(address).and_then(|m| m.last_applied);
        self.groups.insert(
            address.to_string(),
            ManagedGroup {
                last_applied,
                group,
            },
        );
    }

    /// Forget a group
    pub fn remove(&mut self, address: &str) -> Option<ManagedGroup> {
        self.groups.remove(address)
    }

    /// Addresses of all managed groups
    pub fn addresses(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }
}
