//! Declared groups and platform connection settings (`groups.toml`)

use anyhow::{Context, Result, bail};
use platform::{ClientConfig, Group, RetryConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding `platform.url`
pub const ENV_PLATFORM_URL: &str = "PLATFORM_URL";

/// Default environment variable holding the access token
pub const DEFAULT_TOKEN_ENV: &str = "PLATFORM_ACCESS_TOKEN";

// ============================================================================
// Config File
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GroupsConfig {
    #[serde(default)]
    pub platform: PlatformSettings,

    /// Declared groups keyed by address
    #[serde(default)]
    pub groups: BTreeMap<String, GroupDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformSettings {
    #[serde(default)]
    pub url: Option<String>,

    /// Name of the environment variable holding the access token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per request for transient failures
    #[serde(default = "default_retries")]
    pub retries: u32,
}

fn default_token_env() -> String {
    DEFAULT_TOKEN_ENV.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retries() -> u32 {
    3
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            url: None,
            token_env: default_token_env(),
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
        }
    }
}

/// One `[groups.<address>]` table
///
/// Only user-settable fields; `realm` and `realm_attributes` are reported
/// by the platform and cannot be declared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupDecl {
    /// Remote group name, defaults to the address
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub auto_join: bool,
    #[serde(default)]
    pub admin_privileges: bool,
    #[serde(default)]
    pub members: Option<Vec<String>>,
}

impl GroupDecl {
    /// Desired group for this declaration at `address`
    pub fn to_group(&self, address: &str) -> Group {
        Group {
            name: self.name.clone().unwrap_or_else(|| address.to_string()),
            description: self.description.clone(),
            external_id: self.external_id.clone(),
            auto_join: self.auto_join,
            admin_privileges: self.admin_privileges,
            members: self.members.clone(),
            realm: None,
            realm_attributes: None,
        }
    }
}

impl GroupsConfig {
    /// Load and parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse config from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.check_unique_names()?;
        log::debug!("Loaded {} declared groups", config.groups.len());
        Ok(config)
    }

    // Two addresses targeting one remote group would fight each other
    fn check_unique_names(&self) -> Result<()> {
        let mut seen: BTreeMap<String, &str> = BTreeMap::new();
        for (address, decl) in &self.groups {
            let name = decl.to_group(address).name;
            if let Some(other) = seen.insert(name.clone(), address.as_str()) {
                bail!(
                    "groups '{}' and '{}' both declare group name '{}'",
                    other,
                    address,
                    name
                );
            }
        }
        Ok(())
    }

    /// Desired groups keyed by address
    pub fn desired(&self) -> BTreeMap<String, Group> {
        self.groups
            .iter()
            .map(|(address, decl)| (address.clone(), decl.to_group(address)))
            .collect()
    }

    /// Validate every declared group without contacting the platform
    ///
    /// Returns the addresses that failed, with their errors.
    pub fn validate(&self) -> Vec<(String, declarative::Error)> {
        self.desired()
            .into_iter()
            .filter_map(|(address, group)| {
                declarative::prepare(group).err().map(|e| (address, e))
            })
            .collect()
    }
}

impl PlatformSettings {
    /// Resolve connection settings from the process environment
    pub fn client_config(&self) -> Result<ClientConfig> {
        self.resolve(|key| std::env::var(key).ok())
    }

    /// Resolve connection settings, looking variables up with `env`
    pub fn resolve(&self, env: impl Fn(&str) -> Option<String>) -> Result<ClientConfig> {
        let url = env(ENV_PLATFORM_URL)
            .filter(|u| !u.trim().is_empty())
            .or_else(|| self.url.clone())
            .with_context(|| {
                format!(
                    "No platform URL: set [platform] url in the config or {}",
                    ENV_PLATFORM_URL
                )
            })?;

        let token = env(&self.token_env)
            .filter(|t| !t.trim().is_empty())
            .with_context(|| format!("Access token not set: export {}", self.token_env))?;

        Ok(ClientConfig {
            base_url: url,
            token,
            timeout: Duration::from_secs(self.timeout_secs),
            retry: RetryConfig::attempts(self.retries),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[platform]
url = "https://example.jfrog.io"

[groups.readers]
name = "readers"
description = "Read-only users"
auto_join = true
members = ["anonymous", "admin"]

[groups.admins]
admin_privileges = true
"#;

    #[test]
    fn test_parse_sample() {
        let config = GroupsConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.platform.token_env, DEFAULT_TOKEN_ENV);
        assert_eq!(config.platform.timeout_secs, 30);
        assert_eq!(config.platform.retries, 3);

        let desired = config.desired();
        let readers = &desired["readers"];
        assert!(readers.auto_join);
        assert_eq!(readers.external_id, None);
        assert_eq!(
            readers.members,
            Some(vec!["anonymous".to_string(), "admin".to_string()])
        );
        assert_eq!(desired["admins"].name, "admins");
        assert_eq!(desired["admins"].members, None);
    }

    #[test]
    fn test_realm_cannot_be_declared() {
        let err = GroupsConfig::parse("[groups.g]\nrealm = \"internal\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("realm"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let toml = "[groups.a]\nname = \"same\"\n[groups.b]\nname = \"same\"\n";
        let err = GroupsConfig::parse(toml).unwrap_err();
        assert!(err.to_string().contains("same"));
    }

    #[test]
    fn test_validate_reports_bad_groups() {
        let toml = "[groups.ok]\n[groups.bad]\nauto_join = true\nadmin_privileges = true\n";
        let config = GroupsConfig::parse(toml).unwrap();
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, "bad");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("groups.toml");
        fs::write(&path, SAMPLE).unwrap();

        let config = GroupsConfig::load(&path).unwrap();
        assert_eq!(config.groups.len(), 2);

        let missing = GroupsConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(missing.to_string().contains("Could not read config file"));
    }

    #[test]
    fn test_resolve_env_overrides_url() {
        let settings = GroupsConfig::parse(SAMPLE).unwrap().platform;
        let env = |key: &str| match key {
            ENV_PLATFORM_URL => Some("https://override.example".to_string()),
            DEFAULT_TOKEN_ENV => Some("tok".to_string()),
            _ => None,
        };
        let client = settings.resolve(env).unwrap();
        assert_eq!(client.base_url, "https://override.example");
        assert_eq!(client.token, "tok");
        assert_eq!(client.retry.max_attempts, 3);
    }

    #[test]
    fn test_resolve_requires_token() {
        let settings = GroupsConfig::parse(SAMPLE).unwrap().platform;
        let err = settings.resolve(|_| None).unwrap_err();
        assert!(err.to_string().contains(DEFAULT_TOKEN_ENV));
    }

    #[test]
    fn test_resolve_requires_url() {
        let settings = PlatformSettings::default();
        let err = settings
            .resolve(|key| (key == DEFAULT_TOKEN_ENV).then(|| "tok".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_PLATFORM_URL));
    }
}
