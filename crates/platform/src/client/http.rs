//! HTTP client for the platform access API.
//!
//! Speaks the v2 groups API:
//!
//! | Call             | Request                                   |
//! |------------------|-------------------------------------------|
//! | create           | `POST   /access/api/v2/groups`            |
//! | read             | `GET    /access/api/v2/groups/{name}`     |
//! | update scalars   | `PATCH  /access/api/v2/groups/{name}`     |
//! | update members   | `PATCH  /access/api/v2/groups/{name}/members` |
//! | delete           | `DELETE /access/api/v2/groups/{name}`     |
//!
//! Transient failures (connection errors, 429, 5xx) are retried with
//! backoff according to [`RetryConfig`]; everything else is returned to
//! the caller on the first failure.

use crate::error::{Error, Result};
use crate::group::{Group, GroupAttribute};
use crate::retry::{RetryConfig, with_retry};
use crate::wire::{GroupPatch, GroupPayload, MembersPatch, from_wire, to_wire};
use declarative::{Deletion, Operation, Provider};
use serde::Serialize;
use std::time::Duration;
use ureq::Body;
use ureq::http::Response;
use url::Url;

/// Path segments of the groups collection, relative to the platform URL.
const GROUPS_PATH: [&str; 4] = ["access", "api", "v2", "groups"];

/// Connection settings for [`HttpClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Platform base URL, e.g. `https://example.jfrog.io`
    pub base_url: String,
    /// Access token sent as a bearer token
    pub token: String,
    /// Timeout for a whole request
    pub timeout: Duration,
    /// Retry policy for transient failures
    pub retry: RetryConfig,
}

impl ClientConfig {
    /// Create a config with default timeout and retry policy.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }
}

/// Blocking HTTP client for groups.
pub struct HttpClient {
    agent: ureq::Agent,
    base_url: Url,
    token: String,
    retry: RetryConfig,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url.as_str())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Create a client, rejecting a malformed URL or an empty token.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let raw = config.base_url.trim();
        if raw.is_empty() {
            return Err(Error::Config("platform URL is empty".into()));
        }
        let mut base_url = Url::parse(raw)
            .map_err(|e| Error::Config(format!("invalid platform URL '{}': {}", raw, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "platform URL must use http or https, got '{}'",
                raw
            )));
        }
        base_url.set_query(None);
        base_url.set_fragment(None);

        if config.token.trim().is_empty() {
            return Err(Error::Config("access token is empty".into()));
        }

        // Status codes are inspected here so error bodies reach the caller
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(config.timeout))
            .build()
            .into();

        Ok(Self {
            agent,
            base_url,
            token: config.token,
            retry: config.retry,
        })
    }

    /// Get the platform base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Build `{base}/access/api/v2/groups/{segments..}`, encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<String> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Config(format!("{} can not be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(GROUPS_PATH)
            .extend(segments);
        Ok(url.into())
    }

    fn groups_url(&self) -> Result<String> {
        self.endpoint(&[])
    }

    fn group_url(&self, name: &str) -> Result<String> {
        self.endpoint(&[name])
    }

    fn members_url(&self, name: &str) -> Result<String> {
        self.endpoint(&[name, "members"])
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    fn get(&self, name: &str) -> Result<Option<Group>> {
        let url = self.group_url(name)?;
        with_retry(&self.retry, "GET group", || {
            let response = self
                .agent
                .get(&url)
                .header("Authorization", &self.bearer())
                .header("Accept", "application/json")
                .call()?;
            if response.status().as_u16() == 404 {
                return Ok(None);
            }
            let mut response = check(response)?;
            let payload: GroupPayload = response.body_mut().read_json()?;
            Ok(Some(from_wire(payload)))
        })
    }

    fn post(&self, url: &str, body: &impl Serialize) -> Result<String> {
        let response = self
            .agent
            .post(url)
            .header("Authorization", &self.bearer())
            .header("Accept", "application/json")
            .send_json(body)?;
        let mut response = check(response)?;
        Ok(response.body_mut().read_to_string()?)
    }

    fn patch(&self, url: &str, body: &impl Serialize) -> Result<()> {
        with_retry(&self.retry, &format!("PATCH {}", url), || {
            let response = self
                .agent
                .patch(url)
                .header("Authorization", &self.bearer())
                .header("Accept", "application/json")
                .send_json(body)?;
            check(response)?;
            Ok(())
        })
    }

    /// Read back a group that must exist.
    fn fetch(&self, name: &str) -> declarative::Result<Group> {
        self.get(name)
            .map_err(|e| e.into_remote(Operation::Read, name))?
            .ok_or_else(|| declarative::Error::NotFound {
                resource_type: "group",
                id: name.to_string(),
            })
    }
}

/// Turn a non-success response into an error carrying the body verbatim.
fn check(mut response: Response<Body>) -> Result<Response<Body>> {
    let status = response.status().as_u16();
    if (200..300).contains(&status) {
        return Ok(response);
    }
    let body = response.body_mut().read_to_string().unwrap_or_default();
    let message = if body.trim().is_empty() {
        format!("HTTP {}", status)
    } else {
        body
    };
    Err(Error::http(message, Some(status)))
}

impl Provider<Group> for HttpClient {
    fn create(&self, desired: &Group) -> declarative::Result<Group> {
        let name = desired.name.as_str();
        let url = self
            .groups_url()
            .map_err(|e| e.into_remote(Operation::Create, name))?;
        let payload = to_wire(desired);

        // A retried POST may find the group its lost first attempt created
        let mut attempts = 0u32;
        let sent = with_retry(&self.retry, "POST group", || {
            attempts += 1;
            self.post(&url, &payload)
        });

        let body = match sent {
            Ok(body) => body,
            Err(e) if attempts > 1 && e.status() == Some(409) => {
                log::warn!(
                    "group '{}' already exists after {} create attempts, reading it back",
                    name,
                    attempts
                );
                String::new()
            }
            Err(e) => return Err(e.into_remote(Operation::Create, name)),
        };

        if !body.trim().is_empty()
            && let Ok(payload) = serde_json::from_str::<GroupPayload>(&body)
        {
            return Ok(from_wire(payload));
        }

        // Some deployments answer 201 with no body
        log::debug!("create of group '{}' returned no body, reading back", name);
        self.fetch(name)
    }

    fn read(&self, id: &str) -> declarative::Result<Option<Group>> {
        self.get(id).map_err(|e| e.into_remote(Operation::Read, id))
    }

    fn update(
        &self,
        observed: &Group,
        desired: &Group,
        changed: &[GroupAttribute],
    ) -> declarative::Result<Group> {
        let name = observed.name.as_str();
        let remote = |e: Error| e.into_remote(Operation::Update, name);

        let patch = GroupPatch::from_changes(desired, changed);
        if !patch.is_empty() {
            self.patch(&self.group_url(name).map_err(remote)?, &patch)
                .map_err(remote)?;
        }

        if changed.contains(&GroupAttribute::Members) {
            let members = MembersPatch::between(observed.member_list(), desired.member_list());
            if !members.is_empty() {
                log::debug!(
                    "group '{}': adding {:?}, removing {:?}",
                    name,
                    members.add,
                    members.remove
                );
                self.patch(&self.members_url(name).map_err(remote)?, &members)
                    .map_err(remote)?;
            }
        }

        self.fetch(name)
    }

    fn delete(&self, id: &str) -> declarative::Result<Deletion> {
        let remote = |e: Error| e.into_remote(Operation::Delete, id);
        let url = self.group_url(id).map_err(remote)?;
        with_retry(&self.retry, "DELETE group", || {
            let response = self
                .agent
                .delete(&url)
                .header("Authorization", &self.bearer())
                .call()?;
            if response.status().as_u16() == 404 {
                return Ok(Deletion::AlreadyAbsent);
            }
            check(response)?;
            Ok(Deletion::Removed)
        })
        .map_err(remote)
    }
}
