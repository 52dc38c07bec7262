//! Clients for the platform access API.
//!
//! Both clients implement [`declarative::Provider`] for [`Group`]:
//!
//! - [`HttpClient`]: talks to a live service over HTTP
//! - [`MockClient`]: keeps groups in memory, for tests and dry runs
//!
//! # Example
//!
//! ```
//! use declarative::{Executor, PlanDecision};
//! use platform::{Group, MockClient};
//!
//! let client = MockClient::new();
//! let executor = Executor::<Group, _>::new(&client);
//!
//! let desired = Group::new("readers").members(["anonymous", "admin"]);
//! let outcome = executor.reconcile(None, Some(&desired)).unwrap();
//!
//! assert_eq!(outcome.decision, PlanDecision::Create);
//! assert_eq!(outcome.state.unwrap().member_list(), ["admin", "anonymous"]);
//! ```

pub mod http;
#[cfg(test)]
mod stub;

pub use http::{ClientConfig, HttpClient};

use crate::error::Error as ApiError;
use crate::group::{Group, GroupAttribute};
use crate::wire::{GroupPatch, MembersPatch, from_wire, to_wire};
use declarative::{Deletion, Operation, Provider, Result};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Realm the mock reports for every group it creates.
pub const MOCK_REALM: &str = "internal";

/// In-memory client for testing without network access.
///
/// Groups round-trip through the wire representation, so the mock
/// reports state the same way the live service does. Every call is
/// recorded, and failures can be injected per operation and name.
#[derive(Debug, Clone, Default)]
pub struct MockClient {
    groups: Arc<Mutex<BTreeMap<String, Group>>>,
    calls: Arc<Mutex<Vec<(Operation, String)>>>,
    failures: Arc<Mutex<Vec<(Operation, String, ApiError)>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockClient {
    /// Create a new empty mock client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a group as if it already existed remotely.
    pub fn insert(&self, group: Group) {
        let stored = Self::store(&group);
        lock(&self.groups).insert(stored.name.clone(), stored);
    }

    /// Current remote state of a group.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Group> {
        lock(&self.groups).get(name).cloned()
    }

    /// Names of all groups, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        lock(&self.groups).keys().cloned().collect()
    }

    /// Calls received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<(Operation, String)> {
        lock(&self.calls).clone()
    }

    /// Make the next `operation` on `name` fail with the given HTTP status.
    pub fn fail_next(&self, operation: Operation, name: &str, status: u16, body: &str) {
        lock(&self.failures).push((
            operation,
            name.to_string(),
            ApiError::http(body, Some(status)),
        ));
    }

    fn record(&self, operation: Operation, name: &str) -> Result<()> {
        lock(&self.calls).push((operation, name.to_string()));

        let mut failures = lock(&self.failures);
        if let Some(pos) = failures
            .iter()
            .position(|(op, n, _)| *op == operation && n == name)
        {
            let (_, _, err) = failures.remove(pos);
            return Err(err.into_remote(operation, name));
        }
        Ok(())
    }

    // Everything stored passes through the wire format
    fn store(group: &Group) -> Group {
        let mut payload = to_wire(group);
        if payload.realm.is_none() {
            payload.realm = Some(MOCK_REALM.to_string());
        }
        from_wire(payload)
    }
}

impl Provider<Group> for MockClient {
    fn create(&self, desired: &Group) -> Result<Group> {
        self.record(Operation::Create, &desired.name)?;

        let mut groups = lock(&self.groups);
        if groups.contains_key(&desired.name) {
            return Err(ApiError::http(
                format!("Group '{}' already exists", desired.name),
                Some(409),
            )
            .into_remote(Operation::Create, &desired.name));
        }

        let mut group = desired.clone();
        group.realm = None;
        group.realm_attributes = None;
        let stored = Self::store(&group);
        groups.insert(stored.name.clone(), stored.clone());
        Ok(stored)
    }

    fn read(&self, id: &str) -> Result<Option<Group>> {
        self.record(Operation::Read, id)?;
        Ok(lock(&self.groups).get(id).cloned())
    }

    fn update(&self, observed: &Group, desired: &Group, changed: &[GroupAttribute]) -> Result<Group> {
        self.record(Operation::Update, &observed.name)?;

        let mut groups = lock(&self.groups);
        let Some(current) = groups.get_mut(&observed.name) else {
            return Err(ApiError::http("", Some(404)).into_remote(Operation::Update, &observed.name));
        };

        let patch = GroupPatch::from_changes(desired, changed);
        if let Some(description) = patch.description {
            current.description = Some(description);
        }
        if let Some(external_id) = patch.external_id {
            current.external_id = Some(external_id);
        }
        if let Some(auto_join) = patch.auto_join {
            current.auto_join = auto_join;
        }
        if let Some(admin_privileges) = patch.admin_privileges {
            current.admin_privileges = admin_privileges;
        }

        if changed.contains(&GroupAttribute::Members) {
            let members = MembersPatch::between(current.member_list(), desired.member_list());
            let mut next: Vec<String> = current
                .member_list()
                .iter()
                .filter(|m| !members.remove.contains(*m))
                .cloned()
                .collect();
            next.extend(members.add);
            next.sort();
            current.members = Some(next);
        }

        Ok(current.clone())
    }

    fn delete(&self, id: &str) -> Result<Deletion> {
        self.record(Operation::Delete, id)?;
        match lock(&self.groups).remove(id) {
            Some(_) => Ok(Deletion::Removed),
            None => Ok(Deletion::AlreadyAbsent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_create_reports_computed_fields() {
        let client = MockClient::new();
        let created = client
            .create(&Group::new("g").members(["b", "a", "b"]))
            .unwrap();
        assert_eq!(created.realm.as_deref(), Some(MOCK_REALM));
        assert_eq!(created.realm_attributes, None);
        assert_eq!(created.member_list(), ["a", "b"]);
        assert_eq!(client.names(), vec!["g".to_string()]);
    }

    #[test]
    fn test_mock_create_conflict() {
        let client = MockClient::new();
        client.insert(Group::new("g"));
        let err = client.create(&Group::new("g")).unwrap_err();
        assert!(err.to_string().contains("HTTP 409"));
    }

    #[test]
    fn test_mock_update_only_touches_changed() {
        let client = MockClient::new();
        client.insert(Group::new("g").description("old").members(["a"]));
        let observed = client.get("g").unwrap();
        let desired = Group::new("g").description("new").members(["b"]);

        let updated = client
            .update(&observed, &desired, &[GroupAttribute::Members])
            .unwrap();

        assert_eq!(updated.description.as_deref(), Some("old"));
        assert_eq!(updated.member_list(), ["b"]);
    }

    #[test]
    fn test_mock_delete_absent() {
        let client = MockClient::new();
        assert_eq!(client.delete("nope").unwrap(), Deletion::AlreadyAbsent);
    }

    #[test]
    fn test_mock_injected_failure_fires_once() {
        let client = MockClient::new();
        client.fail_next(Operation::Create, "g", 500, "boom");

        let err = client.create(&Group::new("g")).unwrap_err();
        assert!(err.to_string().contains("boom"));
        assert!(client.create(&Group::new("g")).is_ok());
        assert_eq!(
            client.calls(),
            vec![
                (Operation::Create, "g".to_string()),
                (Operation::Create, "g".to_string())
            ]
        );
    }
}
