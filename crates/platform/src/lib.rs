//! # Platform
//!
//! The Group principal of a platform access service, and clients that
//! reconcile it through the [`declarative`] engine.
//!
//! ## Modules
//!
//! - [`group`]: the [`Group`] model, validation rules and normalization
//! - [`wire`]: JSON payloads exchanged with the access API
//! - [`client`]: [`HttpClient`] for a live service, [`MockClient`] for tests
//! - [`retry`]: backoff for transient transport failures
//! - [`error`]: transport errors and their mapping to reconciliation errors
//!
//! ## Example
//!
//! ```no_run
//! use declarative::Executor;
//! use platform::{ClientConfig, Group, HttpClient};
//!
//! let client = HttpClient::new(ClientConfig::new("https://example.jfrog.io", "token"))?;
//! let executor = Executor::<Group, _>::new(&client);
//!
//! let desired = Group::new("readers")
//!     .description("Read-only users")
//!     .members(["alice", "bob"]);
//! let observed = executor.read("readers")?;
//! let outcome = executor.reconcile(observed.as_ref(), Some(&desired))?;
//! println!("{}: {:?}", outcome.decision, outcome.result);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod client;
pub mod error;
pub mod group;
pub mod retry;
pub mod wire;

pub use client::{ClientConfig, HttpClient, MockClient};
pub use error::{Error, ErrorCategory, Result};
pub use group::{Group, GroupAttribute, NAME_MAX_LEN, NAME_MIN_LEN};
pub use retry::RetryConfig;
pub use wire::{GroupPatch, GroupPayload, MembersPatch};

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::{
        ApplyResult, ExecuteOptions, Executor, Operation, PlanDecision, Reconciliation,
        execute_simple,
    };
    use std::collections::BTreeSet;

    fn desired(name: &str) -> Group {
        Group::new(name)
            .description("Test group")
            .external_id("externalID")
            .auto_join(true)
            .admin_privileges(false)
            .members(["anonymous", "admin"])
    }

    #[test]
    fn test_lifecycle_create_update_rename_delete() {
        let client = MockClient::new();
        let executor = Executor::<Group, _>::new(&client);

        // Create
        let outcome = executor.reconcile(None, Some(&desired("g1"))).unwrap();
        assert_eq!(outcome.decision, PlanDecision::Create);
        let state = outcome.state.unwrap();
        assert_eq!(state.member_list(), ["admin", "anonymous"]);
        assert_eq!(state.member_list().len(), 2);
        assert_eq!(state.realm.as_deref(), Some("internal"));

        // Re-apply is a no-op
        let outcome = executor
            .reconcile(Some(&state), Some(&desired("g1")))
            .unwrap();
        assert_eq!(outcome.decision, PlanDecision::NoOp);
        assert_eq!(outcome.result, ApplyResult::NoChange);

        // Shrink membership in place
        let update = desired("g1").members(["admin"]);
        let outcome = executor.reconcile(Some(&state), Some(&update)).unwrap();
        assert_eq!(
            outcome.decision,
            PlanDecision::UpdateInPlace(BTreeSet::from([GroupAttribute::Members]))
        );
        let state = outcome.state.unwrap();
        assert_eq!(state.member_list(), ["admin"]);
        assert_eq!(state.description.as_deref(), Some("Test group"));

        // Rename replaces: old object deleted before the new one is created
        let renamed = desired("g1-updated").members(["admin"]);
        let outcome = executor.reconcile(Some(&state), Some(&renamed)).unwrap();
        assert!(matches!(outcome.decision, PlanDecision::Replace(_)));
        assert_eq!(outcome.result, ApplyResult::Replaced);
        let calls = client.calls();
        let delete = calls
            .iter()
            .position(|c| *c == (Operation::Delete, "g1".to_string()))
            .unwrap();
        let create = calls
            .iter()
            .position(|c| *c == (Operation::Create, "g1-updated".to_string()))
            .unwrap();
        assert!(delete < create);
        assert_eq!(client.names(), vec!["g1-updated".to_string()]);
        let state = outcome.state.unwrap();

        // Delete
        let outcome = executor.reconcile(Some(&state), None).unwrap();
        assert_eq!(outcome.decision, PlanDecision::Delete);
        assert!(outcome.state.is_none());
        assert!(client.names().is_empty());
    }

    #[test]
    fn test_import_reports_realm_without_attributes() {
        let client = MockClient::new();
        client.insert(desired("g1"));
        let executor = Executor::<Group, _>::new(&client);

        let imported = executor.import("g1").unwrap();

        assert_eq!(imported.realm.as_deref(), Some("internal"));
        assert_eq!(imported.realm_attributes, None);
        assert_eq!(imported.member_list(), ["admin", "anonymous"]);
        assert_eq!(
            executor.reconcile(Some(&imported), Some(&desired("g1")))
                .unwrap()
                .decision,
            PlanDecision::NoOp
        );
    }

    #[test]
    fn test_import_missing_is_not_found() {
        let client = MockClient::new();
        let err = Executor::<Group, _>::new(&client).import("ghost").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_conflicting_flags_never_reach_the_client() {
        let client = MockClient::new();
        let bad = desired("g1").admin_privileges(true);

        let err = Executor::<Group, _>::new(&client).reconcile(None, Some(&bad)).unwrap_err();

        assert_eq!(
            err.to_string(),
            "invalid group 'g1': admin_privileges can not be set to true when auto_join is true"
        );
        assert!(client.calls().is_empty());
    }

    #[test]
    fn test_replace_create_failure_is_fatal() {
        let client = MockClient::new();
        client.insert(desired("g1"));
        let state = client.get("g1").unwrap();
        client.fail_next(Operation::Create, "g2", 400, "Group name is invalid");

        let err = Executor::<Group, _>::new(&client)
            .reconcile(Some(&state), Some(&desired("g2")))
            .unwrap_err();

        assert!(err.is_fatal());
        assert!(client.names().is_empty());
    }

    #[test]
    fn test_remote_error_is_surfaced_verbatim() {
        let client = MockClient::new();
        client.fail_next(Operation::Create, "g1", 403, "Forbidden: insufficient scope");

        let err = Executor::<Group, _>::new(&client)
            .reconcile(None, Some(&desired("g1")))
            .unwrap_err();

        assert!(err.to_string().contains("Forbidden: insufficient scope"));
        assert!(err.to_string().contains("HTTP 403"));
    }

    #[test]
    fn test_externally_deleted_group_deletes_cleanly() {
        let client = MockClient::new();
        let ghost = Group::new("gone").members(Vec::<String>::new());

        let outcome = Executor::<Group, _>::new(&client).reconcile(Some(&ghost), None).unwrap();

        assert_eq!(outcome.result, ApplyResult::Removed);
    }

    #[test]
    fn test_batch_instances_are_independent() {
        let client = MockClient::new();
        client.fail_next(Operation::Create, "bad", 500, "boom");
        let items = vec![
            Reconciliation {
                address: "a".into(),
                observed: None,
                desired: Some(desired("good")),
            },
            Reconciliation {
                address: "b".into(),
                observed: None,
                desired: Some(desired("bad")),
            },
        ];

        let report = execute_simple(
            items,
            &client,
            ExecuteOptions {
                dry_run: false,
                jobs: 2,
            },
        )
        .unwrap();

        assert_eq!(report.summary.created, 1);
        assert_eq!(report.summary.failed, 1);
        assert_eq!(client.names(), vec!["good".to_string()]);
    }
}
