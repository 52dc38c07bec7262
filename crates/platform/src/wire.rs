//! Wire representation of groups and the mapping to [`Group`].
//!
//! The remote API speaks JSON objects of the shape
//! `{name, description?, external_id?, auto_join, admin_privileges,
//! members: [string], realm, realm_attributes?}`. Optional fields are
//! omitted rather than sent as `null` or empty strings, so a payload read
//! from the service maps back to the exact same JSON.

use crate::group::{Group, GroupAttribute};
use serde::{Deserialize, Serialize};

/// Group as sent to and received from the remote API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPayload {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,

    #[serde(default)]
    pub auto_join: bool,

    #[serde(default)]
    pub admin_privileges: bool,

    #[serde(default)]
    pub members: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm_attributes: Option<String>,
}

/// Convert a group to its wire payload.
///
/// Undeclared members are sent as an empty list.
pub fn to_wire(group: &Group) -> GroupPayload {
    GroupPayload {
        name: group.name.clone(),
        description: group.description.clone(),
        external_id: group.external_id.clone(),
        auto_join: group.auto_join,
        admin_privileges: group.admin_privileges,
        members: group.member_list().to_vec(),
        realm: group.realm.clone(),
        realm_attributes: group.realm_attributes.clone(),
    }
}

/// Convert a wire payload to a group.
///
/// Members are sorted and deduplicated on ingestion; an absent
/// `realm_attributes` stays absent.
pub fn from_wire(payload: GroupPayload) -> Group {
    let mut members = payload.members;
    members.sort();
    members.dedup();

    Group {
        name: payload.name,
        description: payload.description,
        external_id: payload.external_id,
        auto_join: payload.auto_join,
        admin_privileges: payload.admin_privileges,
        members: Some(members),
        realm: payload.realm,
        realm_attributes: payload.realm_attributes,
    }
}

impl From<GroupPayload> for Group {
    fn from(payload: GroupPayload) -> Self {
        from_wire(payload)
    }
}

impl From<&Group> for GroupPayload {
    fn from(group: &Group) -> Self {
        to_wire(group)
    }
}

/// Partial update of a group's scalar fields (`PATCH /groups/{name}`).
///
/// Only changed fields are serialized; `name` is never part of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_join: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_privileges: Option<bool>,
}

impl GroupPatch {
    /// Build a patch carrying the `changed` attributes of `desired`.
    pub fn from_changes(desired: &Group, changed: &[GroupAttribute]) -> Self {
        let mut patch = Self::default();
        for attribute in changed {
            match attribute {
                GroupAttribute::Description => patch.description = desired.description.clone(),
                GroupAttribute::ExternalId => patch.external_id = desired.external_id.clone(),
                GroupAttribute::AutoJoin => patch.auto_join = Some(desired.auto_join),
                GroupAttribute::AdminPrivileges => {
                    patch.admin_privileges = Some(desired.admin_privileges);
                }
                GroupAttribute::Name | GroupAttribute::Members => {}
            }
        }
        patch
    }

    /// Check if the patch carries nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Membership change (`PATCH /groups/{name}/members`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembersPatch {
    pub add: Vec<String>,
    pub remove: Vec<String>,
}

impl MembersPatch {
    /// Compute the additions and removals turning `current` into `desired`.
    ///
    /// Both inputs are treated as sets; output lists are sorted.
    pub fn between(current: &[String], desired: &[String]) -> Self {
        use std::collections::BTreeSet;

        let current: BTreeSet<&String> = current.iter().collect();
        let desired: BTreeSet<&String> = desired.iter().collect();

        Self {
            add: desired.difference(&current).map(|s| (*s).clone()).collect(),
            remove: current.difference(&desired).map(|s| (*s).clone()).collect(),
        }
    }

    /// Check if the patch carries nothing.
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_JSON: &str = r#"{"name":"readers","description":"Test group","external_id":"externalID","auto_join":true,"admin_privileges":false,"members":["admin","anonymous"],"realm":"internal","realm_attributes":"ldap-attrs"}"#;
    const MINIMAL_JSON: &str = r#"{"name":"readers","auto_join":false,"admin_privileges":false,"members":["admin"],"realm":"internal"}"#;

    #[test]
    fn test_wire_json_round_trips_byte_for_byte() {
        for json in [FULL_JSON, MINIMAL_JSON] {
            let payload: GroupPayload = serde_json::from_str(json).unwrap();
            let back = serde_json::to_string(&to_wire(&from_wire(payload))).unwrap();
            assert_eq!(back, json);
        }
    }

    #[test]
    fn test_group_round_trip_with_and_without_realm_attributes() {
        let base = Group::new("g")
            .description("d")
            .members(["admin", "anonymous"]);
        let mut without = base.clone();
        without.realm = Some("internal".into());
        let mut with = without.clone();
        with.realm_attributes = Some("attrs".into());

        assert_eq!(from_wire(to_wire(&without)), without);
        assert_eq!(from_wire(to_wire(&with)), with);
    }

    #[test]
    fn test_absent_realm_attributes_not_synthesized() {
        let payload: GroupPayload = serde_json::from_str(MINIMAL_JSON).unwrap();
        let group = from_wire(payload);
        assert_eq!(group.realm.as_deref(), Some("internal"));
        assert_eq!(group.realm_attributes, None);
        assert_eq!(group.description, None);
    }

    #[test]
    fn test_members_sorted_on_ingestion() {
        let payload: GroupPayload =
            serde_json::from_str(r#"{"name":"g","members":["zed","admin","zed"]}"#).unwrap();
        let group: Group = payload.into();
        assert_eq!(group.member_list(), ["admin", "zed"]);
    }

    #[test]
    fn test_missing_members_reads_as_empty_set() {
        let payload: GroupPayload = serde_json::from_str(r#"{"name":"g"}"#).unwrap();
        assert_eq!(from_wire(payload).members, Some(Vec::new()));
    }

    #[test]
    fn test_patch_only_changed_fields() {
        let desired = Group::new("g").description("new").admin_privileges(true);
        let patch = GroupPatch::from_changes(
            &desired,
            &[GroupAttribute::Description, GroupAttribute::Members],
        );
        assert_eq!(
            serde_json::to_string(&patch).unwrap(),
            r#"{"description":"new"}"#
        );

        let patch = GroupPatch::from_changes(&desired, &[GroupAttribute::AdminPrivileges]);
        assert_eq!(
            serde_json::to_string(&patch).unwrap(),
            r#"{"admin_privileges":true}"#
        );
        assert!(GroupPatch::from_changes(&desired, &[GroupAttribute::Members]).is_empty());
    }

    #[test]
    fn test_members_patch_between() {
        let current = vec!["admin".to_string(), "anonymous".to_string()];
        let desired = vec!["admin".to_string(), "deploy".to_string()];
        let patch = MembersPatch::between(&current, &desired);
        assert_eq!(patch.add, vec!["deploy".to_string()]);
        assert_eq!(patch.remove, vec!["anonymous".to_string()]);
        assert!(MembersPatch::between(&current, &current).is_empty());
    }
}
