//! Group principal: model, validation and normalization.

use declarative::{ChangeKind, Resource, ValidationError, check_exclusive, check_length};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum length of a group name, in characters.
pub const NAME_MIN_LEN: usize = 1;

/// Maximum length of a group name, in characters.
pub const NAME_MAX_LEN: usize = 64;

/// A group of users on the platform.
///
/// The same type carries declared and observed state. Fields the remote
/// service computes (`realm`, `realm_attributes`) are `None` in a
/// declared group. `description`, `external_id` and `members` are `None`
/// when the declaration leaves them out, which means "not managed".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Remote primary key; changing it replaces the group.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Identifier in an external identity provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,

    /// Automatically add new users to this group.
    #[serde(default)]
    pub auto_join: bool,

    /// Grant administrative rights to members.
    #[serde(default)]
    pub admin_privileges: bool,

    /// Member usernames; a set, kept sorted once normalized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<String>>,

    /// Read-only, reported by the remote service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm: Option<String>,

    /// Read-only, reported by the remote service; may be legitimately absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm_attributes: Option<String>,
}

impl Group {
    /// Create a declared group with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the external identity provider id.
    pub fn external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    /// Set the auto-join flag.
    pub fn auto_join(mut self, auto_join: bool) -> Self {
        self.auto_join = auto_join;
        self
    }

    /// Set the admin-privileges flag.
    pub fn admin_privileges(mut self, admin_privileges: bool) -> Self {
        self.admin_privileges = admin_privileges;
        self
    }

    /// Declare the member set.
    pub fn members<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.members = Some(members.into_iter().map(Into::into).collect());
        self
    }

    /// Members as a slice, empty when undeclared.
    pub fn member_list(&self) -> &[String] {
        self.members.as_deref().unwrap_or_default()
    }
}

/// Attributes of a [`Group`] that can differ between two states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GroupAttribute {
    Name,
    Description,
    ExternalId,
    AutoJoin,
    AdminPrivileges,
    Members,
}

impl GroupAttribute {
    /// Wire/config field name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::ExternalId => "external_id",
            Self::AutoJoin => "auto_join",
            Self::AdminPrivileges => "admin_privileges",
            Self::Members => "members",
        }
    }
}

impl fmt::Display for GroupAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Resource for Group {
    type Attribute = GroupAttribute;
    const RESOURCE_TYPE: &'static str = "group";

    fn id(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_length("name", &self.name, NAME_MIN_LEN, NAME_MAX_LEN)?;
        check_exclusive(
            "admin_privileges",
            self.admin_privileges,
            "auto_join",
            self.auto_join,
        )
    }

    fn normalize(mut self) -> Self {
        if let Some(members) = self.members.as_mut() {
            members.sort();
            members.dedup();
        }
        self
    }

    fn changed_attributes(&self, desired: &Self) -> Vec<GroupAttribute> {
        let mut changed = Vec::new();

        if self.name != desired.name {
            changed.push(GroupAttribute::Name);
        }
        if desired.description.is_some() && self.description != desired.description {
            changed.push(GroupAttribute::Description);
        }
        if desired.external_id.is_some() && self.external_id != desired.external_id {
            changed.push(GroupAttribute::ExternalId);
        }
        if self.auto_join != desired.auto_join {
            changed.push(GroupAttribute::AutoJoin);
        }
        if self.admin_privileges != desired.admin_privileges {
            changed.push(GroupAttribute::AdminPrivileges);
        }
        // An observed group with no members reports an empty list
        if let Some(members) = &desired.members
            && self.member_list() != members.as_slice()
        {
            changed.push(GroupAttribute::Members);
        }

        changed
    }

    fn change_kind(attribute: GroupAttribute) -> ChangeKind {
        match attribute {
            GroupAttribute::Name => ChangeKind::RequiresReplace,
            _ => ChangeKind::UpdateInPlace,
        }
    }

    fn attribute_value(&self, attribute: GroupAttribute) -> Option<String> {
        match attribute {
            GroupAttribute::Name => Some(self.name.clone()),
            GroupAttribute::Description => self.description.clone(),
            GroupAttribute::ExternalId => self.external_id.clone(),
            GroupAttribute::AutoJoin => Some(self.auto_join.to_string()),
            GroupAttribute::AdminPrivileges => Some(self.admin_privileges.to_string()),
            GroupAttribute::Members => self
                .members
                .as_ref()
                .map(|m| format!("[{}]", m.join(", "))),
        }
    }
}
