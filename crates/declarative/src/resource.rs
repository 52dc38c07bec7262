//! Resource trait for declarative state management
//!
//! A Resource is a snapshot of one remote entity: either the state an
//! operator declared, or the state last observed on the remote side.
//! Both sides share the same type so they can be compared attribute by
//! attribute.

use crate::types::ChangeKind;
use crate::validation::ValidationError;
use std::fmt;
use std::hash::Hash;

/// Core trait for declarative resources
///
/// Every managed entity implements this trait, which provides:
/// - Identity (id, type)
/// - Static validation and canonical form
/// - Attribute-level comparison and change classification
///
/// All methods are pure. Remote calls live behind [`crate::Provider`].
///
/// # Example
///
/// ```ignore
/// use declarative::{ChangeKind, Resource, ValidationError};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Bucket { name: String, tags: Vec<String> }
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// enum BucketAttr { Name, Tags }
///
/// impl Resource for Bucket {
///     type Attribute = BucketAttr;
///     const RESOURCE_TYPE: &'static str = "bucket";
///
///     fn id(&self) -> &str { &self.name }
///     fn validate(&self) -> Result<(), ValidationError> { Ok(()) }
///
///     fn normalize(mut self) -> Self {
///         self.tags.sort();
///         self.tags.dedup();
///         self
///     }
///
///     fn changed_attributes(&self, desired: &Self) -> Vec<BucketAttr> {
///         let mut changed = Vec::new();
///         if self.name != desired.name { changed.push(BucketAttr::Name); }
///         if self.tags != desired.tags { changed.push(BucketAttr::Tags); }
///         changed
///     }
///
///     fn change_kind(attribute: BucketAttr) -> ChangeKind {
///         match attribute {
///             BucketAttr::Name => ChangeKind::RequiresReplace,
///             BucketAttr::Tags => ChangeKind::UpdateInPlace,
///         }
///     }
///
///     fn attribute_value(&self, attribute: BucketAttr) -> Option<String> {
///         match attribute {
///             BucketAttr::Name => Some(self.name.clone()),
///             BucketAttr::Tags => Some(format!("{:?}", self.tags)),
///         }
///     }
/// }
/// ```
pub trait Resource: Clone + PartialEq + fmt::Debug + Send + Sync {
    /// Attribute names of this resource type
    type Attribute: Copy + Eq + Ord + Hash + fmt::Debug + fmt::Display + Send + Sync;

    /// Remote primary key
    ///
    /// Two resources with different ids are different remote objects.
    fn id(&self) -> &str;

    /// Resource type category, e.g. "group"
    const RESOURCE_TYPE: &'static str;

    /// Check the desired state for internal consistency
    fn validate(&self) -> Result<(), ValidationError>;

    /// Canonical form used for comparisons
    ///
    /// Order-insensitive collections are sorted and deduplicated so that
    /// equivalent configurations compare equal.
    fn normalize(self) -> Self;

    /// Attributes whose desired value differs from `self` (the observed state)
    ///
    /// Attributes the desired side does not declare are not differences.
    /// Both sides are already normalized when the planner calls this.
    fn changed_attributes(&self, desired: &Self) -> Vec<Self::Attribute>;

    /// How a change of `attribute` can be converged
    fn change_kind(attribute: Self::Attribute) -> ChangeKind;

    /// Display form of an attribute value, `None` when not set
    fn attribute_value(&self, attribute: Self::Attribute) -> Option<String>;
}

/// Extension trait with derived helpers
pub trait ResourceExt: Resource {
    /// Validate, then normalize
    fn prepare(self) -> Result<Self, ValidationError> {
        self.validate()?;
        Ok(self.normalize())
    }
}

impl<R: Resource> ResourceExt for R {}
