//! Test fixtures: a small resource type and an in-memory provider

use crate::context::Provider;
use crate::error::{Error, Result};
use crate::resource::Resource;
use crate::types::{ChangeKind, Deletion, Operation};
use crate::validation::{ValidationError, check_length};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Widget {
    pub name: String,
    pub tags: Option<Vec<String>>,
    pub zone: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WidgetAttr {
    Name,
    Tags,
    Zone,
}

impl fmt::Display for WidgetAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Tags => write!(f, "tags"),
            Self::Zone => write!(f, "zone"),
        }
    }
}

impl Widget {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tags: Some(Vec::new()),
            zone: None,
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = Some(tags.iter().map(ToString::to_string).collect());
        self
    }

    pub fn with_zone(mut self, zone: &str) -> Self {
        self.zone = Some(zone.to_string());
        self
    }
}

impl Resource for Widget {
    type Attribute = WidgetAttr;
    const RESOURCE_TYPE: &'static str = "widget";

    fn id(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> std::result::Result<(), ValidationError> {
        check_length("name", &self.name, 1, 8)
    }

    fn normalize(mut self) -> Self {
        if let Some(tags) = self.tags.as_mut() {
            tags.sort();
            tags.dedup();
        }
        self
    }

    fn changed_attributes(&self, desired: &Self) -> Vec<WidgetAttr> {
        let mut changed = Vec::new();
        if self.name != desired.name {
            changed.push(WidgetAttr::Name);
        }
        if desired.tags.is_some() && self.tags != desired.tags {
            changed.push(WidgetAttr::Tags);
        }
        if desired.zone.is_some() && self.zone != desired.zone {
            changed.push(WidgetAttr::Zone);
        }
        changed
    }

    fn change_kind(attribute: WidgetAttr) -> ChangeKind {
        match attribute {
            WidgetAttr::Name | WidgetAttr::Zone => ChangeKind::RequiresReplace,
            WidgetAttr::Tags => ChangeKind::UpdateInPlace,
        }
    }

    fn attribute_value(&self, attribute: WidgetAttr) -> Option<String> {
        match attribute {
            WidgetAttr::Name => Some(self.name.clone()),
            WidgetAttr::Tags => self.tags.as_ref().map(|t| format!("[{}]", t.join(", "))),
            WidgetAttr::Zone => self.zone.clone(),
        }
    }
}

/// In-memory provider that records every call in order
#[derive(Debug, Default)]
pub struct MemoryProvider {
    pub objects: Mutex<BTreeMap<String, Widget>>,
    pub calls: Mutex<Vec<(Operation, String)>>,
    pub fail_create: Mutex<BTreeSet<String>>,
}

impl MemoryProvider {
    pub fn with(widgets: &[Widget]) -> Self {
        let provider = Self::default();
        for w in widgets {
            provider
                .objects
                .lock()
                .unwrap()
                .insert(w.name.clone(), w.clone().normalize());
        }
        provider
    }

    pub fn calls(&self) -> Vec<(Operation, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: Operation, id: &str) {
        self.calls.lock().unwrap().push((op, id.to_string()));
    }
}

impl Provider<Widget> for MemoryProvider {
    fn create(&self, desired: &Widget) -> Result<Widget> {
        self.record(Operation::Create, &desired.name);
        if self.fail_create.lock().unwrap().contains(&desired.name) {
            return Err(Error::Remote {
                operation: Operation::Create,
                resource_type: "widget",
                id: desired.name.clone(),
                status: Some(500),
                message: "internal error".into(),
            });
        }
        let mut created = desired.clone().normalize();
        created.zone.get_or_insert_with(|| "default".to_string());
        self.objects
            .lock()
            .unwrap()
            .insert(created.name.clone(), created.clone());
        Ok(created)
    }

    fn read(&self, id: &str) -> Result<Option<Widget>> {
        self.record(Operation::Read, id);
        Ok(self.objects.lock().unwrap().get(id).cloned())
    }

    fn update(&self, observed: &Widget, desired: &Widget, _changed: &[WidgetAttr]) -> Result<Widget> {
        self.record(Operation::Update, &observed.name);
        let mut objects = self.objects.lock().unwrap();
        let current = objects.get_mut(&observed.name).ok_or_else(|| Error::NotFound {
            resource_type: "widget",
            id: observed.name.clone(),
        })?;
        if let Some(tags) = &desired.tags {
            current.tags = Some(tags.clone());
        }
        Ok(current.clone())
    }

    fn delete(&self, id: &str) -> Result<Deletion> {
        self.record(Operation::Delete, id);
        match self.objects.lock().unwrap().remove(id) {
            Some(_) => Ok(Deletion::Removed),
            None => Ok(Deletion::AlreadyAbsent),
        }
    }
}
