//! Wire types for the remote tracker's REST API.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `{gid, name}` pair used for sections, projects, users and enum options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub gid: String,
    #[serde(default)]
    pub name: String,
}

impl NamedRef {
    pub fn new(gid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            gid: gid.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    #[serde(default)]
    pub section: Option<NamedRef>,
    #[serde(default)]
    pub project: Option<NamedRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteCustomField {
    pub gid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub field_type: Option<String>,
    #[serde(default)]
    pub number_value: Option<f64>,
    #[serde(default)]
    pub multi_enum_values: Option<Vec<NamedRef>>,
    #[serde(default)]
    pub enum_value: Option<NamedRef>,
    #[serde(default)]
    pub display_value: Option<String>,
}

/// One task as returned by the project task listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteTask {
    pub gid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub assignee: Option<NamedRef>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub memberships: Vec<Membership>,
    #[serde(default)]
    pub custom_fields: Vec<RemoteCustomField>,
    #[serde(default)]
    pub html_notes: Option<String>,
    #[serde(default)]
    pub permalink_url: Option<String>,
}

/// Custom field definition attached to a project, with its enum options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomFieldDef {
    pub gid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub enum_options: Vec<NamedRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFieldSetting {
    pub custom_field: CustomFieldDef,
}

/// Value written to a custom field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CustomFieldValue {
    Number(f64),
    /// Enum option gids; an empty list clears a multi-enum field.
    Options(Vec<String>),
}

/// Body of a task create or update. Absent fields are left untouched
/// remotely.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_fields: BTreeMap<String, CustomFieldValue>,
}

impl TaskPayload {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.projects.is_none()
            && self.html_notes.is_none()
            && self.completed.is_none()
            && self.custom_fields.is_empty()
    }
}

/// `{data: T}` wrapper used by every request and response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct NextPage {
    pub offset: String,
}

#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub next_page: Option<NextPage>,
}

#[derive(Debug, Serialize)]
pub struct AddTaskBody {
    pub task: String,
}
