//! Access to the remote tracker's credentials.
//!
//! A bearer token and project id are required; the two custom-field ids are
//! optional and fall back to name matching when absent.

use secrecy::{ExposeSecret, SecretString};
use sprintcap_core::RemoteConfig;
use std::fmt;

pub struct Credentials {
    token: SecretString,
    pub project_id: String,
    pub sprint_field_id: Option<String>,
    pub points_field_id: Option<String>,
}

impl Credentials {
    /// Returns `None` when the token or project id is empty.
    pub fn new(token: &str, project_id: &str) -> Option<Self> {
        let token = non_empty(Some(token))?;
        let project_id = non_empty(Some(project_id))?;
        Some(Self {
            token: SecretString::new(token.into()),
            project_id,
            sprint_field_id: None,
            points_field_id: None,
        })
    }

    pub fn with_field_ids(mut self, sprint: Option<&str>, points: Option<&str>) -> Self {
        self.sprint_field_id = non_empty(sprint);
        self.points_field_id = non_empty(points);
        self
    }

    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"[REDACTED]")
            .field("project_id", &self.project_id)
            .field("sprint_field_id", &self.sprint_field_id)
            .field("points_field_id", &self.points_field_id)
            .finish()
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Where the coordinator reads credentials from on every sync.
pub trait CredentialSource: Send + Sync {
    fn credentials(&self) -> Option<Credentials>;
}

impl CredentialSource for RemoteConfig {
    fn credentials(&self) -> Option<Credentials> {
        let token = self.access_token.as_deref()?;
        let project = self.project_id.as_deref()?;
        Credentials::new(token, project).map(|c| {
            c.with_field_ids(
                self.sprint_field_id.as_deref(),
                self.points_field_id.as_deref(),
            )
        })
    }
}

/// Fixed credentials, or none at all.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    token: Option<String>,
    project_id: Option<String>,
    sprint_field_id: Option<String>,
    points_field_id: Option<String>,
}

impl StaticCredentials {
    pub fn new(token: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            project_id: Some(project_id.into()),
            ..Self::default()
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_sprint_field(mut self, id: impl Into<String>) -> Self {
        self.sprint_field_id = Some(id.into());
        self
    }

    pub fn with_points_field(mut self, id: impl Into<String>) -> Self {
        self.points_field_id = Some(id.into());
        self
    }
}

impl CredentialSource for StaticCredentials {
    fn credentials(&self) -> Option<Credentials> {
        Credentials::new(self.token.as_deref()?, self.project_id.as_deref()?).map(|c| {
            c.with_field_ids(
                self.sprint_field_id.as_deref(),
                self.points_field_id.as_deref(),
            )
        })
    }
}
