use crate::error::PlannerError;
use crate::result::PlannerResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_API_BASE_URL: &str = "https://app.asana.com/api/1.0";
pub const DEFAULT_SPRINT_COUNT: usize = 6;
pub const DEFAULT_SPRINT_CAPACITY: f64 = 50.0;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SYNC_TIMEOUT_SECS: u64 = 120;

pub const ENV_TOKEN: &str = "SPRINTCAP_TOKEN";
pub const ENV_PROJECT: &str = "SPRINTCAP_PROJECT";
pub const ENV_SPRINT_FIELD: &str = "SPRINTCAP_SPRINT_FIELD";
pub const ENV_POINTS_FIELD: &str = "SPRINTCAP_POINTS_FIELD";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub board: BoardConfig,
}

/// Connection and field-mapping settings for the remote tracker.
///
/// `access_token` and `project_id` are the credentials; a missing or empty
/// value for either means sync is not configured.
#[derive(Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub sprint_field_id: Option<String>,
    #[serde(default)]
    pub points_field_id: Option<String>,
    #[serde(default = "default_sprint_count")]
    pub sprint_count: usize,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_sync_timeout")]
    pub sync_timeout_secs: u64,
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("project_id", &self.project_id)
            .field("sprint_field_id", &self.sprint_field_id)
            .field("points_field_id", &self.points_field_id)
            .field("sprint_count", &self.sprint_count)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("sync_timeout_secs", &self.sync_timeout_secs)
            .finish()
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_token: None,
            project_id: None,
            sprint_field_id: None,
            points_field_id: None,
            sprint_count: default_sprint_count(),
            request_timeout_secs: default_request_timeout(),
            sync_timeout_secs: default_sync_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub data_file: Option<PathBuf>,
    #[serde(default = "default_capacity")]
    pub default_sprint_capacity: f64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            default_sprint_capacity: default_capacity(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_sprint_count() -> usize {
    DEFAULT_SPRINT_COUNT
}

fn default_capacity() -> f64 {
    DEFAULT_SPRINT_CAPACITY
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_sync_timeout() -> u64 {
    DEFAULT_SYNC_TIMEOUT_SECS
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/sprintcap/config.toml"))
        }
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir().map(|config| config.join("sprintcap/config.toml"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|config| config.join("sprintcap\\config.toml"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }

    /// Load the user config, falling back to defaults when it is missing or
    /// unreadable, then apply environment overrides.
    pub fn load() -> Self {
        let mut config = Self::config_path()
            .filter(|path| path.exists())
            .and_then(|path| match Self::load_from(&path) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!("Ignoring config at {}: {}", path.display(), e);
                    None
                }
            })
            .unwrap_or_default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    pub fn load_from(path: &Path) -> PlannerResult<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| PlannerError::Config(e.to_string()))
    }

    /// Overlay remote settings from a key lookup (normally the process
    /// environment). Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = non_empty(ENV_TOKEN) {
            self.remote.access_token = Some(token);
        }
        if let Some(project) = non_empty(ENV_PROJECT) {
            self.remote.project_id = Some(project);
        }
        if let Some(field) = non_empty(ENV_SPRINT_FIELD) {
            self.remote.sprint_field_id = Some(field);
        }
        if let Some(field) = non_empty(ENV_POINTS_FIELD) {
            self.remote.points_field_id = Some(field);
        }
    }

    pub fn effective_data_file(&self) -> PathBuf {
        self.board
            .data_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("sprintcap.json"))
    }
}
