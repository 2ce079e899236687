//! REST client for the remote tracker.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::models::*;
use super::RemoteApi;
use crate::error::{SyncError, SyncResult};

/// Fields requested for every task in a project listing
pub const TASK_OPT_FIELDS: &str = "name,assignee.name,completed,html_notes,permalink_url,\
memberships.section.name,memberships.project.gid,memberships.project.name,\
custom_fields.gid,custom_fields.name,custom_fields.type,custom_fields.number_value,\
custom_fields.multi_enum_values.name,custom_fields.enum_value.name,custom_fields.display_value";

pub const PAGE_LIMIT: usize = 100;

pub struct HttpRemoteClient {
    client: Client,
    base_url: String,
    token: SecretString,
}

impl HttpRemoteClient {
    pub fn new(base_url: &str, token: SecretString, timeout: Duration) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(
                "Authorization",
                format!("Bearer {}", self.token.expose_secret()),
            )
            .header("Accept", "application/json")
    }

    async fn send(&self, request: RequestBuilder) -> SyncResult<Response> {
        let res = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;

        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }

        let body = res.text().await.unwrap_or_default();
        debug!("Remote API returned {}: {}", status, body);
        Err(SyncError::Http {
            status: status.as_u16(),
            message: status
                .canonical_reason()
                .unwrap_or("Unknown status")
                .to_string(),
        })
    }

    async fn decode<T: DeserializeOwned>(res: Response) -> SyncResult<T> {
        res.json::<T>()
            .await
            .map_err(|e| SyncError::Decode(e.to_string()))
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> SyncResult<T> {
        let res = self.send(self.client.get(self.url(path))).await?;
        Ok(Self::decode::<DataEnvelope<T>>(res).await?.data)
    }
}

#[async_trait]
impl RemoteApi for HttpRemoteClient {
    async fn fetch_tasks(&self, project_id: &str) -> SyncResult<Vec<RemoteTask>> {
        let url = self.url(&format!("projects/{project_id}/tasks"));
        let limit = PAGE_LIMIT.to_string();
        let mut tasks = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut query = vec![("opt_fields", TASK_OPT_FIELDS), ("limit", limit.as_str())];
            if let Some(offset) = offset.as_deref() {
                query.push(("offset", offset));
            }

            let res = self.send(self.client.get(&url).query(&query)).await?;
            let page: Page<RemoteTask> = Self::decode(res).await?;
            tasks.extend(page.data);

            match page.next_page {
                Some(next) => offset = Some(next.offset),
                None => break,
            }
        }

        debug!("Fetched {} tasks from project {}", tasks.len(), project_id);
        Ok(tasks)
    }

    async fn fetch_sections(&self, project_id: &str) -> SyncResult<Vec<NamedRef>> {
        self.get_data(&format!("projects/{project_id}/sections")).await
    }

    async fn fetch_custom_field_settings(
        &self,
        project_id: &str,
    ) -> SyncResult<Vec<CustomFieldSetting>> {
        self.get_data(&format!("projects/{project_id}/custom_field_settings"))
            .await
    }

    async fn create_task(&self, payload: &TaskPayload) -> SyncResult<String> {
        let request = self
            .client
            .post(self.url("tasks"))
            .json(&DataEnvelope { data: payload });
        let res = self.send(request).await?;
        let created: DataEnvelope<NamedRef> = Self::decode(res).await?;
        Ok(created.data.gid)
    }

    async fn update_task(&self, task_id: &str, payload: &TaskPayload) -> SyncResult<()> {
        let request = self
            .client
            .put(self.url(&format!("tasks/{task_id}")))
            .json(&DataEnvelope { data: payload });
        self.send(request).await?;
        Ok(())
    }

    async fn add_task_to_section(&self, section_id: &str, task_id: &str) -> SyncResult<()> {
        let request = self
            .client
            .post(self.url(&format!("sections/{section_id}/addTask")))
            .json(&DataEnvelope {
                data: AddTaskBody {
                    task: task_id.to_string(),
                },
            });
        self.send(request).await?;
        Ok(())
    }
}
