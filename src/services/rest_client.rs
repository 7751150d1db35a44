//! PostgREST adapter for the hosted database.
//!
//! Speaks the REST dialect of the hosted service directly: filters go in the
//! query string (`profile_id=eq.…`), joins in `select`, and inserts ask for the
//! stored row back with `Prefer: return=representation`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::services::remote_store::{BookmarkRow, RemoteStore, BOOKMARK_SELECT};
use crate::types::bookmark::BookmarkRecord;
use crate::types::errors::RemoteError;
use crate::types::profile::Profile;
use crate::types::settings::RemoteSettings;

/// Error body returned by PostgREST on failure.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client for the hosted tables.
pub struct RestRemoteStore {
    client: Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
}

impl RestRemoteStore {
    pub fn new(settings: &RemoteSettings) -> Result<Self, RemoteError> {
        if settings.base_url.trim().is_empty() {
            return Err(RemoteError::Network("remote base_url is not configured".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            anon_key: settings.anon_key.clone(),
            access_token: settings.access_token.clone(),
        })
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        builder
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", bearer))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, RemoteError> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or(text);
        warn!(status = status.as_u16(), %message, "remote store rejected request");
        Err(RemoteError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RemoteStore for RestRemoteStore {
    async fn list_bookmarks(&self, profile_id: &str) -> Result<Vec<BookmarkRecord>, RemoteError> {
        debug!(profile_id, "fetching bookmarks");
        let profile_filter = format!("eq.{}", profile_id);
        let request = self.client.get(self.table_url("bookmarks")).query(&[
            ("select", BOOKMARK_SELECT),
            ("profile_id", profile_filter.as_str()),
            ("order", "created_at.desc"),
        ]);
        let rows: Vec<BookmarkRow> = Self::decode(self.send(request).await?).await?;
        Ok(rows.into_iter().map(BookmarkRow::into_record).collect())
    }

    async fn insert_bookmark(&self, profile_id: &str, resource_id: &str) -> Result<BookmarkRecord, RemoteError> {
        debug!(profile_id, resource_id, "inserting bookmark");
        let request = self
            .client
            .post(self.table_url("bookmarks"))
            .query(&[("select", BOOKMARK_SELECT)])
            .header("Prefer", "return=representation")
            .json(&json!([{ "profile_id": profile_id, "resource_id": resource_id }]));
        let rows: Vec<BookmarkRow> = Self::decode(self.send(request).await?).await?;
        rows.into_iter()
            .next()
            .map(BookmarkRow::into_record)
            .ok_or_else(|| RemoteError::Decode("insert returned no row".to_string()))
    }

    async fn delete_bookmark(&self, profile_id: &str, resource_id: &str) -> Result<(), RemoteError> {
        debug!(profile_id, resource_id, "deleting bookmark");
        let profile_filter = format!("eq.{}", profile_id);
        let resource_filter = format!("eq.{}", resource_id);
        let request = self.client.delete(self.table_url("bookmarks")).query(&[
            ("profile_id", profile_filter.as_str()),
            ("resource_id", resource_filter.as_str()),
        ]);
        self.send(request).await?;
        Ok(())
    }

    async fn list_profiles(&self, account_id: &str) -> Result<Vec<Profile>, RemoteError> {
        debug!(account_id, "fetching profiles");
        let account_filter = format!("eq.{}", account_id);
        let request = self.client.get(self.table_url("member_profiles")).query(&[
            ("select", "*"),
            ("account_id", account_filter.as_str()),
            ("order", "created_at.asc"),
        ]);
        Self::decode(self.send(request).await?).await
    }
}
