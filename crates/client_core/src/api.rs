use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{EmployeeRecord, RecordId},
    protocol::EmployeePayload,
};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::SyncError;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote employee store. Each method is exactly one request with no retry;
/// reconciling local state afterwards is the caller's job.
#[async_trait]
pub trait EmployeeApi: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<EmployeeRecord>, SyncError>;
    async fn create(&self, payload: &EmployeePayload) -> Result<EmployeeRecord, SyncError>;
    async fn update(
        &self,
        id: RecordId,
        payload: &EmployeePayload,
    ) -> Result<EmployeeRecord, SyncError>;
    async fn remove(&self, id: RecordId) -> Result<(), SyncError>;
}

pub struct HttpEmployeeApi {
    http: Client,
    collection_url: String,
}

impl HttpEmployeeApi {
    pub fn new(collection_url: &str, timeout: Duration) -> Result<Self> {
        let collection_url = normalize_collection_url(collection_url)?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            collection_url,
        })
    }

    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    fn record_url(&self, id: RecordId) -> String {
        format!("{}/{}", self.collection_url, id)
    }
}

fn normalize_collection_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).with_context(|| format!("invalid API URL '{raw}'"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(anyhow!(
            "API URL must start with http:// or https://, got scheme '{other}'"
        )),
    }
}

async fn ensure_success(response: Response) -> Result<Response, SyncError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => {
            warn!(status = status.as_u16(), error = %err, "employees: failed to read error body");
            String::new()
        }
    };
    Err(SyncError::from_status(status.as_u16(), &body))
}

#[async_trait]
impl EmployeeApi for HttpEmployeeApi {
    async fn fetch_all(&self) -> Result<Vec<EmployeeRecord>, SyncError> {
        debug!(url = %self.collection_url, "employees: fetching collection");
        let response = self.http.get(&self.collection_url).send().await?;
        let records: Vec<EmployeeRecord> = ensure_success(response).await?.json().await?;
        debug!(count = records.len(), "employees: collection fetched");
        Ok(records)
    }

    async fn create(&self, payload: &EmployeePayload) -> Result<EmployeeRecord, SyncError> {
        let response = self
            .http
            .post(&self.collection_url)
            .json(payload)
            .send()
            .await?;
        let created: EmployeeRecord = ensure_success(response).await?.json().await?;
        info!(
            record_id = created.id.0,
            employee_id = %created.employee_id,
            "employees: created"
        );
        Ok(created)
    }

    async fn update(
        &self,
        id: RecordId,
        payload: &EmployeePayload,
    ) -> Result<EmployeeRecord, SyncError> {
        let response = self
            .http
            .put(self.record_url(id))
            .json(payload)
            .send()
            .await?;
        let updated: EmployeeRecord = ensure_success(response).await?.json().await?;
        if updated.id != id {
            warn!(
                requested = id.0,
                returned = updated.id.0,
                "employees: server returned a different id for update"
            );
        }
        info!(record_id = id.0, "employees: updated");
        Ok(updated)
    }

    async fn remove(&self, id: RecordId) -> Result<(), SyncError> {
        let response = self.http.delete(self.record_url(id)).send().await?;
        ensure_success(response).await?;
        info!(record_id = id.0, "employees: removed");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
