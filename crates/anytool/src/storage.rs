use crate::config::Settings;
use crate::prelude::*;
use serde::Serialize;
use tokio::task::JoinHandle;

/// One generate-diff request and its final answer.
#[derive(Debug, Clone, Serialize)]
pub struct DiffRecord {
    pub repo_url: String,
    pub prompt: String,
    pub diff: String,
}

/// Supabase table receiving [`DiffRecord`]s through PostgREST.
#[derive(Debug, Clone)]
pub struct RecordStore {
    client: reqwest::Client,
    endpoint: String,
}

impl RecordStore {
    /// Build a store when both Supabase values are configured.
    ///
    /// A key that can't be sent as a header disables storage instead of
    /// failing startup.
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        let (url, key) = settings.storage_credentials()?;

        match Self::build(settings, url, key) {
            Ok(store) => Some(store),
            Err(e) => {
                log::warn!("Supabase storage disabled: {e}");
                None
            }
        }
    }

    fn build(settings: &Settings, url: &str, key: &str) -> Result<Self> {
        use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(key).map_err(|e| eyre!("Invalid header value: {}", e))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&f!("Bearer {key}"))
                .map_err(|e| eyre!("Invalid header value: {}", e))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("Prefer", HeaderValue::from_static("return=minimal"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.http_timeout())
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            endpoint: f!(
                "{}/rest/v1/{}",
                url.trim_end_matches('/'),
                settings.supabase_table
            ),
        })
    }

    /// Insert a single record.
    pub async fn insert(&self, record: &DiffRecord) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(record)
            .send()
            .await
            .context("Failed to reach record store")?;

        if !response.status().is_success() {
            return Err(eyre!("Record store returned status: {}", response.status()));
        }

        Ok(())
    }
}

/// Forward `record` in the background.
///
/// A missing store and a failed insert look the same to the caller; failures
/// only show up in the logs.
pub fn forward_record(store: Option<&RecordStore>, record: DiffRecord) -> Option<JoinHandle<()>> {
    let store = store?.clone();

    Some(tokio::spawn(async move {
        match store.insert(&record).await {
            Ok(()) => log::debug!("Stored record for {}", record.repo_url),
            Err(e) => log::warn!("Failed to store record for {}: {e}", record.repo_url),
        }
    }))
}
