//! SWAPI HTTP client.
//!
//! Thin GET-and-parse layer over reqwest. Missing resources come back as
//! `None`; transport and decode failures propagate to the caller and are
//! fatal for the record being built.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::error::IngestError;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Fetches one JSON resource by absolute URL.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// GET the URL and parse the body as JSON.
    ///
    /// `Ok(None)` means the resource does not exist upstream.
    async fn fetch_json(&self, url: &str) -> Result<Option<Value>, IngestError>;
}

/// reqwest-backed fetcher for the SWAPI boundary.
pub struct SwapiClient {
    http: Client,
}

impl SwapiClient {
    pub fn new() -> Result<Self, IngestError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(IngestError::ClientBuild)?;

        Ok(Self { http })
    }
}

#[async_trait]
impl ResourceFetcher for SwapiClient {
    async fn fetch_json(&self, url: &str) -> Result<Option<Value>, IngestError> {
        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|source| IngestError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(IngestError::UnexpectedStatus {
                url: url.to_string(),
                status,
            });
        }

        let body: Value = response.json().await.map_err(|source| IngestError::Parse {
            url: url.to_string(),
            source,
        })?;

        // A literal JSON null body also counts as missing.
        if body.is_null() {
            return Ok(None);
        }

        Ok(Some(body))
    }
}
