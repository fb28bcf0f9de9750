//! Person enrichment.
//!
//! Builds one person record per identifier: fetch the record, strip the
//! bookkeeping fields, and resolve each relation-URL list into a
//! comma-joined string of display names. Relation resolution is
//! sequential and paced with a fixed delay so one record never bursts
//! the upstream API.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::client::ResourceFetcher;
use crate::error::IngestError;
use crate::types::{PersonRecord, RELATION_FIELDS};

/// Fetches and enriches individual person records.
pub struct PersonEnricher {
    fetcher: Arc<dyn ResourceFetcher>,
    api_base: String,
    relation_delay: Duration,
}

impl PersonEnricher {
    pub fn new(
        fetcher: Arc<dyn ResourceFetcher>,
        api_base: impl Into<String>,
        relation_delay: Duration,
    ) -> Self {
        Self {
            fetcher,
            api_base: api_base.into(),
            relation_delay,
        }
    }

    /// Fetch and enrich one person.
    ///
    /// `Ok(None)` means the identifier does not exist upstream and the
    /// record is skipped.
    pub async fn build_person(&self, id: u64) -> Result<Option<PersonRecord>, IngestError> {
        let url = person_url(&self.api_base, id);

        let Some(body) = self.fetcher.fetch_json(&url).await? else {
            warn!(id, "person not found, skipping");
            return Ok(None);
        };
        let Value::Object(fields) = body else {
            return Err(IngestError::UnexpectedBody { url });
        };

        let mut record = PersonRecord::from_json(fields);
        for relation in RELATION_FIELDS {
            if let Some(urls) = record.relation_urls(relation.field) {
                let joined = self.resolve_details(&urls, relation.detail_field).await?;
                debug!(id, field = relation.field, count = urls.len(), "relation resolved");
                record.resolve_relation(relation.field, joined);
            }
            // Flat pause between relations keeps the per-record request
            // rate under the API's limit.
            sleep(self.relation_delay).await;
        }

        Ok(Some(record))
    }

    /// Resolve related-resource URLs into one comma-joined string of
    /// display names, preserving input order.
    ///
    /// Sequential on purpose: one in-flight relation request per record.
    /// A missing resource or attribute contributes an empty segment.
    pub async fn resolve_details(
        &self,
        urls: &[String],
        detail_field: &str,
    ) -> Result<String, IngestError> {
        let mut names = Vec::with_capacity(urls.len());
        for url in urls {
            let detail = self.fetcher.fetch_json(url).await?;
            let name = detail
                .as_ref()
                .and_then(|value| value.get(detail_field))
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            names.push(name);
        }
        Ok(names.join(","))
    }
}

/// Absolute URL for one person record.
fn person_url(api_base: &str, id: u64) -> String {
    format!("{}/people/{}/", api_base.trim_end_matches('/'), id)
}
