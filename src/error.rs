//! Error types for the ingestion pipeline.

use thiserror::Error;

/// Errors produced while fetching, enriching, or persisting people.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status {status} from {url}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to decode response from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("expected a JSON object from {url}")]
    UnexpectedBody { url: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("persistence task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("configuration error: {0}")]
    Config(String),
}
