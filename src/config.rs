//! Runtime configuration.
//!
//! There is no configuration file; everything is read from the
//! environment once at startup, with compile-time defaults matching the
//! original ingestion constants.

use std::time::Duration;

use crate::error::IngestError;

pub const DEFAULT_API_BASE: &str = "https://swapi.dev/api";
pub const DEFAULT_CHUNK_SIZE: usize = 10;
pub const DEFAULT_MAX_PERSON_ID: u64 = 99;
pub const DEFAULT_RELATION_DELAY_MS: u64 = 1_000;
pub const DEFAULT_CHUNK_DELAY_MS: u64 = 3_000;

/// Settings for one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub database_url: String,
    pub api_base: String,
    /// Identifiers fetched concurrently per batch.
    pub chunk_size: usize,
    /// People are ingested for ids 1..=max_person_id.
    pub max_person_id: u64,
    /// Pause between relation resolutions within one record.
    pub relation_delay: Duration,
    /// Pause between chunk submissions.
    pub chunk_delay: Duration,
}

impl IngestConfig {
    /// Read configuration from the environment.
    ///
    /// `DATABASE_URL` is required; everything else falls back to the
    /// defaults above.
    pub fn from_env() -> Result<Self, IngestError> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| IngestError::Config("DATABASE_URL must be set".to_string()))?;

        let chunk_size = env_parse("SWAPI_CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?;
        if chunk_size == 0 {
            return Err(IngestError::Config(
                "SWAPI_CHUNK_SIZE must be positive".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            api_base: std::env::var("SWAPI_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            chunk_size,
            max_person_id: env_parse("SWAPI_MAX_PERSON_ID", DEFAULT_MAX_PERSON_ID)?,
            relation_delay: Duration::from_millis(env_parse(
                "SWAPI_RELATION_DELAY_MS",
                DEFAULT_RELATION_DELAY_MS,
            )?),
            chunk_delay: Duration::from_millis(env_parse(
                "SWAPI_CHUNK_DELAY_MS",
                DEFAULT_CHUNK_DELAY_MS,
            )?),
        })
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> Result<T, IngestError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| IngestError::Config(format!("{name} must be a number, got '{raw}'"))),
        Err(_) => Ok(default),
    }
}
