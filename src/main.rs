//! SWAPI people ingestion binary.
//!
//! Fetches people 1..=N from the SWAPI API, resolves their relation URLs
//! into display names, and batch-inserts the enriched records into
//! PostgreSQL.
//!
//! Run with:
//!   DATABASE_URL="postgresql:///swapi" cargo run

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use swapi_ingest::client::SwapiClient;
use swapi_ingest::config::IngestConfig;
use swapi_ingest::enrichment::PersonEnricher;
use swapi_ingest::pipeline::IngestPipeline;
use swapi_ingest::repository::PersonRepository;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = IngestConfig::from_env().context("Failed to load configuration")?;

    let repository = Arc::new(
        PersonRepository::connect(&config.database_url)
            .await
            .context("Failed to connect to database")?,
    );
    repository
        .ensure_schema()
        .await
        .context("Failed to prepare schema")?;
    info!("connected to database");

    let client = Arc::new(SwapiClient::new().context("Failed to create SWAPI client")?);
    let enricher = Arc::new(PersonEnricher::new(
        client,
        &config.api_base,
        config.relation_delay,
    ));
    let pipeline = IngestPipeline::new(
        enricher,
        Arc::clone(&repository),
        config.chunk_size,
        config.chunk_delay,
    );

    info!(
        max_person_id = config.max_person_id,
        chunk_size = config.chunk_size,
        "starting ingestion"
    );
    let result = pipeline.run(1..=config.max_person_id).await;

    // Release the pool on both exit paths before surfacing the outcome.
    repository.close().await;

    let summary = result.context("Ingestion failed")?;
    info!(
        batches = summary.batches,
        records = summary.records,
        skipped = summary.skipped,
        "ingestion complete"
    );
    Ok(())
}
