//! SWAPI people ingestion pipeline.
//!
//! Fetches character records from the public SWAPI API, resolves their
//! relation URLs (films, species, starships, vehicles) into comma-joined
//! display names, and persists the enriched records to PostgreSQL in
//! fixed-size transactional batches.
//!
//! The moving parts:
//! - [`client`]: reqwest-backed fetcher behind the [`ResourceFetcher`] seam
//! - [`enrichment`]: per-person record building and relation resolution
//! - [`pipeline`]: chunked orchestration with detached persistence tasks
//! - [`repository`]: transactional PostgreSQL sink

pub mod client;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod pipeline;
pub mod repository;
pub mod types;

pub use client::{ResourceFetcher, SwapiClient};
pub use config::IngestConfig;
pub use enrichment::PersonEnricher;
pub use error::IngestError;
pub use pipeline::{IngestPipeline, IngestSummary};
pub use repository::{PersonRepository, PersonSink};
pub use types::{PersonRecord, RelationField, RELATION_FIELDS};
