//! Batch orchestration.
//!
//! Splits the identifier range into fixed-size chunks, builds each
//! chunk's records concurrently, and hands finished batches to the sink
//! as detached tasks. Every detached task is joined before the run
//! completes, so no persistence failure is silently dropped.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::info;

use crate::enrichment::PersonEnricher;
use crate::error::IngestError;
use crate::repository::PersonSink;

/// Counters reported after a completed run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    /// Batches submitted to the sink.
    pub batches: usize,
    /// Records built and queued for persistence.
    pub records: usize,
    /// Identifiers that did not exist upstream.
    pub skipped: usize,
}

/// Consecutive fixed-size chunks of an inclusive identifier range; the
/// last chunk may be shorter.
pub fn chunk_ids(ids: RangeInclusive<u64>, chunk_size: usize) -> Vec<Vec<u64>> {
    let ids: Vec<u64> = ids.collect();
    ids.chunks(chunk_size.max(1)).map(<[u64]>::to_vec).collect()
}

/// Drives the fetch-enrich-persist loop over an identifier range.
pub struct IngestPipeline {
    enricher: Arc<PersonEnricher>,
    sink: Arc<dyn PersonSink>,
    chunk_size: usize,
    chunk_delay: Duration,
}

impl IngestPipeline {
    pub fn new(
        enricher: Arc<PersonEnricher>,
        sink: Arc<dyn PersonSink>,
        chunk_size: usize,
        chunk_delay: Duration,
    ) -> Self {
        Self {
            enricher,
            sink,
            chunk_size,
            chunk_delay,
        }
    }

    /// Run the pipeline over an inclusive identifier range.
    ///
    /// Builders within a chunk run concurrently and the chunk is a
    /// full-batch-or-fail barrier: one builder error aborts the run.
    /// Missing identifiers shrink the batch instead. Persistence runs
    /// detached and overlaps later chunks; the task registry is drained
    /// before returning, so a failed commit also fails the run.
    pub async fn run(&self, ids: RangeInclusive<u64>) -> Result<IngestSummary, IngestError> {
        let mut summary = IngestSummary::default();
        let mut persist_tasks: JoinSet<Result<(), IngestError>> = JoinSet::new();

        for chunk in chunk_ids(ids, self.chunk_size) {
            let first = chunk.first().copied().unwrap_or_default();
            let last = chunk.last().copied().unwrap_or_default();

            let built =
                try_join_all(chunk.iter().map(|id| self.enricher.build_person(*id))).await?;

            let fetched = built.len();
            let records: Vec<_> = built.into_iter().flatten().collect();
            summary.skipped += fetched - records.len();
            summary.records += records.len();
            info!(first, last, records = records.len(), "chunk fetched");

            if !records.is_empty() {
                summary.batches += 1;
                let sink = Arc::clone(&self.sink);
                persist_tasks.spawn(async move { sink.insert_people(records).await });
            }

            // Flat pause between chunks keeps the overall request rate
            // under the API's limit.
            sleep(self.chunk_delay).await;
        }

        while let Some(joined) = persist_tasks.join_next().await {
            joined??;
        }

        Ok(summary)
    }
}
