//! End-to-end pipeline tests against in-memory fetcher and sink fakes.
//!
//! These exercise the full fetch → enrich → batch → persist flow without
//! touching the network or a database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use swapi_ingest::{
    IngestError, IngestPipeline, PersonEnricher, PersonRecord, PersonSink, ResourceFetcher,
};

const API_BASE: &str = "https://swapi.test/api";

struct FixtureFetcher {
    resources: HashMap<String, Value>,
}

#[async_trait]
impl ResourceFetcher for FixtureFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Option<Value>, IngestError> {
        Ok(self.resources.get(url).cloned())
    }
}

/// Fetcher that fails transport-level for one URL.
struct FaultyFetcher {
    inner: FixtureFetcher,
    poison_url: String,
}

#[async_trait]
impl ResourceFetcher for FaultyFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Option<Value>, IngestError> {
        if url == self.poison_url {
            return Err(IngestError::UnexpectedStatus {
                url: url.to_string(),
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            });
        }
        self.inner.fetch_json(url).await
    }
}

#[derive(Default)]
struct RecordingSink {
    batches: Mutex<Vec<Vec<PersonRecord>>>,
}

#[async_trait]
impl PersonSink for RecordingSink {
    async fn insert_people(&self, records: Vec<PersonRecord>) -> Result<(), IngestError> {
        self.batches.lock().unwrap().push(records);
        Ok(())
    }
}

/// Sink that commits slowly, to prove the run drains detached tasks.
#[derive(Default)]
struct SlowSink {
    committed: AtomicUsize,
}

#[async_trait]
impl PersonSink for SlowSink {
    async fn insert_people(&self, _records: Vec<PersonRecord>) -> Result<(), IngestError> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.committed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct FailingSink;

#[async_trait]
impl PersonSink for FailingSink {
    async fn insert_people(&self, _records: Vec<PersonRecord>) -> Result<(), IngestError> {
        Err(IngestError::Database(sqlx::Error::PoolClosed))
    }
}

fn person_json(id: u64, name: &str) -> (String, Value) {
    (
        format!("{API_BASE}/people/{id}/"),
        json!({
            "name": name,
            "height": "172",
            "films": [format!("{API_BASE}/films/1/")],
            "created": "2014-12-09T13:50:51.644000Z",
            "edited": "2014-12-20T21:17:56.891000Z",
            "url": format!("{API_BASE}/people/{id}/"),
        }),
    )
}

fn fixture_with_people(ids: &[u64]) -> FixtureFetcher {
    let mut resources = HashMap::new();
    resources.insert(
        format!("{API_BASE}/films/1/"),
        json!({"title": "A New Hope"}),
    );
    for id in ids {
        let (url, body) = person_json(*id, &format!("Person {id}"));
        resources.insert(url, body);
    }
    FixtureFetcher { resources }
}

fn pipeline(
    fetcher: Arc<dyn ResourceFetcher>,
    sink: Arc<dyn PersonSink>,
    chunk_size: usize,
) -> IngestPipeline {
    let enricher = Arc::new(PersonEnricher::new(fetcher, API_BASE, Duration::ZERO));
    IngestPipeline::new(enricher, sink, chunk_size, Duration::ZERO)
}

#[tokio::test]
async fn twelve_ids_chunked_by_ten_submit_two_batches() {
    let ids: Vec<u64> = (1..=12).collect();
    let fetcher = Arc::new(fixture_with_people(&ids));
    let sink = Arc::new(RecordingSink::default());

    let summary = pipeline(fetcher, Arc::clone(&sink) as Arc<dyn PersonSink>, 10)
        .run(1..=12)
        .await
        .unwrap();

    assert_eq!(summary.batches, 2);
    assert_eq!(summary.records, 12);
    assert_eq!(summary.skipped, 0);

    let batches = sink.batches.lock().unwrap();
    assert_eq!(batches.len(), 2);
    let mut sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
    sizes.sort_unstable();
    assert_eq!(sizes, vec![2, 10]);

    // Relation fields reach the sink fully resolved.
    for batch in batches.iter() {
        for record in batch {
            assert!(record.unresolved_relations().is_empty());
            assert_eq!(record.text("films"), Some("A New Hope"));
            assert!(!record.contains("created"));
        }
    }
}

#[tokio::test]
async fn missing_person_is_skipped_without_failing_the_run() {
    // Person 5 does not exist upstream.
    let ids: Vec<u64> = (1..=12).filter(|id| *id != 5).collect();
    let fetcher = Arc::new(fixture_with_people(&ids));
    let sink = Arc::new(RecordingSink::default());

    let summary = pipeline(fetcher, Arc::clone(&sink) as Arc<dyn PersonSink>, 10)
        .run(1..=12)
        .await
        .unwrap();

    assert_eq!(summary.records, 11);
    assert_eq!(summary.skipped, 1);

    let batches = sink.batches.lock().unwrap();
    let total: usize = batches.iter().map(Vec::len).sum();
    assert_eq!(total, 11);
    assert!(batches
        .iter()
        .flatten()
        .all(|record| record.text("name") != Some("Person 5")));
}

#[tokio::test]
async fn fetch_failure_aborts_the_run() {
    let ids: Vec<u64> = (1..=4).collect();
    let fetcher = Arc::new(FaultyFetcher {
        inner: fixture_with_people(&ids),
        poison_url: format!("{API_BASE}/people/3/"),
    });
    let sink = Arc::new(RecordingSink::default());

    let result = pipeline(fetcher, sink, 10).run(1..=4).await;

    assert!(matches!(
        result,
        Err(IngestError::UnexpectedStatus { .. })
    ));
}

#[tokio::test]
async fn run_waits_for_detached_persistence_tasks() {
    let ids: Vec<u64> = (1..=12).collect();
    let fetcher = Arc::new(fixture_with_people(&ids));
    let sink = Arc::new(SlowSink::default());

    pipeline(fetcher, Arc::clone(&sink) as Arc<dyn PersonSink>, 10)
        .run(1..=12)
        .await
        .unwrap();

    assert_eq!(sink.committed.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn persistence_failure_surfaces_at_the_end() {
    let ids: Vec<u64> = (1..=3).collect();
    let fetcher = Arc::new(fixture_with_people(&ids));
    let sink = Arc::new(FailingSink);

    let result = pipeline(fetcher, sink, 10).run(1..=3).await;

    assert!(matches!(result, Err(IngestError::Database(_))));
}

#[tokio::test]
async fn all_ids_missing_submits_no_batch() {
    let fetcher = Arc::new(fixture_with_people(&[]));
    let sink = Arc::new(RecordingSink::default());

    let summary = pipeline(fetcher, Arc::clone(&sink) as Arc<dyn PersonSink>, 10)
        .run(1..=5)
        .await
        .unwrap();

    assert_eq!(summary.batches, 0);
    assert_eq!(summary.skipped, 5);
    assert!(sink.batches.lock().unwrap().is_empty());
}
