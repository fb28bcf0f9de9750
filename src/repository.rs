//! PostgreSQL persistence for enriched people.
//!
//! Each batch is written inside one transaction against a pooled
//! connection; a commit error propagates to the caller and is not
//! retried.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::error::IngestError;
use crate::types::{PersonRecord, PERSON_COLUMNS};

const MAX_CONNECTIONS: u32 = 5;

const INSERT_PERSON: &str = r#"
    INSERT INTO swapi_people
        (name, height, mass, hair_color, skin_color, eye_color,
         birth_year, gender, homeworld, films, species, starships, vehicles)
    VALUES
        ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
"#;

/// Receives finished batches of enriched records.
#[async_trait]
pub trait PersonSink: Send + Sync {
    /// Persist one batch atomically.
    async fn insert_people(&self, records: Vec<PersonRecord>) -> Result<(), IngestError>;
}

/// sqlx-backed store for the `swapi_people` table.
pub struct PersonRepository {
    pool: PgPool,
}

impl PersonRepository {
    /// Connect to PostgreSQL and build the connection pool.
    pub async fn connect(database_url: &str) -> Result<Self, IngestError> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Reuse an existing pool.
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the target table when it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), IngestError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS swapi_people (
                id          BIGSERIAL PRIMARY KEY,
                name        TEXT,
                height      TEXT,
                mass        TEXT,
                hair_color  TEXT,
                skin_color  TEXT,
                eye_color   TEXT,
                birth_year  TEXT,
                gender      TEXT,
                homeworld   TEXT,
                films       TEXT,
                species     TEXT,
                starships   TEXT,
                vehicles    TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl PersonSink for PersonRepository {
    async fn insert_people(&self, records: Vec<PersonRecord>) -> Result<(), IngestError> {
        let mut tx = self.pool.begin().await?;

        for record in &records {
            let mut query = sqlx::query(INSERT_PERSON);
            for column in PERSON_COLUMNS {
                query = query.bind(record.text(column));
            }
            query.execute(&mut *tx).await?;
        }

        tx.commit().await?;
        info!(count = records.len(), "person batch committed");
        Ok(())
    }
}
