use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use hoaxwatch_common::Record;

/// A persisted row from the records table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredRecord {
    pub id: Uuid,
    pub platform: String,
    pub keyword: String,
    pub content: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub author: Option<String>,
    pub predicted_label: Option<String>,
    pub prediction_score: Option<f64>,
    pub fact_check_url: Option<String>,
    pub fact_check_rating: Option<String>,
    pub fact_check_publisher: Option<String>,
    pub inserted_at: DateTime<Utc>,
}

/// Persistence seam for the pipeline. `url` is the identity key: upserting a
/// record whose url already exists merges enrichment fields into the
/// existing row instead of inserting a duplicate.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Reconcile a batch into storage. Atomic: either every record in the
    /// batch lands or none do.
    async fn upsert(&self, records: &[Record]) -> Result<()>;

    /// Most recent rows by ingestion time.
    async fn list_recent(&self, limit: i64) -> Result<Vec<StoredRecord>>;
}

#[async_trait]
impl<T: RecordStore + ?Sized> RecordStore for std::sync::Arc<T> {
    async fn upsert(&self, records: &[Record]) -> Result<()> {
        (**self).upsert(records).await
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<StoredRecord>> {
        (**self).list_recent(limit).await
    }
}

pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .context("Failed to connect to Postgres")?;
        Ok(Self { pool })
    }

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the records table if it does not exist.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                id UUID PRIMARY KEY,
                platform TEXT NOT NULL,
                keyword TEXT NOT NULL,
                content TEXT NOT NULL,
                url TEXT NOT NULL UNIQUE,
                created_at TIMESTAMPTZ NOT NULL,
                author TEXT,
                predicted_label TEXT,
                prediction_score DOUBLE PRECISION,
                fact_check_url TEXT,
                fact_check_rating TEXT,
                fact_check_publisher TEXT,
                inserted_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create records table")?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn upsert(&self, records: &[Record]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to open transaction")?;

        for record in records {
            // An existing row keeps its capture fields (content, created_at,
            // author); only the enrichment columns are overwritten. The
            // original capture is authoritative.
            sqlx::query(
                r#"
                INSERT INTO records
                    (id, platform, keyword, content, url, created_at, author,
                     predicted_label, prediction_score,
                     fact_check_url, fact_check_rating, fact_check_publisher,
                     inserted_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                ON CONFLICT (url) DO UPDATE SET
                    predicted_label = EXCLUDED.predicted_label,
                    prediction_score = EXCLUDED.prediction_score,
                    fact_check_url = EXCLUDED.fact_check_url,
                    fact_check_rating = EXCLUDED.fact_check_rating,
                    fact_check_publisher = EXCLUDED.fact_check_publisher
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(record.platform.to_string())
            .bind(&record.keyword)
            .bind(&record.content)
            .bind(&record.url)
            .bind(record.created_at)
            .bind(&record.author)
            .bind(record.predicted_label.map(|l| l.to_string()))
            .bind(record.prediction_score)
            .bind(&record.fact_check_url)
            .bind(&record.fact_check_rating)
            .bind(&record.fact_check_publisher)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await
            .context("Failed to upsert record")?;
        }

        tx.commit().await.context("Failed to commit record batch")?;
        info!(count = records.len(), "Record batch reconciled");
        Ok(())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<StoredRecord>> {
        let rows = sqlx::query_as::<_, StoredRecord>(
            r#"
            SELECT * FROM records
            ORDER BY inserted_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list records")?;

        Ok(rows)
    }
}
