// Durable tier: append-only Postgres table of cached profiles.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ArchiveError, Result};

/// A row from the style_profiles table. The payload is kept as raw JSON so a
/// row written by an older build can be read back and rejected as invalid.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StoredProfile {
    pub id: Uuid,
    pub handle: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Append a record. Earlier records for the handle are left in place.
    async fn insert(&self, record: &StoredProfile) -> Result<()>;

    /// Most recent record for a handle.
    async fn latest_by_handle(&self, handle: &str) -> Result<Option<StoredProfile>>;
}

pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and run the embedded migrations.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ArchiveError::Database(e.into()))?;
        Ok(())
    }

    /// All records for a handle, newest first.
    pub async fn history(&self, handle: &str) -> Result<Vec<StoredProfile>> {
        let rows = sqlx::query_as::<_, StoredProfile>(
            r#"
            SELECT id, handle, payload, created_at FROM style_profiles
            WHERE handle = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(handle)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn insert(&self, record: &StoredProfile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO style_profiles (id, handle, payload, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(record.id)
        .bind(&record.handle)
        .bind(&record.payload)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn latest_by_handle(&self, handle: &str) -> Result<Option<StoredProfile>> {
        let row = sqlx::query_as::<_, StoredProfile>(
            r#"
            SELECT id, handle, payload, created_at FROM style_profiles
            WHERE handle = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(handle)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}
