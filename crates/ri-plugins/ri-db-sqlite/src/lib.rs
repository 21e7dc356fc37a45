//! # ri-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational
//! model and the `ri-core` domain models. The content-hash set is stored as
//! a JSON array column: it is written once at creation and only ever read
//! back whole, so a join table buys nothing here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ri_core::models::Illustration;
use ri_core::traits::IllustRepo;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::Row;
use std::collections::BTreeSet;
use std::str::FromStr;
use uuid::Uuid;

pub struct SqliteIllustRepo {
    pool: SqlitePool,
}

// Helpers for UUID conversion
fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn blob_to_uuid(blob: &[u8]) -> Uuid {
    Uuid::from_slice(blob).unwrap_or_default()
}

impl SqliteIllustRepo {
    /// Connects (creating the database file if needed) and ensures the
    /// schema exists.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS illustrations (
                id             BLOB PRIMARY KEY,
                author_id      BLOB NOT NULL,
                title          TEXT NOT NULL,
                caption        TEXT NOT NULL,
                is_public      INTEGER NOT NULL,
                allow_comments INTEGER NOT NULL,
                hashes         TEXT NOT NULL,
                created_at     TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    fn row_to_illust(row: &sqlx::sqlite::SqliteRow) -> Illustration {
        let hashes: BTreeSet<String> =
            serde_json::from_str(&row.get::<String, _>("hashes")).unwrap_or_default();
        Illustration {
            id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
            author_id: blob_to_uuid(row.get::<Vec<u8>, _>("author_id").as_slice()),
            title: row.get("title"),
            caption: row.get("caption"),
            is_public: row.get("is_public"),
            allow_comments: row.get("allow_comments"),
            hashes,
            created_at: row.get::<DateTime<Utc>, _>("created_at"),
        }
    }
}

#[async_trait]
impl IllustRepo for SqliteIllustRepo {
    /// Persists a new illustration. A single INSERT, so the record and its
    /// hash set become visible atomically.
    async fn create_illust(&self, illust: &Illustration) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO illustrations (id, author_id, title, caption, is_public, allow_comments, hashes, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(illust.id))
        .bind(uuid_to_blob(illust.author_id))
        .bind(&illust.title)
        .bind(&illust.caption)
        .bind(illust.is_public)
        .bind(illust.allow_comments)
        .bind(serde_json::to_string(&illust.hashes)?)
        .bind(illust.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_illust(&self, id: Uuid) -> anyhow::Result<Option<Illustration>> {
        let row = sqlx::query("SELECT * FROM illustrations WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| Self::row_to_illust(&r)))
    }

    async fn list_recent(&self, limit: i64) -> anyhow::Result<Vec<Illustration>> {
        let rows = sqlx::query(
            "SELECT * FROM illustrations WHERE is_public = 1 ORDER BY created_at DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(Self::row_to_illust).collect())
    }
}
