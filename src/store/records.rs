//! Record book over PostgreSQL
//!
//! Retired players land in the `retired_players` table, ranked by score
//! descending, then play time ascending, then name. The pool is bounded;
//! a connection goes back to it when the executing future completes, even
//! on error.

use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::warn;

use crate::game::RetiredDog;

/// Hard cap on one records page.
pub const MAX_RECORDS_PAGE: u64 = 100;

/// One row of the record book, in client wire shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub name: String,
    pub score: i32,
    #[serde(rename = "playTime")]
    pub play_time: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum RecordsError {
    #[error("maxItems must not exceed 100")]
    PageTooLarge,

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Handle to the record store; cheap to clone.
#[derive(Clone)]
pub struct RecordStore {
    pool: PgPool,
}

impl RecordStore {
    /// Connect with a bounded pool. `pool_size` is clamped to at least one
    /// connection.
    pub async fn connect(db_url: &str, pool_size: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(pool_size.max(1))
            .connect(db_url)
            .await?;
        Ok(Self { pool })
    }

    /// Build the pool without opening a connection; the first query connects.
    /// Startup uses [`RecordStore::connect`] to fail fast, tests use this.
    pub fn connect_lazy(db_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new().max_connections(1).connect_lazy(db_url)?;
        Ok(Self { pool })
    }

    /// Create the record table and its ranking index. Safe to call on every
    /// startup.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS retired_players (
                id SERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                score INTEGER NOT NULL,
                play_time DOUBLE PRECISION NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_retired_players_rank
            ON retired_players (score DESC, play_time ASC, name ASC)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Append one retirement record.
    pub async fn append(&self, name: &str, score: u32, play_time: f64) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO retired_players (name, score, play_time) VALUES ($1, $2, $3)")
            .bind(name)
            .bind(score as i32)
            .bind(play_time)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Load a contiguous page from the ranking order.
    pub async fn load(&self, start: u64, max_items: u64) -> Result<Vec<Record>, RecordsError> {
        if max_items > MAX_RECORDS_PAGE {
            return Err(RecordsError::PageTooLarge);
        }

        let rows = sqlx::query(
            r#"
            SELECT name, score, play_time
            FROM retired_players
            ORDER BY score DESC, play_time ASC, name ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(max_items as i64)
        .bind(start as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| Record {
                name: row.get("name"),
                score: row.get("score"),
                play_time: row.get("play_time"),
            })
            .collect())
    }
}

/// Persist a batch of retirements. Store failures are logged and swallowed:
/// the simulation has already moved on and must not be rolled back.
pub async fn persist_retirements(store: &RecordStore, retired: Vec<RetiredDog>) {
    for dog in retired {
        if let Err(error) = store
            .append(&dog.name, dog.score, dog.play_time_seconds)
            .await
        {
            warn!(player = %dog.name, %error, "failed to persist retirement record");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serialises_with_camel_case_play_time() {
        let record = Record {
            name: "a".to_owned(),
            score: 10,
            play_time: 1.5,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "a", "score": 10, "playTime": 1.5})
        );
    }
}
