//! PostgreSQL implementation of the durable event log.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::models::StoredEvent;
use crate::config::ReconConfig;
use crate::error::ReconError;

/// PostgreSQL-backed event log using `sqlx::PgPool`.
///
/// Append-only: every domain event published on the bus is written as
/// one row, giving an audit trail of all reconciliation activity.
#[derive(Debug, Clone)]
pub struct EventLog {
    pool: PgPool,
}

impl EventLog {
    /// Creates an event log over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects using the database settings in `config` and runs the
    /// bundled migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`ReconError::Persistence`] if the connection or a
    /// migration fails.
    pub async fn connect(config: &ReconConfig) -> Result<Self, ReconError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(std::time::Duration::from_secs(
                config.database_connect_timeout_secs,
            ))
            .connect(&config.database_url)
            .await
            .map_err(|e| ReconError::Persistence(e.to_string()))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| ReconError::Persistence(e.to_string()))?;

        Ok(Self::new(pool))
    }

    /// Appends an event to the log.
    ///
    /// # Errors
    ///
    /// Returns a [`ReconError::Persistence`] on database failure.
    pub async fn save_event(
        &self,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<i64, ReconError> {
        let row = sqlx::query_scalar::<_, i64>(
            "INSERT INTO recon_events (event_type, payload) VALUES ($1, $2) RETURNING id",
        )
        .bind(event_type)
        .bind(payload)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ReconError::Persistence(e.to_string()))?;

        Ok(row)
    }

    /// Loads events after the given timestamp, optionally filtered by
    /// event type.
    ///
    /// # Errors
    ///
    /// Returns a [`ReconError::Persistence`] on database failure.
    pub async fn load_events_after(
        &self,
        after: DateTime<Utc>,
        event_type: Option<&str>,
    ) -> Result<Vec<StoredEvent>, ReconError> {
        let rows = if let Some(kind) = event_type {
            sqlx::query_as::<_, (i64, String, serde_json::Value, DateTime<Utc>)>(
                "SELECT id, event_type, payload, created_at FROM recon_events \
                 WHERE created_at > $1 AND event_type = $2 ORDER BY created_at ASC",
            )
            .bind(after)
            .bind(kind)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, (i64, String, serde_json::Value, DateTime<Utc>)>(
                "SELECT id, event_type, payload, created_at FROM recon_events \
                 WHERE created_at > $1 ORDER BY created_at ASC",
            )
            .bind(after)
            .fetch_all(&self.pool)
            .await
        }
        .map_err(|e| ReconError::Persistence(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(id, event_type, payload, created_at)| StoredEvent {
                id,
                event_type,
                payload,
                created_at,
            })
            .collect())
    }

    /// Deletes events older than the given number of days.
    ///
    /// # Errors
    ///
    /// Returns a [`ReconError::Persistence`] on database failure.
    pub async fn delete_events_before(&self, before_days: u64) -> Result<u64, ReconError> {
        let cutoff =
            Utc::now() - chrono::Duration::days(i64::try_from(before_days).unwrap_or(i64::MAX));

        let result = sqlx::query("DELETE FROM recon_events WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| ReconError::Persistence(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
