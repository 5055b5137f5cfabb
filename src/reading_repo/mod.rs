// SQLite reading store. Uses sqlx for async + connection pooling.
// Channel columns are nullable REALs: NULL means the channel was absent at
// capture time, mirroring Option<f32> on the model.

use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::instrument;

use crate::models::Reading;

/// Summary of the backing database for /data/info.
#[derive(Debug, Clone)]
pub struct DatabaseInfo {
    pub total_records: i64,
    pub earliest_timestamp: Option<DateTime<Utc>>,
    pub latest_timestamp: Option<DateTime<Utc>>,
    pub database_path: String,
    pub database_size_bytes: u64,
    pub healthy: bool,
}

pub struct ReadingRepo {
    pool: SqlitePool,
    path: String,
    retention_ms: i64,
}

impl ReadingRepo {
    pub async fn connect(path: &str, max_pool_size: u32, retention_days: u32) -> anyhow::Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_pool_size)
            .connect_with(opts)
            .await?;
        let retention_ms = (retention_days as i64) * 24 * 60 * 60 * 1000;
        Ok(Self {
            pool,
            path: path.to_string(),
            retention_ms,
        })
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS readings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at INTEGER NOT NULL,
                co2_ppm REAL,
                temperature_c REAL,
                humidity_percent REAL,
                quality_flags INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_readings_created_at ON readings(created_at)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[instrument(skip(self, readings), fields(repo = "readings", operation = "insert_readings", readings_count = readings.len()))]
    pub async fn insert_readings(&self, readings: &[Reading]) -> anyhow::Result<()> {
        if readings.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for r in readings {
            sqlx::query(
                "INSERT INTO readings (created_at, co2_ppm, temperature_c, humidity_percent, quality_flags)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(r.timestamp.timestamp_millis())
            .bind(r.co2_ppm.map(f64::from))
            .bind(r.temperature_c.map(f64::from))
            .bind(r.humidity_percent.map(f64::from))
            .bind(r.quality_flags as i64)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Last `limit` readings, ascending by created_at.
    #[instrument(skip(self), fields(repo = "readings", operation = "get_recent_readings"))]
    pub async fn get_recent_readings(&self, limit: u32) -> anyhow::Result<Vec<Reading>> {
        let rows = sqlx::query(
            "SELECT created_at, co2_ppm, temperature_c, humidity_percent, quality_flags
             FROM readings ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(Self::parse_reading_row(&row)?);
        }
        out.reverse();
        Ok(out)
    }

    /// Readings in [start, end] (both ends inclusive), ascending by created_at.
    #[instrument(skip(self), fields(repo = "readings", operation = "get_readings_in_range"))]
    pub async fn get_readings_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Reading>> {
        let rows = sqlx::query(
            "SELECT created_at, co2_ppm, temperature_c, humidity_percent, quality_flags
             FROM readings WHERE created_at >= $1 AND created_at <= $2 ORDER BY created_at ASC",
        )
        .bind(start.timestamp_millis())
        .bind(end.timestamp_millis())
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(Self::parse_reading_row(&row)?);
        }
        Ok(out)
    }

    /// Record count, time bounds, and file size for /data/info.
    #[instrument(skip(self), fields(repo = "readings", operation = "database_info"))]
    pub async fn database_info(&self) -> anyhow::Result<DatabaseInfo> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total, MIN(created_at) AS earliest, MAX(created_at) AS latest FROM readings",
        )
        .fetch_one(&self.pool)
        .await?;

        let total_records: i64 = row.try_get("total")?;
        let earliest: Option<i64> = row.try_get("earliest")?;
        let latest: Option<i64> = row.try_get("latest")?;

        let database_size_bytes = std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);

        Ok(DatabaseInfo {
            total_records,
            earliest_timestamp: earliest.and_then(DateTime::<Utc>::from_timestamp_millis),
            latest_timestamp: latest.and_then(DateTime::<Utc>::from_timestamp_millis),
            database_path: self.path.clone(),
            database_size_bytes,
            healthy: true,
        })
    }

    /// Cheap liveness probe for /health and /ready.
    pub async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Deletes readings older than the retention window. Returns rows removed.
    #[instrument(skip(self), fields(repo = "readings", operation = "prune_old_data"))]
    pub async fn prune_old_data(&self) -> anyhow::Result<u64> {
        let cutoff = Utc::now().timestamp_millis() - self.retention_ms;
        let r = sqlx::query("DELETE FROM readings WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(r.rows_affected())
    }

    /// Reclaim space after deletes.
    #[instrument(skip(self), fields(repo = "readings", operation = "vacuum"))]
    pub async fn vacuum(&self) -> anyhow::Result<()> {
        sqlx::query("VACUUM").execute(&self.pool).await?;
        Ok(())
    }

    fn parse_reading_row(row: &sqlx::sqlite::SqliteRow) -> anyhow::Result<Reading> {
        let created_at: i64 = row.try_get("created_at")?;
        let co2_ppm: Option<f64> = row.try_get("co2_ppm")?;
        let temperature_c: Option<f64> = row.try_get("temperature_c")?;
        let humidity_percent: Option<f64> = row.try_get("humidity_percent")?;
        let quality_flags: i64 = row.try_get("quality_flags")?;

        let timestamp = DateTime::<Utc>::from_timestamp_millis(created_at)
            .ok_or_else(|| anyhow::anyhow!("created_at out of range: {}", created_at))?;

        Ok(Reading {
            timestamp,
            co2_ppm: co2_ppm.map(|v| v as f32),
            temperature_c: temperature_c.map(|v| v as f32),
            humidity_percent: humidity_percent.map(|v| v as f32),
            quality_flags: quality_flags as u32,
        })
    }
}
