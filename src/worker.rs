// Background sampling worker. Reads the sensor on a fixed cadence, buffers
// readings, and flushes them to the database in batches. Pruning and app
// stats logging run on their own real-time intervals.

use std::sync::Arc;

use chrono::Utc;

use tokio::time::{Duration, MissedTickBehavior, interval};

use crate::reading_repo::ReadingRepo;
use crate::sensor::SensorSource;

/// Sensor, storage, and shutdown signal for the worker.
pub struct WorkerDeps {
    pub source: Arc<dyn SensorSource>,
    pub reading_repo: Arc<ReadingRepo>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

/// Worker timing config. Flushing and pruning use real-time intervals,
/// independent of sample_interval_ms.
pub struct WorkerConfig {
    pub sample_interval_ms: u64,
    /// Buffered readings that force a flush before the interval fires.
    pub flush_rate: u64,
    /// How often to flush regardless of buffer size (real seconds).
    pub flush_interval_secs: u64,
    /// How often to prune old data (real seconds).
    pub prune_interval_secs: u64,
    /// How often to log app stats (real seconds).
    pub stats_log_interval_secs: u64,
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        source,
        reading_repo,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        sample_interval_ms,
        flush_rate,
        flush_interval_secs,
        prune_interval_secs,
        stats_log_interval_secs,
    } = config;

    tokio::spawn(async move {
        let mut sample_tick = interval(Duration::from_millis(sample_interval_ms));
        sample_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut flush_tick = interval(Duration::from_secs(flush_interval_secs));
        flush_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut prune_tick = interval(Duration::from_secs(prune_interval_secs));
        prune_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
        stats_log_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut buffer: Vec<crate::models::Reading> = Vec::new();
        let mut readings_saved_total: u64 = 0;
        let mut readings_pruned_total: u64 = 0;

        let worker_span = tracing::span!(tracing::Level::DEBUG, "worker", sample_interval_ms);
        let _guard = worker_span.enter();

        loop {
            tokio::select! {
                _ = sample_tick.tick() => {
                    match source.read_sample(Utc::now()) {
                        Ok(reading) => {
                            buffer.push(reading);
                            if buffer.len() >= flush_rate as usize
                                && let Err(e) = flush_buffer(&reading_repo, &mut buffer, &mut readings_saved_total).await
                            {
                                tracing::warn!(error = %e, operation = "insert_readings", "flush failed");
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, operation = "read_sample", "sensor read failed");
                        }
                    }
                }
                _ = flush_tick.tick() => {
                    if let Err(e) = flush_buffer(&reading_repo, &mut buffer, &mut readings_saved_total).await {
                        tracing::warn!(error = %e, operation = "insert_readings", "flush failed");
                    }
                }
                _ = prune_tick.tick() => {
                    match reading_repo.prune_old_data().await {
                        Ok(pruned) => {
                            readings_pruned_total += pruned;
                            tracing::debug!(operation = "prune_old_data", pruned, "Old data pruned");
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, operation = "prune_old_data", "Failed to prune old data");
                        }
                    }
                }
                _ = stats_log_tick.tick() => {
                    tracing::info!(
                        buffered = buffer.len(),
                        readings_saved_total,
                        readings_pruned_total,
                        "app stats"
                    );
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Worker shutting down");
                    break;
                }
            }
        }
        if let Err(e) = flush_buffer(&reading_repo, &mut buffer, &mut readings_saved_total).await {
            tracing::warn!(error = %e, operation = "insert_readings", "final flush failed");
        }
    })
}

async fn flush_buffer(
    reading_repo: &ReadingRepo,
    buffer: &mut Vec<crate::models::Reading>,
    saved_total: &mut u64,
) -> anyhow::Result<()> {
    if buffer.is_empty() {
        return Ok(());
    }
    let n = buffer.len();
    reading_repo.insert_readings(buffer).await?;
    *saved_total += n as u64;
    buffer.clear();
    tracing::debug!(operation = "insert_readings", readings_count = n, "Readings saved");
    Ok(())
}
