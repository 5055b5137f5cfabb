// Worker integration test: spawn sampler, tick, shutdown, assert readings flushed

use std::sync::Arc;

use sensord::reading_repo::ReadingRepo;
use sensord::sensor::SimulatedScd40;
use sensord::worker::{WorkerConfig, WorkerDeps, spawn};

#[tokio::test]
async fn worker_samples_and_final_flush_persists_readings() {
    let dir = tempfile::TempDir::new().unwrap();
    let db_path = dir.path().join("readings.db");
    let reading_repo = Arc::new(
        ReadingRepo::connect(db_path.to_str().unwrap(), 2, 7)
            .await
            .unwrap(),
    );
    reading_repo.init().await.unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let deps = WorkerDeps {
        source: Arc::new(SimulatedScd40::new()),
        reading_repo: reading_repo.clone(),
        shutdown_rx,
    };
    // flush_rate high enough that only the shutdown flush persists
    let config = WorkerConfig {
        sample_interval_ms: 25,
        flush_rate: 1000,
        flush_interval_secs: 3600,
        prune_interval_secs: 3600,
        stats_log_interval_secs: 3600,
    };

    let worker_handle = spawn(deps, config);
    tokio::time::sleep(tokio::time::Duration::from_millis(150)).await;
    let _ = shutdown_tx.send(());
    worker_handle.await.unwrap();

    let recent = reading_repo.get_recent_readings(100).await.unwrap();
    assert!(
        !recent.is_empty(),
        "worker should have flushed at least one reading on shutdown"
    );
}

#[tokio::test]
async fn worker_flushes_when_buffer_reaches_flush_rate() {
    let dir = tempfile::TempDir::new().unwrap();
    let db_path = dir.path().join("readings.db");
    let reading_repo = Arc::new(
        ReadingRepo::connect(db_path.to_str().unwrap(), 2, 7)
            .await
            .unwrap(),
    );
    reading_repo.init().await.unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let deps = WorkerDeps {
        source: Arc::new(SimulatedScd40::new()),
        reading_repo: reading_repo.clone(),
        shutdown_rx,
    };
    let config = WorkerConfig {
        sample_interval_ms: 10,
        flush_rate: 2,
        flush_interval_secs: 3600,
        prune_interval_secs: 3600,
        stats_log_interval_secs: 3600,
    };

    let worker_handle = spawn(deps, config);
    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

    let before_shutdown = reading_repo.get_recent_readings(100).await.unwrap();
    let _ = shutdown_tx.send(());
    worker_handle.await.unwrap();

    assert!(
        before_shutdown.len() >= 2,
        "worker should flush while running once flush_rate is reached"
    );
}
