// ReadingRepo tests: connect, init, insert, recent/range queries, info, prune

mod common;

use chrono::{Duration, Utc};
use common::{reading, ts};
use sensord::reading_repo::ReadingRepo;
use tempfile::TempDir;

async fn test_repo(dir: &TempDir) -> ReadingRepo {
    let path = dir.path().join("readings.db");
    let repo = ReadingRepo::connect(path.to_str().unwrap(), 2, 7)
        .await
        .unwrap();
    repo.init().await.unwrap();
    repo
}

#[tokio::test]
async fn reading_repo_connect_and_init() {
    let dir = TempDir::new().unwrap();
    let repo = test_repo(&dir).await;
    // Second init is no-op (IF NOT EXISTS)
    repo.init().await.unwrap();
    assert!(repo.is_healthy().await);
}

#[tokio::test]
async fn reading_repo_insert_and_get_recent() {
    let dir = TempDir::new().unwrap();
    let repo = test_repo(&dir).await;

    let readings = vec![
        reading(ts(2026, 1, 1, 10, 0, 0), 600.0, 21.0, 45.0),
        reading(ts(2026, 1, 1, 10, 5, 0), 610.0, 21.5, 46.0),
        reading(ts(2026, 1, 1, 10, 10, 0), 620.0, 22.0, 47.0),
    ];
    repo.insert_readings(&readings).await.unwrap();

    let recent = repo.get_recent_readings(10).await.unwrap();
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].timestamp, ts(2026, 1, 1, 10, 0, 0));
    assert_eq!(recent[2].timestamp, ts(2026, 1, 1, 10, 10, 0));
    assert_eq!(recent[0].co2_ppm, Some(600.0));
    assert_eq!(recent[0].quality_flags, 0x07);

    // Limit keeps the latest readings, still ascending
    let limited = repo.get_recent_readings(2).await.unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].timestamp, ts(2026, 1, 1, 10, 5, 0));
    assert_eq!(limited[1].timestamp, ts(2026, 1, 1, 10, 10, 0));
}

#[tokio::test]
async fn reading_repo_insert_empty_no_op() {
    let dir = TempDir::new().unwrap();
    let repo = test_repo(&dir).await;
    repo.insert_readings(&[]).await.unwrap();
    assert!(repo.get_recent_readings(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn reading_repo_preserves_absent_channels() {
    let dir = TempDir::new().unwrap();
    let repo = test_repo(&dir).await;

    let mut partial = sensord::models::Reading::new(ts(2026, 1, 1, 10, 0, 0));
    partial.co2_ppm = Some(600.0);
    partial.set_co2_valid(true);
    repo.insert_readings(&[partial]).await.unwrap();

    let recent = repo.get_recent_readings(1).await.unwrap();
    assert_eq!(recent[0].co2_ppm, Some(600.0));
    assert_eq!(recent[0].temperature_c, None);
    assert_eq!(recent[0].humidity_percent, None);
    assert!(recent[0].is_co2_valid());
    assert!(!recent[0].is_temperature_valid());
}

#[tokio::test]
async fn reading_repo_range_is_inclusive_both_ends() {
    let dir = TempDir::new().unwrap();
    let repo = test_repo(&dir).await;

    let readings = vec![
        reading(ts(2026, 1, 1, 9, 59, 59), 590.0, 20.0, 44.0),
        reading(ts(2026, 1, 1, 10, 0, 0), 600.0, 21.0, 45.0),
        reading(ts(2026, 1, 1, 11, 0, 0), 610.0, 22.0, 46.0),
        reading(ts(2026, 1, 1, 11, 0, 1), 620.0, 23.0, 47.0),
    ];
    repo.insert_readings(&readings).await.unwrap();

    let in_range = repo
        .get_readings_in_range(ts(2026, 1, 1, 10, 0, 0), ts(2026, 1, 1, 11, 0, 0))
        .await
        .unwrap();
    assert_eq!(in_range.len(), 2);
    assert_eq!(in_range[0].timestamp, ts(2026, 1, 1, 10, 0, 0));
    assert_eq!(in_range[1].timestamp, ts(2026, 1, 1, 11, 0, 0));
}

#[tokio::test]
async fn reading_repo_database_info() {
    let dir = TempDir::new().unwrap();
    let repo = test_repo(&dir).await;

    let empty_info = repo.database_info().await.unwrap();
    assert_eq!(empty_info.total_records, 0);
    assert!(empty_info.earliest_timestamp.is_none());
    assert!(empty_info.latest_timestamp.is_none());
    assert!(empty_info.healthy);

    repo.insert_readings(&[
        reading(ts(2026, 1, 1, 10, 0, 0), 600.0, 21.0, 45.0),
        reading(ts(2026, 1, 2, 10, 0, 0), 610.0, 22.0, 46.0),
    ])
    .await
    .unwrap();

    let info = repo.database_info().await.unwrap();
    assert_eq!(info.total_records, 2);
    assert_eq!(info.earliest_timestamp, Some(ts(2026, 1, 1, 10, 0, 0)));
    assert_eq!(info.latest_timestamp, Some(ts(2026, 1, 2, 10, 0, 0)));
    assert!(info.database_path.ends_with("readings.db"));
}

#[tokio::test]
async fn reading_repo_prunes_beyond_retention() {
    let dir = TempDir::new().unwrap();
    let repo = test_repo(&dir).await;

    let old = reading(Utc::now() - Duration::days(10), 600.0, 21.0, 45.0);
    let fresh = reading(Utc::now(), 610.0, 22.0, 46.0);
    repo.insert_readings(&[old, fresh]).await.unwrap();

    let pruned = repo.prune_old_data().await.unwrap();
    assert_eq!(pruned, 1);

    let remaining = repo.get_recent_readings(10).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].co2_ppm, Some(610.0));

    repo.vacuum().await.unwrap();
}
