mod common;

use burrow_storage::{Repository, SqliteRepository, StorageError};
use common::*;
use std::path::PathBuf;
use std::sync::Arc;

async fn repo() -> SqliteRepository {
    SqliteRepository::in_memory().await.expect("open sqlite")
}

fn scratch_db(name: &str) -> PathBuf {
    let nanos = jiff::Timestamp::now().as_nanosecond();
    std::env::temp_dir().join(format!("burrow-{name}-{}-{nanos}.db", std::process::id()))
}

fn remove_db(path: &PathBuf) {
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.clone().into_os_string();
        file.push(suffix);
        let _ = std::fs::remove_file(file);
    }
}

#[tokio::test]
async fn create_and_read() {
    create_then_read(&repo().await).await;
}

#[tokio::test]
async fn read_missing() {
    read_missing_is_not_found(&repo().await).await;
}

#[tokio::test]
async fn duplicate_code_conflicts() {
    duplicate_create_is_rejected(&repo().await).await;
}

#[tokio::test]
async fn case_sensitive_codes() {
    codes_are_case_sensitive(&repo().await).await;
}

#[tokio::test]
async fn monotonic_ids() {
    ids_are_monotonic(&repo().await).await;
}

#[tokio::test]
async fn update_fields() {
    update_overwrites_mutable_fields(&repo().await).await;
}

#[tokio::test]
async fn update_missing() {
    update_missing_is_not_found(&repo().await).await;
}

#[tokio::test]
async fn delete_then_reuse() {
    delete_frees_the_code(&repo().await).await;
}

#[tokio::test]
async fn pagination() {
    list_paginates(&repo().await).await;
}

#[tokio::test]
async fn newest_first() {
    list_is_newest_first(&repo().await).await;
}

#[tokio::test]
async fn concurrent_creates() {
    concurrent_creates_admit_one_winner(Arc::new(repo().await)).await;
}

#[tokio::test]
async fn closed_pool_reports_unavailable() {
    let repo = repo().await;
    repo.close().await.unwrap();
    repo.close().await.unwrap();

    let err = repo.read(&code("abc123")).await.unwrap_err();
    assert!(matches!(err, StorageError::Unavailable(_)));
}

#[tokio::test]
async fn file_database_survives_reopen() {
    let path = scratch_db("reopen");

    let repo = SqliteRepository::connect(&path).await.unwrap();
    let created = repo
        .create(new_url("persist", "https://example.com"))
        .await
        .unwrap();
    repo.close().await.unwrap();

    let reopened = SqliteRepository::connect(&path).await.unwrap();
    let read = reopened.read(&code("persist")).await.unwrap();
    assert_eq!(read, created);
    reopened.close().await.unwrap();

    remove_db(&path);
}

#[tokio::test]
async fn file_database_concurrent_creates() {
    let path = scratch_db("race");

    let repo = Arc::new(SqliteRepository::connect(&path).await.unwrap());
    concurrent_creates_admit_one_winner(Arc::clone(&repo)).await;
    repo.close().await.unwrap();

    remove_db(&path);
}
