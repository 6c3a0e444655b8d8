//! Behavior every `Repository` implementation must share.

#![allow(dead_code)]

use burrow_core::ShortCode;
use burrow_storage::{NewUrl, Repository, StorageError};
use jiff::Timestamp;
use std::sync::Arc;

pub fn code(value: &str) -> ShortCode {
    ShortCode::new_unchecked(value)
}

pub fn new_url(short_code: &str, url: &str) -> NewUrl {
    NewUrl::new(code(short_code), url)
}

pub async fn create_then_read<R: Repository>(repo: &R) {
    let created = repo
        .create(new_url("abc123", "https://example.com"))
        .await
        .unwrap();

    assert_eq!(created.short_code.as_str(), "abc123");
    assert_eq!(created.original_url, "https://example.com");
    assert_eq!(created.clicks, 0);
    assert!(created.last_accessed.is_none());

    let read = repo.read(&code("abc123")).await.unwrap();
    assert_eq!(read, created);
}

pub async fn read_missing_is_not_found<R: Repository>(repo: &R) {
    let err = repo.read(&code("missing")).await.unwrap_err();
    assert_eq!(err, StorageError::NotFound("missing".to_string()));
}

pub async fn duplicate_create_is_rejected<R: Repository>(repo: &R) {
    repo.create(new_url("dup", "https://one.example"))
        .await
        .unwrap();

    let err = repo
        .create(new_url("dup", "https://two.example"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::AlreadyExists(_)));

    let kept = repo.read(&code("dup")).await.unwrap();
    assert_eq!(kept.original_url, "https://one.example");
}

pub async fn codes_are_case_sensitive<R: Repository>(repo: &R) {
    repo.create(new_url("CaseCode", "https://upper.example"))
        .await
        .unwrap();
    repo.create(new_url("casecode", "https://lower.example"))
        .await
        .unwrap();

    let upper = repo.read(&code("CaseCode")).await.unwrap();
    assert_eq!(upper.original_url, "https://upper.example");
}

pub async fn ids_are_monotonic<R: Repository>(repo: &R) {
    let first = repo.create(new_url("id-1", "https://a.example")).await.unwrap();
    let second = repo.create(new_url("id-2", "https://b.example")).await.unwrap();
    assert!(second.id > first.id);
}

pub async fn update_overwrites_mutable_fields<R: Repository>(repo: &R) {
    let created = repo
        .create(new_url("upd", "https://example.com"))
        .await
        .unwrap();

    let accessed = Timestamp::from_second(1_800_000_000).unwrap();
    let mut changed = created.clone();
    changed.original_url = "https://changed.example".to_string();
    changed.clicks = 5;
    changed.last_accessed = Some(accessed);
    repo.update(&changed).await.unwrap();

    let stored = repo.read(&code("upd")).await.unwrap();
    assert_eq!(stored.id, created.id);
    assert_eq!(stored.created_at, created.created_at);
    assert_eq!(stored.original_url, "https://changed.example");
    assert_eq!(stored.clicks, 5);
    assert_eq!(stored.last_accessed, Some(accessed));
}

pub async fn update_missing_is_not_found<R: Repository>(repo: &R) {
    let ghost = new_url("ghost", "https://example.com").into_record(1, Timestamp::now());
    let err = repo.update(&ghost).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

pub async fn delete_frees_the_code<R: Repository>(repo: &R) {
    let first = repo
        .create(new_url("gone", "https://example.com"))
        .await
        .unwrap();

    repo.delete(&code("gone")).await.unwrap();
    assert!(matches!(
        repo.read(&code("gone")).await,
        Err(StorageError::NotFound(_))
    ));
    assert!(matches!(
        repo.delete(&code("gone")).await,
        Err(StorageError::NotFound(_))
    ));

    let reused = repo
        .create(new_url("gone", "https://again.example"))
        .await
        .unwrap();
    assert!(reused.id > first.id);
    assert_eq!(reused.clicks, 0);
}

pub async fn list_paginates<R: Repository>(repo: &R) {
    for i in 0..5 {
        repo.create(new_url(&format!("page-{i}"), "https://example.com"))
            .await
            .unwrap();
    }

    assert_eq!(repo.list(2, 0).await.unwrap().len(), 2);
    assert_eq!(repo.list(10, 3).await.unwrap().len(), 2);
    assert!(repo.list(10, 10).await.unwrap().is_empty());
}

/// Relational backends order by `created_at` descending.
pub async fn list_is_newest_first<R: Repository>(repo: &R) {
    for i in 0..3 {
        repo.create(new_url(&format!("order-{i}"), "https://example.com"))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let codes: Vec<String> = repo
        .list(10, 0)
        .await
        .unwrap()
        .into_iter()
        .map(|record| record.short_code.into_inner())
        .collect();
    assert_eq!(codes, vec!["order-2", "order-1", "order-0"]);
}

pub async fn concurrent_creates_admit_one_winner<R: Repository>(repo: Arc<R>) {
    let mut handles = vec![];
    for i in 0..8 {
        let repo = Arc::clone(&repo);
        handles.push(tokio::spawn(async move {
            repo.create(new_url("race", &format!("https://example{i}.com")))
                .await
        }));
    }

    let mut wins = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => wins += 1,
            Err(err) => assert!(matches!(err, StorageError::AlreadyExists(_))),
        }
    }
    assert_eq!(wins, 1);
}
