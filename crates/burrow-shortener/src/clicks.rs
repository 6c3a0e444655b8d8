//! Serial persistence of click counts.
//!
//! `resolve` hands each click to one worker task over a bounded channel. The
//! worker applies them one at a time as read, increment, update, so clicks
//! on the same code never overwrite each other.

use burrow_core::{Repository, ShortCode};
use jiff::Timestamp;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Clicks buffered before `resolve` starts dropping them.
pub const CLICK_QUEUE_CAPACITY: usize = 10_000;

/// A resolved short code waiting to be counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub code: ShortCode,
    pub accessed_at: Timestamp,
}

impl ClickEvent {
    pub fn new(code: ShortCode, accessed_at: Timestamp) -> Self {
        Self { code, accessed_at }
    }
}

/// Drains `rx` until every sender is dropped.
///
/// Failures are swallowed: a code removed before its click lands simply
/// loses that click.
pub async fn run_click_worker<R: Repository>(
    repository: Arc<R>,
    mut rx: mpsc::Receiver<ClickEvent>,
) {
    while let Some(event) = rx.recv().await {
        let mut record = match repository.read(&event.code).await {
            Ok(record) => record,
            Err(err) => {
                debug!(code = %event.code, error = %err, "click dropped");
                continue;
            }
        };

        record.clicks = record.clicks.saturating_add(1);
        record.last_accessed = Some(event.accessed_at);

        if let Err(err) = repository.update(&record).await {
            debug!(code = %event.code, error = %err, "click dropped");
        }
    }

    trace!("click worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_core::NewUrl;
    use burrow_storage::InMemoryRepository;

    #[tokio::test]
    async fn applies_every_queued_click() {
        let repository = Arc::new(InMemoryRepository::new());
        let code = ShortCode::new_unchecked("abc123");
        repository
            .create(NewUrl::new(code.clone(), "https://example.com"))
            .await
            .unwrap();

        let (tx, rx) = mpsc::channel(CLICK_QUEUE_CAPACITY);
        let last = Timestamp::from_second(1_800_000_000).unwrap();
        for second in [1_700_000_000, 1_750_000_000, 1_800_000_000] {
            let at = Timestamp::from_second(second).unwrap();
            tx.send(ClickEvent::new(code.clone(), at)).await.unwrap();
        }
        drop(tx);

        run_click_worker(Arc::clone(&repository), rx).await;

        let record = repository.read(&code).await.unwrap();
        assert_eq!(record.clicks, 3);
        assert_eq!(record.last_accessed, Some(last));
    }

    #[tokio::test]
    async fn missing_codes_do_not_stop_the_worker() {
        let repository = Arc::new(InMemoryRepository::new());
        let code = ShortCode::new_unchecked("kept");
        repository
            .create(NewUrl::new(code.clone(), "https://example.com"))
            .await
            .unwrap();

        let (tx, rx) = mpsc::channel(4);
        let now = Timestamp::now();
        tx.send(ClickEvent::new(ShortCode::new_unchecked("gone"), now))
            .await
            .unwrap();
        tx.send(ClickEvent::new(code.clone(), now)).await.unwrap();
        drop(tx);

        run_click_worker(Arc::clone(&repository), rx).await;

        assert_eq!(repository.read(&code).await.unwrap().clicks, 1);
    }
}
