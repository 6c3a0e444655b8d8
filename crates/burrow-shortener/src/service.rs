use crate::clicks::{run_click_worker, ClickEvent, CLICK_QUEUE_CAPACITY};
use crate::generator::random::RandomGenerator;
use crate::generator::Generator;
use async_trait::async_trait;
use burrow_core::{NewUrl, Repository, ShortCode, Shortener, ShortenerError, UrlRecord};
use jiff::Timestamp;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Upper bound on create attempts for a generated code.
pub const MAX_ATTEMPTS: usize = 5;

/// Page size used when `list` is called with a non-positive limit.
pub const DEFAULT_LIST_LIMIT: u64 = 10;

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a `Repository` and a `Generator` to handle:
/// - Short code generation with bounded collision retry
/// - Click counting on resolve, persisted by a background worker
/// - One-shot shutdown of the backend
#[derive(Debug)]
pub struct ShortenerService<R, G = RandomGenerator> {
    repository: Arc<R>,
    generator: G,
    clicks: Mutex<Option<mpsc::Sender<ClickEvent>>>,
    click_worker: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl<R: Repository> ShortenerService<R, RandomGenerator> {
    /// Creates a service that generates random codes of `code_length` characters.
    pub fn new(repository: R, code_length: usize) -> Self {
        Self::with_generator(repository, RandomGenerator::new(code_length))
    }
}

impl<R: Repository, G: Generator> ShortenerService<R, G> {
    /// Creates a new `ShortenerService` with a custom generator.
    ///
    /// Spawns the click worker, so this must be called from within a Tokio
    /// runtime.
    pub fn with_generator(repository: R, generator: G) -> Self {
        let repository = Arc::new(repository);
        let (tx, rx) = mpsc::channel(CLICK_QUEUE_CAPACITY);
        let worker = tokio::spawn(run_click_worker(Arc::clone(&repository), rx));

        Self {
            repository,
            generator,
            clicks: Mutex::new(Some(tx)),
            click_worker: Mutex::new(Some(worker)),
            closed: AtomicBool::new(false),
        }
    }

    /// Returns the backend this service stores records in.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    async fn create_with_generated_code(
        &self,
        original_url: &str,
    ) -> Result<UrlRecord, ShortenerError> {
        let mut last_error = None;

        for attempt in 1..=MAX_ATTEMPTS {
            let code = self.generator.generate()?;
            match self
                .repository
                .create(NewUrl::new(code, original_url))
                .await
            {
                Ok(record) => return Ok(record),
                Err(err @ burrow_core::StorageError::AlreadyExists(_)) => {
                    debug!(attempt, error = %err, "generated short code collided");
                    last_error = Some(err);
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(last_error
            .map(ShortenerError::from)
            .unwrap_or_else(|| ShortenerError::Generator("no attempts made".to_string())))
    }
}

fn normalize_page(limit: i64, offset: i64) -> (u64, u64) {
    let limit = u64::try_from(limit)
        .ok()
        .filter(|limit| *limit > 0)
        .unwrap_or(DEFAULT_LIST_LIMIT);
    let offset = u64::try_from(offset).unwrap_or(0);
    (limit, offset)
}

#[async_trait]
impl<R: Repository, G: Generator> Shortener for ShortenerService<R, G> {
    async fn shorten(
        &self,
        original_url: String,
        custom_code: Option<ShortCode>,
    ) -> Result<UrlRecord, ShortenerError> {
        let record = match custom_code {
            Some(code) => {
                self.repository
                    .create(NewUrl::new(code, original_url))
                    .await?
            }
            None => self.create_with_generated_code(&original_url).await?,
        };

        trace!(code = %record.short_code, "shortened url");
        Ok(record)
    }

    async fn resolve(&self, code: &ShortCode) -> Result<UrlRecord, ShortenerError> {
        let mut record = self.repository.read(code).await?;
        let accessed_at = Timestamp::now();
        record.clicks = record.clicks.saturating_add(1);
        record.last_accessed = Some(accessed_at);

        if let Some(clicks) = self.clicks.lock().as_ref() {
            match clicks.try_send(ClickEvent::new(record.short_code.clone(), accessed_at)) {
                Ok(()) => {}
                Err(TrySendError::Full(event)) => {
                    debug!(code = %event.code, "click queue full, click dropped");
                }
                Err(TrySendError::Closed(event)) => {
                    trace!(code = %event.code, "click worker gone, click dropped");
                }
            }
        }

        Ok(record)
    }

    async fn stats(&self, code: &ShortCode) -> Result<UrlRecord, ShortenerError> {
        Ok(self.repository.read(code).await?)
    }

    async fn remove(&self, code: &ShortCode) -> Result<(), ShortenerError> {
        Ok(self.repository.delete(code).await?)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UrlRecord>, ShortenerError> {
        let (limit, offset) = normalize_page(limit, offset);
        Ok(self.repository.list(limit, offset).await?)
    }

    async fn shutdown(&self) -> Result<(), ShortenerError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            trace!("shortener already shut down");
            return Ok(());
        }

        // Dropping the sender lets the worker drain queued clicks and exit.
        drop(self.clicks.lock().take());
        let worker = self.click_worker.lock().take();
        if let Some(worker) = worker {
            if let Err(err) = worker.await {
                warn!(error = %err, "click worker failed");
            }
        }

        Ok(self.repository.close().await?)
    }
}
