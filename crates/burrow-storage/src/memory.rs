use async_trait::async_trait;
use burrow_core::error::StorageError;
use burrow_core::repository::{NewUrl, Repository, Result, UrlRecord};
use burrow_core::shortcode::ShortCode;
use jiff::Timestamp;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct State {
    records: HashMap<String, UrlRecord>,
    /// Last assigned id. Survives deletes and `close`, so ids are never reused.
    last_id: i64,
}

/// In-memory implementation of the Repository trait.
///
/// All mutations go through a single write lock, so the existence check and
/// the insert in `create` cannot interleave with another writer. Reads share
/// the lock. `list` returns records newest first (by id).
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: RwLock<State>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: RwLock::new(State {
                records: HashMap::with_capacity(capacity),
                last_id: 0,
            }),
        }
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn create(&self, new_url: NewUrl) -> Result<UrlRecord> {
        let mut state = self.state.write();

        if state.records.contains_key(new_url.short_code.as_str()) {
            return Err(StorageError::AlreadyExists(new_url.short_code.into_inner()));
        }

        state.last_id += 1;
        let record = new_url.into_record(state.last_id, Timestamp::now());
        state
            .records
            .insert(record.short_code.as_str().to_owned(), record.clone());

        Ok(record)
    }

    async fn read(&self, code: &ShortCode) -> Result<UrlRecord> {
        self.state
            .read()
            .records
            .get(code.as_str())
            .cloned()
            .ok_or_else(|| StorageError::NotFound(code.to_string()))
    }

    async fn update(&self, record: &UrlRecord) -> Result<()> {
        let mut state = self.state.write();

        let Some(stored) = state.records.get_mut(record.short_code.as_str()) else {
            return Err(StorageError::NotFound(record.short_code.to_string()));
        };

        stored.original_url.clone_from(&record.original_url);
        stored.clicks = record.clicks;
        stored.last_accessed = record.last_accessed;
        Ok(())
    }

    async fn delete(&self, code: &ShortCode) -> Result<()> {
        self.state
            .write()
            .records
            .remove(code.as_str())
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(code.to_string()))
    }

    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<UrlRecord>> {
        let state = self.state.read();

        let mut records: Vec<&UrlRecord> = state.records.values().collect();
        records.sort_unstable_by(|a, b| b.id.cmp(&a.id));

        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        Ok(records
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn close(&self) -> Result<()> {
        let mut state = self.state.write();
        state.records.clear();
        state.records.shrink_to_fit();
        Ok(())
    }
}
