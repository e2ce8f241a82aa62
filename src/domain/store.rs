//! Concurrent record storage with per-record fine-grained locking.
//!
//! [`EntityStore`] keeps each record kind in a `HashMap` where every
//! entry is individually protected by a [`tokio::sync::RwLock`]. This
//! allows concurrent reads on the same record and concurrent writes on
//! different records, while status transitions on one record serialize
//! behind its write lock. The store itself holds no business logic —
//! transition rules live on the entities.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{EntityKind, ReconError};

/// Generic keyed store for one record kind.
///
/// # Concurrency
///
/// - Multiple tasks may read the same record concurrently.
/// - Writes to different records are concurrent.
/// - Writes to the same record are serialized.
#[derive(Debug)]
pub struct EntityStore<I, E> {
    kind: EntityKind,
    records: RwLock<HashMap<I, Arc<RwLock<E>>>>,
}

/// Store of webreport records.
pub type WebreportStore = EntityStore<super::WebreportId, super::Webreport>;
/// Store of bank-statement records.
pub type StatementStore = EntityStore<super::StatementId, super::BankStatement>;
/// Store of matching results.
pub type MatchStore = EntityStore<super::MatchId, super::MatchingResult>;

impl<I, E> EntityStore<I, E>
where
    I: Copy + Eq + std::hash::Hash + std::fmt::Display,
    E: Clone,
{
    /// Creates an empty store for the given record kind.
    #[must_use]
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a new record under the given id.
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::Conflict`] if a record with the same id
    /// already exists (should never happen with UUID v4 ids).
    pub async fn insert(&self, id: I, record: E) -> Result<I, ReconError> {
        let mut map = self.records.write().await;
        if map.contains_key(&id) {
            return Err(ReconError::Conflict(format!(
                "{} {id} already exists",
                self.kind
            )));
        }
        map.insert(id, Arc::new(RwLock::new(record)));
        Ok(id)
    }

    /// Returns a shared handle to the record behind its per-record lock.
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::NotFound`] if no record with the given id
    /// exists.
    pub async fn get(&self, id: I) -> Result<Arc<RwLock<E>>, ReconError> {
        let map = self.records.read().await;
        map.get(&id)
            .cloned()
            .ok_or_else(|| ReconError::not_found(self.kind, id))
    }

    /// Returns clones of all records matching the predicate.
    pub async fn snapshot_filtered<F>(&self, pred: F) -> Vec<E>
    where
        F: Fn(&E) -> bool,
    {
        let map = self.records.read().await;
        let mut out = Vec::with_capacity(map.len());
        for record_lock in map.values() {
            let record = record_lock.read().await;
            if pred(&record) {
                out.push(record.clone());
            }
        }
        out
    }

    /// Returns clones of all records.
    pub async fn snapshot(&self) -> Vec<E> {
        self.snapshot_filtered(|_| true).await
    }

    /// Returns the number of records in the store.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns `true` if the store contains no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
