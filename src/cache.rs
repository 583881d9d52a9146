//! Write-through cache with explicit rollback.
//!
//! A mutation is applied to the cache first so readers see it at once, then
//! committed to the backing store. The value held before the mutation is
//! captured up front; if the commit fails the cache is restored to it.

use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;

use moka::future::Cache;

/// How an optimistic mutation ended.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome<V> {
    /// The store accepted the change; carries the value now cached.
    Committed(Option<V>),
    /// The store rejected the change and the cache was restored.
    RolledBack {
        restored: Option<V>,
        reason: String,
    },
}

impl<V> MutationOutcome<V> {
    pub fn is_committed(&self) -> bool {
        matches!(self, MutationOutcome::Committed(_))
    }
}

#[derive(Clone)]
pub struct OptimisticCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Cache<K, V>,
}

impl<K, V> OptimisticCache<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(max_capacity: u64, time_to_live: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .time_to_live(time_to_live)
                .max_capacity(max_capacity)
                .build(),
        }
    }

    pub async fn read(&self, key: &K) -> Option<V> {
        self.inner.get(key).await
    }

    pub async fn write(&self, key: K, value: V) {
        self.inner.insert(key, value).await;
    }

    pub async fn invalidate(&self, key: &K) {
        self.inner.invalidate(key).await;
    }

    /// Apply `next` to the cache (`None` removes the entry), then run
    /// `commit`. On error the captured previous value is put back.
    pub async fn mutate<F, Fut, E>(&self, key: K, next: Option<V>, commit: F) -> MutationOutcome<V>
    where
        F: FnOnce(Option<V>) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        let rollback = self.read(&key).await;
        self.apply(key.clone(), next.clone()).await;

        match commit(next.clone()).await {
            Ok(()) => MutationOutcome::Committed(next),
            Err(e) => {
                self.apply(key, rollback.clone()).await;
                MutationOutcome::RolledBack {
                    restored: rollback,
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn apply(&self, key: K, value: Option<V>) {
        match value {
            Some(value) => self.write(key, value).await,
            None => self.invalidate(&key).await,
        }
    }
}
