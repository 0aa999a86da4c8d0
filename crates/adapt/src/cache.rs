//! In-process TTL cache for CMS read snapshots.
//!
//! One instance is constructed at startup and injected into the content
//! service; tests build their own. Entries are JSON snapshots keyed by
//! deterministic operation strings, evicted lazily on the first read past
//! expiry. There is no background sweep and no capacity bound.

use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value as Json;
use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::warn;

struct CacheEntry {
    data: Json,
    expires_at: Instant,
}

#[derive(Default)]
pub struct TtlCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unexpired value for `key`, or `None`. Reading an expired entry
    /// deletes it (lazy eviction).
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.lock();
        let expired = match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                return serde_json::from_value(entry.data.clone()).ok();
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(key);
        }
        None
    }

    /// Store a snapshot of `value` under `key`. A `set` on an existing key
    /// fully replaces the prior entry.
    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        match serde_json::to_value(value) {
            Ok(data) => {
                self.entries.lock().insert(
                    key.to_string(),
                    CacheEntry {
                        data,
                        expires_at: Instant::now() + ttl,
                    },
                );
            }
            Err(err) => warn!(key, %err, "value not serializable, skipping cache store"),
        }
    }

    pub fn delete(&self, key: &str) {
        self.entries.lock().remove(key);
    }

    /// Entry count, expired entries included (they linger until read).
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Return the cached value for `key`, or run `producer` and cache its
    /// success. Producer errors are returned as-is and cached never.
    ///
    /// Two tasks racing on the same cold key may both invoke the producer;
    /// the later `set` wins. There is no in-flight de-duplication.
    pub async fn get_or_set<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        producer: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get::<T>(key) {
            return Ok(hit);
        }
        let value = producer().await?;
        self.set(key, &value, ttl);
        Ok(value)
    }
}
