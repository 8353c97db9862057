use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;

use crate::{ObjectStore, Result, StoreError};

/// In-process bucket. Records every mutating call so tests can assert on the
/// exact uploads and deletes a run performed, and can be told to reject
/// specific writes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects:       Mutex<BTreeMap<String, Bytes>>,
    put_calls:     Mutex<Vec<String>>,
    delete_calls:  Mutex<Vec<Vec<String>>>,
    rejected_puts: HashSet<String>,
    fail_list:     bool,
    fail_deletes:  bool,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> { m.lock().unwrap_or_else(PoisonError::into_inner) }

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    /// Seed the bucket with `keys`, each holding an empty body.
    #[must_use]
    pub fn with_keys<I, K>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        {
            let mut objects = lock(&self.objects);
            for key in keys {
                objects.insert(key.into(), Bytes::new());
            }
        }
        self
    }

    /// Make `put` fail for `key`.
    #[must_use]
    pub fn reject_put(mut self, key: impl Into<String>) -> Self {
        self.rejected_puts.insert(key.into());
        self
    }

    #[must_use]
    pub fn fail_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    #[must_use]
    pub fn fail_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    pub fn keys(&self) -> Vec<String> { lock(&self.objects).keys().cloned().collect() }

    pub fn get(&self, key: &str) -> Option<Bytes> { lock(&self.objects).get(key).cloned() }

    pub fn contains(&self, key: &str) -> bool { lock(&self.objects).contains_key(key) }

    /// Keys passed to `put`, in call order, including rejected ones.
    pub fn put_calls(&self) -> Vec<String> { lock(&self.put_calls).clone() }

    /// Arguments of every `batch_delete` call, in call order.
    pub fn delete_calls(&self) -> Vec<Vec<String>> { lock(&self.delete_calls).clone() }
}

impl ObjectStore for MemoryStore {
    async fn list_keys(&self, prefix: Option<&str>) -> Result<Vec<String>> {
        if self.fail_list {
            return Err(StoreError::List("listing disabled".to_string()));
        }
        Ok(lock(&self.objects)
            .keys()
            .filter(|k| prefix.is_none_or(|p| k.starts_with(p)))
            .cloned()
            .collect())
    }

    async fn put(&self, key: &str, body: Bytes) -> Result<()> {
        lock(&self.put_calls).push(key.to_string());
        if self.rejected_puts.contains(key) {
            return Err(StoreError::Put {
                key:     key.to_string(),
                message: "rejected".to_string(),
            });
        }
        lock(&self.objects).insert(key.to_string(), body);
        Ok(())
    }

    async fn batch_delete(&self, keys: &[String]) -> Result<()> {
        lock(&self.delete_calls).push(keys.to_vec());
        if self.fail_deletes {
            return Err(StoreError::Delete {
                count:   keys.len(),
                message: "rejected".to_string(),
            });
        }
        let mut objects = lock(&self.objects);
        for key in keys {
            objects.remove(key);
        }
        Ok(())
    }
}
