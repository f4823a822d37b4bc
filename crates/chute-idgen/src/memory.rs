use crate::error::AllocError;
use crate::store::{CoordinationStore, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-process [`CoordinationStore`] with the same linearizable
/// compare-and-put semantics as etcd.
///
/// Used by unit tests and by the race harnesses that drive several
/// allocators against one shared pool.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CoordinationStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let data = self.data.lock().map_err(|_| AllocError::StatePoisoned)?;
        Ok(data.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        let mut data = self.data.lock().map_err(|_| AllocError::StatePoisoned)?;
        data.insert(key.to_string(), value.into_bytes());
        Ok(())
    }

    async fn compare_and_put(
        &self,
        guard_key: &str,
        expected: &[u8],
        puts: &[(String, String)],
    ) -> Result<bool> {
        let mut data = self.data.lock().map_err(|_| AllocError::StatePoisoned)?;

        // The guard and the writes happen under one lock acquisition, which
        // is exactly the transaction isolation etcd gives a Txn.
        let current = data.get(guard_key).map(Vec::as_slice);
        if current != Some(expected) {
            return Ok(false);
        }

        for (key, value) in puts {
            data.insert(key.clone(), value.clone().into_bytes());
        }
        Ok(true)
    }
}
