use crate::error::Result;
use crate::repository::{ReadRepository, Repository};
use async_trait::async_trait;
use chute_core::UrlRecord;
use dashmap::DashMap;

/// In-memory implementation of the repository contract.
///
/// DashMap's sharded locks let concurrent create and redirect tests hit
/// the repository without serializing on a single lock.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    records: DashMap<i64, UrlRecord>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn get(&self, id: i64) -> Result<Option<UrlRecord>> {
        Ok(self.records.get(&id).map(|entry| entry.value().clone()))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn save(&self, record: &UrlRecord) -> Result<()> {
        self.records.insert(record.id, record.clone());
        Ok(())
    }
}
