use crate::error::AllocError;
use crate::options::IdAllocOptions;
use crate::store::{CoordinationStore, Result};
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info};

/// Draws segment identifiers uniformly at random from the unused pool in
/// the coordination store.
///
/// The pool is a lazy, store-resident Fisher–Yates shuffle: a `count` key
/// holds the remaining pool size, and sparse `remap/<slot>` keys override
/// the identity mapping `slot -> slot`. Removing a slot copies the tail
/// slot's logical value over it and shrinks `count` by one, all inside a
/// transaction guarded on `count` being unchanged since it was read.
pub struct SegmentAllocator<S> {
    store: Arc<S>,
    count_key: String,
    map_key: String,
    max_segment_count: u32,
}

impl<S: CoordinationStore> SegmentAllocator<S> {
    pub fn new(store: Arc<S>, options: &IdAllocOptions) -> Self {
        Self {
            store,
            count_key: options.segment_count_key.clone(),
            map_key: options.segment_map_key.clone(),
            max_segment_count: options.max_segment_count,
        }
    }

    /// First-boot initialization: writes the full pool size if the count
    /// key is absent. Safe to call from every replica.
    pub async fn ensure_initialized(&self) -> Result<()> {
        if self.store.get(&self.count_key).await?.is_none() {
            self.store
                .put(&self.count_key, self.max_segment_count.to_string())
                .await?;
            info!(count = self.max_segment_count, "initialized segment pool");
        }
        Ok(())
    }

    /// Removes and returns one segment identifier, chosen uniformly from
    /// the remaining pool.
    ///
    /// Lost compare-and-put races retry with fresh reads and a re-rolled
    /// slot; retrying a fixed slot would bias selection under contention.
    pub async fn draw(&self) -> Result<u32> {
        loop {
            let raw_count = self.store.get(&self.count_key).await?.ok_or_else(|| {
                AllocError::CorruptValue(
                    "segment count key is missing; pool was never initialized".to_string(),
                )
            })?;
            let count = parse_count(&raw_count)?;
            let Some(count) = count else {
                return Err(AllocError::Exhausted);
            };

            let slot = rand::thread_rng().gen_range(1..=count);
            let chosen = self.read_slot(slot).await?.unwrap_or(slot);
            let tail = self.read_slot(count).await?.unwrap_or(count);

            // Slot `count` leaves the live range here; its remap entry may
            // linger, unreachable.
            let puts = [
                (self.count_key.clone(), (count - 1).to_string()),
                (self.remap_key(slot), tail.to_string()),
            ];

            if self
                .store
                .compare_and_put(&self.count_key, &raw_count, &puts)
                .await?
            {
                debug!(segment_id = chosen, remaining = count - 1, "drew segment");
                return Ok(chosen);
            }

            debug!(slot, "lost segment draw transaction; retrying");
        }
    }

    fn remap_key(&self, slot: u32) -> String {
        format!("{}/{}", self.map_key, slot)
    }

    async fn read_slot(&self, slot: u32) -> Result<Option<u32>> {
        match self.store.get(&self.remap_key(slot)).await? {
            Some(raw) => parse_decimal(&raw).map(Some),
            None => Ok(None),
        }
    }
}

/// Parses the pool count. `None` means the pool is drained (zero or, after
/// manual edits, negative).
fn parse_count(raw: &[u8]) -> Result<Option<u32>> {
    let text = std::str::from_utf8(raw)
        .map_err(|_| corrupt(raw))?
        .trim();
    let value: i64 = text.parse().map_err(|_| corrupt(raw))?;
    if value <= 0 {
        return Ok(None);
    }
    u32::try_from(value).map(Some).map_err(|_| corrupt(raw))
}

fn parse_decimal(raw: &[u8]) -> Result<u32> {
    std::str::from_utf8(raw)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| corrupt(raw))
}

fn corrupt(raw: &[u8]) -> AllocError {
    AllocError::CorruptValue(format!(
        "expected a decimal integer, got {:?}",
        String::from_utf8_lossy(raw)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::store::CoordinationStore;
    use std::collections::HashSet;

    fn options(max: u32) -> IdAllocOptions {
        IdAllocOptions::builder()
            .segment_size(4)
            .segment_count_key("test/count".to_string())
            .segment_map_key("test/map".to_string())
            .max_segment_count(max)
            .build()
    }

    fn allocator(store: Arc<MemoryStore>, max: u32) -> SegmentAllocator<MemoryStore> {
        SegmentAllocator::new(store, &options(max))
    }

    #[tokio::test]
    async fn initializes_pool_once() {
        let store = Arc::new(MemoryStore::new());
        let alloc = allocator(Arc::clone(&store), 10);

        alloc.ensure_initialized().await.unwrap();
        assert_eq!(store.get("test/count").await.unwrap(), Some(b"10".to_vec()));

        // A second replica booting must not reset a drained pool.
        store.put("test/count", "3".to_string()).await.unwrap();
        alloc.ensure_initialized().await.unwrap();
        assert_eq!(store.get("test/count").await.unwrap(), Some(b"3".to_vec()));
    }

    #[tokio::test]
    async fn draws_every_segment_exactly_once() {
        let store = Arc::new(MemoryStore::new());
        let alloc = allocator(store, 50);
        alloc.ensure_initialized().await.unwrap();

        let mut seen = HashSet::new();
        for _ in 0..50 {
            let segment = alloc.draw().await.unwrap();
            assert!((1..=50).contains(&segment));
            assert!(seen.insert(segment), "segment {segment} drawn twice");
        }
        assert_eq!(alloc.draw().await, Err(AllocError::Exhausted));
    }

    #[tokio::test]
    async fn empty_pool_reports_exhausted() {
        let store = Arc::new(MemoryStore::new());
        let alloc = allocator(Arc::clone(&store), 1);
        store.put("test/count", "0".to_string()).await.unwrap();
        assert_eq!(alloc.draw().await, Err(AllocError::Exhausted));
    }

    #[tokio::test]
    async fn uninitialized_pool_is_corrupt() {
        let store = Arc::new(MemoryStore::new());
        let alloc = allocator(store, 1);
        assert!(matches!(
            alloc.draw().await,
            Err(AllocError::CorruptValue(_))
        ));
    }

    #[tokio::test]
    async fn garbage_count_is_corrupt() {
        let store = Arc::new(MemoryStore::new());
        let alloc = allocator(Arc::clone(&store), 1);
        store.put("test/count", "banana".to_string()).await.unwrap();
        assert!(matches!(
            alloc.draw().await,
            Err(AllocError::CorruptValue(_))
        ));
    }

    #[tokio::test]
    async fn concurrent_draws_never_collide() {
        let store = Arc::new(MemoryStore::new());
        let pool_size = 200;
        allocator(Arc::clone(&store), pool_size)
            .ensure_initialized()
            .await
            .unwrap();

        let mut tasks = Vec::new();
        for _ in 0..4 {
            let alloc = allocator(Arc::clone(&store), pool_size);
            tasks.push(tokio::spawn(async move {
                let mut drawn = Vec::new();
                loop {
                    match alloc.draw().await {
                        Ok(segment) => drawn.push(segment),
                        Err(AllocError::Exhausted) => break,
                        Err(other) => panic!("unexpected draw failure: {other}"),
                    }
                }
                drawn
            }));
        }

        let mut all = Vec::new();
        for task in tasks {
            all.extend(task.await.unwrap());
        }

        let distinct: HashSet<u32> = all.iter().copied().collect();
        assert_eq!(all.len(), pool_size as usize);
        assert_eq!(distinct.len(), pool_size as usize);
        assert_eq!(distinct, (1..=pool_size).collect::<HashSet<u32>>());
    }

    #[tokio::test]
    async fn first_draw_is_roughly_uniform() {
        let pool_size = 10u32;
        let trials = 2_000;
        let mut histogram = vec![0u32; pool_size as usize + 1];

        for _ in 0..trials {
            let store = Arc::new(MemoryStore::new());
            let alloc = allocator(store, pool_size);
            alloc.ensure_initialized().await.unwrap();
            let segment = alloc.draw().await.unwrap();
            histogram[segment as usize] += 1;
        }

        // Expected 200 per bucket; 7+ standard deviations of slack keeps
        // this deterministic in practice while still catching bias.
        let expected = trials / pool_size;
        for (segment, &hits) in histogram.iter().enumerate().skip(1) {
            assert!(
                hits >= expected / 2 && hits <= expected * 2,
                "segment {segment} drawn {hits} times, expected about {expected}"
            );
        }
    }
}
