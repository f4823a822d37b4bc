use crate::error::AllocError;
use crate::options::IdAllocOptions;
use crate::segment::SegmentAllocator;
use crate::store::CoordinationStore;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Result type for ID allocation.
pub type Result<T> = std::result::Result<T, AllocError>;

/// Sentinel for "no segment staged" in `segment_id`/`next_segment_id`.
const NO_SEGMENT: u32 = 0;

#[derive(Debug)]
struct QueueState {
    /// Offsets being drained. Only the first `length` entries are live.
    front: Vec<u32>,
    /// Offsets staged by the last completed prefetch.
    back: Vec<u32>,
    length: usize,
    /// Segment the front queue belongs to.
    segment_id: u32,
    /// Segment the back queue belongs to, or [`NO_SEGMENT`].
    next_segment_id: u32,
}

struct Inner<S> {
    segments: SegmentAllocator<S>,
    state: Mutex<QueueState>,
    /// At most one background segment request may be outstanding.
    prefetch_in_flight: AtomicBool,
    /// Latched once a prefetch observes the pool drained; from then on an
    /// empty queue reports `Exhausted` instead of `Starved`.
    pool_exhausted: AtomicBool,
    segment_size: usize,
    prefetch_threshold: usize,
}

/// Hands out globally unique 64-bit IDs.
///
/// Each replica drains one owned segment of `segment_size` local offsets
/// from a front queue, popping in uniformly random order so consecutive
/// short codes are not sequential. Once the queue drops to the prefetch
/// threshold, a single background task draws the next segment into the
/// back queue; when the front queue empties, the back queue is promoted.
///
/// One mutex serializes `pop` and the promote step. It is never held
/// across a store round trip: the prefetch task talks to the store first
/// and takes the lock only to publish the staged segment.
pub struct IdAllocator<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for IdAllocator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: CoordinationStore> IdAllocator<S> {
    /// Boots the allocator: initializes the pool on first start, then
    /// synchronously stages and promotes one segment so the first `pop`
    /// never waits on the store.
    ///
    /// The replica must not serve traffic until this returns.
    pub async fn bootstrap(store: Arc<S>, options: &IdAllocOptions) -> Result<Self> {
        validate(options)?;

        let segment_size = options.segment_size;
        let prefetch_threshold = (options.queue_threshold * segment_size as f32).floor() as usize;

        let inner = Arc::new(Inner {
            segments: SegmentAllocator::new(store, options),
            state: Mutex::new(QueueState {
                front: vec![0; segment_size],
                back: vec![0; segment_size],
                length: 0,
                segment_id: NO_SEGMENT,
                next_segment_id: NO_SEGMENT,
            }),
            prefetch_in_flight: AtomicBool::new(false),
            pool_exhausted: AtomicBool::new(false),
            segment_size,
            prefetch_threshold,
        });

        inner.segments.ensure_initialized().await?;

        let segment_id = inner.segments.draw().await?;
        {
            let mut state = inner.lock_state()?;
            Inner::<S>::stage(&mut state, segment_id);
            inner.promote(&mut state)?;
        }
        info!(segment_id, "allocated initial segment");

        Ok(Self { inner })
    }

    /// Pops one globally unique ID.
    ///
    /// Fails with [`AllocError::Starved`] when the queue drained before a
    /// prefetch landed (retryable) and [`AllocError::Exhausted`] once the
    /// shared pool is gone (terminal).
    ///
    /// Must be called from within a Tokio runtime: crossing the prefetch
    /// threshold spawns the background segment request.
    pub fn pop(&self) -> Result<i64> {
        let mut state = self.inner.lock_state()?;

        // Checked here as well as after the draw below: a starving pop
        // must still be able to request the next segment, or the queue
        // could never refill after a store outage.
        Inner::maybe_prefetch(&self.inner, &state);

        if state.length == 0 {
            self.inner.promote(&mut state)?;
        }

        let idx = rand::thread_rng().gen_range(0..state.length);
        let local = state.front[idx];
        state.front[idx] = state.front[state.length - 1];
        state.length -= 1;

        Inner::maybe_prefetch(&self.inner, &state);

        Ok(global_id(state.segment_id, local, self.inner.segment_size))
    }

    #[cfg(test)]
    fn snapshot(&self) -> (usize, u32, u32) {
        let state = self.inner.state.lock().unwrap();
        (state.length, state.segment_id, state.next_segment_id)
    }

    #[cfg(test)]
    fn prefetch_pending(&self) -> bool {
        self.inner.prefetch_in_flight.load(Ordering::Acquire)
    }
}

impl<S: CoordinationStore> Inner<S> {
    fn lock_state(&self) -> Result<MutexGuard<'_, QueueState>> {
        self.state.lock().map_err(|_| AllocError::StatePoisoned)
    }

    /// Fills the back queue with the offsets `1..=segment_size` of a
    /// freshly drawn segment. Caller holds the state lock.
    fn stage(state: &mut QueueState, segment_id: u32) {
        for (i, slot) in state.back.iter_mut().enumerate() {
            *slot = (i + 1) as u32;
        }
        state.next_segment_id = segment_id;
    }

    /// Swaps the staged segment into service. Caller holds the state lock.
    fn promote(&self, state: &mut QueueState) -> Result<()> {
        if state.next_segment_id == NO_SEGMENT {
            if self.pool_exhausted.load(Ordering::Acquire) {
                return Err(AllocError::Exhausted);
            }
            return Err(AllocError::Starved);
        }

        std::mem::swap(&mut state.front, &mut state.back);
        state.length = self.segment_size;
        state.segment_id = state.next_segment_id;
        state.next_segment_id = NO_SEGMENT;
        state.back.fill(0);

        debug!(segment_id = state.segment_id, "promoted staged segment");
        Ok(())
    }

    /// Fires the background segment request when the queue has drained to
    /// the threshold and nothing is staged or already in flight.
    ///
    /// `<=` rather than `==` so a skipped exact crossing can never strand
    /// the queue without a staged successor. Caller holds the state lock.
    fn maybe_prefetch(inner: &Arc<Self>, state: &QueueState) {
        if state.length <= inner.prefetch_threshold
            && state.next_segment_id == NO_SEGMENT
            && !inner.pool_exhausted.load(Ordering::Acquire)
            && inner
                .prefetch_in_flight
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
        {
            Self::spawn_prefetch(inner);
        }
    }

    /// Runs the store round trip without the lock, then takes it only to
    /// publish. On failure the staged slot stays empty and the in-flight
    /// latch is released, so a later pop may try again.
    fn spawn_prefetch(inner: &Arc<Self>) {
        let inner = Arc::clone(inner);
        tokio::spawn(async move {
            match inner.segments.draw().await {
                Ok(segment_id) => match inner.state.lock() {
                    Ok(mut state) => {
                        Self::stage(&mut state, segment_id);
                        debug!(segment_id, "staged prefetched segment");
                    }
                    Err(_) => {
                        warn!("allocator state lock poisoned; dropping prefetched segment");
                    }
                },
                Err(AllocError::Exhausted) => {
                    inner.pool_exhausted.store(true, Ordering::Release);
                    warn!("segment pool exhausted; no further segments can be staged");
                }
                Err(e) => {
                    warn!(error = %e, "failed to prefetch next segment");
                }
            }
            inner.prefetch_in_flight.store(false, Ordering::Release);
        });
    }
}

fn validate(options: &IdAllocOptions) -> Result<()> {
    if options.segment_size == 0 {
        return Err(AllocError::InvalidOptions(
            "segment_size must be positive".to_string(),
        ));
    }
    if !(options.queue_threshold > 0.0 && options.queue_threshold < 1.0) {
        return Err(AllocError::InvalidOptions(format!(
            "queue_threshold must lie in (0, 1), got {}",
            options.queue_threshold
        )));
    }
    if options.max_segment_count == 0 {
        return Err(AllocError::InvalidOptions(
            "max_segment_count must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Maps an owned `(segment_id, local_offset)` pair onto the global ID
/// space. Both inputs are 1-based; segment `s` covers
/// `[(s-1)*size + 1, s*size]`.
fn global_id(segment_id: u32, local: u32, segment_size: usize) -> i64 {
    (segment_id as i64 - 1) * segment_size as i64 + (local as i64 - 1) + 1
}
