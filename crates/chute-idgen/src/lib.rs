//! Distributed, collision-free 64-bit ID allocation for Chute.
//!
//! Every shortener replica owns this pipeline:
//!
//! - [`SegmentAllocator`] draws segment identifiers uniformly at random
//!   from an unused pool held in a strongly consistent coordination store,
//!   using a lazy Fisher–Yates shuffle (a `count` key plus sparse `remap`
//!   override keys) and a compare-and-put transaction per draw.
//! - [`IdAllocator`] turns an owned segment into `segment_size` local
//!   offsets in a double-buffered queue, pops them in random order, and
//!   prefetches the next segment in the background before the current one
//!   drains.
//!
//! IDs are never reissued: a crashed replica forfeits whatever offsets it
//! still held, and the pool hands the next replica a fresh segment.

pub mod allocator;
pub mod error;
pub mod etcd;
pub mod memory;
pub mod options;
pub mod segment;
pub mod store;

pub use allocator::IdAllocator;
pub use error::AllocError;
pub use etcd::EtcdStore;
pub use memory::MemoryStore;
pub use options::{EtcdOptions, IdAllocOptions};
pub use segment::SegmentAllocator;
pub use store::CoordinationStore;
