//! Durable URL storage for Chute.
//!
//! The shortener writes every minted record here (best-effort, after the
//! hot cache); the redirector reads on a cache miss. The production
//! backend is a quorum-replicated Cassandra cluster.

pub mod cassandra;
pub mod error;
pub mod memory;
pub mod options;
pub mod repository;

pub use cassandra::CassandraRepository;
pub use error::{Result, StorageError};
pub use memory::InMemoryRepository;
pub use options::CassandraOptions;
pub use repository::{ReadRepository, Repository};
