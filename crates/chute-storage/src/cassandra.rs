use crate::error::{Result, StorageError};
use crate::options::CassandraOptions;
use crate::repository::{ReadRepository, Repository};
use async_trait::async_trait;
use chute_core::UrlRecord;
use jiff::Timestamp;
use scylla::frame::value::CqlTimestamp;
use scylla::statement::Consistency;
use scylla::transport::ExecutionProfile;
use scylla::{Session, SessionBuilder};
use tracing::{debug, info, trace};

const INSERT_URL: &str = "INSERT INTO urls (id, long_url, created_at) VALUES (?, ?, ?)";
const SELECT_URL: &str = "SELECT long_url, created_at FROM urls WHERE id = ?";

/// Cassandra implementation of the repository contract.
///
/// Reads and writes both run at quorum consistency, installed on the
/// session's default execution profile together with the request timeout,
/// so every statement issued here inherits them.
pub struct CassandraRepository {
    session: Session,
}

fn map_query_error(err: scylla::transport::errors::QueryError) -> StorageError {
    let message = err.to_string();
    if message.to_ascii_lowercase().contains("timeout") {
        StorageError::Timeout(message)
    } else {
        StorageError::Query(message)
    }
}

impl CassandraRepository {
    /// Connects to the cluster and selects the configured keyspace.
    pub async fn connect(options: &CassandraOptions) -> Result<Self> {
        let profile = ExecutionProfile::builder()
            .consistency(Consistency::Quorum)
            .request_timeout(Some(options.timeout()))
            .build();

        let session = SessionBuilder::new()
            .known_nodes(&options.hosts)
            .connection_timeout(options.connect_timeout())
            .default_execution_profile_handle(profile.into_handle())
            .use_keyspace(&options.keyspace, false)
            .build()
            .await
            .map_err(|e| {
                StorageError::Unavailable(format!("failed to connect to Cassandra: {e}"))
            })?;

        info!(
            hosts = ?options.hosts,
            keyspace = %options.keyspace,
            "connected to Cassandra cluster"
        );

        Ok(Self { session })
    }
}

#[async_trait]
impl ReadRepository for CassandraRepository {
    async fn get(&self, id: i64) -> Result<Option<UrlRecord>> {
        trace!(id, "fetching URL record from Cassandra");

        let result = self
            .session
            .query(SELECT_URL, (id,))
            .await
            .map_err(map_query_error)?;

        let row = result
            .maybe_first_row_typed::<(String, CqlTimestamp)>()
            .map_err(|e| StorageError::InvalidData(format!("malformed urls row: {e}")))?;

        let Some((long_url, created_at)) = row else {
            return Ok(None);
        };

        let created_at = Timestamp::from_millisecond(created_at.0).map_err(|e| {
            StorageError::InvalidData(format!("invalid created_at '{}': {e}", created_at.0))
        })?;

        Ok(Some(UrlRecord {
            id,
            long_url,
            created_at,
        }))
    }
}

#[async_trait]
impl Repository for CassandraRepository {
    async fn save(&self, record: &UrlRecord) -> Result<()> {
        self.session
            .query(
                INSERT_URL,
                (
                    record.id,
                    record.long_url.as_str(),
                    CqlTimestamp(record.created_at.as_millisecond()),
                ),
            )
            .await
            .map_err(map_query_error)?;

        debug!(id = record.id, "persisted URL record");
        Ok(())
    }
}
