use crate::error::AllocError;
use crate::options::EtcdOptions;
use crate::store::{CoordinationStore, Result};
use async_trait::async_trait;
use etcd_client::{Client, Compare, CompareOp, ConnectOptions, Txn, TxnOp};
use tracing::info;

/// Coordination store backed by etcd v3.
///
/// The per-request deadline from [`EtcdOptions`] is installed on the
/// client, so every get/put/txn issued here runs under that timeout.
#[derive(Clone)]
pub struct EtcdStore {
    client: Client,
}

fn map_etcd_error(err: etcd_client::Error) -> AllocError {
    AllocError::StoreUnavailable(err.to_string())
}

impl EtcdStore {
    /// Connects to etcd at the configured address.
    pub async fn connect(options: &EtcdOptions) -> Result<Self> {
        let connect_options = ConnectOptions::new()
            .with_connect_timeout(options.connect_timeout())
            .with_timeout(options.request_timeout());

        let client = Client::connect([options.address.as_str()], Some(connect_options))
            .await
            .map_err(|e| {
                AllocError::StoreUnavailable(format!(
                    "failed to connect to etcd at {}: {e}",
                    options.address
                ))
            })?;

        info!(address = %options.address, "connected to etcd");
        Ok(Self { client })
    }
}

#[async_trait]
impl CoordinationStore for EtcdStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut kv = self.client.kv_client();
        let resp = kv.get(key, None).await.map_err(map_etcd_error)?;
        Ok(resp.kvs().first().map(|kv| kv.value().to_vec()))
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        let mut kv = self.client.kv_client();
        kv.put(key, value, None).await.map_err(map_etcd_error)?;
        Ok(())
    }

    async fn compare_and_put(
        &self,
        guard_key: &str,
        expected: &[u8],
        puts: &[(String, String)],
    ) -> Result<bool> {
        let ops = puts
            .iter()
            .map(|(key, value)| TxnOp::put(key.clone(), value.clone(), None))
            .collect::<Vec<_>>();

        let txn = Txn::new()
            .when(vec![Compare::value(
                guard_key,
                CompareOp::Equal,
                expected.to_vec(),
            )])
            .and_then(ops);

        let mut kv = self.client.kv_client();
        let resp = kv.txn(txn).await.map_err(map_etcd_error)?;
        Ok(resp.succeeded())
    }
}
