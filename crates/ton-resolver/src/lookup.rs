//! Transaction-by-hash lookup, the resolver's only side effect.

use std::sync::Arc;

use ton_replay_types::{ReplayError, Result, StdAddress, TransactionIdentity, TxHash};
use ton_transport::{IndexerClient, RequestPacer, V3Transaction};

const SERVICE: &str = "toncenter v3";

/// Finds the account and lt of a transaction from its hash alone.
#[async_trait::async_trait]
pub trait TransactionLookup: Send + Sync {
    /// `Ok(None)` when the service does not know the hash.
    async fn lookup(&self, hash: &TxHash) -> Result<Option<TransactionIdentity>>;
}

#[async_trait::async_trait]
impl<T: TransactionLookup + ?Sized> TransactionLookup for Arc<T> {
    async fn lookup(&self, hash: &TxHash) -> Result<Option<TransactionIdentity>> {
        (**self).lookup(hash).await
    }
}

/// [`TransactionLookup`] backed by the toncenter v3 indexer.
pub struct IndexerLookup {
    client: IndexerClient,
    pacer: Arc<RequestPacer>,
}

impl IndexerLookup {
    pub fn new(client: IndexerClient, pacer: Arc<RequestPacer>) -> Self {
        Self { client, pacer }
    }
}

fn identity_from_v3(tx: &V3Transaction) -> Result<TransactionIdentity> {
    let lt = tx
        .lt
        .parse()
        .map_err(|_| ReplayError::upstream(SERVICE, format!("bad lt '{}'", tx.lt)))?;
    let hash = TxHash::parse(&tx.hash).map_err(|e| ReplayError::upstream(SERVICE, e))?;
    let address = StdAddress::parse_raw(&tx.account).map_err(|e| ReplayError::upstream(SERVICE, e))?;
    Ok(TransactionIdentity::new(lt, hash, address))
}

#[async_trait::async_trait]
impl TransactionLookup for IndexerLookup {
    async fn lookup(&self, hash: &TxHash) -> Result<Option<TransactionIdentity>> {
        self.pacer.pace().await;
        let client = self.client.clone();
        let hex = hash.to_hex();
        let found = tokio::task::spawn_blocking(move || client.transaction_by_hash(&hex))
            .await
            .map_err(|e| ReplayError::upstream(SERVICE, format!("lookup task failed: {}", e)))?
            .map_err(|e| ReplayError::upstream(SERVICE, e))?;
        found.as_ref().map(identity_from_v3).transpose()
    }
}
