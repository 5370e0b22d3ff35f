//! One replay, end to end: reference in, report out.

use std::sync::Arc;

use ton_replay_types::{
    Network, ProgressSink, ReplayError, Result, StateCodec, TlbCodec, TransactionIdentity,
};
use ton_resolver::{resolve, to_links, IndexerLookup, TransactionLookup, TxLinks};
use ton_state_fetcher::{RemoteSources, ReplaySnapshot, SnapshotBuilder, SnapshotSources};
use ton_transport::{IndexerClient, RequestPacer, TransportConfig};

use crate::compile::{compile, CompileInput};
use crate::config::{EngineConfig, HashMismatchPolicy, EMULATOR_BIN_ENV};
use crate::emulator::{EmulationRequest, ProcessEmulator, TransactionEmulator, Verbosity};
use crate::replay::{ReplayOutcome, SequentialReplayer};
use crate::report::EmulationReport;
use crate::trace::parse_vm_log;

/// Hash lookup against the configured toncenter v3 indexer.
pub fn indexer_lookup(config: &TransportConfig) -> IndexerLookup {
    let client = IndexerClient::with_agent(
        &config.endpoints.toncenter_v3,
        config.api_key.clone(),
        config.build_agent(),
    );
    IndexerLookup::new(client, Arc::new(RequestPacer::new(config.request_delay)))
}

/// Wires resolver, snapshot builder, replayer, emulator and compiler.
///
/// Each call owns its snapshot and replay chain; nothing is cached between
/// calls.
pub struct ReplayEngine {
    network: Network,
    lookup: Arc<dyn TransactionLookup>,
    snapshots: SnapshotBuilder,
    emulator: Arc<dyn TransactionEmulator>,
    codec: Arc<dyn StateCodec>,
    policy: HashMismatchPolicy,
}

impl ReplayEngine {
    pub fn new(
        network: Network,
        lookup: Arc<dyn TransactionLookup>,
        sources: SnapshotSources,
        emulator: Arc<dyn TransactionEmulator>,
        codec: Arc<dyn StateCodec>,
        policy: HashMismatchPolicy,
    ) -> Self {
        Self {
            network,
            lookup,
            snapshots: SnapshotBuilder::new(sources, codec.clone()),
            emulator,
            codec,
            policy,
        }
    }

    /// Production engine: public HTTP sources, the real codec and the
    /// configured emulator bridge.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let binary = config.emulator_bin.clone().ok_or_else(|| {
            ReplayError::Emulator(format!(
                "no emulator bridge configured (set {} or pass --emulator)",
                EMULATOR_BIN_ENV
            ))
        })?;
        Ok(Self::new(
            config.network(),
            Arc::new(indexer_lookup(&config.transport)),
            RemoteSources::new(&config.transport).into_sources(),
            Arc::new(ProcessEmulator::new(binary)),
            Arc::new(TlbCodec),
            config.on_hash_mismatch,
        ))
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub async fn resolve(&self, reference: &str) -> Result<TransactionIdentity> {
        resolve(reference, self.network, self.lookup.as_ref()).await
    }

    pub async fn links(&self, reference: &str) -> Result<TxLinks> {
        let identity = self.resolve(reference).await?;
        Ok(to_links(&identity, self.network))
    }

    /// Resolve `reference` and replay it.
    pub async fn run(&self, reference: &str, progress: &dyn ProgressSink) -> Result<EmulationReport> {
        let identity = self.resolve(reference).await?;
        self.run_identity(&identity, progress).await
    }

    pub async fn run_identity(
        &self,
        identity: &TransactionIdentity,
        progress: &dyn ProgressSink,
    ) -> Result<EmulationReport> {
        tracing::info!(%identity, "replaying transaction");
        let snapshot = self.snapshots.build(identity, progress).await?;
        if !snapshot.is_last_in_block {
            tracing::info!("later transactions of the account exist in this block");
        }

        let libraries = self.codec.encode_libraries(&snapshot.libraries)?;
        let outcome = SequentialReplayer::new(self.emulator.as_ref(), self.codec.as_ref(), self.policy)
            .replay(&snapshot, libraries.as_deref(), progress)
            .await?;

        progress.phase("Emulating the tx");
        self.emulate_target(&snapshot, libraries.as_deref(), &outcome, identity, progress)
            .await
    }

    async fn emulate_target(
        &self,
        snapshot: &ReplaySnapshot,
        libraries: Option<&str>,
        outcome: &ReplayOutcome,
        identity: &TransactionIdentity,
        progress: &dyn ProgressSink,
    ) -> Result<EmulationReport> {
        let untraced = EmulationRequest::for_transaction(
            &snapshot.block,
            libraries,
            &outcome.account,
            &snapshot.target,
            Verbosity::Short,
        )?;
        let traced = EmulationRequest {
            verbosity: Verbosity::FullLocationStackVerbose,
            ..untraced.clone()
        };

        let (untraced, traced) = futures::future::join(
            self.emulator.emulate(untraced),
            self.emulator.emulate(traced),
        )
        .await;
        let (untraced, traced) = (untraced?, traced?);

        progress.phase("Packing the result");
        let trace = parse_vm_log(&traced.vm_log);
        compile(
            CompileInput {
                untraced: &untraced,
                traced: &traced,
                target: &snapshot.target,
                balance_before: outcome.balance,
                identity,
                network: self.network,
                trace,
            },
            self.codec.as_ref(),
        )
    }
}
