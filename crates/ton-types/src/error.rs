//! Error taxonomy shared by every stage of the replay pipeline.
//!
//! Fatal conditions are variants of [`ReplayError`]. Non-fatal conditions
//! (a state-hash mismatch on the target, an unparseable stack token) never
//! show up here; they surface as report fields or `Unparsed` stack values.

use thiserror::Error;

/// Which address of the target's inbound message failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressRole {
    Source,
    Destination,
}

impl std::fmt::Display for AddressRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressRole::Source => write!(f, "source"),
            AddressRole::Destination => write!(f, "destination"),
        }
    }
}

/// Which of the two target runs failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmulationRun {
    Untraced,
    Traced,
}

impl std::fmt::Display for EmulationRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmulationRun::Untraced => write!(f, "untraced"),
            EmulationRun::Traced => write!(f, "traced"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ReplayError {
    /// The reference matched no known pattern and the hash lookup did not
    /// produce a transaction either.
    #[error("unrecognized transaction reference '{reference}': {reason}")]
    UnrecognizedFormat { reference: String, reason: String },

    /// A collaborator (block data, archive, index, library directory,
    /// lookup) failed or returned an unusable payload.
    #[error("{service} unavailable: {message}")]
    UpstreamUnavailable { service: String, message: String },

    /// The block index disagrees with the block data service about the
    /// shard block's root hash.
    #[error(
        "root hash mismatch for shard block {workchain}:{shard}:{seqno}: expected {expected}, index returned {actual}"
    )]
    BlockIntegrityError {
        workchain: i32,
        shard: String,
        seqno: u32,
        expected: String,
        actual: String,
    },

    #[error("replay of prior transaction at lt {lt} failed: {reason}")]
    ReplayFailed { lt: u64, reason: String },

    #[error("{run} emulation of transaction at lt {lt} failed: {reason}")]
    EmulationFailed {
        run: EmulationRun,
        lt: u64,
        reason: String,
    },

    #[error("invalid {role} address in inbound message: {value}")]
    InvalidAddress { role: AddressRole, value: String },

    #[error("unsupported transaction kind '{kind}': only ordinary transactions can be replayed")]
    UnsupportedTransactionKind { kind: String },

    /// A bag of cells or one of its TL-B structures could not be decoded or
    /// encoded.
    #[error("malformed {what}: {message}")]
    Codec { what: String, message: String },

    /// The emulator itself could not be invoked (as opposed to reporting a
    /// failed execution).
    #[error("emulator error: {0}")]
    Emulator(String),
}

impl ReplayError {
    pub fn upstream(service: impl Into<String>, message: impl std::fmt::Display) -> Self {
        ReplayError::UpstreamUnavailable {
            service: service.into(),
            message: message.to_string(),
        }
    }

    pub fn codec(what: impl Into<String>, message: impl std::fmt::Display) -> Self {
        ReplayError::Codec {
            what: what.into(),
            message: message.to_string(),
        }
    }

    pub fn unrecognized(reference: &str, reason: impl Into<String>) -> Self {
        ReplayError::UnrecognizedFormat {
            reference: reference.to_string(),
            reason: reason.into(),
        }
    }

    /// Short machine-readable tag, used by the CLI's JSON error output.
    pub fn kind(&self) -> &'static str {
        match self {
            ReplayError::UnrecognizedFormat { .. } => "unrecognized_format",
            ReplayError::UpstreamUnavailable { .. } => "upstream_unavailable",
            ReplayError::BlockIntegrityError { .. } => "block_integrity_error",
            ReplayError::ReplayFailed { .. } => "replay_failed",
            ReplayError::EmulationFailed { .. } => "emulation_failed",
            ReplayError::InvalidAddress { .. } => "invalid_address",
            ReplayError::UnsupportedTransactionKind { .. } => "unsupported_transaction_kind",
            ReplayError::Codec { .. } => "codec",
            ReplayError::Emulator(_) => "emulator",
        }
    }
}

pub type Result<T, E = ReplayError> = std::result::Result<T, E>;
