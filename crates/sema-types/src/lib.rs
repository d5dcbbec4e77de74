#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

//! Shared protocol types for the SEMA anonymous-signaling stack: supported
//! tree-depth range, remote-prover polling limits, the canonical wire proof
//! structure and the error taxonomy used across all crates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest Merkle tree depth with published circuit parameters.
pub const MIN_TREE_DEPTH: usize = 16;

/// Largest Merkle tree depth with published circuit parameters.
pub const MAX_TREE_DEPTH: usize = 32;

/// Number of decimal-string elements in a packed Groth16 proof.
pub const PACKED_PROOF_LENGTH: usize = 8;

/// Fixed delay between remote proof status polls.
pub const PROOF_POLL_INTERVAL_MS: u64 = 1_000;

/// Hard ceiling on remote proof status polls for one job.
pub const MAX_PROOF_POLLS: u32 = 120;

/// Errors surfaced by proof generation and verification. All variants are
/// terminal for the request that produced them; nothing is retried
/// automatically.
#[derive(Error, Debug)]
pub enum SemaError {
    #[error("Invalid input encoding: {0}")]
    InvalidInputEncoding(String),

    #[error("The identity is not part of the group")]
    NotAGroupMember,

    #[error("Proving failed: {0}")]
    ProvingFailed(String),

    #[error("Proof polling timed out after {0} ticks")]
    ProofPollingTimeout(u32),

    #[error("Malformed prover response: {0}")]
    MalformedProverResponse(String),

    #[error("Invalid proof shape: {0}")]
    InvalidProofShape(String),

    #[error("Unsupported tree depth: {0}")]
    UnsupportedTreeDepth(usize),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Artifact error: {0}")]
    Artifact(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result alias used throughout the workspace.
pub type SemaResult<T> = Result<T, SemaError>;

/// Fixed-order flat proof encoding: eight fully expanded unsigned decimal
/// strings. The layout is a wire contract shared with every verifier; see
/// the codec for the exact coordinate order.
pub type PackedProof = [String; PACKED_PROOF_LENGTH];

/// Canonical wire output of a proof request. All numeric fields are unsigned
/// decimal strings; `signal` and `external_nullifier` carry the caller's raw
/// integer value, not its field-reduced hash. Immutable once constructed and
/// safe to serialize, transmit and store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemaphoreProof {
    pub merkle_tree_root: String,
    pub nullifier_hash: String,
    pub signal: String,
    pub external_nullifier: String,
    pub proof: PackedProof,
}
