//! Proving backends.
//!
//! Both backends take assembled [`CircuitInputs`](crate::inputs::CircuitInputs)
//! and return the same [`ProverOutput`], so callers choose a strategy once
//! and the rest of the pipeline does not care where the proof was made.

use crate::inputs::CircuitInputs;
use ark_bn254::{Bn254, Fr};
use ark_groth16::Proof;
use sema_types::SemaResult;

pub mod local;
pub mod remote;

pub use local::LocalProver;
pub use remote::{
    HttpProofService, JobDetail, JobStatus, ProofPayload, ProofService, RemoteProver,
    RemoteProverConfig, DEFAULT_PROVER_API_URL,
};

/// Raw proving result before wire packing: the Groth16 proof and the
/// circuit's public signals in declaration order
/// `[merkleTreeRoot, nullifierHash, signalHash, externalNullifier]`.
#[derive(Clone, Debug)]
pub struct ProverOutput {
    /// The proof itself.
    pub proof: Proof<Bn254>,
    /// Public signals as the prover emitted them.
    pub public_signals: Vec<Fr>,
}

/// Proving strategy selected by the caller.
pub enum ProverBackend {
    /// Prove in-process on a blocking worker thread.
    Local(LocalProver),
    /// Delegate to a remote proving service.
    Remote(RemoteProver),
}

impl ProverBackend {
    /// Run the selected prover.
    pub async fn prove(&self, inputs: &CircuitInputs) -> SemaResult<ProverOutput> {
        match self {
            ProverBackend::Local(prover) => prover.prove(inputs).await,
            ProverBackend::Remote(prover) => prover.prove(inputs).await,
        }
    }
}
