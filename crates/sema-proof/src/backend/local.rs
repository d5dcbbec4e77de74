//! In-process Groth16 proving.

use super::ProverOutput;
use crate::artifacts::{self, DepthKeys, SnarkArtifacts};
use crate::inputs::CircuitInputs;
use ark_bn254::Bn254;
use ark_groth16::Groth16;
use ark_snark::SNARK;
use ark_std::rand::thread_rng;
use sema_crypto::{fold_path, poseidon_hash2, MembershipCircuit};
use sema_types::{SemaError, SemaResult};
use std::sync::Arc;
use tracing::debug;

/// Prover that runs witness generation and Groth16 proving on a blocking
/// worker thread, keeping the async runtime responsive.
#[derive(Clone, Debug, Default)]
pub struct LocalProver {
    artifacts: Option<SnarkArtifacts>,
}

impl LocalProver {
    /// Prover using registered (or development) parameters per depth.
    pub fn new() -> Self {
        Self { artifacts: None }
    }

    /// Prover that loads its proving key from explicit artifact locations.
    pub fn with_artifacts(artifacts: SnarkArtifacts) -> Self {
        Self {
            artifacts: Some(artifacts),
        }
    }

    /// Prove membership for the given inputs.
    pub async fn prove(&self, inputs: &CircuitInputs) -> SemaResult<ProverOutput> {
        let depth = inputs.depth();
        let keys = match &self.artifacts {
            Some(artifacts) => artifacts::ensure_artifacts(depth, artifacts)?,
            None => artifacts::ensure_depth_keys(depth)?,
        };
        if keys.proving_key.is_none() {
            return Err(SemaError::Artifact(format!(
                "depth {} is registered verify-only; no proving key available",
                depth
            )));
        }

        debug!("Proving membership locally at depth {}", depth);
        let inputs = inputs.clone();
        tokio::task::spawn_blocking(move || prove_blocking(&keys, &inputs))
            .await
            .map_err(|e| SemaError::ProvingFailed(format!("proving task failed: {}", e)))?
    }
}

fn prove_blocking(keys: &Arc<DepthKeys>, inputs: &CircuitInputs) -> SemaResult<ProverOutput> {
    let proving_key = keys
        .proving_key
        .as_ref()
        .ok_or_else(|| SemaError::Artifact("no proving key available".into()))?;

    // The public signals are recomputed from the witness so the caller
    // never has to pass values the circuit would contradict.
    let commitment = poseidon_hash2(inputs.identity_trapdoor, inputs.identity_nullifier);
    let merkle_root = fold_path(commitment, &inputs.tree_siblings, &inputs.tree_path_indices);
    let nullifier_hash = poseidon_hash2(inputs.external_nullifier, inputs.identity_nullifier);

    let circuit = MembershipCircuit::new(
        inputs.identity_trapdoor,
        inputs.identity_nullifier,
        inputs.tree_siblings.clone(),
        inputs.tree_path_indices.iter().map(|i| *i == 1).collect(),
        merkle_root,
        inputs.signal_hash,
        inputs.external_nullifier,
    );

    let mut rng = thread_rng();
    let proof = Groth16::<Bn254>::prove(proving_key, circuit, &mut rng)
        .map_err(|e| SemaError::ProvingFailed(format!("{}", e)))?;

    Ok(ProverOutput {
        proof,
        public_signals: vec![
            merkle_root,
            nullifier_hash,
            inputs.signal_hash,
            inputs.external_nullifier,
        ],
    })
}
