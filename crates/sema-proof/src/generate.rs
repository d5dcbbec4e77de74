//! Proof generation facade.

use crate::backend::ProverBackend;
use crate::codec::pack_proof;
use crate::hash::HashInput;
use crate::inputs::{assemble_inputs, GroupOrProof};
use sema_crypto::{field_to_dec, Identity};
use sema_types::{SemaError, SemaResult, SemaphoreProof};
use tracing::debug;

/// Generate a membership proof: assemble circuit inputs, prove on the
/// selected backend, pack the result into the wire format.
///
/// `external_nullifier` and `signal` accept any hash-adapter input. The
/// returned wire proof carries their raw canonical integer values as
/// decimal strings; the circuit itself sees their field-reduced hashes,
/// and verification re-derives those hashes from the raw values.
pub async fn generate_proof<'a>(
    identity: &Identity,
    membership: impl Into<GroupOrProof<'a>>,
    external_nullifier: impl Into<HashInput>,
    signal: impl Into<HashInput>,
    backend: &ProverBackend,
) -> SemaResult<SemaphoreProof> {
    let external_nullifier = external_nullifier.into();
    let signal = signal.into();

    let external_nullifier_value = external_nullifier.to_decimal()?;
    let signal_value = signal.to_decimal()?;

    let inputs = assemble_inputs(identity, membership, &external_nullifier, &signal)?;
    debug!("Assembled circuit inputs at depth {}", inputs.depth());

    let output = backend.prove(&inputs).await?;

    let merkle_tree_root = output
        .public_signals
        .first()
        .map(field_to_dec)
        .ok_or_else(|| SemaError::MalformedProverResponse("missing merkle root signal".into()))?;
    let nullifier_hash = output
        .public_signals
        .get(1)
        .map(field_to_dec)
        .ok_or_else(|| {
            SemaError::MalformedProverResponse("missing nullifier hash signal".into())
        })?;

    Ok(SemaphoreProof {
        merkle_tree_root,
        nullifier_hash,
        signal: signal_value,
        external_nullifier: external_nullifier_value,
        proof: pack_proof(&output.proof),
    })
}
