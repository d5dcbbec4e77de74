//! Wire-proof verification.

use crate::artifacts::{check_depth, ensure_depth_keys};
use crate::codec::unpack_proof;
use crate::hash::{hash, HashInput};
use ark_bn254::{Bn254, Fr};
use ark_groth16::Groth16;
use ark_snark::SNARK;
use sema_crypto::field_from_dec;
use sema_types::{SemaError, SemaResult, SemaphoreProof};
use tracing::debug;

/// Verify a wire proof against the verifying key for `tree_depth`.
///
/// The public signals are rebuilt as `[merkleTreeRoot, nullifierHash,
/// hash(signal), hash(externalNullifier)]`. The wire carries the raw signal
/// and external-nullifier values, so both are re-hashed here exactly as
/// they were at proving time; a proof transplanted onto a different signal
/// or scope verifies false, never true.
pub fn verify_proof(proof: &SemaphoreProof, tree_depth: usize) -> SemaResult<bool> {
    check_depth(tree_depth)?;

    let raw = unpack_proof(&proof.proof)?;

    let merkle_tree_root: Fr = field_from_dec(&proof.merkle_tree_root).ok_or_else(|| {
        SemaError::InvalidInputEncoding("merkleTreeRoot is not a field decimal".into())
    })?;
    let nullifier_hash: Fr = field_from_dec(&proof.nullifier_hash).ok_or_else(|| {
        SemaError::InvalidInputEncoding("nullifierHash is not a field decimal".into())
    })?;
    let signal_hash = hash(&HashInput::from(proof.signal.as_str()))?;
    let external_nullifier_hash = hash(&HashInput::from(proof.external_nullifier.as_str()))?;

    let public_inputs = vec![
        merkle_tree_root,
        nullifier_hash,
        signal_hash,
        external_nullifier_hash,
    ];

    let keys = ensure_depth_keys(tree_depth)?;
    let valid = Groth16::<Bn254>::verify_with_processed_vk(&keys.prepared_vk, &public_inputs, &raw)
        .map_err(|e| SemaError::InvalidProofShape(format!("verification aborted: {}", e)))?;

    debug!("Verified proof at depth {}: {}", tree_depth, valid);
    Ok(valid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_wire_proof() -> SemaphoreProof {
        SemaphoreProof {
            merkle_tree_root: "1".to_string(),
            nullifier_hash: "2".to_string(),
            signal: "3".to_string(),
            external_nullifier: "4".to_string(),
            proof: core::array::from_fn(|i| i.to_string()),
        }
    }

    #[test]
    fn test_depth_checked_before_anything_else() {
        let err = verify_proof(&dummy_wire_proof(), 8).unwrap_err();
        assert!(matches!(err, SemaError::UnsupportedTreeDepth(8)));

        let err = verify_proof(&dummy_wire_proof(), 33).unwrap_err();
        assert!(matches!(err, SemaError::UnsupportedTreeDepth(33)));
    }

    #[test]
    fn test_malformed_root_rejected_before_key_lookup() {
        let mut proof = dummy_wire_proof();
        proof.merkle_tree_root = "not a number".to_string();
        let err = verify_proof(&proof, 16).unwrap_err();
        assert!(matches!(err, SemaError::InvalidInputEncoding(_)));
    }

    #[test]
    fn test_bad_packed_element_rejected() {
        let mut proof = dummy_wire_proof();
        proof.proof[7] = "abc".to_string();
        let err = verify_proof(&proof, 16).unwrap_err();
        assert!(matches!(err, SemaError::InvalidProofShape(_)));
    }
}
