//! Standalone nullifier hash calculation.

use ark_bn254::Fr;
use sema_crypto::poseidon_hash2;

/// The nullifier hash a proof for this identity and scope will expose:
/// `Poseidon(externalNullifier, identityNullifier)`.
///
/// Useful on its own for double-signal bookkeeping: an application can
/// compute the expected hash for a scope before any proof exists and index
/// seen values against it.
pub fn calculate_nullifier_hash(identity_nullifier: Fr, external_nullifier: Fr) -> Fr {
    poseidon_hash2(external_nullifier, identity_nullifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let a = calculate_nullifier_hash(Fr::from(7u64), Fr::from(9u64));
        let b = calculate_nullifier_hash(Fr::from(7u64), Fr::from(9u64));
        assert_eq!(a, b);
    }

    #[test]
    fn test_argument_order_matters() {
        // external nullifier hashes first; swapping the roles must not collide
        let forward = calculate_nullifier_hash(Fr::from(7u64), Fr::from(9u64));
        let swapped = calculate_nullifier_hash(Fr::from(9u64), Fr::from(7u64));
        assert_ne!(forward, swapped);
    }

    #[test]
    fn test_scope_separates_nullifiers() {
        let same_identity = Fr::from(7u64);
        let poll_a = calculate_nullifier_hash(same_identity, Fr::from(100u64));
        let poll_b = calculate_nullifier_hash(same_identity, Fr::from(101u64));
        assert_ne!(poll_a, poll_b);
    }
}
