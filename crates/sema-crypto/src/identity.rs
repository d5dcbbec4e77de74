//! Prover identities: a trapdoor and a nullifier secret, published to the
//! world only as their Poseidon commitment.

use crate::field::{bytes_to_fr, field_to_dec};
use crate::poseidon::poseidon_hash2;
use ark_bn254::Fr;
use ark_ff::UniformRand;
use std::fmt;

const TRAPDOOR_CONTEXT: &str = "sema-identity-trapdoor-v1";
const NULLIFIER_CONTEXT: &str = "sema-identity-nullifier-v1";

/// An identity holder's secrets plus the derived commitment. The commitment
/// is what gets inserted into a group; the secrets never leave the holder.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    trapdoor: Fr,
    nullifier: Fr,
    commitment: Fr,
}

impl Identity {
    /// Generate an identity from fresh randomness.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        Self::from_secrets(Fr::rand(&mut rng), Fr::rand(&mut rng))
    }

    /// Derive an identity deterministically from a seed. The trapdoor and
    /// nullifier come from independent blake3 key-derivation contexts, so
    /// the same seed always rebuilds the same identity.
    pub fn from_seed(seed: &[u8]) -> Self {
        let trapdoor = bytes_to_fr(&blake3::derive_key(TRAPDOOR_CONTEXT, seed));
        let nullifier = bytes_to_fr(&blake3::derive_key(NULLIFIER_CONTEXT, seed));
        Self::from_secrets(trapdoor, nullifier)
    }

    /// Rebuild an identity from stored secrets.
    pub fn from_secrets(trapdoor: Fr, nullifier: Fr) -> Self {
        let commitment = poseidon_hash2(trapdoor, nullifier);
        Self {
            trapdoor,
            nullifier,
            commitment,
        }
    }

    /// Private trapdoor.
    pub fn trapdoor(&self) -> Fr {
        self.trapdoor
    }

    /// Private nullifier secret.
    pub fn nullifier(&self) -> Fr {
        self.nullifier
    }

    /// Public commitment: `Poseidon(trapdoor, nullifier)`.
    pub fn commitment(&self) -> Fr {
        self.commitment
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Identity(commitment: {}, secrets: [REDACTED])",
            field_to_dec(&self.commitment)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commitment_matches_hash() {
        let identity = Identity::from_secrets(Fr::from(11u64), Fr::from(22u64));
        assert_eq!(
            identity.commitment(),
            poseidon_hash2(Fr::from(11u64), Fr::from(22u64))
        );
    }

    #[test]
    fn test_seed_derivation_deterministic() {
        let a = Identity::from_seed(b"correct horse battery staple");
        let b = Identity::from_seed(b"correct horse battery staple");
        assert_eq!(a, b);

        let c = Identity::from_seed(b"different seed");
        assert_ne!(a.commitment(), c.commitment());
    }

    #[test]
    fn test_seed_secrets_independent() {
        let identity = Identity::from_seed(b"seed");
        assert_ne!(identity.trapdoor(), identity.nullifier());
    }

    #[test]
    fn test_random_identities_distinct() {
        let a = Identity::random();
        let b = Identity::random();
        assert_ne!(a.commitment(), b.commitment());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let identity = Identity::from_secrets(Fr::from(987654321u64), Fr::from(123456789u64));
        let rendered = format!("{:?}", identity);
        let expected = format!(
            "Identity(commitment: {}, secrets: [REDACTED])",
            field_to_dec(&identity.commitment())
        );
        assert_eq!(rendered, expected);
    }
}
