//! Groth16 membership circuit.
//!
//! Proves knowledge of identity secrets whose commitment sits in a Poseidon
//! Merkle tree, and that the nullifier hash was derived from the same
//! nullifier secret under the given external nullifier. Public inputs, in
//! declaration order: `merkle_root`, `nullifier_hash`, `signal_hash`,
//! `external_nullifier`.

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::constraints::CryptographicSpongeVar;
use ark_crypto_primitives::sponge::poseidon::constraints::PoseidonSpongeVar;
use ark_r1cs_std::{
    alloc::AllocVar,
    boolean::Boolean,
    eq::EqGadget,
    fields::fp::FpVar,
    select::CondSelectGadget,
};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

use crate::poseidon::{canonical_config, poseidon_hash2};

#[derive(Clone)]
pub struct MembershipCircuit {
    identity_trapdoor: Option<Fr>,
    identity_nullifier: Option<Fr>,
    siblings: Vec<Option<Fr>>,
    path_indices: Vec<Option<bool>>,
    merkle_root: Option<Fr>,
    nullifier_hash: Option<Fr>,
    signal_hash: Option<Fr>,
    external_nullifier: Option<Fr>,
}

impl MembershipCircuit {
    /// Circuit with a full witness assignment. The nullifier hash is
    /// derived here so witness and public input can never disagree.
    pub fn new(
        identity_trapdoor: Fr,
        identity_nullifier: Fr,
        siblings: Vec<Fr>,
        path_indices: Vec<bool>,
        merkle_root: Fr,
        signal_hash: Fr,
        external_nullifier: Fr,
    ) -> Self {
        let nullifier_hash = poseidon_hash2(external_nullifier, identity_nullifier);

        Self {
            identity_trapdoor: Some(identity_trapdoor),
            identity_nullifier: Some(identity_nullifier),
            siblings: siblings.into_iter().map(Some).collect(),
            path_indices: path_indices.into_iter().map(Some).collect(),
            merkle_root: Some(merkle_root),
            nullifier_hash: Some(nullifier_hash),
            signal_hash: Some(signal_hash),
            external_nullifier: Some(external_nullifier),
        }
    }

    /// Shape-only circuit for parameter generation at a given tree depth.
    pub fn empty(depth: usize) -> Self {
        Self {
            identity_trapdoor: None,
            identity_nullifier: None,
            siblings: vec![None; depth],
            path_indices: vec![None; depth],
            merkle_root: None,
            nullifier_hash: None,
            signal_hash: None,
            external_nullifier: None,
        }
    }

    /// Tree depth this circuit instance is shaped for.
    pub fn depth(&self) -> usize {
        self.siblings.len()
    }
}

impl ConstraintSynthesizer<Fr> for MembershipCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let identity_trapdoor = FpVar::new_witness(cs.clone(), || {
            self.identity_trapdoor.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let identity_nullifier = FpVar::new_witness(cs.clone(), || {
            self.identity_nullifier.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let mut siblings = Vec::with_capacity(self.siblings.len());
        for sibling in &self.siblings {
            siblings.push(FpVar::new_witness(cs.clone(), || {
                sibling.ok_or(SynthesisError::AssignmentMissing)
            })?);
        }

        let mut path_indices = Vec::with_capacity(self.path_indices.len());
        for index in &self.path_indices {
            path_indices.push(Boolean::new_witness(cs.clone(), || {
                index.ok_or(SynthesisError::AssignmentMissing)
            })?);
        }

        let merkle_root = FpVar::new_input(cs.clone(), || {
            self.merkle_root.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let nullifier_hash = FpVar::new_input(cs.clone(), || {
            self.nullifier_hash.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let signal_hash = FpVar::new_input(cs.clone(), || {
            self.signal_hash.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let external_nullifier = FpVar::new_input(cs.clone(), || {
            self.external_nullifier.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let commitment = poseidon_gadget(
            cs.clone(),
            &[identity_trapdoor.clone(), identity_nullifier.clone()],
        )?;

        let computed_root =
            merkle_root_gadget(cs.clone(), &commitment, &siblings, &path_indices)?;
        computed_root.enforce_equal(&merkle_root)?;

        let computed_nullifier_hash = poseidon_gadget(
            cs.clone(),
            &[external_nullifier.clone(), identity_nullifier],
        )?;
        computed_nullifier_hash.enforce_equal(&nullifier_hash)?;

        // Squaring binds the signal into the constraint system, mirroring
        // the published circuit's signalHashSquared output.
        let _signal_hash_squared = &signal_hash * &signal_hash;

        Ok(())
    }
}

pub fn poseidon_gadget(
    cs: ConstraintSystemRef<Fr>,
    inputs: &[FpVar<Fr>],
) -> Result<FpVar<Fr>, SynthesisError> {
    let config = canonical_config();

    let mut sponge = PoseidonSpongeVar::new(cs, config);
    sponge.absorb(&inputs)?;

    let output = sponge.squeeze_field_elements(1)?;
    Ok(output[0].clone())
}

pub fn merkle_root_gadget(
    cs: ConstraintSystemRef<Fr>,
    leaf: &FpVar<Fr>,
    siblings: &[FpVar<Fr>],
    path_indices: &[Boolean<Fr>],
) -> Result<FpVar<Fr>, SynthesisError> {
    let mut current = leaf.clone();

    for (sibling, is_right) in siblings.iter().zip(path_indices.iter()) {
        let left = FpVar::conditionally_select(is_right, sibling, &current)?;
        let right = FpVar::conditionally_select(is_right, &current, sibling)?;

        current = poseidon_gadget(cs.clone(), &[left, right])?;
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::Group;
    use crate::identity::Identity;
    use ark_relations::r1cs::ConstraintSystem;

    fn satisfied(circuit: MembershipCircuit) -> bool {
        let cs = ConstraintSystem::<Fr>::new_ref();
        circuit.generate_constraints(cs.clone()).unwrap();
        cs.is_satisfied().unwrap()
    }

    fn honest_circuit() -> (MembershipCircuit, Fr) {
        let identity = Identity::from_seed(b"circuit test member");
        let mut group = Group::new(16).unwrap();
        group.add_member(Fr::from(111u64)).unwrap();
        group.add_member(identity.commitment()).unwrap();
        group.add_member(Fr::from(333u64)).unwrap();

        let proof = group.merkle_proof(1).unwrap();
        let root = proof.root;
        let circuit = MembershipCircuit::new(
            identity.trapdoor(),
            identity.nullifier(),
            proof.siblings,
            proof.path_indices.iter().map(|i| *i == 1).collect(),
            root,
            Fr::from(777u64),
            Fr::from(888u64),
        );
        (circuit, root)
    }

    #[test]
    fn test_honest_witness_satisfies() {
        let (circuit, _) = honest_circuit();
        assert_eq!(circuit.depth(), 16);
        assert!(satisfied(circuit));
    }

    #[test]
    fn test_wrong_root_unsatisfied() {
        let (mut circuit, root) = honest_circuit();
        circuit.merkle_root = Some(root + Fr::from(1u64));
        assert!(!satisfied(circuit));
    }

    #[test]
    fn test_wrong_nullifier_hash_unsatisfied() {
        let (mut circuit, _) = honest_circuit();
        circuit.nullifier_hash = Some(Fr::from(4u64));
        assert!(!satisfied(circuit));
    }

    #[test]
    fn test_public_input_count() {
        let (circuit, _) = honest_circuit();
        let cs = ConstraintSystem::<Fr>::new_ref();
        circuit.generate_constraints(cs.clone()).unwrap();
        // One slot for the constant plus the four protocol inputs.
        assert_eq!(cs.num_instance_variables(), 5);
    }
}
