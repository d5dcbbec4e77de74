//! Witness assembly for the membership circuit.
//!
//! [`CircuitInputs`] carries identity secrets. It is built fresh for each
//! proof request, handed to a backend, and dropped; nothing here is ever
//! persisted, and its `Debug` output redacts everything secret.

use crate::hash::{hash, HashInput};
use ark_bn254::Fr;
use sema_crypto::{field_to_dec, Group, Identity, MerkleProof};
use sema_types::{SemaError, SemaResult};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::Serialize;
use std::fmt;

/// Private and public inputs for one proving run.
#[derive(Clone)]
pub struct CircuitInputs {
    /// Identity trapdoor (secret).
    pub identity_trapdoor: Fr,
    /// Identity nullifier (secret).
    pub identity_nullifier: Fr,
    /// Merkle path directions, leaf to root, 0 = current node is the left child.
    pub tree_path_indices: Vec<u8>,
    /// Merkle path siblings, leaf to root.
    pub tree_siblings: Vec<Fr>,
    /// Field-reduced external nullifier.
    pub external_nullifier: Fr,
    /// Field-reduced signal.
    pub signal_hash: Fr,
}

impl CircuitInputs {
    /// Tree depth these inputs were assembled for.
    pub fn depth(&self) -> usize {
        self.tree_siblings.len()
    }

    fn to_node(&self) -> InputNode {
        InputNode::Record(vec![
            ("identityTrapdoor", InputNode::Field(self.identity_trapdoor)),
            ("identityNullifier", InputNode::Field(self.identity_nullifier)),
            (
                "treePathIndices",
                InputNode::Seq(
                    self.tree_path_indices
                        .iter()
                        .map(|i| InputNode::Index(*i))
                        .collect(),
                ),
            ),
            (
                "treeSiblings",
                InputNode::Seq(
                    self.tree_siblings
                        .iter()
                        .map(|s| InputNode::Field(*s))
                        .collect(),
                ),
            ),
            ("externalNullifier", InputNode::Field(self.external_nullifier)),
            ("signalHash", InputNode::Field(self.signal_hash)),
        ])
    }

    /// JSON in the shape remote proving services expect: field elements as
    /// decimal strings, path indices as bare numbers, keys in circuit
    /// declaration order.
    pub fn to_prover_json(&self) -> SemaResult<String> {
        serde_json::to_string(&self.to_node())
            .map_err(|e| SemaError::Serialization(format!("prover input encoding failed: {}", e)))
    }
}

impl fmt::Debug for CircuitInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CircuitInputs(depth: {}, secrets: [REDACTED])",
            self.depth()
        )
    }
}

/// Membership evidence: either a group to derive the Merkle path from, or a
/// path that was already computed elsewhere.
pub enum GroupOrProof<'a> {
    /// Look the identity up in this group.
    Group(&'a Group),
    /// Use this precomputed path as-is.
    Proof(MerkleProof),
}

impl<'a> From<&'a Group> for GroupOrProof<'a> {
    fn from(group: &'a Group) -> Self {
        GroupOrProof::Group(group)
    }
}

impl From<MerkleProof> for GroupOrProof<'_> {
    fn from(proof: MerkleProof) -> Self {
        GroupOrProof::Proof(proof)
    }
}

/// Assemble circuit inputs for `identity` against the given membership
/// evidence. When a group is passed, the identity commitment must be one of
/// its members.
pub fn assemble_inputs<'a>(
    identity: &Identity,
    membership: impl Into<GroupOrProof<'a>>,
    external_nullifier: &HashInput,
    signal: &HashInput,
) -> SemaResult<CircuitInputs> {
    let merkle_proof = match membership.into() {
        GroupOrProof::Group(group) => {
            let index = group
                .index_of(identity.commitment())
                .ok_or(SemaError::NotAGroupMember)?;
            group.merkle_proof(index)?
        }
        GroupOrProof::Proof(proof) => proof,
    };

    Ok(CircuitInputs {
        identity_trapdoor: identity.trapdoor(),
        identity_nullifier: identity.nullifier(),
        tree_path_indices: merkle_proof.path_indices,
        tree_siblings: merkle_proof.siblings,
        external_nullifier: hash(external_nullifier)?,
        signal_hash: hash(signal)?,
    })
}

/// One node of the prover-input JSON tree.
///
/// The set of shapes is closed on purpose: a field element renders as a
/// decimal string, a path index as a bare number, and containers preserve
/// insertion order. Remote provers reject anything else, so the type system
/// rules everything else out.
pub enum InputNode {
    /// Field element, rendered as a decimal string.
    Field(Fr),
    /// Path index, rendered as a bare JSON number.
    Index(u8),
    /// Ordered sequence of nodes.
    Seq(Vec<InputNode>),
    /// Record with insertion-ordered keys.
    Record(Vec<(&'static str, InputNode)>),
}

impl Serialize for InputNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            InputNode::Field(value) => serializer.serialize_str(&field_to_dec(value)),
            InputNode::Index(value) => serializer.serialize_u8(*value),
            InputNode::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            InputNode::Record(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sema_crypto::poseidon_hash2;

    fn three_member_group() -> (Identity, Group) {
        let identity = Identity::from_seed(b"member under test");
        let mut group = Group::new(16).unwrap();
        group
            .add_members(&[
                Identity::from_seed(b"first").commitment(),
                identity.commitment(),
                Identity::from_seed(b"third").commitment(),
            ])
            .unwrap();
        (identity, group)
    }

    #[test]
    fn test_assemble_from_group() {
        let (identity, group) = three_member_group();
        let inputs = assemble_inputs(
            &identity,
            &group,
            &HashInput::from("topic"),
            &HashInput::from("hello"),
        )
        .unwrap();

        assert_eq!(inputs.depth(), 16);
        assert_eq!(inputs.tree_siblings.len(), 16);
        assert_eq!(inputs.tree_path_indices.len(), 16);
        assert_eq!(inputs.identity_trapdoor, identity.trapdoor());
        assert_eq!(inputs.identity_nullifier, identity.nullifier());
        assert_eq!(inputs.external_nullifier, hash(&HashInput::from("topic")).unwrap());
        assert_eq!(inputs.signal_hash, hash(&HashInput::from("hello")).unwrap());
    }

    #[test]
    fn test_assemble_from_precomputed_proof_matches_group() {
        let (identity, group) = three_member_group();
        let ext = HashInput::from(42u64);
        let sig = HashInput::from(43u64);

        let from_group = assemble_inputs(&identity, &group, &ext, &sig).unwrap();
        let proof = group.merkle_proof(1).unwrap();
        let from_proof = assemble_inputs(&identity, proof, &ext, &sig).unwrap();

        assert_eq!(from_group.tree_siblings, from_proof.tree_siblings);
        assert_eq!(from_group.tree_path_indices, from_proof.tree_path_indices);
    }

    #[test]
    fn test_non_member_rejected() {
        let (_, group) = three_member_group();
        let outsider = Identity::from_seed(b"not in the group");
        let err = assemble_inputs(
            &outsider,
            &group,
            &HashInput::from(1u64),
            &HashInput::from(2u64),
        )
        .unwrap_err();
        assert!(matches!(err, SemaError::NotAGroupMember));
    }

    #[test]
    fn test_prover_json_shape() {
        let inputs = CircuitInputs {
            identity_trapdoor: Fr::from(1u64),
            identity_nullifier: Fr::from(2u64),
            tree_path_indices: vec![0, 1],
            tree_siblings: vec![Fr::from(3u64), Fr::from(4u64)],
            external_nullifier: Fr::from(5u64),
            signal_hash: Fr::from(6u64),
        };

        let json = inputs.to_prover_json().unwrap();
        assert_eq!(
            json,
            r#"{"identityTrapdoor":"1","identityNullifier":"2","treePathIndices":[0,1],"treeSiblings":["3","4"],"externalNullifier":"5","signalHash":"6"}"#
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let trapdoor = Fr::from(77u64);
        let inputs = CircuitInputs {
            identity_trapdoor: trapdoor,
            identity_nullifier: Fr::from(88u64),
            tree_path_indices: vec![0; 16],
            tree_siblings: vec![poseidon_hash2(trapdoor, trapdoor); 16],
            external_nullifier: Fr::from(5u64),
            signal_hash: Fr::from(6u64),
        };

        assert_eq!(
            format!("{:?}", inputs),
            "CircuitInputs(depth: 16, secrets: [REDACTED])"
        );
    }
}
