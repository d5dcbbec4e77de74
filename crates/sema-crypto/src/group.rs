//! Groups: incremental binary Poseidon Merkle trees over identity
//! commitments.
//!
//! Members are packed left to right; every absent subtree is the zero-subtree
//! chain `zeroes[0] = 0`, `zeroes[i+1] = Poseidon(zeroes[i], zeroes[i])`.
//! Roots and proofs are recomputed from the member list on demand, padding
//! each level with that level's zero value, so the cost stays linear in the
//! member count rather than in `2^depth`.

use crate::poseidon::poseidon_hash2;
use ark_bn254::Fr;
use sema_types::{SemaError, SemaResult, MAX_TREE_DEPTH, MIN_TREE_DEPTH};

/// Membership proof for one leaf: fold the leaf with `siblings` using
/// `path_indices` as left/right selectors (0 = leaf side is left) and the
/// result equals `root`. Both vectors always have length `depth()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleProof {
    pub root: Fr,
    pub leaf: Fr,
    pub siblings: Vec<Fr>,
    pub path_indices: Vec<u8>,
}

impl MerkleProof {
    /// Tree depth this proof was generated for.
    pub fn depth(&self) -> usize {
        self.siblings.len()
    }

    /// Recompute the root from the leaf and check it against `root`.
    pub fn verify(&self) -> bool {
        self.siblings.len() == self.path_indices.len()
            && fold_path(self.leaf, &self.siblings, &self.path_indices) == self.root
    }
}

/// Fold a leaf up the tree: index 0 keeps the running node on the left,
/// index 1 moves it to the right.
pub fn fold_path(leaf: Fr, siblings: &[Fr], path_indices: &[u8]) -> Fr {
    let mut current = leaf;
    for (sibling, index) in siblings.iter().zip(path_indices) {
        current = if *index == 0 {
            poseidon_hash2(current, *sibling)
        } else {
            poseidon_hash2(*sibling, current)
        };
    }
    current
}

/// A group of identity commitments with a fixed tree depth.
#[derive(Clone, Debug)]
pub struct Group {
    depth: usize,
    members: Vec<Fr>,
    zeroes: Vec<Fr>,
}

impl Group {
    /// Create an empty group. Depths outside the published circuit range
    /// (16..=32) are rejected.
    pub fn new(depth: usize) -> SemaResult<Self> {
        if !(MIN_TREE_DEPTH..=MAX_TREE_DEPTH).contains(&depth) {
            return Err(SemaError::UnsupportedTreeDepth(depth));
        }

        let mut zeroes = Vec::with_capacity(depth + 1);
        let mut current = Fr::from(0u64);
        zeroes.push(current);
        for _ in 0..depth {
            current = poseidon_hash2(current, current);
            zeroes.push(current);
        }

        Ok(Self {
            depth,
            members: Vec::new(),
            zeroes,
        })
    }

    /// Tree depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Member commitments in insertion order.
    pub fn members(&self) -> &[Fr] {
        &self.members
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the group has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Empty-subtree roots per level; `zeroes()[0]` is the empty leaf.
    pub fn zeroes(&self) -> &[Fr] {
        &self.zeroes
    }

    /// Append a member commitment, returning its leaf index.
    pub fn add_member(&mut self, commitment: Fr) -> SemaResult<usize> {
        if self.members.len() as u64 >= 1u64 << self.depth {
            return Err(SemaError::InvalidInputEncoding(format!(
                "group is full: depth {} holds at most {} members",
                self.depth,
                1u64 << self.depth
            )));
        }
        let index = self.members.len();
        self.members.push(commitment);
        Ok(index)
    }

    /// Append several member commitments.
    pub fn add_members(&mut self, commitments: &[Fr]) -> SemaResult<()> {
        for commitment in commitments {
            self.add_member(*commitment)?;
        }
        Ok(())
    }

    /// Exact-match lookup of a commitment's leaf index.
    pub fn index_of(&self, commitment: Fr) -> Option<usize> {
        self.members.iter().position(|m| *m == commitment)
    }

    /// Current Merkle root.
    pub fn root(&self) -> Fr {
        if self.members.is_empty() {
            return self.zeroes[self.depth];
        }

        let mut level = self.members.clone();
        for zero in self.zeroes.iter().take(self.depth) {
            if level.len() % 2 == 1 {
                level.push(*zero);
            }
            level = level
                .chunks(2)
                .map(|pair| poseidon_hash2(pair[0], pair[1]))
                .collect();
        }
        level[0]
    }

    /// Membership proof for the member at `index`.
    pub fn merkle_proof(&self, index: usize) -> SemaResult<MerkleProof> {
        if index >= self.members.len() {
            return Err(SemaError::InvalidInputEncoding(format!(
                "member index {} out of range for group of {} members",
                index,
                self.members.len()
            )));
        }

        let leaf = self.members[index];
        let mut siblings = Vec::with_capacity(self.depth);
        let mut path_indices = Vec::with_capacity(self.depth);

        let mut level = self.members.clone();
        let mut idx = index;
        for zero in self.zeroes.iter().take(self.depth) {
            if level.len() % 2 == 1 {
                level.push(*zero);
            }

            let sibling_idx = if idx % 2 == 0 { idx + 1 } else { idx - 1 };
            path_indices.push((idx % 2) as u8);
            siblings.push(level[sibling_idx]);

            level = level
                .chunks(2)
                .map(|pair| poseidon_hash2(pair[0], pair[1]))
                .collect();
            idx /= 2;
        }

        Ok(MerkleProof {
            root: level[0],
            leaf,
            siblings,
            path_indices,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commitments(n: u64) -> Vec<Fr> {
        (1..=n).map(|i| poseidon_hash2(Fr::from(i), Fr::from(i + 100))).collect()
    }

    #[test]
    fn test_depth_range() {
        assert!(Group::new(16).is_ok());
        assert!(Group::new(32).is_ok());
        assert!(matches!(
            Group::new(15),
            Err(SemaError::UnsupportedTreeDepth(15))
        ));
        assert!(matches!(
            Group::new(33),
            Err(SemaError::UnsupportedTreeDepth(33))
        ));
    }

    #[test]
    fn test_empty_root_is_zero_chain() {
        let group = Group::new(16).unwrap();
        let mut expected = Fr::from(0u64);
        for _ in 0..16 {
            expected = poseidon_hash2(expected, expected);
        }
        assert_eq!(group.root(), expected);
    }

    #[test]
    fn test_root_changes_on_insert() {
        let mut group = Group::new(16).unwrap();
        let empty_root = group.root();
        group.add_member(Fr::from(42u64)).unwrap();
        assert_ne!(group.root(), empty_root);
    }

    #[test]
    fn test_index_of() {
        let mut group = Group::new(16).unwrap();
        let members = commitments(3);
        group.add_members(&members).unwrap();

        assert_eq!(group.index_of(members[0]), Some(0));
        assert_eq!(group.index_of(members[2]), Some(2));
        assert_eq!(group.index_of(Fr::from(999u64)), None);
    }

    #[test]
    fn test_proofs_verify_for_all_members() {
        let mut group = Group::new(16).unwrap();
        group.add_members(&commitments(5)).unwrap();
        let root = group.root();

        for index in 0..group.len() {
            let proof = group.merkle_proof(index).unwrap();
            assert_eq!(proof.root, root);
            assert_eq!(proof.leaf, group.members()[index]);
            assert!(proof.verify());
        }
    }

    #[test]
    fn test_three_member_proof_structure() {
        let mut group = Group::new(16).unwrap();
        let members = commitments(3);
        group.add_members(&members).unwrap();

        let proof = group.merkle_proof(1).unwrap();
        assert_eq!(proof.siblings.len(), 16);
        assert_eq!(proof.path_indices.len(), 16);

        // Index 1 sits right of member 0, then everything above is the
        // zero-padded remainder of the tree.
        assert_eq!(proof.path_indices[0], 1);
        assert_eq!(proof.siblings[0], members[0]);
        assert_eq!(
            proof.siblings[1],
            poseidon_hash2(members[2], group.zeroes()[0])
        );
        for level in 2..16 {
            assert_eq!(proof.siblings[level], group.zeroes()[level]);
        }
    }

    #[test]
    fn test_tampered_proof_fails() {
        let mut group = Group::new(16).unwrap();
        group.add_members(&commitments(4)).unwrap();

        let mut proof = group.merkle_proof(2).unwrap();
        proof.siblings[0] = Fr::from(1u64);
        assert!(!proof.verify());
    }

    #[test]
    fn test_proof_index_out_of_range() {
        let mut group = Group::new(16).unwrap();
        group.add_member(Fr::from(1u64)).unwrap();
        assert!(matches!(
            group.merkle_proof(1),
            Err(SemaError::InvalidInputEncoding(_))
        ));
    }
}
