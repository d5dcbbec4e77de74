#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod circuit;
pub mod field;
pub mod group;
pub mod identity;
pub mod poseidon;

pub use circuit::MembershipCircuit;
pub use field::{bytes_to_fr, field_from_dec, field_to_dec, fr_to_bytes};
pub use group::{fold_path, Group, MerkleProof};
pub use identity::Identity;
pub use poseidon::{canonical_config, poseidon_hash, poseidon_hash2};
