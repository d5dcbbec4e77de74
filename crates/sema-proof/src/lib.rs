//! SEMA proof core: anonymous group-membership proofs.
//!
//! An [`Identity`](sema_crypto::Identity) registered in a
//! [`Group`](sema_crypto::Group) can prove it belongs to the group and
//! broadcast a signal under an external nullifier, without revealing which
//! member it is. Each (identity, external nullifier) pair exposes one
//! stable nullifier hash, so double-signalling is detectable while the
//! signaller stays anonymous.
//!
//! Proofs are generated either in-process ([`LocalProver`]) or through a
//! remote proving service ([`RemoteProver`]), and always verify through
//! [`verify_proof`] against the wire form.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod artifacts;
pub mod backend;
pub mod codec;
pub mod generate;
pub mod hash;
pub mod inputs;
pub mod nullifier;
pub mod verifier;

pub use artifacts::{
    register_proving_key_file, register_verifying_key_file, SnarkArtifacts,
    DEFAULT_ARTIFACT_BASE_URL,
};
pub use backend::{
    HttpProofService, JobDetail, JobStatus, LocalProver, ProofPayload, ProofService,
    ProverBackend, ProverOutput, RemoteProver, RemoteProverConfig, DEFAULT_PROVER_API_URL,
};
pub use codec::{pack_proof, unpack_proof};
pub use generate::generate_proof;
pub use hash::{hash, HashInput};
pub use inputs::{assemble_inputs, CircuitInputs, GroupOrProof, InputNode};
pub use nullifier::calculate_nullifier_hash;
pub use verifier::verify_proof;
