//! Packing between Groth16 proofs and the flat wire representation.
//!
//! The wire form is eight decimal strings in a fixed order:
//!
//! ```text
//! [a.x, a.y, b.x.c1, b.x.c0, b.y.c1, b.y.c0, c.x, c.y]
//! ```
//!
//! Note the swap inside each G2 coordinate pair. Verifier contracts consume
//! exactly this layout, so the order is a compatibility contract and must
//! never change.

use ark_bn254::{Bn254, Fq, Fq2, G1Affine, G2Affine};
use ark_groth16::Proof;
use sema_crypto::{field_from_dec, field_to_dec};
use sema_types::{PackedProof, SemaError, SemaResult, PACKED_PROOF_LENGTH};

/// Flatten a proof into the wire layout.
pub fn pack_proof(proof: &Proof<Bn254>) -> PackedProof {
    [
        field_to_dec(&proof.a.x),
        field_to_dec(&proof.a.y),
        field_to_dec(&proof.b.x.c1),
        field_to_dec(&proof.b.x.c0),
        field_to_dec(&proof.b.y.c1),
        field_to_dec(&proof.b.y.c0),
        field_to_dec(&proof.c.x),
        field_to_dec(&proof.c.y),
    ]
}

/// Rebuild a proof from the wire layout.
///
/// Every element must be a decimal below the base-field modulus. The points
/// are assembled without subgroup checks; pairing-based verification fails
/// closed on points that are not on the curve.
pub fn unpack_proof(packed: &[String]) -> SemaResult<Proof<Bn254>> {
    if packed.len() != PACKED_PROOF_LENGTH {
        return Err(SemaError::InvalidProofShape(format!(
            "expected {} elements, got {}",
            PACKED_PROOF_LENGTH,
            packed.len()
        )));
    }

    let mut coords = Vec::with_capacity(PACKED_PROOF_LENGTH);
    for (i, element) in packed.iter().enumerate() {
        let value: Fq = field_from_dec(element).ok_or_else(|| {
            SemaError::InvalidProofShape(format!(
                "element {} is not a base-field decimal",
                i
            ))
        })?;
        coords.push(value);
    }

    let a = G1Affine::new_unchecked(coords[0], coords[1]);
    let b = G2Affine::new_unchecked(
        Fq2::new(coords[3], coords[2]),
        Fq2::new(coords[5], coords[4]),
    );
    let c = G1Affine::new_unchecked(coords[6], coords[7]);

    Ok(Proof { a, b, c })
}
