//! Field element encodings: 32-byte little-endian and the fully expanded
//! unsigned decimal strings used on the wire.

use ark_bn254::Fr;
use ark_ff::PrimeField;
use ark_serialize::CanonicalSerialize;
use num_bigint::BigUint;

/// Convert a scalar field element to 32 bytes (little-endian).
pub fn fr_to_bytes(f: &Fr) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    f.serialize_compressed(&mut bytes[..])
        .expect("Fr serialization failed");
    bytes
}

/// Convert 32 bytes to a scalar field element (mod order).
pub fn bytes_to_fr(bytes: &[u8; 32]) -> Fr {
    Fr::from_le_bytes_mod_order(bytes)
}

/// Render a field element as a fully expanded unsigned decimal string.
pub fn field_to_dec<F: PrimeField>(value: &F) -> String {
    let repr: BigUint = value.into_bigint().into();
    repr.to_string()
}

/// Parse a decimal string into a field element. Returns `None` unless the
/// string is all ASCII digits and its value is strictly below the field
/// modulus; no modular reduction is performed here.
pub fn field_from_dec<F: PrimeField>(s: &str) -> Option<F> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value = BigUint::parse_bytes(s.as_bytes(), 10)?;
    let modulus: BigUint = F::MODULUS.into();
    if value >= modulus {
        return None;
    }
    Some(F::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::Fq;
    use proptest::prelude::*;

    #[test]
    fn test_bytes_round_trip() {
        let original = Fr::from(0xdeadbeefu64);
        let bytes = fr_to_bytes(&original);
        let restored = bytes_to_fr(&bytes);
        assert_eq!(original, restored);
    }

    #[test]
    fn test_dec_round_trip() {
        let original = Fr::from(123456789u64);
        let dec = field_to_dec(&original);
        assert_eq!(dec, "123456789");
        let restored: Fr = field_from_dec(&dec).unwrap();
        assert_eq!(original, restored);
    }

    #[test]
    fn test_dec_rejects_modulus() {
        let modulus: BigUint = Fr::MODULUS.into();
        assert!(field_from_dec::<Fr>(&modulus.to_string()).is_none());

        let below = modulus - 1u32;
        let parsed: Fr = field_from_dec(&below.to_string()).unwrap();
        assert_eq!(field_to_dec(&parsed), below.to_string());
    }

    #[test]
    fn test_dec_rejects_garbage() {
        assert!(field_from_dec::<Fr>("").is_none());
        assert!(field_from_dec::<Fr>("12a3").is_none());
        assert!(field_from_dec::<Fr>("-5").is_none());
        assert!(field_from_dec::<Fr>("0x2a").is_none());
    }

    #[test]
    fn test_dec_base_field() {
        let original = Fq::from(42u64);
        let restored: Fq = field_from_dec(&field_to_dec(&original)).unwrap();
        assert_eq!(original, restored);
    }

    proptest! {
        #[test]
        fn prop_dec_round_trip(n in any::<u128>()) {
            let original = Fr::from(n);
            let restored: Fr = field_from_dec(&field_to_dec(&original)).unwrap();
            prop_assert_eq!(original, restored);
        }
    }
}
