//! Representation-independent hashing of signals and external nullifiers.
//!
//! Callers hand over whatever they have: an integer, raw bytes, a hex
//! string, a decimal string or plain text. Every form is mapped to one
//! canonical big-endian integer and then reduced into the scalar field, so
//! the same logical value always lands on the same field element no matter
//! how it was spelled.

use ark_bn254::Fr;
use ark_ff::PrimeField;
use num_bigint::BigUint;
use sema_types::{SemaError, SemaResult};

/// A value destined for the circuit, before canonicalization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HashInput {
    /// An unsigned integer, used as-is.
    Uint(u128),
    /// Raw bytes, interpreted as a big-endian integer.
    Bytes(Vec<u8>),
    /// A string: `0x`-prefixed hex, all-decimal digits, or arbitrary text
    /// whose UTF-8 bytes are taken big-endian.
    Str(String),
}

impl HashInput {
    /// Canonical integer form of the input.
    ///
    /// Strings are disambiguated in order: a `0x`/`0X` prefix forces hex
    /// (and malformed hex is an error rather than a fallback to text), a
    /// string of pure ASCII digits is decimal, anything else is treated as
    /// UTF-8 bytes. Empty strings carry no value and are rejected.
    pub fn to_biguint(&self) -> SemaResult<BigUint> {
        match self {
            HashInput::Uint(value) => Ok(BigUint::from(*value)),
            HashInput::Bytes(bytes) => Ok(BigUint::from_bytes_be(bytes)),
            HashInput::Str(text) => {
                if let Some(digits) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))
                {
                    let bytes = hex::decode(digits).map_err(|e| {
                        SemaError::InvalidInputEncoding(format!("bad hex string: {}", e))
                    })?;
                    Ok(BigUint::from_bytes_be(&bytes))
                } else if text.is_empty() {
                    Err(SemaError::InvalidInputEncoding(
                        "empty string has no canonical value".into(),
                    ))
                } else if text.bytes().all(|b| b.is_ascii_digit()) {
                    BigUint::parse_bytes(text.as_bytes(), 10).ok_or_else(|| {
                        SemaError::InvalidInputEncoding(format!("bad decimal string: {}", text))
                    })
                } else {
                    Ok(BigUint::from_bytes_be(text.as_bytes()))
                }
            }
        }
    }

    /// Canonical integer as a decimal string. This is the unreduced value
    /// that wire proofs carry for signals and external nullifiers.
    pub fn to_decimal(&self) -> SemaResult<String> {
        Ok(self.to_biguint()?.to_string())
    }
}

impl From<u64> for HashInput {
    fn from(value: u64) -> Self {
        HashInput::Uint(u128::from(value))
    }
}

impl From<u128> for HashInput {
    fn from(value: u128) -> Self {
        HashInput::Uint(value)
    }
}

impl From<&str> for HashInput {
    fn from(value: &str) -> Self {
        HashInput::Str(value.to_string())
    }
}

impl From<String> for HashInput {
    fn from(value: String) -> Self {
        HashInput::Str(value)
    }
}

impl From<&[u8]> for HashInput {
    fn from(value: &[u8]) -> Self {
        HashInput::Bytes(value.to_vec())
    }
}

impl From<Vec<u8>> for HashInput {
    fn from(value: Vec<u8>) -> Self {
        HashInput::Bytes(value)
    }
}

/// Reduce an input to a scalar field element.
///
/// The canonical integer is taken modulo the field order, so values at or
/// above the modulus wrap instead of failing. Inputs that cannot be
/// canonicalized at all (bad hex, empty strings) are rejected.
pub fn hash(input: &HashInput) -> SemaResult<Fr> {
    let value = input.to_biguint()?;
    Ok(Fr::from_le_bytes_mod_order(&value.to_bytes_le()))
}
