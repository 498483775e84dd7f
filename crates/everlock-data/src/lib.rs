//! everlock-data
//!
//! Codec for the structured binary format consumed on-chain: datum cells and
//! redeemer arguments. The representable shapes are a closed set (tagged
//! constructors over an ordered field list, raw byte strings, and integers),
//! so anything outside the set is unrepresentable at the type
//! level rather than rejected at run time. Decoding is the exact inverse of
//! encoding: `decode(encode(v)) == v` for every representable `v`.
//!
//! The wire form is CBOR-compatible: constructors ride on semantic tags
//! (121..=127 for the first seven alternatives, 1280..=1400 for the next 121,
//! the general tag 102 beyond that), byte strings chunk at 64 bytes, and
//! integers outside the direct u64 range use the bignum tags 2 and 3.

mod decode;
mod encode;

use everlock_core::LockError;

/// One on-chain data value. Constructors nest arbitrarily; field order is
/// significant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptData {
    Constr { tag: u64, fields: Vec<ScriptData> },
    Bytes(Vec<u8>),
    Int(i128),
}

impl ScriptData {
    pub fn constr(tag: u64, fields: Vec<ScriptData>) -> Self {
        ScriptData::Constr { tag, fields }
    }

    pub fn bytes(b: impl Into<Vec<u8>>) -> Self {
        ScriptData::Bytes(b.into())
    }

    pub fn int(i: impl Into<i128>) -> Self {
        ScriptData::Int(i.into())
    }

    /// Encode to the on-chain wire form. Total: every representable value
    /// has an encoding.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        encode::encode_into(self, &mut out);
        out
    }

    /// Decode exactly one value; trailing bytes are an error.
    pub fn decode(bytes: &[u8]) -> Result<Self, LockError> {
        let mut decoder = decode::Decoder::new(bytes);
        let value = decoder.decode_item()?;
        let rest = decoder.remaining();
        if rest != 0 {
            return Err(LockError::TrailingBytes(rest));
        }
        Ok(value)
    }

    /// The fields of a constructor with the expected tag, or `None` when the
    /// value is anything else. Convenience for datum dispatch.
    pub fn as_constr(&self, expected_tag: u64) -> Option<&[ScriptData]> {
        match self {
            ScriptData::Constr { tag, fields } if *tag == expected_tag => Some(fields),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ScriptData::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i128> {
        match self {
            ScriptData::Int(i) => Some(*i),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(v: ScriptData) {
        let encoded = v.encode();
        assert_eq!(ScriptData::decode(&encoded).unwrap(), v, "wire: {}", hex::encode(&encoded));
    }

    #[test]
    fn unit_constructor() {
        round_trip(ScriptData::constr(0, vec![]));
    }

    #[test]
    fn constructor_tag_ranges() {
        for tag in [0, 1, 6, 7, 100, 127, 128, 4096, u64::MAX] {
            round_trip(ScriptData::constr(tag, vec![ScriptData::int(1)]));
        }
    }

    #[test]
    fn nested_constructors() {
        round_trip(ScriptData::constr(
            1,
            vec![
                ScriptData::constr(0, vec![]),
                ScriptData::constr(2, vec![ScriptData::bytes(vec![1, 2, 3]), ScriptData::int(-5)]),
            ],
        ));
    }

    #[test]
    fn byte_strings_across_the_chunk_boundary() {
        for len in [0usize, 1, 63, 64, 65, 128, 200] {
            round_trip(ScriptData::bytes(vec![0xab; len]));
        }
    }

    #[test]
    fn integers_across_the_direct_range() {
        for i in [
            0i128,
            1,
            -1,
            23,
            24,
            -25,
            u64::MAX as i128,
            u64::MAX as i128 + 1,
            -(u64::MAX as i128) - 1,
            -(u64::MAX as i128) - 2,
            i128::MAX,
            i128::MIN,
        ] {
            round_trip(ScriptData::int(i));
        }
    }

    #[test]
    fn known_wire_forms() {
        // Constructor 0, no fields: tag 121 + empty list.
        assert_eq!(ScriptData::constr(0, vec![]).encode(), vec![0xd8, 0x79, 0x80]);
        // Small ints are bare heads.
        assert_eq!(ScriptData::int(0).encode(), vec![0x00]);
        assert_eq!(ScriptData::int(-1).encode(), vec![0x20]);
        // Short byte string.
        assert_eq!(ScriptData::bytes(vec![0xff]).encode(), vec![0x41, 0xff]);
    }

    #[test]
    fn decode_accepts_definite_field_lists() {
        // Constructor 0 with a definite-length [1] field list, as other
        // encoders may emit: d879 81 01.
        let bytes = [0xd8, 0x79, 0x81, 0x01];
        assert_eq!(
            ScriptData::decode(&bytes).unwrap(),
            ScriptData::constr(0, vec![ScriptData::int(1)])
        );
    }
}
