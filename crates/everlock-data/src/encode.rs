//! Encoder half of the datum codec. Emits the canonical forms the chain
//! tooling produces: minimal-width heads, indefinite field lists for
//! non-empty constructors, 64-byte chunking for long byte strings.

use crate::ScriptData;

pub(crate) const MAJOR_UINT: u8 = 0;
pub(crate) const MAJOR_NINT: u8 = 1;
pub(crate) const MAJOR_BYTES: u8 = 2;
pub(crate) const MAJOR_ARRAY: u8 = 4;
pub(crate) const MAJOR_TAG: u8 = 6;

/// Constructor alternatives 0..=6 ride on tags 121..=127.
pub(crate) const CONSTR_TAG_BASE: u64 = 121;
/// Alternatives 7..=127 ride on tags 1280..=1400.
pub(crate) const CONSTR_TAG_EXT_BASE: u64 = 1280;
/// Anything beyond rides on the general constructor tag.
pub(crate) const CONSTR_TAG_GENERAL: u64 = 102;

pub(crate) const BIGNUM_POS: u64 = 2;
pub(crate) const BIGNUM_NEG: u64 = 3;

/// Byte strings longer than this chunk into an indefinite sequence.
pub(crate) const BYTES_CHUNK: usize = 64;

pub(crate) const INDEFINITE_ARRAY: u8 = 0x9f;
pub(crate) const BREAK: u8 = 0xff;
pub(crate) const EMPTY_ARRAY: u8 = 0x80;

pub(crate) fn encode_into(data: &ScriptData, out: &mut Vec<u8>) {
    match data {
        ScriptData::Int(i) => encode_int(*i, out),
        ScriptData::Bytes(b) => encode_bytes(b, out),
        ScriptData::Constr { tag, fields } => encode_constr(*tag, fields, out),
    }
}

fn encode_constr(tag: u64, fields: &[ScriptData], out: &mut Vec<u8>) {
    if tag <= 6 {
        write_head(out, MAJOR_TAG, CONSTR_TAG_BASE + tag);
        encode_fields(fields, out);
    } else if tag <= 127 {
        write_head(out, MAJOR_TAG, CONSTR_TAG_EXT_BASE + (tag - 7));
        encode_fields(fields, out);
    } else {
        // General form: 102([tag, fields]).
        write_head(out, MAJOR_TAG, CONSTR_TAG_GENERAL);
        write_head(out, MAJOR_ARRAY, 2);
        write_head(out, MAJOR_UINT, tag);
        encode_fields(fields, out);
    }
}

fn encode_fields(fields: &[ScriptData], out: &mut Vec<u8>) {
    if fields.is_empty() {
        out.push(EMPTY_ARRAY);
    } else {
        out.push(INDEFINITE_ARRAY);
        for field in fields {
            encode_into(field, out);
        }
        out.push(BREAK);
    }
}

fn encode_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    if bytes.len() <= BYTES_CHUNK {
        write_head(out, MAJOR_BYTES, bytes.len() as u64);
        out.extend_from_slice(bytes);
    } else {
        out.push(MAJOR_BYTES << 5 | 0x1f);
        for chunk in bytes.chunks(BYTES_CHUNK) {
            write_head(out, MAJOR_BYTES, chunk.len() as u64);
            out.extend_from_slice(chunk);
        }
        out.push(BREAK);
    }
}

fn encode_int(i: i128, out: &mut Vec<u8>) {
    if i >= 0 {
        if i <= u64::MAX as i128 {
            write_head(out, MAJOR_UINT, i as u64);
        } else {
            write_head(out, MAJOR_TAG, BIGNUM_POS);
            encode_bytes(&magnitude_be(i as u128), out);
        }
    } else {
        // Negative integers carry magnitude - 1.
        let m = -(i + 1);
        if m <= u64::MAX as i128 {
            write_head(out, MAJOR_NINT, m as u64);
        } else {
            write_head(out, MAJOR_TAG, BIGNUM_NEG);
            encode_bytes(&magnitude_be(m as u128), out);
        }
    }
}

/// Big-endian magnitude with leading zeros stripped; never empty.
fn magnitude_be(m: u128) -> Vec<u8> {
    let bytes = m.to_be_bytes();
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(15);
    bytes[first..].to_vec()
}

/// Minimal-width head for `value` under `major`.
fn write_head(out: &mut Vec<u8>, major: u8, value: u64) {
    let m = major << 5;
    if value < 24 {
        out.push(m | value as u8);
    } else if value <= 0xff {
        out.push(m | 24);
        out.push(value as u8);
    } else if value <= 0xffff {
        out.push(m | 25);
        out.extend_from_slice(&(value as u16).to_be_bytes());
    } else if value <= 0xffff_ffff {
        out.push(m | 26);
        out.extend_from_slice(&(value as u32).to_be_bytes());
    } else {
        out.push(m | 27);
        out.extend_from_slice(&value.to_be_bytes());
    }
}
