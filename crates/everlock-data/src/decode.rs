//! Decoder half of the datum codec: the exact inverse of the encoder, plus
//! tolerance for the equivalent forms other encoders emit (definite-length
//! field lists, non-minimal heads). Everything outside the closed shape set
//! (floats, maps, bare arrays) is rejected.

use everlock_core::LockError;

use crate::encode::{
    BIGNUM_NEG, BIGNUM_POS, BREAK, CONSTR_TAG_BASE, CONSTR_TAG_EXT_BASE, CONSTR_TAG_GENERAL,
    MAJOR_ARRAY, MAJOR_BYTES, MAJOR_NINT, MAJOR_TAG, MAJOR_UINT,
};
use crate::ScriptData;

/// Head of one data item: a definite value or the indefinite-length marker.
enum Head {
    Value(u64),
    Indefinite,
}

pub(crate) struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self) -> Result<u8, LockError> {
        let b = *self
            .bytes
            .get(self.pos)
            .ok_or(LockError::Truncated(self.pos))?;
        self.pos += 1;
        Ok(b)
    }

    fn take_slice(&mut self, n: usize) -> Result<&'a [u8], LockError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(LockError::Truncated(self.bytes.len()))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn read_head(&mut self) -> Result<(u8, Head), LockError> {
        let offset = self.pos;
        let initial = self.take()?;
        let major = initial >> 5;
        let info = initial & 0x1f;
        let head = match info {
            0..=23 => Head::Value(info as u64),
            24 => Head::Value(self.take()? as u64),
            25 => {
                let b = self.take_slice(2)?;
                Head::Value(u16::from_be_bytes([b[0], b[1]]) as u64)
            }
            26 => {
                let b = self.take_slice(4)?;
                Head::Value(u32::from_be_bytes([b[0], b[1], b[2], b[3]]) as u64)
            }
            27 => {
                let b = self.take_slice(8)?;
                Head::Value(u64::from_be_bytes([
                    b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
                ]))
            }
            31 => Head::Indefinite,
            _ => {
                return Err(LockError::UnexpectedByte {
                    byte: initial,
                    offset,
                })
            }
        };
        Ok((major, head))
    }

    pub(crate) fn decode_item(&mut self) -> Result<ScriptData, LockError> {
        let offset = self.pos;
        let initial = self.peek().ok_or(LockError::Truncated(self.pos))?;
        let (major, head) = self.read_head()?;
        match (major, head) {
            (MAJOR_UINT, Head::Value(v)) => Ok(ScriptData::Int(v as i128)),
            (MAJOR_NINT, Head::Value(v)) => Ok(ScriptData::Int(-(v as i128) - 1)),
            (MAJOR_BYTES, head) => Ok(ScriptData::Bytes(self.decode_byte_body(head)?)),
            (MAJOR_TAG, Head::Value(tag)) => self.decode_tagged(tag, offset, initial),
            _ => Err(LockError::UnexpectedByte {
                byte: initial,
                offset,
            }),
        }
    }

    fn decode_tagged(
        &mut self,
        tag: u64,
        offset: usize,
        initial: u8,
    ) -> Result<ScriptData, LockError> {
        match tag {
            t if (CONSTR_TAG_BASE..=CONSTR_TAG_BASE + 6).contains(&t) => {
                Ok(ScriptData::Constr {
                    tag: t - CONSTR_TAG_BASE,
                    fields: self.decode_fields()?,
                })
            }
            t if (CONSTR_TAG_EXT_BASE..=CONSTR_TAG_EXT_BASE + 120).contains(&t) => {
                Ok(ScriptData::Constr {
                    tag: t - CONSTR_TAG_EXT_BASE + 7,
                    fields: self.decode_fields()?,
                })
            }
            CONSTR_TAG_GENERAL => {
                // 102([tag, fields])
                let (major, head) = self.read_head()?;
                match (major, head) {
                    (MAJOR_ARRAY, Head::Value(2)) => {}
                    _ => {
                        return Err(LockError::UnexpectedByte {
                            byte: initial,
                            offset,
                        })
                    }
                }
                let (major, head) = self.read_head()?;
                let tag = match (major, head) {
                    (MAJOR_UINT, Head::Value(v)) => v,
                    _ => {
                        return Err(LockError::UnexpectedByte {
                            byte: initial,
                            offset,
                        })
                    }
                };
                Ok(ScriptData::Constr {
                    tag,
                    fields: self.decode_fields()?,
                })
            }
            BIGNUM_POS => {
                let magnitude = self.decode_bignum_magnitude()?;
                if magnitude > i128::MAX as u128 {
                    return Err(LockError::IntegerOverflow);
                }
                Ok(ScriptData::Int(magnitude as i128))
            }
            BIGNUM_NEG => {
                let magnitude = self.decode_bignum_magnitude()?;
                if magnitude > i128::MAX as u128 {
                    return Err(LockError::IntegerOverflow);
                }
                Ok(ScriptData::Int(-(magnitude as i128) - 1))
            }
            _ => Err(LockError::UnexpectedByte {
                byte: initial,
                offset,
            }),
        }
    }

    fn decode_byte_body(&mut self, head: Head) -> Result<Vec<u8>, LockError> {
        match head {
            Head::Value(len) => Ok(self.take_slice(len as usize)?.to_vec()),
            Head::Indefinite => {
                // Chunked: definite byte strings until the break marker.
                let mut out = Vec::new();
                loop {
                    if self.peek() == Some(BREAK) {
                        self.pos += 1;
                        return Ok(out);
                    }
                    let offset = self.pos;
                    let initial = self.peek().ok_or(LockError::Truncated(self.pos))?;
                    match self.read_head()? {
                        (MAJOR_BYTES, Head::Value(len)) => {
                            out.extend_from_slice(self.take_slice(len as usize)?);
                        }
                        _ => {
                            return Err(LockError::UnexpectedByte {
                                byte: initial,
                                offset,
                            })
                        }
                    }
                }
            }
        }
    }

    fn decode_fields(&mut self) -> Result<Vec<ScriptData>, LockError> {
        let offset = self.pos;
        let initial = self.peek().ok_or(LockError::Truncated(self.pos))?;
        let (major, head) = self.read_head()?;
        if major != MAJOR_ARRAY {
            return Err(LockError::UnexpectedByte {
                byte: initial,
                offset,
            });
        }
        match head {
            Head::Value(n) => {
                let mut fields = Vec::with_capacity(n.min(128) as usize);
                for _ in 0..n {
                    fields.push(self.decode_item()?);
                }
                Ok(fields)
            }
            Head::Indefinite => {
                let mut fields = Vec::new();
                while self.peek() != Some(BREAK) {
                    fields.push(self.decode_item()?);
                }
                self.pos += 1;
                Ok(fields)
            }
        }
    }

    fn decode_bignum_magnitude(&mut self) -> Result<u128, LockError> {
        let offset = self.pos;
        let initial = self.peek().ok_or(LockError::Truncated(self.pos))?;
        let (major, head) = self.read_head()?;
        if major != MAJOR_BYTES {
            return Err(LockError::UnexpectedByte {
                byte: initial,
                offset,
            });
        }
        let bytes = self.decode_byte_body(head)?;
        let stripped: Vec<u8> = bytes.iter().copied().skip_while(|&b| b == 0).collect();
        if stripped.len() > 16 {
            return Err(LockError::IntegerOverflow);
        }
        let mut buf = [0u8; 16];
        buf[16 - stripped.len()..].copy_from_slice(&stripped);
        Ok(u128::from_be_bytes(buf))
    }
}
