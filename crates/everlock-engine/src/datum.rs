use everlock_core::{Digest32, Hash28, LockError, Timestamp};
use everlock_data::ScriptData;
use everlock_script::LockKind;

// ── LockDatum ────────────────────────────────────────────────────────────────

/// The datum shapes this client writes to and reads from contract outputs.
/// A closed union: the codec dispatches over it exhaustively, so a new
/// variant cannot ship without an encoding and a decoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LockDatum {
    /// Empty payload. No extraction procedure exists for a sealed output.
    Sealed,
    /// Arbitrary owner-supplied payload with no enforcement semantics.
    /// Equally final under the permanent validator.
    Note { note: Vec<u8> },
    /// Unlockable by `owner` once ledger time passes `unlock_after`.
    TimeLock {
        unlock_after: Timestamp,
        owner: Hash28,
    },
    /// Unlockable by presenting the preimage of `secret_hash`.
    PasswordLock {
        secret_hash: Digest32,
        owner: Hash28,
    },
}

impl LockDatum {
    /// The policy this datum belongs to.
    pub fn kind(&self) -> LockKind {
        match self {
            LockDatum::Sealed | LockDatum::Note { .. } => LockKind::Permanent,
            LockDatum::TimeLock { .. } => LockKind::Timed,
            LockDatum::PasswordLock { .. } => LockKind::Password,
        }
    }

    /// Build the generic on-chain shape. Each validator reads constructor 0
    /// of its own field layout; the policy picks the layout.
    pub fn to_data(&self) -> ScriptData {
        match self {
            LockDatum::Sealed => ScriptData::constr(0, vec![]),
            LockDatum::Note { note } => {
                ScriptData::constr(0, vec![ScriptData::bytes(note.clone())])
            }
            LockDatum::TimeLock {
                unlock_after,
                owner,
            } => ScriptData::constr(
                0,
                vec![
                    ScriptData::int(*unlock_after),
                    ScriptData::bytes(owner.as_bytes().to_vec()),
                ],
            ),
            LockDatum::PasswordLock {
                secret_hash,
                owner,
            } => ScriptData::constr(
                0,
                vec![
                    ScriptData::bytes(secret_hash.as_bytes().to_vec()),
                    ScriptData::bytes(owner.as_bytes().to_vec()),
                ],
            ),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        self.to_data().encode()
    }

    /// Decode datum bytes under the field layout expected for `kind`.
    pub fn decode_for(kind: LockKind, bytes: &[u8]) -> Result<Self, LockError> {
        let data = ScriptData::decode(bytes)?;
        Self::from_data(kind, &data).ok_or(LockError::DatumShape {
            kind: kind.label(),
        })
    }

    fn from_data(kind: LockKind, data: &ScriptData) -> Option<Self> {
        let fields = data.as_constr(0)?;
        match (kind, fields) {
            (LockKind::Permanent, []) => Some(LockDatum::Sealed),
            (LockKind::Permanent, [note]) => Some(LockDatum::Note {
                note: note.as_bytes()?.to_vec(),
            }),
            (LockKind::Timed, [after, owner]) => Some(LockDatum::TimeLock {
                unlock_after: Timestamp::try_from(after.as_int()?).ok()?,
                owner: hash28_field(owner)?,
            }),
            (LockKind::Password, [secret, owner]) => Some(LockDatum::PasswordLock {
                secret_hash: digest32_field(secret)?,
                owner: hash28_field(owner)?,
            }),
            _ => None,
        }
    }
}

fn hash28_field(data: &ScriptData) -> Option<Hash28> {
    let bytes = data.as_bytes()?;
    let arr: [u8; 28] = bytes.try_into().ok()?;
    Some(Hash28::from_bytes(arr))
}

fn digest32_field(data: &ScriptData) -> Option<Digest32> {
    let bytes = data.as_bytes()?;
    let arr: [u8; 32] = bytes.try_into().ok()?;
    Some(Digest32::from_bytes(arr))
}

// ── UnlockRedeemer ───────────────────────────────────────────────────────────

/// The action data a consuming transaction presents. There is deliberately
/// no variant for the permanent policy: no redeemer exists for it, and the
/// planner refuses rather than fabricating one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnlockRedeemer {
    /// The empty action the time-lock validator expects.
    Void,
    /// The raw UTF-8 password bytes.
    Password(Vec<u8>),
}

impl UnlockRedeemer {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            UnlockRedeemer::Void => ScriptData::constr(0, vec![]).encode(),
            UnlockRedeemer::Password(p) => ScriptData::bytes(p.clone()).encode(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Hash28 {
        Hash28::digest(b"owner-key")
    }

    #[test]
    fn every_datum_round_trips_through_its_policy() {
        let cases = [
            (LockKind::Permanent, LockDatum::Sealed),
            (
                LockKind::Permanent,
                LockDatum::Note {
                    note: b"kept 4 ever".to_vec(),
                },
            ),
            (
                LockKind::Timed,
                LockDatum::TimeLock {
                    unlock_after: 1_900_000_000,
                    owner: owner(),
                },
            ),
            (
                LockKind::Password,
                LockDatum::PasswordLock {
                    secret_hash: Digest32::commit(b"swordfish"),
                    owner: owner(),
                },
            ),
        ];
        for (kind, datum) in cases {
            let decoded = LockDatum::decode_for(kind, &datum.encode()).unwrap();
            assert_eq!(decoded, datum);
            assert_eq!(decoded.kind(), kind);
        }
    }

    #[test]
    fn datum_under_the_wrong_policy_is_a_shape_error() {
        let timed = LockDatum::TimeLock {
            unlock_after: 1_900_000_000,
            owner: owner(),
        };
        assert!(matches!(
            LockDatum::decode_for(LockKind::Password, &timed.encode()),
            Err(LockError::DatumShape { kind: "password" })
        ));
    }

    #[test]
    fn truncated_owner_hash_is_a_shape_error() {
        let data = ScriptData::constr(
            0,
            vec![ScriptData::int(5i64), ScriptData::bytes(vec![0u8; 27])],
        );
        assert!(matches!(
            LockDatum::decode_for(LockKind::Timed, &data.encode()),
            Err(LockError::DatumShape { .. })
        ));
    }

    #[test]
    fn malformed_bytes_keep_their_codec_error() {
        assert!(matches!(
            LockDatum::decode_for(LockKind::Timed, &[0xa1, 0x01, 0x02]),
            Err(LockError::UnexpectedByte { .. })
        ));
    }

    #[test]
    fn redeemer_wire_forms() {
        assert_eq!(UnlockRedeemer::Void.encode(), vec![0xd8, 0x79, 0x80]);
        assert_eq!(
            UnlockRedeemer::Password(b"swordfish".to_vec()).encode(),
            ScriptData::bytes(b"swordfish".to_vec()).encode()
        );
    }
}
