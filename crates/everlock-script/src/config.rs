use serde::{Deserialize, Serialize};

use everlock_core::{Network, SpendingValidator};

// ── LockKind ─────────────────────────────────────────────────────────────────

/// The closed set of lock policies. Adding a variant is a compile-time event:
/// every dispatch over this union is exhaustive, so the planner, datum codec
/// and configuration table all fail to build until they handle it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockKind {
    /// One-way lock; no unlock path exists.
    Permanent,
    /// Unlockable by the owner key once a timestamp has passed.
    Timed,
    /// Unlockable by whoever presents the committed password.
    Password,
}

impl LockKind {
    pub fn label(&self) -> &'static str {
        match self {
            LockKind::Permanent => "permanent",
            LockKind::Timed => "timed",
            LockKind::Password => "password",
        }
    }
}

// ── ValidatorTable ───────────────────────────────────────────────────────────

/// One pre-compiled validator per lock policy. A struct rather than a map:
/// a configuration file missing a policy fails to parse instead of failing
/// at first use.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorTable {
    pub permanent: SpendingValidator,
    pub timed: SpendingValidator,
    pub password: SpendingValidator,
}

impl ValidatorTable {
    pub fn for_kind(&self, kind: LockKind) -> &SpendingValidator {
        match kind {
            LockKind::Permanent => &self.permanent,
            LockKind::Timed => &self.timed,
            LockKind::Password => &self.password,
        }
    }
}

// ── LockConfig ───────────────────────────────────────────────────────────────

/// Explicit client configuration: the target network and the validator
/// table. Passed into the planner and builder at construction; nothing is
/// read from ambient globals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockConfig {
    pub network: Network,
    pub validators: ValidatorTable,
}

#[cfg(test)]
mod tests {
    use super::*;
    use everlock_core::ScriptKind;

    fn table() -> ValidatorTable {
        ValidatorTable {
            permanent: SpendingValidator::new(ScriptKind::V3, vec![1]),
            timed: SpendingValidator::new(ScriptKind::V3, vec![2]),
            password: SpendingValidator::new(ScriptKind::V3, vec![3]),
        }
    }

    #[test]
    fn table_dispatch_is_exhaustive_over_kinds() {
        let t = table();
        for kind in [LockKind::Permanent, LockKind::Timed, LockKind::Password] {
            let v = t.for_kind(kind);
            assert!(!v.script.is_empty());
        }
        assert_ne!(
            t.for_kind(LockKind::Permanent).script_hash(),
            t.for_kind(LockKind::Timed).script_hash()
        );
    }

    #[test]
    fn config_file_round_trip() {
        let cfg = LockConfig {
            network: Network::Testnet,
            validators: table(),
        };
        let json = serde_json::to_string_pretty(&cfg).unwrap();
        let back: LockConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn config_missing_a_policy_fails_to_parse() {
        let json = r#"{
            "network": "testnet",
            "validators": {
                "permanent": { "kind": "v3", "script": "01" },
                "timed":     { "kind": "v3", "script": "02" }
            }
        }"#;
        assert!(serde_json::from_str::<LockConfig>(json).is_err());
    }
}
