use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use everlock_core::{Address, Credential, Hash28, LockError, Network, Witness};

// ── KeyPair ──────────────────────────────────────────────────────────────────

/// One wallet keypair: secp256k1 public + secret key with the derived
/// 28-byte key hash.
///
/// The secret key is wrapped in `Zeroizing` while in use and wiped on drop.
#[derive(Serialize, Deserialize)]
pub struct KeyPair {
    pub key_hash: Hash28,
    #[serde(with = "hex_key")]
    pub public_key: Vec<u8>,
    #[serde(with = "hex_key")]
    secret_key: Vec<u8>,
}

impl KeyPair {
    /// Generate a fresh keypair.
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (sk, pk) = secp.generate_keypair(&mut rand::thread_rng());
        let pk_bytes = pk.serialize().to_vec();
        Self {
            key_hash: Hash28::digest(&pk_bytes),
            public_key: pk_bytes,
            secret_key: sk.secret_bytes().to_vec(),
        }
    }

    /// Sign a 32-byte body digest, producing one transaction witness.
    pub fn sign(&self, digest: &[u8; 32]) -> Result<Witness, LockError> {
        let sk_bytes = Zeroizing::new(self.secret_key.clone());
        let sk = SecretKey::from_slice(&sk_bytes)
            .map_err(|e| LockError::Serialization(format!("loading signing key: {e}")))?;
        let msg = Message::from_digest_slice(digest)
            .map_err(|e| LockError::Serialization(format!("signing digest: {e}")))?;
        let signature = Secp256k1::new().sign_ecdsa(&msg, &sk);
        Ok(Witness {
            public_key: self.public_key.clone(),
            signature: signature.serialize_compact().to_vec(),
        })
    }

    /// Restore from raw key bytes (e.g. a loaded keyfile).
    pub fn from_raw(pk_bytes: Vec<u8>, sk_bytes: Vec<u8>) -> Result<Self, LockError> {
        PublicKey::from_slice(&pk_bytes)
            .map_err(|e| LockError::Serialization(format!("loading public key: {e}")))?;
        Ok(Self {
            key_hash: Hash28::digest(&pk_bytes),
            public_key: pk_bytes,
            secret_key: sk_bytes,
        })
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.secret_key.zeroize();
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyPair {{ key_hash: {:?} }}", self.key_hash)
    }
}

// ── WalletKeys ───────────────────────────────────────────────────────────────

/// The wallet's payment and stake keypairs. Both are always present, so the
/// wallet's own address carries both credentials and a lock scoped to this
/// wallet can always be derived.
#[derive(Debug, Serialize, Deserialize)]
pub struct WalletKeys {
    pub payment: KeyPair,
    pub stake: KeyPair,
}

impl WalletKeys {
    pub fn generate() -> Self {
        Self {
            payment: KeyPair::generate(),
            stake: KeyPair::generate(),
        }
    }

    /// The wallet's base address on `network`.
    pub fn address(&self, network: Network) -> Address {
        Address::Base {
            network,
            payment: Credential::Key(self.payment.key_hash),
            stake: Credential::Key(self.stake.key_hash),
        }
    }

    /// Whether either wallet key matches `hash`.
    pub fn holds(&self, hash: &Hash28) -> bool {
        self.payment.key_hash == *hash || self.stake.key_hash == *hash
    }
}

/// Keys serialize as hex strings so keyfiles stay greppable.
mod hex_key {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(d)?;
        hex::decode(&text).map_err(serde::de::Error::custom)
    }
}
