//! Keyed-hash commitment to a move index.
//!
//! digest = HMAC(key, decimal 1-based move index)

use crate::error::GameError;
use crate::games::MoveIndex;
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use sha3::Sha3_256;
use std::fmt;
use std::str::FromStr;

/// Keyed hash construction used for the digest
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    #[default]
    #[serde(rename = "HMAC-SHA3-256")]
    HmacSha3_256,
    #[serde(rename = "HMAC-SHA256")]
    HmacSha256,
}

impl DigestAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::HmacSha3_256 => "HMAC-SHA3-256",
            DigestAlgorithm::HmacSha256 => "HMAC-SHA256",
        }
    }

    /// Compute the MAC of `message` under `key`
    pub fn mac(&self, key: &[u8], message: &[u8]) -> Result<[u8; 32], GameError> {
        let invalid = |_| GameError::InvalidKeyLength(key.len());
        let bytes: [u8; 32] = match self {
            DigestAlgorithm::HmacSha3_256 => {
                let mut mac = Hmac::<Sha3_256>::new_from_slice(key).map_err(invalid)?;
                mac.update(message);
                mac.finalize().into_bytes().into()
            }
            DigestAlgorithm::HmacSha256 => {
                let mut mac = Hmac::<Sha256>::new_from_slice(key).map_err(invalid)?;
                mac.update(message);
                mac.finalize().into_bytes().into()
            }
        };
        Ok(bytes)
    }

    /// Constant-time check of `digest` against MAC(key, message)
    pub fn verify(&self, key: &[u8], message: &[u8], digest: &[u8]) -> bool {
        match self {
            DigestAlgorithm::HmacSha3_256 => Hmac::<Sha3_256>::new_from_slice(key)
                .map(|mut mac| {
                    mac.update(message);
                    mac.verify_slice(digest).is_ok()
                })
                .unwrap_or(false),
            DigestAlgorithm::HmacSha256 => Hmac::<Sha256>::new_from_slice(key)
                .map(|mut mac| {
                    mac.update(message);
                    mac.verify_slice(digest).is_ok()
                })
                .unwrap_or(false),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hmac-sha3-256" | "sha3-256" => Ok(DigestAlgorithm::HmacSha3_256),
            "hmac-sha256" | "sha256" | "sha-256" => Ok(DigestAlgorithm::HmacSha256),
            _ => Err(GameError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// 256-bit HMAC key, scoped to a single round
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretKey(#[serde(with = "hex_bytes")] [u8; 32]);

impl SecretKey {
    /// Draw a fresh key from the operating system's entropy source
    pub fn generate() -> Result<Self, GameError> {
        let mut bytes = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| GameError::EntropyUnavailable(e.to_string()))?;
        Ok(Self(bytes))
    }

    /// Parse a hex-encoded key as printed at the end of a round
    pub fn from_hex(s: &str) -> Result<Self, GameError> {
        let bytes = hex::decode(s.trim())?;
        let len = bytes.len();
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| GameError::InvalidKeyLength(len))?;
        Ok(Self(bytes))
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey(<redacted>)")
    }
}

/// Public half of a commitment: what the human sees before moving
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commitment {
    algorithm: DigestAlgorithm,
    #[serde(with = "hex_bytes")]
    digest: [u8; 32],
}

impl Commitment {
    /// Commit to `index` under `key`
    pub fn new(
        algorithm: DigestAlgorithm,
        key: &SecretKey,
        index: MoveIndex,
    ) -> Result<Self, GameError> {
        let digest = algorithm.mac(key.as_bytes(), &index.to_bytes())?;
        Ok(Self { algorithm, digest })
    }

    /// Reassemble a commitment from its published parts
    pub fn from_parts(algorithm: DigestAlgorithm, digest: [u8; 32]) -> Self {
        Self { algorithm, digest }
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Get the underlying bytes
    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }

    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }

    /// Verify that the revealed key and claimed move produce this commitment
    pub fn verify(&self, key: &SecretKey, claimed: MoveIndex) -> bool {
        self.algorithm
            .verify(key.as_bytes(), &claimed.to_bytes(), &self.digest)
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Commitment({}, {})",
            self.algorithm,
            hex::encode(&self.digest[..8])
        )
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.digest))
    }
}

/// Audit a round from its raw published values.
///
/// Recomputes MAC(key, claimed index) and compares it with `digest`. Any
/// mismatch in the four inputs yields `false`.
pub fn verify_digest(
    digest: &[u8],
    algorithm: DigestAlgorithm,
    key: &[u8],
    claimed_index: usize,
) -> bool {
    algorithm.verify(key, claimed_index.to_string().as_bytes(), digest)
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
        hex::encode(bytes).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 32], D::Error> {
        let hex_str = String::deserialize(d)?;
        let bytes = hex::decode(&hex_str).map_err(serde::de::Error::custom)?;
        if bytes.len() != 32 {
            return Err(serde::de::Error::custom("expected 32 bytes"));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(arr)
    }
}
