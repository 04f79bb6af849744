//! API key generation and verification
//!
//! Write access to the service is granted by an API key sent in the `x-api-key`
//! header. Only a salted, hashed form of the key ([`ApiSecret`]) is ever stored in
//! configuration. The secret records its own format version so the derivation can
//! be migrated without ambiguity.

use base64::Engine;
use rand::RngCore;
use serde::Deserialize;
use serde::Serialize;
use subtle::ConstantTimeEq;

use crate::RagbotError;
use crate::Result;

/// Number of random bytes in a generated API key
pub const API_KEY_BYTES: usize = 32;

/// Number of random bytes in a generated salt
pub const SALT_BYTES: usize = 8;

/// scrypt cost for new v1 secrets (N = 2^14)
pub const DEFAULT_LOG_N: u8 = 14;

/// scrypt block size for v1 secrets
pub const DEFAULT_R: u32 = 8;

/// scrypt parallelism for v1 secrets
pub const DEFAULT_P: u32 = 1;

/// Length of a v1 derived hash in bytes
pub const V1_HASH_LEN: usize = 64;

/// Hash format of a stored secret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretVersion {
    /// scrypt with a 64-byte output
    V1,
}

/// Stored, hashed form of an API key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSecret {
    pub version: SecretVersion,
    pub log_n: u8,
    pub r: u32,
    pub p: u32,
    #[serde(with = "hex")]
    pub salt: Vec<u8>,
    #[serde(with = "hex")]
    pub hash: Vec<u8>,
}

impl ApiSecret {
    /// Hash `key` with a fresh random salt using the current format version
    pub fn generate(key: &str) -> Result<Self> {
        Self::with_salt(key, random_bytes(SALT_BYTES), DEFAULT_LOG_N)
    }

    /// Hash `key` with a caller-provided salt and scrypt cost
    pub fn with_salt(key: &str, salt: Vec<u8>, log_n: u8) -> Result<Self> {
        let hash = derive_v1(key.as_bytes(), &salt, log_n, DEFAULT_R, DEFAULT_P)?;
        Ok(Self {
            version: SecretVersion::V1,
            log_n,
            r: DEFAULT_R,
            p: DEFAULT_P,
            salt,
            hash,
        })
    }

    /// A well-formed secret that no key was derived from.
    ///
    /// Used until a real secret is configured; every request is rejected.
    pub fn placeholder() -> Self {
        Self {
            version: SecretVersion::V1,
            log_n: DEFAULT_LOG_N,
            r: DEFAULT_R,
            p: DEFAULT_P,
            salt: random_bytes(SALT_BYTES),
            hash: random_bytes(V1_HASH_LEN),
        }
    }

    /// Check that the secret is structurally usable
    pub fn validate(&self) -> Result<()> {
        match self.version {
            SecretVersion::V1 => {
                scrypt_params(self.log_n, self.r, self.p)?;
                if self.salt.is_empty() {
                    return Err(RagbotError::Config(
                        "API secret salt must not be empty".to_string(),
                    ));
                }
                if self.hash.len() != V1_HASH_LEN {
                    return Err(RagbotError::Config(format!(
                        "API secret hash must be {V1_HASH_LEN} bytes, got {}",
                        self.hash.len()
                    )));
                }
                Ok(())
            }
        }
    }

    /// Verify a supplied key against this secret in constant time
    pub fn verify(&self, supplied: &str) -> bool {
        let candidate = match self.version {
            SecretVersion::V1 => {
                derive_v1(supplied.as_bytes(), &self.salt, self.log_n, self.r, self.p)
            }
        };
        match candidate {
            Ok(candidate) => self.hash.ct_eq(&candidate).into(),
            Err(e) => {
                tracing::warn!("API secret cannot be checked: {}", e);
                false
            }
        }
    }
}

/// Generate a random API key, base64 encoded
pub fn generate_api_key() -> String {
    base64::engine::general_purpose::STANDARD.encode(random_bytes(API_KEY_BYTES))
}

/// Produce the stored secret for an API key
pub fn generate_api_secret(key: &str) -> Result<ApiSecret> {
    ApiSecret::generate(key)
}

/// Returns true when `supplied` is the key `stored` was generated from
pub fn authenticate_api_key(stored: &ApiSecret, supplied: &str) -> bool {
    stored.verify(supplied)
}

fn random_bytes(len: usize) -> Vec<u8> {
    let mut buffer = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut buffer);
    buffer
}

fn scrypt_params(log_n: u8, r: u32, p: u32) -> Result<scrypt::Params> {
    scrypt::Params::new(log_n, r, p, V1_HASH_LEN)
        .map_err(|e| RagbotError::Config(format!("invalid scrypt parameters: {e}")))
}

fn derive_v1(key: &[u8], salt: &[u8], log_n: u8, r: u32, p: u32) -> Result<Vec<u8>> {
    let params = scrypt_params(log_n, r, p)?;
    let mut out = vec![0u8; V1_HASH_LEN];
    scrypt::scrypt(key, salt, &params, &mut out)
        .map_err(|e| RagbotError::Auth(format!("scrypt failed: {e}")))?;
    Ok(out)
}
