use std::fmt;

use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;

use super::errors::JwtError;

/// Key material used to sign and verify every token the service handles.
///
/// Access and refresh tokens go through the same scheme. There is no way to
/// sign with one key family and verify with another.
#[derive(Clone)]
pub enum SigningScheme {
    /// HMAC with SHA-256 over a shared secret.
    Hs256 { secret: Vec<u8> },

    /// RSA PKCS#1 v1.5 with SHA-256. Keys are PEM encoded.
    Rs256 {
        private_key_pem: String,
        public_key_pem: String,
    },
}

impl SigningScheme {
    /// Shortest accepted HS256 secret (256 bits).
    pub const MIN_SECRET_LEN: usize = 32;

    pub fn hs256(secret: impl AsRef<[u8]>) -> Self {
        Self::Hs256 {
            secret: secret.as_ref().to_vec(),
        }
    }

    pub fn rs256(private_key_pem: impl Into<String>, public_key_pem: impl Into<String>) -> Self {
        Self::Rs256 {
            private_key_pem: private_key_pem.into(),
            public_key_pem: public_key_pem.into(),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            SigningScheme::Hs256 { .. } => Algorithm::HS256,
            SigningScheme::Rs256 { .. } => Algorithm::RS256,
        }
    }

    /// Build the encoding and decoding keys.
    ///
    /// # Errors
    /// * `InvalidKey` - Secret too short or PEM material unparseable
    pub(crate) fn keys(&self) -> Result<(EncodingKey, DecodingKey), JwtError> {
        match self {
            SigningScheme::Hs256 { secret } => {
                if secret.len() < Self::MIN_SECRET_LEN {
                    return Err(JwtError::InvalidKey(format!(
                        "HS256 secret must be at least {} bytes, got {}",
                        Self::MIN_SECRET_LEN,
                        secret.len()
                    )));
                }
                Ok((
                    EncodingKey::from_secret(secret),
                    DecodingKey::from_secret(secret),
                ))
            }
            SigningScheme::Rs256 {
                private_key_pem,
                public_key_pem,
            } => {
                let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
                    .map_err(|e| JwtError::InvalidKey(format!("RSA private key: {}", e)))?;
                let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
                    .map_err(|e| JwtError::InvalidKey(format!("RSA public key: {}", e)))?;
                Ok((encoding_key, decoding_key))
            }
        }
    }
}

// Key material stays out of logs.
impl fmt::Debug for SigningScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigningScheme::Hs256 { .. } => f.write_str("SigningScheme::Hs256(..)"),
            SigningScheme::Rs256 { .. } => f.write_str("SigningScheme::Rs256(..)"),
        }
    }
}
