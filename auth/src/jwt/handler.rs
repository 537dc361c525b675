use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::JwtError;
use super::signing::SigningScheme;

/// JWT token handler for encoding and decoding tokens.
///
/// Keys are derived once from a [`SigningScheme`] and never change for the
/// lifetime of the handler. Rotating keys means building a new handler.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    leeway_seconds: u64,
}

impl JwtHandler {
    /// Create a handler for `scheme`.
    ///
    /// # Arguments
    /// * `scheme` - Key material shared by access and refresh tokens
    /// * `leeway_seconds` - Clock skew tolerated on `exp` and `nbf`
    ///
    /// # Errors
    /// * `InvalidKey` - Key material rejected
    pub fn new(scheme: &SigningScheme, leeway_seconds: u64) -> Result<Self, JwtError> {
        let (encoding_key, decoding_key) = scheme.keys()?;

        Ok(Self {
            encoding_key,
            decoding_key,
            algorithm: scheme.algorithm(),
            leeway_seconds,
        })
    }

    /// Sign claims into a compact JWT.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify signature and validity window, then return the claims.
    ///
    /// The signature is checked before any time claim, so a tampered token
    /// is reported as `InvalidSignature` even when it is also stale.
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature mismatch or unexpected algorithm
    /// * `Expired` - `exp` has passed
    /// * `NotYetValid` - `nbf` is in the future
    /// * `Malformed` - Not a JWT, or the payload is not a valid claim set
    pub fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = self.leeway_seconds;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "nbf", "sub"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    JwtError::InvalidSignature
                }
                ErrorKind::ExpiredSignature => JwtError::Expired,
                ErrorKind::ImmatureSignature => JwtError::NotYetValid,
                _ => JwtError::Malformed(e.to_string()),
            })
    }
}
