use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::JwtError;

/// Issuer stamped on every token and required on validation.
pub const ISSUER: &str = "FestiveGuest";

/// Audience stamped on every token and required on validation.
pub const AUDIENCE: &str = "FestiveGuest";

/// The only signing algorithm produced or accepted.
pub const ALGORITHM: Algorithm = Algorithm::HS256;

/// Allowed clock drift between issuing and validating hosts.
pub const CLOCK_SKEW_SECONDS: u64 = 5 * 60;

/// JWT token handler for encoding and decoding identity tokens.
///
/// Issuer, audience and algorithm are fixed; the only input is the secret.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Symmetric signing secret
    ///
    /// # Returns
    /// JwtHandler instance configured with HS256, fixed issuer/audience and clock skew
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = CLOCK_SKEW_SECONDS;
        validation.validate_exp = true;
        validation.set_issuer(&[ISSUER]);
        validation.set_audience(&[AUDIENCE]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign claims into a compact JWT.
    ///
    /// Issuer and audience are overwritten with the fixed values.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        let claims = claims.clone().with_issuer(ISSUER).with_audience(AUDIENCE);

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify signature, algorithm, issuer, audience and expiry, then decode claims.
    ///
    /// # Errors
    /// * `Malformed` - Token is not a decodable JWT
    /// * `TokenExpired` - Expired beyond the clock skew allowance
    /// * `InvalidSignature` - Signature does not match the secret
    /// * `InvalidAlgorithm` - Header names an algorithm other than HS256
    /// * `InvalidIssuer` / `InvalidAudience` - Foreign token
    /// * `MissingClaim` - A required registered claim is absent
    pub fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;

        Ok(token_data.claims)
    }
}
