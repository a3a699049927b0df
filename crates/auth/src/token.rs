use core::fmt;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use thiserror::Error;

use httpkit_core::headers::BEARER_SCHEME;

use crate::claims::{Claims, RawClaims};
use crate::config::AuthConfig;

/// Why a bearer token was not accepted.
///
/// Checks run in declaration order and stop at the first failure. The variant
/// is diagnostic only: every rejection maps to the same `401` response.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    #[error("authorization header is absent or empty")]
    NoToken,

    #[error("authorization header is not `Bearer <credential>`")]
    Malformed,

    #[error("token failed verification")]
    SignatureInvalid,

    #[error("token claims lack a numeric expiration")]
    InvalidClaims,

    #[error("token has expired")]
    Expired,
}

/// HMAC bearer-token validator.
///
/// Holds only read-only key material; share it behind an `Arc`.
#[derive(Clone)]
pub struct TokenValidator {
    key: DecodingKey,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        // `exp` is checked by `Claims` against the caller's clock.
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_aud = false;
        // A token used before its `nbf` does not verify. No clock skew allowance.
        validation.validate_nbf = true;
        validation.leeway = 0;

        Self {
            key: DecodingKey::from_secret(config.secret()),
            validation,
        }
    }

    /// Validate the raw `Authorization` header value at instant `now`.
    pub fn validate(
        &self,
        header: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenRejection> {
        let header = header
            .filter(|h| !h.is_empty())
            .ok_or(TokenRejection::NoToken)?;

        let credential = split_bearer(header)?;
        let raw = self.verify(credential)?;
        let claims = Claims::try_from(raw)?;

        if claims.is_expired(now) {
            return Err(TokenRejection::Expired);
        }

        Ok(claims)
    }

    fn verify(&self, credential: &str) -> Result<RawClaims, TokenRejection> {
        jsonwebtoken::decode::<RawClaims>(credential, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| TokenRejection::SignatureInvalid)
    }
}

impl fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenValidator")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}

/// Split `Bearer <credential>` on single spaces; exactly two parts allowed.
fn split_bearer(header: &str) -> Result<&str, TokenRejection> {
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(credential), None) if scheme == BEARER_SCHEME => Ok(credential),
        _ => Err(TokenRejection::Malformed),
    }
}
