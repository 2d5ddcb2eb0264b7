use std::{fmt, sync::Arc};

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::principal::Principal;

/// Failures produced while issuing or verifying a session token.
///
/// These never leave the auth core: the principal resolver collapses every variant
/// into "no session".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed session token")]
    Malformed,
    #[error("session token signature mismatch")]
    Invalid,
    #[error("session token expired")]
    Expired,
    #[error("session claims incomplete: {0}")]
    Encoding(&'static str),
}

/// Claims
///
/// The payload signed into every session token. The principal is flattened so the
/// `role` discriminant sits next to `iat`/`exp` at the top level of the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub principal: Principal,
    /// Issued At, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiration Time, seconds since the Unix epoch. Valid while `now <= exp`.
    pub exp: i64,
}

/// Source of "now" for token issuance and expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// Wall clock backed by `chrono::Utc`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// A clock frozen at a given Unix timestamp.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}

/// TokenCodec
///
/// Issues and verifies HS256 session tokens. The key material is held only here and
/// is never formatted, logged or serialized.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

/// Shared handle used in the application state.
pub type TokenCodecState = Arc<TokenCodec>;

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self::with_clock(secret, ttl, Arc::new(SystemClock))
    }

    /// Builds a codec that reads the current time from `clock`.
    pub fn with_clock(secret: &[u8], ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
            clock,
        }
    }

    /// Default session lifetime, also used as the cookie `Max-Age`.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `principal` using the configured session lifetime.
    pub fn issue_session(&self, principal: &Principal) -> Result<String, TokenError> {
        self.issue(principal, self.ttl)
    }

    /// issue
    ///
    /// Signs `principal` into a token valid from now until now + `ttl` inclusive.
    pub fn issue(&self, principal: &Principal, ttl: Duration) -> Result<String, TokenError> {
        principal.ensure_complete()?;
        if ttl.num_seconds() < 1 {
            return Err(TokenError::Encoding("ttl must be at least one second"));
        }

        let iat = self.clock.now();
        let claims = Claims {
            principal: principal.clone(),
            iat,
            exp: iat + ttl.num_seconds(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| TokenError::Encoding("claims could not be serialized"))
    }

    /// verify
    ///
    /// Checks the signature, then expiry against the codec's clock. Expiry is checked
    /// here rather than by `jsonwebtoken` so it follows the injected clock with no
    /// leeway.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::Invalid,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;

        if self.clock.now() > data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}
