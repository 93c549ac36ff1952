//! Signing and verification of AquaDesk bearer tokens.
//!
//! Tokens are HS256 JWTs. Verification is a pure function of the token, the
//! current time and the signing key: the `*_at` variants take the time
//! explicitly, the plain variants read the wall clock. A [`TokenCodec`] is
//! immutable after construction and is shared between requests behind an
//! `Arc`.
//!
//! # Example
//!
//! ```ignore
//! use aquadesk_auth::TokenCodec;
//! use aquadesk_config::JwtConfig;
//!
//! let codec = TokenCodec::new(&JwtConfig::from_env());
//! let issued = codec.sign_access(&principal)?;
//! let claims = codec.verify_access(&issued.token)?;
//! ```

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use uuid::Uuid;

use aquadesk_config::JwtConfig;
use aquadesk_core::AppError;

use crate::claims::{AccessClaims, RefreshClaims, TokenKind};
use crate::principal::Principal;

/// Why a token was rejected.
///
/// The resolver treats every variant the same way (fall through to the next
/// strategy); the distinction only feeds logs and metrics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationFailure {
    #[error("token signature is invalid")]
    BadSignature,
    #[error("token expired at {expired_at}")]
    Expired { expired_at: i64 },
    #[error("expected a {expected} token, got a {actual} token")]
    WrongKind {
        expected: &'static str,
        actual: &'static str,
    },
    #[error("malformed token: {0}")]
    Malformed(String),
}

impl VerificationFailure {
    /// Short label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            VerificationFailure::BadSignature => "bad_signature",
            VerificationFailure::Expired { .. } => "expired",
            VerificationFailure::WrongKind { .. } => "wrong_kind",
            VerificationFailure::Malformed(_) => "malformed",
        }
    }
}

/// A freshly signed token with its validity window.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub kind: TokenKind,
    pub issued_at: i64,
    pub expires_at: i64,
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl: i64,
    refresh_ttl: i64,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

fn expiry(now: i64, ttl: i64) -> Result<i64, AppError> {
    now.checked_add(ttl)
        .ok_or_else(|| AppError::internal_error(format!("Token lifetime of {ttl}s overflows")))
}

impl TokenCodec {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the caller-supplied clock instead.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            access_ttl: config.access_token_expiry,
            refresh_ttl: config.refresh_token_expiry,
        }
    }

    /// Signs a token of the given kind for `principal`.
    pub fn sign(&self, principal: &Principal, kind: TokenKind) -> Result<IssuedToken, AppError> {
        let now = Utc::now().timestamp();
        match kind {
            TokenKind::Access => self.sign_access_at(principal, now),
            TokenKind::Refresh => self.sign_refresh_at(&principal.user_id, &principal.email, now),
        }
    }

    pub fn sign_access(&self, principal: &Principal) -> Result<IssuedToken, AppError> {
        self.sign_access_at(principal, Utc::now().timestamp())
    }

    pub fn sign_access_at(&self, principal: &Principal, now: i64) -> Result<IssuedToken, AppError> {
        let exp = expiry(now, self.access_ttl)?;
        let claims = AccessClaims::for_principal(principal, now, exp);
        self.encode_claims(&claims, TokenKind::Access, now, exp)
    }

    pub fn sign_refresh(&self, user_id: &str, email: &str) -> Result<IssuedToken, AppError> {
        self.sign_refresh_at(user_id, email, Utc::now().timestamp())
    }

    pub fn sign_refresh_at(
        &self,
        user_id: &str,
        email: &str,
        now: i64,
    ) -> Result<IssuedToken, AppError> {
        let exp = expiry(now, self.refresh_ttl)?;
        let claims = RefreshClaims {
            user_id: user_id.to_string(),
            email: email.to_string(),
            typ: TokenKind::Refresh,
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp,
        };
        self.encode_claims(&claims, TokenKind::Refresh, now, exp)
    }

    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, VerificationFailure> {
        self.verify_access_at(token, Utc::now().timestamp())
    }

    pub fn verify_access_at(
        &self,
        token: &str,
        now: i64,
    ) -> Result<AccessClaims, VerificationFailure> {
        self.decode_at(token, TokenKind::Access, now)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, VerificationFailure> {
        self.verify_refresh_at(token, Utc::now().timestamp())
    }

    pub fn verify_refresh_at(
        &self,
        token: &str,
        now: i64,
    ) -> Result<RefreshClaims, VerificationFailure> {
        self.decode_at(token, TokenKind::Refresh, now)
    }

    fn encode_claims<C: Serialize>(
        &self,
        claims: &C,
        kind: TokenKind,
        issued_at: i64,
        expires_at: i64,
    ) -> Result<IssuedToken, AppError> {
        let token = encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(|e| {
            AppError::internal_error(format!("Failed to create {} token: {}", kind.as_str(), e))
        })?;

        Ok(IssuedToken {
            token,
            kind,
            issued_at,
            expires_at,
        })
    }

    fn decode_at<C: DeserializeOwned>(
        &self,
        token: &str,
        expected: TokenKind,
        now: i64,
    ) -> Result<C, VerificationFailure> {
        let data = decode::<serde_json::Value>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    VerificationFailure::BadSignature
                }
                _ => VerificationFailure::Malformed(e.to_string()),
            })?;
        let payload = data.claims;

        let kind: TokenKind = payload
            .get("typ")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| VerificationFailure::Malformed(e.to_string()))?
            .ok_or_else(|| VerificationFailure::Malformed("missing typ claim".to_string()))?;
        if kind != expected {
            return Err(VerificationFailure::WrongKind {
                expected: expected.as_str(),
                actual: kind.as_str(),
            });
        }

        let exp = payload
            .get("exp")
            .and_then(serde_json::Value::as_i64)
            .ok_or_else(|| VerificationFailure::Malformed("exp is not an integer".to_string()))?;
        if now >= exp {
            return Err(VerificationFailure::Expired { expired_at: exp });
        }

        serde_json::from_value(payload).map_err(|e| VerificationFailure::Malformed(e.to_string()))
    }
}
