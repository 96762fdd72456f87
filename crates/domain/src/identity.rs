//! Identity token service.
//!
//! Tokens are compact HS256 JWS strings:
//! `base64url(header).base64url(claims).base64url(signature)`, with claims
//! `{"user_id", "is_admin", "exp"}`. Verification needs nothing but the
//! signing secret, so a subject removed after issuance keeps a valid token
//! until it expires.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use common::{Identity, SubjectId};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretSlice, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Token lifetime, counted from issuance.
pub const TOKEN_TTL_HOURS: i64 = 24;

const ALGORITHM: &str = "HS256";

/// Errors raised while issuing or verifying tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The token is not three base64url segments carrying JSON.
    #[error("Malformed token")]
    Malformed,

    /// Wrong algorithm, or the signature does not match the key.
    #[error("Bad token signature")]
    BadSignature,

    /// The token's `exp` has passed.
    #[error("Token expired")]
    Expired,

    /// The signing key is unusable.
    #[error("Signing key unavailable: {0}")]
    SigningKey(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Claims carried by a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub is_admin: bool,
    /// Expiry as unix seconds.
    pub exp: i64,
}

/// Issues and verifies bearer tokens with a process-wide signing secret.
///
/// The secret is fixed at construction and only ever read afterwards, so one
/// instance can be shared across request tasks behind an `Arc`.
#[derive(Debug)]
pub struct TokenService {
    key: SecretSlice<u8>,
}

impl TokenService {
    /// Creates a token service. An empty secret is rejected.
    pub fn new(secret: &SecretString) -> Result<Self, TokenError> {
        let bytes = secret.expose_secret().as_bytes();
        if bytes.is_empty() {
            return Err(TokenError::SigningKey("secret is empty".to_string()));
        }
        Ok(Self {
            key: SecretSlice::from(bytes.to_vec()),
        })
    }

    /// Issues a token for `identity` that expires 24 hours from now.
    pub fn issue(&self, identity: Identity) -> Result<String, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issues a token as if the current time were `now`.
    pub fn issue_at(&self, identity: Identity, now: DateTime<Utc>) -> Result<String, TokenError> {
        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        };
        let claims = Claims {
            user_id: identity.subject_id.as_i64(),
            is_admin: identity.is_admin,
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };

        let header = serde_json::to_vec(&header).map_err(|e| TokenError::SigningKey(e.to_string()))?;
        let claims = serde_json::to_vec(&claims).map_err(|e| TokenError::SigningKey(e.to_string()))?;
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(claims)
        );

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        metrics::counter!("tokens_issued_total").increment(1);
        Ok(format!("{signing_input}.{signature}"))
    }

    /// Verifies a token and returns the identity it was issued for.
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies a token as if the current time were `now`.
    ///
    /// The signature is checked before the claims are trusted, so a forged
    /// token reports `BadSignature` even when its `exp` has also passed.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError> {
        let mut segments = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::Malformed);
        };

        let header: Header = decode_segment(header_b64)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::BadSignature);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::Malformed)?;
        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let claims: Claims = decode_segment(claims_b64)?;
        if claims.user_id < 1 {
            return Err(TokenError::Malformed);
        }
        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(Identity {
            subject_id: SubjectId::new(claims.user_id),
            is_admin: claims.is_admin,
        })
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(self.key.expose_secret())
            .map_err(|e| TokenError::SigningKey(e.to_string()))
    }
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}
