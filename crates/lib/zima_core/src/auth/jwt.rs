//! Bearer token issuance and validation (HS256 JWT).

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::AuthError;
use crate::models::auth::TokenClaims;

/// Default bearer token lifetime: 24 hours.
pub const DEFAULT_ACCESS_TOKEN_TTL_MINUTES: i64 = 1440;

/// Claims the issuer owns; callers cannot override them.
const RESERVED_CLAIMS: [&str; 4] = ["sub", "exp", "iat", "aud"];

/// Signs and verifies bearer tokens with a process-wide secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Create an issuer from the signing secret and the default token lifetime.
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Default lifetime applied when `issue` is called without an explicit TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject` carrying `claims`, expiring `ttl` from now.
    pub fn issue(
        &self,
        subject: &str,
        claims: Map<String, Value>,
        ttl: Option<Duration>,
    ) -> Result<String, AuthError> {
        self.issue_at(subject, claims, ttl.unwrap_or(self.ttl), Utc::now())
    }

    /// Issue a token as if it had been issued at `issued_at`.
    pub fn issue_at(
        &self,
        subject: &str,
        mut claims: Map<String, Value>,
        ttl: Duration,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        if ttl <= Duration::zero() {
            return Err(AuthError::ValidationError("token TTL must be positive".into()));
        }
        for reserved in RESERVED_CLAIMS {
            claims.remove(reserved);
        }
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::ValidationError("token TTL too large".into()))?;
        let claims = TokenClaims {
            sub: subject.to_string(),
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
            extra: claims,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
    }

    /// Verify signature and expiry, returning the claims on success.
    pub fn validate(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<TokenClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let reason = match e.kind() {
                    ErrorKind::ExpiredSignature => "expired",
                    ErrorKind::InvalidSignature => "bad signature",
                    _ => "malformed",
                };
                AuthError::InvalidToken(reason.into())
            })?;

        // A token is valid only strictly before its expiry.
        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::InvalidToken("expired".into()));
        }
        Ok(claims)
    }
}

/// Resolve the JWT secret: env var `JWT_SECRET` → `AUTH_SECRET` → persisted file.
pub fn resolve_jwt_secret() -> String {
    resolve_jwt_secret_with(|var| std::env::var(var).ok())
}

/// Like [`resolve_jwt_secret`], reading variables through `lookup`.
pub fn resolve_jwt_secret_with(lookup: impl Fn(&str) -> Option<String>) -> String {
    for var in ["JWT_SECRET", "AUTH_SECRET"] {
        if let Some(secret) = lookup(var)
            && !secret.is_empty()
        {
            return secret;
        }
    }
    load_or_create_secret(&jwt_secret_path())
}

/// Read the secret stored at `path`, generating and persisting one if absent.
pub fn load_or_create_secret(path: &Path) -> String {
    if let Ok(existing) = std::fs::read_to_string(path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match std::fs::write(path, &secret) {
        Ok(()) => info!(path = %path.display(), "generated new JWT secret"),
        Err(e) => warn!(path = %path.display(), error = %e, "could not persist JWT secret"),
    }
    secret
}

/// Path to the persisted JWT secret file.
pub fn jwt_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("zima")
        .join("jwt-secret")
}
