//! Bearer token models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JWT claims embedded in bearer tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: account email (standard JWT `sub` claim).
    pub sub: String,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Caller-supplied claims (e.g. `role`, `plan`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenClaims {
    /// String-valued extra claim, if present.
    pub fn claim_str(&self, name: &str) -> Option<&str> {
        self.extra.get(name).and_then(Value::as_str)
    }
}
