//! Account domain models.
//!
//! Roles and plans are closed enumerations. They travel as lowercase strings
//! on the wire and in the database; anything else is rejected at the edge.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A string did not name a known role or plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Account role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
    Institutional,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Admin, Role::Institutional];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Institutional => "institutional",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant {
                kind: "role",
                value: s.to_string(),
            })
    }
}

/// Commercial tier, orthogonal to [`Role`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Freemium,
    Basic,
    Pro,
    Institutional,
    Lifetime,
}

impl Plan {
    pub const ALL: [Plan; 5] = [
        Plan::Freemium,
        Plan::Basic,
        Plan::Pro,
        Plan::Institutional,
        Plan::Lifetime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Freemium => "freemium",
            Plan::Basic => "basic",
            Plan::Pro => "pro",
            Plan::Institutional => "institutional",
            Plan::Lifetime => "lifetime",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Plan::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant {
                kind: "plan",
                value: s.to_string(),
            })
    }
}

/// Stored account, including the password hash.
///
/// Never serialize this type to clients; use [`AccountSummary`].
#[derive(Debug, Clone)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub plan: Plan,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Identity resolved from this account for authorization checks.
    pub fn identity(&self) -> Identity {
        Identity {
            account_id: self.id.clone(),
            email: self.email.clone(),
            role: self.role,
            plan: self.plan,
        }
    }

    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            id: self.id.clone(),
            email: self.email.clone(),
            role: self.role,
            plan: self.plan,
            disabled: self.disabled,
            created_at: self.created_at,
            last_login_at: self.last_login_at,
        }
    }
}

/// Client-facing view of an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub plan: Plan,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Authenticated caller, as seen by the authorization guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub account_id: String,
    pub email: String,
    pub role: Role,
    pub plan: Plan,
}

/// Trim and lowercase an email, rejecting anything without a `local@domain` shape.
pub fn normalize_email(email: &str) -> Option<String> {
    let email = email.trim().to_ascii_lowercase();
    let (local, domain) = email.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    if email.chars().any(char::is_whitespace) {
        return None;
    }
    Some(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!(" institutional ".parse::<Role>(), Ok(Role::Institutional));
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn plan_round_trips_through_str() {
        for plan in Plan::ALL {
            assert_eq!(plan.as_str().parse::<Plan>(), Ok(plan));
        }
        let err = "enterprise".parse::<Plan>().unwrap_err();
        assert_eq!(err.to_string(), "unknown plan 'enterprise'");
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let plan: Plan = serde_json::from_str("\"lifetime\"").unwrap();
        assert_eq!(plan, Plan::Lifetime);
    }

    #[test]
    fn defaults_are_user_and_freemium() {
        assert_eq!(Role::default(), Role::User);
        assert_eq!(Plan::default(), Plan::Freemium);
    }

    #[test]
    fn normalize_email_lowercases_and_validates() {
        assert_eq!(normalize_email("  A@X.com "), Some("a@x.com".into()));
        assert_eq!(normalize_email("no-at-sign"), None);
        assert_eq!(normalize_email("@x.com"), None);
        assert_eq!(normalize_email("a@"), None);
        assert_eq!(normalize_email("a@b@c"), None);
        assert_eq!(normalize_email("a b@x.com"), None);
    }
}
