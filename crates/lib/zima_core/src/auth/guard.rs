//! Role/plan authorization guard.
//!
//! Roles and plans are each compared through an explicit total order. The
//! order is configuration, not code: deployments disagree on whether
//! `institutional` sits above `pro`, so both orders can be overridden with a
//! comma-separated list (lowest first) that names every value exactly once.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::AuthError;
use crate::models::account::{Identity, Plan, Role, UnknownVariant};

/// Default role order, lowest first.
pub const DEFAULT_ROLE_ORDER: [Role; 3] = [Role::User, Role::Institutional, Role::Admin];

/// Default plan order, lowest first.
pub const DEFAULT_PLAN_ORDER: [Plan; 5] = [
    Plan::Freemium,
    Plan::Basic,
    Plan::Pro,
    Plan::Institutional,
    Plan::Lifetime,
];

/// A closed set of values that can be ranked.
pub trait Tier: Copy + Eq + fmt::Display + FromStr<Err = UnknownVariant> + 'static {
    const KIND: &'static str;
    fn all() -> &'static [Self];
}

impl Tier for Role {
    const KIND: &'static str = "role";
    fn all() -> &'static [Self] {
        &Role::ALL
    }
}

impl Tier for Plan {
    const KIND: &'static str = "plan";
    fn all() -> &'static [Self] {
        &Plan::ALL
    }
}

/// Errors building a ranking from configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RankingError {
    #[error(transparent)]
    Unknown(#[from] UnknownVariant),

    #[error("{kind} '{value}' listed more than once")]
    Duplicate { kind: &'static str, value: String },

    #[error("{kind} '{value}' missing from order")]
    Missing { kind: &'static str, value: String },
}

/// Total order over a [`Tier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking<T: Tier> {
    order: Vec<T>,
}

impl<T: Tier> Ranking<T> {
    /// Build a ranking from `order` (lowest first). Every value must appear once.
    pub fn new(order: Vec<T>) -> Result<Self, RankingError> {
        for (i, value) in order.iter().enumerate() {
            if order[..i].contains(value) {
                return Err(RankingError::Duplicate {
                    kind: T::KIND,
                    value: value.to_string(),
                });
            }
        }
        if let Some(missing) = T::all().iter().find(|v| !order.contains(*v)) {
            return Err(RankingError::Missing {
                kind: T::KIND,
                value: missing.to_string(),
            });
        }
        Ok(Self { order })
    }

    /// Parse a comma-separated order, e.g. `"user,institutional,admin"`.
    pub fn parse(spec: &str) -> Result<Self, RankingError> {
        let order = spec
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<T>)
            .collect::<Result<Vec<T>, _>>()?;
        Self::new(order)
    }

    fn rank(&self, value: T) -> usize {
        // `new` guarantees every value is present.
        self.order.iter().position(|v| *v == value).unwrap_or(0)
    }

    /// Whether `value` ranks at or above `minimum`.
    pub fn at_least(&self, value: T, minimum: T) -> bool {
        self.rank(value) >= self.rank(minimum)
    }
}

impl Default for Ranking<Role> {
    fn default() -> Self {
        Self {
            order: DEFAULT_ROLE_ORDER.to_vec(),
        }
    }
}

impl Default for Ranking<Plan> {
    fn default() -> Self {
        Self {
            order: DEFAULT_PLAN_ORDER.to_vec(),
        }
    }
}

/// Enforces role- and plan-based access for resolved identities.
#[derive(Debug, Clone, Default)]
pub struct Guard {
    roles: Ranking<Role>,
    plans: Ranking<Plan>,
}

impl Guard {
    pub fn new(roles: Ranking<Role>, plans: Ranking<Plan>) -> Self {
        Self { roles, plans }
    }

    /// Pass `identity` through if its role ranks at or above `required`.
    pub fn require<'a>(
        &self,
        identity: &'a Identity,
        required: Role,
    ) -> Result<&'a Identity, AuthError> {
        if self.roles.at_least(identity.role, required) {
            Ok(identity)
        } else {
            Err(AuthError::Forbidden(format!("role '{required}' required")))
        }
    }

    /// Pass `identity` through if its plan ranks at or above `minimum`.
    pub fn require_plan<'a>(
        &self,
        identity: &'a Identity,
        minimum: Plan,
    ) -> Result<&'a Identity, AuthError> {
        if self.plan_at_least(identity.plan, minimum) {
            Ok(identity)
        } else {
            Err(AuthError::Forbidden(format!("plan '{minimum}' or higher required")))
        }
    }

    pub fn plan_at_least(&self, plan: Plan, minimum: Plan) -> bool {
        self.plans.at_least(plan, minimum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Role, plan: Plan) -> Identity {
        Identity {
            account_id: "acc-1".into(),
            email: "a@x.com".into(),
            role,
            plan,
        }
    }

    #[test]
    fn user_cannot_pass_admin_check() {
        let guard = Guard::default();
        let user = identity(Role::User, Plan::Freemium);
        assert!(matches!(
            guard.require(&user, Role::Admin),
            Err(AuthError::Forbidden(_))
        ));
        assert!(guard.require(&user, Role::User).is_ok());
    }

    #[test]
    fn admin_satisfies_every_role_by_default() {
        let guard = Guard::default();
        let admin = identity(Role::Admin, Plan::Freemium);
        for role in Role::ALL {
            assert!(guard.require(&admin, role).is_ok(), "admin should pass {role}");
        }
    }

    #[test]
    fn institutional_sits_between_user_and_admin() {
        let guard = Guard::default();
        let inst = identity(Role::Institutional, Plan::Institutional);
        assert!(guard.require(&inst, Role::User).is_ok());
        assert!(guard.require(&inst, Role::Admin).is_err());
    }

    #[test]
    fn plan_order_is_configurable() {
        let default = Guard::default();
        assert!(default.plan_at_least(Plan::Institutional, Plan::Pro));

        let plans =
            Ranking::<Plan>::parse("freemium, basic, institutional, pro, lifetime").unwrap();
        let guard = Guard::new(Ranking::default(), plans);
        assert!(!guard.plan_at_least(Plan::Institutional, Plan::Pro));
        let inst = identity(Role::User, Plan::Institutional);
        assert!(guard.require_plan(&inst, Plan::Pro).is_err());
        assert!(guard.require_plan(&inst, Plan::Basic).is_ok());
    }

    #[test]
    fn ranking_rejects_incomplete_or_repeated_orders() {
        assert_eq!(
            Ranking::<Role>::parse("user,admin"),
            Err(RankingError::Missing {
                kind: "role",
                value: "institutional".into()
            })
        );
        assert_eq!(
            Ranking::<Role>::parse("user,admin,user,institutional"),
            Err(RankingError::Duplicate {
                kind: "role",
                value: "user".into()
            })
        );
        assert!(matches!(
            Ranking::<Role>::parse("user,root,admin"),
            Err(RankingError::Unknown(_))
        ));
    }

    #[test]
    fn default_rankings_are_valid() {
        assert!(Ranking::<Role>::new(DEFAULT_ROLE_ORDER.to_vec()).is_ok());
        assert!(Ranking::<Plan>::new(DEFAULT_PLAN_ORDER.to_vec()).is_ok());
    }
}
