use log::debug;
use std::collections::HashMap;

use crate::error::{AppError, AppResult};
use crate::models::authenticated_user::AuthenticatedUser;

/// A named access rule evaluated against the caller's claim set.
#[derive(Clone, Debug)]
pub enum Policy {
    /// Permit iff the caller holds a role claim equal to the name
    /// (case-sensitive).
    RequireRole(String),
    /// Permit iff the caller holds at least one claim with this exact
    /// `(type, value)` pair.
    RequireClaim { claim_type: String, value: String },
}

/// Named policies, registered once at startup and evaluated per endpoint.
/// Everything fails closed: an unknown policy name denies.
pub struct PolicyRegistry {
    policies: HashMap<String, Policy>,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        Self {
            policies: HashMap::new(),
        }
    }

    /// The registry used by the demo endpoints.
    pub fn demo_policies() -> Self {
        let mut registry = Self::new();
        registry.add_policy("HR Only", Policy::RequireRole("HR-Worker".to_string()));
        registry.add_policy(
            "HR-Manager Only",
            Policy::RequireClaim {
                claim_type: "CeoApproval".to_string(),
                value: "true".to_string(),
            },
        );
        registry
    }

    pub fn add_policy(&mut self, name: &str, policy: Policy) {
        self.policies.insert(name.to_string(), policy);
    }

    pub fn evaluate(&self, name: &str, user: &AuthenticatedUser) -> bool {
        match self.policies.get(name) {
            Some(Policy::RequireRole(role)) => user.has_role(role),
            Some(Policy::RequireClaim { claim_type, value }) => user.has_claim(claim_type, value),
            None => {
                debug!("Unknown policy {} denies by default", name);
                false
            }
        }
    }

    /// Evaluate and turn a denial into the typed forbidden outcome.
    pub fn authorize(&self, name: &str, user: &AuthenticatedUser) -> AppResult<()> {
        if self.evaluate(name, user) {
            Ok(())
        } else {
            debug!("Policy {} denied for {}", name, user.username);
            Err(AppError::Forbidden(format!(
                "Policy not satisfied: {}",
                name
            )))
        }
    }
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth_jwt_claims::Claims;
    use crate::models::claim::{claim_types, Claim, ClaimValueType};

    fn user(roles: &[&str], claims: Vec<Claim>) -> AuthenticatedUser {
        let mut all: Vec<Claim> = roles
            .iter()
            .map(|r| Claim::new(claim_types::ROLE, r, ClaimValueType::String, "test"))
            .collect();
        all.extend(claims);

        AuthenticatedUser::from_claims(&Claims {
            iss: "test".to_string(),
            aud: "test".to_string(),
            sub: "someone".to_string(),
            email: "someone@xyz.com".to_string(),
            jti: "jti".to_string(),
            iat: 0,
            nbf: 0,
            exp: 0,
            claims: all,
        })
    }

    #[test]
    fn role_policy_permits_exact_role_holder() {
        let registry = PolicyRegistry::demo_policies();

        assert!(registry.evaluate("HR Only", &user(&["Employee", "HR-Worker"], vec![])));
        assert!(!registry.evaluate("HR Only", &user(&["Employee"], vec![])));
    }

    #[test]
    fn role_match_is_case_sensitive() {
        let registry = PolicyRegistry::demo_policies();

        assert!(!registry.evaluate("HR Only", &user(&["hr-worker"], vec![])));
    }

    #[test]
    fn claim_policy_needs_exact_type_and_value() {
        let registry = PolicyRegistry::demo_policies();

        let approved = user(&[], vec![Claim::stored("CeoApproval", "true")]);
        let not_approved = user(&[], vec![Claim::stored("CeoApproval", "false")]);

        assert!(registry.evaluate("HR-Manager Only", &approved));
        assert!(!registry.evaluate("HR-Manager Only", &not_approved));
    }

    #[test]
    fn unknown_policy_fails_closed() {
        let registry = PolicyRegistry::demo_policies();
        let anyone = user(&["HR-Worker"], vec![Claim::stored("CeoApproval", "true")]);

        assert!(!registry.evaluate("No Such Policy", &anyone));
    }

    #[test]
    fn authorize_maps_denial_to_forbidden() {
        let registry = PolicyRegistry::demo_policies();
        let result = registry.authorize("HR Only", &user(&[], vec![]));

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
