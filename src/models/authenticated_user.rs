use actix_web::{dev::Payload, Error, FromRequest, HttpMessage, HttpRequest};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

use crate::models::auth_jwt_claims::Claims;
use crate::models::claim::Claim;

/// The authenticated principal reconstructed from a validated token.
///
/// Built by the auth middleware and read back by handlers through the
/// `FromRequest` impl; nothing here is resolved from ambient state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
    pub claims: Vec<Claim>,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            username: claims.sub.clone(),
            email: claims.email.clone(),
            roles: claims.role_names(),
            claims: claims.claims.clone(),
        }
    }

    /// Exact, case-sensitive role membership check.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Exact match on both claim type and value.
    pub fn has_claim(&self, claim_type: &str, value: &str) -> bool {
        self.claims
            .iter()
            .any(|c| c.claim_type == claim_type && c.value == value)
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if let Some(user) = req.extensions().get::<AuthenticatedUser>() {
            ready(Ok(user.clone()))
        } else {
            ready(Err(actix_web::error::ErrorUnauthorized("Not authenticated")))
        }
    }
}
