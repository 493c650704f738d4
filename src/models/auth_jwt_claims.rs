use serde::{Deserialize, Serialize};

use crate::models::claim::{claim_types, Claim};

/// JWT claims structure that will be encoded/decoded for authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Subject (username)
    pub sub: String,
    /// User email
    pub email: String,
    /// JWT ID (unique identifier for the token)
    pub jti: String,
    /// Issued at (as UTC timestamp)
    pub iat: i64,
    /// Not valid before (as UTC timestamp, equals iat)
    pub nbf: i64,
    /// Expiration time (as UTC timestamp)
    pub exp: i64,
    /// Ordered non-registered claims: user claims, then one role claim per
    /// role immediately followed by that role's claims. Duplicate types
    /// are legal.
    #[serde(default)]
    pub claims: Vec<Claim>,
}

impl Claims {
    /// Role names carried by this token, in claim order.
    pub fn role_names(&self) -> Vec<String> {
        self.claims
            .iter()
            .filter(|c| c.claim_type == claim_types::ROLE)
            .map(|c| c.value.clone())
            .collect()
    }

    /// True when the token carries at least one claim with the exact
    /// `(claim_type, value)` pair.
    pub fn has_claim(&self, claim_type: &str, value: &str) -> bool {
        self.claims
            .iter()
            .any(|c| c.claim_type == claim_type && c.value == value)
    }
}
