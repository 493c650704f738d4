use serde::{Deserialize, Serialize};

/// Claim types used by the token issuer and the authorization gate.
pub mod claim_types {
    pub const ISSUER: &str = "iss";
    pub const SUBJECT: &str = "sub";
    pub const EMAIL: &str = "email";
    pub const TOKEN_ID: &str = "jti";
    pub const ISSUED_AT: &str = "iat";
    pub const ROLE: &str = "role";
}

/// Issuer recorded on claims attached directly in the identity store
/// (as opposed to claims minted by the token issuer itself).
pub const LOCAL_ISSUER: &str = "local";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimValueType {
    String,
    Integer,
    Boolean,
}

/// A typed key/value assertion about a principal.
///
/// Claim types are NOT unique: a principal may carry several claims of the
/// same type (e.g. one `Department` claim per role). Insertion order is
/// preserved end to end.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(rename = "type")]
    pub claim_type: String,
    pub value: String,
    pub value_type: ClaimValueType,
    pub issuer: String,
}

impl Claim {
    pub fn new(claim_type: &str, value: &str, value_type: ClaimValueType, issuer: &str) -> Self {
        Self {
            claim_type: claim_type.to_string(),
            value: value.to_string(),
            value_type,
            issuer: issuer.to_string(),
        }
    }

    /// Shorthand for a string-valued claim from the identity store.
    pub fn stored(claim_type: &str, value: &str) -> Self {
        Self::new(claim_type, value, ClaimValueType::String, LOCAL_ISSUER)
    }
}
