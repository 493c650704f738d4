use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of a successful token issuance.
///
/// The signed token text is what travels to clients; the metadata is kept
/// for callers that schedule renewal without re-decoding the token.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IssuedToken {
    #[serde(rename = "AccessToken")]
    pub access_token: String,
    /// Validity window in minutes.
    #[serde(rename = "ValidFor")]
    pub valid_for: i64,
    #[serde(rename = "ExpiresUtc")]
    pub expires_utc: DateTime<Utc>,
}
