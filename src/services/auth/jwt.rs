use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::{debug, error, warn};
use std::fmt;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::{AppError, AppResult};
use crate::models::auth_jwt_claims::Claims;
use crate::models::claim::{claim_types, Claim};
use crate::models::issued_token::IssuedToken;
use crate::services::auth::claims::assemble_claims;
use crate::store::{IdentityStore, StoredUser};

/// HS256 floor: secrets shorter than the hash output are rejected outright.
const MIN_SECRET_BYTES: usize = 32;

/// Why a presented token was rejected. Routine outcomes, never panics:
/// only configuration problems are fatal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationFailure {
    BadSignature,
    Expired,
    Malformed,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationFailure::BadSignature => write!(f, "Token signature is invalid"),
            ValidationFailure::Expired => write!(f, "Token has expired"),
            ValidationFailure::Malformed => write!(f, "Token is malformed"),
        }
    }
}

/// Which claim checks to apply on top of signature and lifetime.
#[derive(Clone, Copy, Debug)]
pub struct ValidationOptions {
    pub validate_issuer: bool,
    pub validate_audience: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            validate_issuer: true,
            validate_audience: true,
        }
    }
}

impl ValidationOptions {
    /// Renewal trusts signature and lifetime only; the token being renewed
    /// was issued here, so issuer/audience re-checks add nothing.
    pub fn renewal() -> Self {
        Self {
            validate_issuer: false,
            validate_audience: false,
        }
    }
}

/// Issues, validates and renews the signed tokens gating the resource API.
///
/// Holds the process-wide symmetric key material; read-only after
/// construction and safe to share across concurrent requests.
pub struct JwtIssuer {
    issuer: String,
    audience: String,
    valid_for_minutes: i64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtIssuer {
    pub fn from_config(config: &AuthConfig) -> AppResult<Self> {
        if config.jwt_secret.len() < MIN_SECRET_BYTES {
            return Err(AppError::Configuration(format!(
                "JWT_SECRET must be at least {} bytes for HS256",
                MIN_SECRET_BYTES
            )));
        }

        let secret = config.jwt_secret.as_bytes();

        Ok(Self {
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            valid_for_minutes: config.token_valid_minutes,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        })
    }

    pub fn issuer_name(&self) -> &str {
        &self.issuer
    }

    /// Issue a fresh token for the user, with claims assembled from the
    /// identity store at this moment.
    pub async fn issue(
        &self,
        user: &StoredUser,
        store: &dyn IdentityStore,
    ) -> AppResult<IssuedToken> {
        let issued_at = Utc::now();
        let jti = Uuid::new_v4().to_string();

        let expires_at = issued_at
            .checked_add_signed(
                Duration::try_minutes(self.valid_for_minutes)
                    .ok_or_else(|| AppError::Internal("Token validity overflows".to_string()))?,
            )
            .ok_or_else(|| AppError::Internal("Failed to calculate token expiration".to_string()))?;

        let assembled =
            assemble_claims(user, store, &self.issuer, &jti, issued_at.timestamp()).await;

        // Registered claims travel as top-level JWT fields; everything
        // else keeps its assembly order in the claims array.
        let custom: Vec<Claim> = assembled
            .into_iter()
            .filter(|c| !is_registered_claim(&c.claim_type))
            .collect();

        let claims = Claims {
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            sub: user.username.clone(),
            email: user.email.clone(),
            jti,
            iat: issued_at.timestamp(),
            nbf: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            claims: custom,
        };

        let header = Header::new(Algorithm::HS256);

        debug!(
            "Issuing token for {} (jti: {}, exp: {})",
            user.email, claims.jti, claims.exp
        );
        let access_token = encode(&header, &claims, &self.encoding_key).map_err(|e| {
            error!("Failed to sign token: {}", e);
            AppError::Internal(format!("Token generation failed: {}", e))
        })?;

        Ok(IssuedToken {
            access_token,
            valid_for: self.valid_for_minutes,
            expires_utc: expires_at,
        })
    }

    /// Verify a token and extract its claims.
    ///
    /// Expiry is checked with zero leeway; there is no grace window.
    /// Routine invalidity comes back as a `ValidationFailure` value.
    pub fn validate(
        &self,
        token: &str,
        options: &ValidationOptions,
    ) -> Result<Claims, ValidationFailure> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        if options.validate_issuer {
            validation.set_issuer(&[self.issuer.as_str()]);
        }
        if options.validate_audience {
            validation.set_audience(&[self.audience.as_str()]);
        } else {
            validation.validate_aud = false;
        }

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(err) => {
                let failure = match err.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => ValidationFailure::Expired,
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        ValidationFailure::BadSignature
                    }
                    _ => ValidationFailure::Malformed,
                };
                debug!("Token rejected: {} ({})", failure, err);
                Err(failure)
            }
        }
    }

    /// Re-issue a token that is still valid.
    ///
    /// The subject is re-resolved from the identity store, so role and
    /// claim changes since the original issuance are picked up. An expired
    /// token cannot be renewed; that path ends in a fresh login.
    pub async fn renew(&self, token: &str, store: &dyn IdentityStore) -> AppResult<IssuedToken> {
        let claims = self
            .validate(token, &ValidationOptions::renewal())
            .map_err(|failure| AppError::Auth(failure.to_string()))?;

        let user = store.find_by_email(&claims.email).await.ok_or_else(|| {
            warn!("Renewal refused, subject no longer resolves: {}", claims.email);
            AppError::NotFound(format!("Unknown subject: {}", claims.email))
        })?;

        self.issue(&user, store).await
    }
}

#[cfg(test)]
impl JwtIssuer {
    /// Sign arbitrary claims with this issuer's key so tests can control
    /// iat/exp directly.
    pub(crate) fn sign_claims_for_tests(&self, claims: &Claims) -> String {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .unwrap_or_else(|e| panic!("failed to sign test claims: {}", e))
    }
}

fn is_registered_claim(claim_type: &str) -> bool {
    matches!(
        claim_type,
        claim_types::ISSUER
            | claim_types::SUBJECT
            | claim_types::EMAIL
            | claim_types::TOKEN_ID
            | claim_types::ISSUED_AT
    )
}
