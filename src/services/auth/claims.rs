use log::debug;

use crate::models::claim::{claim_types, Claim, ClaimValueType};
use crate::store::{IdentityStore, StoredUser};

/// Builds the ordered claim sequence for a principal.
///
/// Order: issuer, subject (username), email, token id, issued-at, then the
/// user's own stored claims, then per assigned role one role claim
/// (carrying the token issuer) immediately followed by the claims attached
/// to that role. Role names with no stored role are skipped. The result
/// may contain duplicate claim types; callers must not assume uniqueness.
pub async fn assemble_claims(
    user: &StoredUser,
    store: &dyn IdentityStore,
    issuer: &str,
    jti: &str,
    issued_at: i64,
) -> Vec<Claim> {
    let mut claims = vec![
        Claim::new(claim_types::ISSUER, issuer, ClaimValueType::String, issuer),
        Claim::new(claim_types::SUBJECT, &user.username, ClaimValueType::String, issuer),
        Claim::new(claim_types::EMAIL, &user.email, ClaimValueType::String, issuer),
        Claim::new(claim_types::TOKEN_ID, jti, ClaimValueType::String, issuer),
        Claim::new(
            claim_types::ISSUED_AT,
            &issued_at.to_string(),
            ClaimValueType::Integer,
            issuer,
        ),
    ];

    // Claims attached to the user itself
    claims.extend(store.user_claims(&user.username).await);

    // Roles become claims, each followed by the claims it grants
    for role_name in store.roles_of(&user.username).await {
        let Some(role) = store.find_role(&role_name).await else {
            debug!("Skipping unknown role {} for {}", role_name, user.username);
            continue;
        };

        claims.push(Claim::new(
            claim_types::ROLE,
            &role.name,
            ClaimValueType::String,
            issuer,
        ));
        claims.extend(role.claims);
    }

    claims
}
