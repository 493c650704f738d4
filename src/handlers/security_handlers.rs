use actix_web::{web, HttpResponse};
use log::{info, warn};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::services::auth::jwt::JwtIssuer;
use crate::store::IdentityStore;

/// The one credential-failure message. Unknown email and wrong password
/// are deliberately indistinguishable to avoid user enumeration.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, Deserialize)]
pub struct LoginResource {
    #[serde(rename = "Email", alias = "email")]
    pub email: String,
    #[serde(rename = "Password", alias = "password")]
    pub password: String,
}

/// POST /api/security/login: authenticate and issue a token.
/// Responds with the signed token text; all failures are 400 with the
/// unified message.
pub async fn login(
    web::Json(resource): web::Json<LoginResource>,
    identity_store: web::Data<dyn IdentityStore>,
    issuer: web::Data<JwtIssuer>,
) -> AppResult<HttpResponse> {
    let Some(user) = identity_store.find_by_email(&resource.email).await else {
        info!("Login rejected for {}", resource.email);
        return Err(AppError::BadRequest(INVALID_CREDENTIALS.to_string()));
    };

    if !identity_store
        .verify_password(&resource.email, &resource.password)
        .await
    {
        info!("Login rejected for {}", resource.email);
        return Err(AppError::BadRequest(INVALID_CREDENTIALS.to_string()));
    }

    let issued = issuer.issue(&user, identity_store.get_ref()).await?;
    info!("Issued token for {}", resource.email);

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(issued.access_token))
}

/// POST /api/security/renewtoken: re-issue a still-valid token.
///
/// Takes the raw token text as the request body and answers with the
/// replacement token text. Any renewal failure (expired token, vanished
/// subject) is a 400; an expired token can only lead to a fresh login.
pub async fn renew_token(
    body: String,
    identity_store: web::Data<dyn IdentityStore>,
    issuer: web::Data<JwtIssuer>,
) -> HttpResponse {
    let token = body.trim();

    if token.is_empty() {
        return HttpResponse::BadRequest().body("Token must be assigned");
    }

    match issuer.renew(token, identity_store.get_ref()).await {
        Ok(renewed) => HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .body(renewed.access_token),
        Err(e) => {
            warn!("Token renewal rejected: {}", e);
            HttpResponse::BadRequest().body(e.to_string())
        }
    }
}
