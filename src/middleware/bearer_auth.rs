use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorUnauthorized,
    Error, HttpMessage,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use log::{debug, warn};
use std::sync::Arc;
use std::task::{Context, Poll};

use crate::models::authenticated_user::AuthenticatedUser;
use crate::services::auth::jwt::{JwtIssuer, ValidationOptions};

/// Extract Bearer token from Authorization header
pub fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    if let Some(auth_header) = req.headers().get("authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    None
}

/// Validate the bearer token and stash the claims and the reconstructed
/// principal in the request extensions for handlers and the renewal
/// monitor.
fn authenticate(req: &ServiceRequest, issuer: &JwtIssuer) -> Result<(), String> {
    let path = req.path().to_string();

    let token = match extract_bearer_token(req) {
        Some(token) => token,
        None => {
            debug!("No bearer token on request to {}", path);
            return Err("Missing credentials".to_string());
        }
    };

    let claims = match issuer.validate(&token, &ValidationOptions::default()) {
        Ok(claims) => claims,
        Err(failure) => {
            warn!("Rejected token on {}: {}", path, failure);
            return Err(failure.to_string());
        }
    };

    debug!("Token accepted for {} on {}", claims.sub, path);

    let authenticated_user = AuthenticatedUser::from_claims(&claims);
    req.extensions_mut().insert(claims);
    req.extensions_mut().insert(authenticated_user);

    Ok(())
}

/// Middleware factory: bearer-JWT authentication for a protected scope.
///
/// Requests without a valid token are answered 401 before any handler
/// runs. OPTIONS requests pass through for CORS preflight.
pub fn bearer_auth_middleware(issuer: Arc<JwtIssuer>) -> BearerAuthMiddleware {
    BearerAuthMiddleware { issuer }
}

pub struct BearerAuthMiddleware {
    issuer: Arc<JwtIssuer>,
}

impl<S, B> Transform<S, ServiceRequest> for BearerAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = BearerAuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(BearerAuthMiddlewareService {
            service: std::rc::Rc::new(service),
            issuer: self.issuer.clone(),
        })
    }
}

pub struct BearerAuthMiddlewareService<S> {
    service: std::rc::Rc<S>,
    issuer: Arc<JwtIssuer>,
}

impl<S, B> Service<ServiceRequest> for BearerAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let issuer = self.issuer.clone();

        Box::pin(async move {
            // Skip authentication for OPTIONS requests (CORS preflight)
            if req.method() == actix_web::http::Method::OPTIONS {
                return service.call(req).await;
            }

            if let Err(message) = authenticate(&req, &issuer) {
                return Err(Error::from(ErrorUnauthorized(
                    serde_json::json!({ "error": message }).to_string(),
                )));
            }

            service.call(req).await
        })
    }
}
