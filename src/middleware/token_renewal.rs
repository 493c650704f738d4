use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error, HttpMessage,
};
use chrono::Utc;
use futures_util::future::{ok, LocalBoxFuture, Ready};
use log::{debug, info, warn};
use std::sync::Arc;
use std::task::{Context, Poll};

use crate::middleware::bearer_auth::extract_bearer_token;
use crate::models::auth_jwt_claims::Claims;
use crate::services::auth::jwt::JwtIssuer;
use crate::services::auth::renewal::should_renew;
use crate::store::IdentityStore;

/// Response header carrying the silently renewed token. The client-held
/// session replaces its stored token when it sees this header; there is
/// no server-side token registry.
pub const RENEWED_TOKEN_HEADER: &str = "x-renewed-token";

/// Middleware factory: sliding token renewal for authenticated scopes.
///
/// Must sit inside the bearer auth middleware, which puts the validated
/// claims into the request extensions. When the token is past half of its
/// validity window the renewal runs concurrently with the handler (the
/// current request proceeds on the old, still-valid claims) and the
/// replacement token is attached to the response. A failed renewal is
/// logged and retried on the next qualifying request; the session keeps
/// its current token.
pub fn token_renewal_middleware(
    issuer: Arc<JwtIssuer>,
    identity_store: Arc<dyn IdentityStore>,
) -> TokenRenewalMiddleware {
    TokenRenewalMiddleware {
        issuer,
        identity_store,
    }
}

pub struct TokenRenewalMiddleware {
    issuer: Arc<JwtIssuer>,
    identity_store: Arc<dyn IdentityStore>,
}

impl<S, B> Transform<S, ServiceRequest> for TokenRenewalMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = TokenRenewalMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(TokenRenewalMiddlewareService {
            service: std::rc::Rc::new(service),
            issuer: self.issuer.clone(),
            identity_store: self.identity_store.clone(),
        })
    }
}

pub struct TokenRenewalMiddlewareService<S> {
    service: std::rc::Rc<S>,
    issuer: Arc<JwtIssuer>,
    identity_store: Arc<dyn IdentityStore>,
}

impl<S, B> Service<ServiceRequest> for TokenRenewalMiddlewareService<S>
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
        let identity_store = self.identity_store.clone();

        Box::pin(async move {
            let lifetime = req
                .extensions()
                .get::<Claims>()
                .map(|claims| (claims.iat, claims.exp));

            let renewal = match lifetime {
                Some((issued_at, expires_at))
                    if should_renew(issued_at, expires_at, Utc::now().timestamp()) =>
                {
                    extract_bearer_token(&req).map(|token| {
                        debug!("Token past renewal threshold, re-issuing");
                        tokio::spawn(async move {
                            issuer.renew(&token, identity_store.as_ref()).await
                        })
                    })
                }
                _ => None,
            };

            // The triggering request keeps running on its old claims
            let mut res = service.call(req).await?;

            if let Some(handle) = renewal {
                match handle.await {
                    Ok(Ok(renewed)) => match HeaderValue::from_str(&renewed.access_token) {
                        Ok(value) => {
                            info!("Issued renewal token, handing to client session");
                            res.headers_mut()
                                .insert(HeaderName::from_static(RENEWED_TOKEN_HEADER), value);
                        }
                        Err(e) => warn!("Renewed token is not header-safe: {}", e),
                    },
                    // Session keeps its current token; the next qualifying
                    // request retries
                    Ok(Err(e)) => warn!("Token renewal failed: {}", e),
                    Err(e) => warn!("Token renewal task panicked: {}", e),
                }
            }

            Ok(res)
        })
    }
}
