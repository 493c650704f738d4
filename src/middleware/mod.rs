pub mod bearer_auth;
pub mod token_renewal;

pub use bearer_auth::{bearer_auth_middleware, extract_bearer_token, BearerAuthMiddleware};
pub use token_renewal::{token_renewal_middleware, TokenRenewalMiddleware, RENEWED_TOKEN_HEADER};
