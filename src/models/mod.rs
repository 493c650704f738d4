pub mod auth_jwt_claims;
pub mod authenticated_user;
pub mod claim;
pub mod employee;
pub mod employee_resource;
pub mod issued_token;
pub mod resource_result;

pub use auth_jwt_claims::Claims;
pub use authenticated_user::AuthenticatedUser;
pub use claim::{Claim, ClaimValueType};
pub use employee::Employee;
pub use employee_resource::{EmployeeResource, EmployeeView, LoadResult, RedactedEmployeeResource};
pub use issued_token::IssuedToken;
pub use resource_result::{ResourceResult, ValidationError};
