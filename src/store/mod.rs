pub mod employee_store;
pub mod identity_store;

pub use employee_store::{EmployeeStore, InMemoryEmployeeStore};
pub use identity_store::{IdentityStore, InMemoryIdentityStore, StoredRole, StoredUser};
