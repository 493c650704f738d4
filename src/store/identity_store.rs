use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use log::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::models::claim::Claim;

/// An identity as the issuer sees it. The password hash never leaves the
/// store; callers go through `verify_password`.
#[derive(Clone, Debug)]
pub struct StoredUser {
    pub username: String,
    pub email: String,
}

/// A role plus the claims granted with it.
#[derive(Clone, Debug)]
pub struct StoredRole {
    pub name: String,
    pub claims: Vec<Claim>,
}

/// Read-only identity collaborator used by login, claim assembly and
/// token renewal.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Option<StoredUser>;

    async fn verify_password(&self, email: &str, password: &str) -> bool;

    /// Role names assigned to the user, in assignment order.
    async fn roles_of(&self, username: &str) -> Vec<String>;

    /// Claims attached directly to the user (not via roles).
    async fn user_claims(&self, username: &str) -> Vec<Claim>;

    /// Role lookup by exact name. A missing role is not an error.
    async fn find_role(&self, name: &str) -> Option<StoredRole>;
}

struct UserRecord {
    username: String,
    email: String,
    password_hash: String,
    role_names: Vec<String>,
    claims: Vec<Claim>,
}

/// In-memory identity store seeded with the demo accounts. Read-only
/// after construction, so it is shared without locking.
pub struct InMemoryIdentityStore {
    users: Vec<UserRecord>,
    roles: Vec<StoredRole>,
}

impl InMemoryIdentityStore {
    /// Builds the demo identity data set:
    /// three roles (HR roles carry a `Department=HR` claim) and three
    /// users with increasing privileges, all sharing one demo password.
    pub fn seeded() -> AppResult<Self> {
        let password_hash = hash_password("password")?;

        let roles = vec![
            StoredRole {
                name: "Employee".to_string(),
                claims: vec![],
            },
            StoredRole {
                name: "HR-Worker".to_string(),
                claims: vec![Claim::stored("Department", "HR")],
            },
            StoredRole {
                name: "HR-Manager".to_string(),
                claims: vec![Claim::stored("Department", "HR")],
            },
        ];

        let users = vec![
            UserRecord {
                username: "employee".to_string(),
                email: "employee@xyz.com".to_string(),
                password_hash: password_hash.clone(),
                role_names: vec!["Employee".to_string()],
                claims: vec![],
            },
            UserRecord {
                username: "hrworker".to_string(),
                email: "hrworker@xyz.com".to_string(),
                password_hash: password_hash.clone(),
                role_names: vec!["Employee".to_string(), "HR-Worker".to_string()],
                claims: vec![],
            },
            UserRecord {
                username: "hrmanager".to_string(),
                email: "hrmanager@xyz.com".to_string(),
                password_hash,
                role_names: vec![
                    "Employee".to_string(),
                    "HR-Worker".to_string(),
                    "HR-Manager".to_string(),
                ],
                claims: vec![Claim::stored("CeoApproval", "true")],
            },
        ];

        Ok(Self { users, roles })
    }

    fn user_by_email(&self, email: &str) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.email == email)
    }

    fn user_by_name(&self, username: &str) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.username == username)
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find_by_email(&self, email: &str) -> Option<StoredUser> {
        self.user_by_email(email).map(|u| StoredUser {
            username: u.username.clone(),
            email: u.email.clone(),
        })
    }

    async fn verify_password(&self, email: &str, password: &str) -> bool {
        let Some(user) = self.user_by_email(email) else {
            return false;
        };

        let parsed = match PasswordHash::new(&user.password_hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Stored password hash for {} is unreadable: {}", email, e);
                return false;
            }
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    async fn roles_of(&self, username: &str) -> Vec<String> {
        self.user_by_name(username)
            .map(|u| u.role_names.clone())
            .unwrap_or_default()
    }

    async fn user_claims(&self, username: &str) -> Vec<Claim> {
        self.user_by_name(username)
            .map(|u| u.claims.clone())
            .unwrap_or_default()
    }

    async fn find_role(&self, name: &str) -> Option<StoredRole> {
        let role = self.roles.iter().find(|r| r.name == name).cloned();
        if role.is_none() {
            debug!("Role lookup missed: {}", name);
        }
        role
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash seed password: {}", e)))
}
