use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::employee::Employee;

/// Persistence collaborator for employee rows.
///
/// `upsert` is the concurrency-guarded write path: inserts and updates go
/// through it so the row version and audit stamps are assigned in one
/// place. The actor is passed explicitly; there is no ambient current-user
/// state.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn find(&self, id: Uuid) -> Option<Employee>;

    async fn find_by_email(&self, email: &str) -> Option<Employee>;

    async fn list(&self) -> Vec<Employee>;

    /// Insert (empty row version) or update (matching row version).
    /// A presented row version that differs from the stored one fails with
    /// `AppError::Conflict` and writes nothing.
    async fn upsert(&self, entity: Employee, actor: &str) -> AppResult<Employee>;

    /// Returns false when the row was already gone.
    async fn delete(&self, id: Uuid) -> bool;
}

/// In-memory employee store. The single write lock is the transaction
/// boundary: version check, audit stamping and the write itself happen
/// atomically, so a failed upsert leaves the map untouched.
pub struct InMemoryEmployeeStore {
    rows: RwLock<BTreeMap<Uuid, Employee>>,
}

impl InMemoryEmployeeStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
        }
    }

    /// Store preloaded with a few demo rows, stamped as system-created.
    pub fn seeded() -> Self {
        let store = Self::new();
        let now = Utc::now();

        let mut rows = BTreeMap::new();
        for (first_name, last_name, email, gender, salary) in [
            ("Danielle", "Huber", "danielle.huber@xyz.com", "Female", "52750"),
            ("Marc", "Verbeek", "marc.verbeek@xyz.com", "Male", "48300"),
            ("Sofie", "Willems", "sofie.willems@xyz.com", "Female", "61200"),
            ("Peter", "Janssen", "peter.janssen@xyz.com", "Male", "39800"),
        ] {
            let employee = Employee {
                id: Uuid::new_v4(),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                email: email.to_string(),
                gender: gender.to_string(),
                salary: salary.parse().unwrap_or_default(),
                created_by: Some("system".to_string()),
                created_at: Some(now),
                modified_by: None,
                modified_at: None,
                row_version: Some(Uuid::new_v4().to_string()),
            };
            rows.insert(employee.id, employee);
        }

        info!("Seeded employee store with {} demo rows", rows.len());
        Self {
            rows: RwLock::new(rows),
        }
    }
}

impl Default for InMemoryEmployeeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmployeeStore for InMemoryEmployeeStore {
    async fn find(&self, id: Uuid) -> Option<Employee> {
        self.rows.read().await.get(&id).cloned()
    }

    async fn find_by_email(&self, email: &str) -> Option<Employee> {
        self.rows
            .read()
            .await
            .values()
            .find(|e| e.email == email)
            .cloned()
    }

    async fn list(&self) -> Vec<Employee> {
        self.rows.read().await.values().cloned().collect()
    }

    async fn upsert(&self, mut entity: Employee, actor: &str) -> AppResult<Employee> {
        let mut rows = self.rows.write().await;

        let is_insert = entity
            .row_version
            .as_deref()
            .map(str::is_empty)
            .unwrap_or(true);

        if is_insert {
            if rows.contains_key(&entity.id) {
                return Err(AppError::BadRequest(format!(
                    "Employee {} already exists",
                    entity.id
                )));
            }

            entity.row_version = Some(Uuid::new_v4().to_string());
            entity.created_by = Some(actor.to_string());
            entity.created_at = Some(Utc::now());
            entity.modified_by = None;
            entity.modified_at = None;

            debug!("Inserting employee {} as {}", entity.id, actor);
            rows.insert(entity.id, entity.clone());
            return Ok(entity);
        }

        let stored = rows
            .get(&entity.id)
            .ok_or_else(|| AppError::NotFound(format!("Employee not found: {}", entity.id)))?;

        // Another writer got here first: the stored version no longer
        // matches the one the caller read.
        if stored.row_version != entity.row_version {
            return Err(AppError::Conflict(
                "The record was changed by another user. Reload and try again".to_string(),
            ));
        }

        entity.created_by = stored.created_by.clone();
        entity.created_at = stored.created_at;
        entity.row_version = Some(Uuid::new_v4().to_string());
        entity.modified_by = Some(actor.to_string());
        entity.modified_at = Some(Utc::now());

        debug!("Updating employee {} as {}", entity.id, actor);
        rows.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> bool {
        self.rows.write().await.remove(&id).is_some()
    }
}
