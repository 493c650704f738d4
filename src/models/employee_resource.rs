use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::authenticated_user::AuthenticatedUser;
use crate::models::employee::Employee;
use crate::models::resource_result::ValidationError;

/// Wire shape of an employee. PascalCase field names are the consuming
/// grid client's contract.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmployeeResource {
    #[serde(rename = "Id")]
    pub id: Uuid,
    #[serde(rename = "FirstName", default)]
    pub first_name: String,
    #[serde(rename = "LastName", default)]
    pub last_name: String,
    #[serde(rename = "Email", default)]
    pub email: String,
    #[serde(rename = "Gender", default)]
    pub gender: String,
    #[serde(rename = "Salary", default)]
    pub salary: BigDecimal,

    #[serde(rename = "CreatedBy", default)]
    pub created_by: Option<String>,
    #[serde(rename = "CreatedAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "ModifiedBy", default)]
    pub modified_by: Option<String>,
    #[serde(rename = "ModifiedAt", default)]
    pub modified_at: Option<DateTime<Utc>>,
    #[serde(rename = "RowVersion", default)]
    pub row_version: Option<String>,
}

impl EmployeeResource {
    /// Fresh resource template for create dialogs: a new id, nothing else.
    pub fn create() -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            gender: String::new(),
            salary: BigDecimal::from(0),
            created_by: None,
            created_at: None,
            modified_by: None,
            modified_at: None,
            row_version: None,
        }
    }

    pub fn from_entity(entity: &Employee) -> Self {
        Self {
            id: entity.id,
            first_name: entity.first_name.clone(),
            last_name: entity.last_name.clone(),
            email: entity.email.clone(),
            gender: entity.gender.clone(),
            salary: entity.salary.clone(),
            created_by: entity.created_by.clone(),
            created_at: entity.created_at,
            modified_by: entity.modified_by.clone(),
            modified_at: entity.modified_at,
            row_version: entity.row_version.clone(),
        }
    }

    pub fn into_entity(self) -> Employee {
        Employee {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            gender: self.gender,
            salary: self.salary,
            created_by: self.created_by,
            created_at: self.created_at,
            modified_by: self.modified_by,
            modified_at: self.modified_at,
            row_version: self.row_version,
        }
    }

    /// Attribute-level validation mirroring the entity constraints.
    pub fn validate_attributes(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.first_name.trim().is_empty() {
            errors.push(ValidationError::new("The FirstName field is required", "FirstName"));
        } else if self.first_name.len() > 80 {
            errors.push(ValidationError::new(
                "The FirstName field must not exceed 80 characters",
                "FirstName",
            ));
        }

        if self.last_name.trim().is_empty() {
            errors.push(ValidationError::new("The LastName field is required", "LastName"));
        } else if self.last_name.len() > 80 {
            errors.push(ValidationError::new(
                "The LastName field must not exceed 80 characters",
                "LastName",
            ));
        }

        if self.email.trim().is_empty() {
            errors.push(ValidationError::new("The Email field is required", "Email"));
        } else if self.email.len() > 128 {
            errors.push(ValidationError::new(
                "The Email field must not exceed 128 characters",
                "Email",
            ));
        }

        if self.gender.len() > 20 {
            errors.push(ValidationError::new(
                "The Gender field must not exceed 20 characters",
                "Gender",
            ));
        }

        errors
    }
}

/// Employee projection without the salary field.
///
/// This is a distinct type rather than a nulled-out field: for callers
/// outside HR the salary must be structurally absent from the payload.
#[derive(Clone, Debug, Serialize)]
pub struct RedactedEmployeeResource {
    #[serde(rename = "Id")]
    pub id: Uuid,
    #[serde(rename = "FirstName")]
    pub first_name: String,
    #[serde(rename = "LastName")]
    pub last_name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Gender")]
    pub gender: String,

    #[serde(rename = "CreatedBy")]
    pub created_by: Option<String>,
    #[serde(rename = "CreatedAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "ModifiedBy")]
    pub modified_by: Option<String>,
    #[serde(rename = "ModifiedAt")]
    pub modified_at: Option<DateTime<Utc>>,
    #[serde(rename = "RowVersion")]
    pub row_version: Option<String>,
}

impl From<EmployeeResource> for RedactedEmployeeResource {
    fn from(resource: EmployeeResource) -> Self {
        Self {
            id: resource.id,
            first_name: resource.first_name,
            last_name: resource.last_name,
            email: resource.email,
            gender: resource.gender,
            created_by: resource.created_by,
            created_at: resource.created_at,
            modified_by: resource.modified_by,
            modified_at: resource.modified_at,
            row_version: resource.row_version,
        }
    }
}

/// Per-capability projection of an employee, chosen by tagged dispatch on
/// the caller's claims instead of runtime property enumeration.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum EmployeeView {
    Full(EmployeeResource),
    Redacted(RedactedEmployeeResource),
}

impl EmployeeView {
    /// Salary is only visible to the HR department.
    pub fn for_user(entity: &Employee, user: &AuthenticatedUser) -> Self {
        let resource = EmployeeResource::from_entity(entity);

        if user.has_claim("Department", "HR") {
            EmployeeView::Full(resource)
        } else {
            EmployeeView::Redacted(resource.into())
        }
    }
}

/// Listing envelope for the grid client.
#[derive(Debug, Serialize)]
pub struct LoadResult<TItem> {
    #[serde(rename = "CountUnfiltered")]
    pub count_unfiltered: usize,
    #[serde(rename = "Items")]
    pub items: Vec<TItem>,
}
