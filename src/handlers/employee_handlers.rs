use actix_web::{web, HttpResponse};
use log::debug;
use serde::Deserialize;
use std::cmp::Ordering;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::authenticated_user::AuthenticatedUser;
use crate::models::employee::Employee;
use crate::models::employee_resource::{EmployeeResource, EmployeeView, LoadResult};
use crate::models::resource_result::ResourceResult;
use crate::services::auth::policy::PolicyRegistry;
use crate::store::EmployeeStore;

/// Grid-sortable/searchable wire field names.
const FIELD_NAMES: &[&str] = &["Id", "FirstName", "LastName", "Email", "Gender", "Salary"];

/// GET /api/employee/loginstatus: authenticated echo for the client shell.
pub async fn login_status(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "IsAuthenticated": true,
        "Email": user.email,
    }))
}

/// GET /api/employee/create: fresh resource template for the edit dialog.
pub async fn create_template(
    user: AuthenticatedUser,
    policies: web::Data<PolicyRegistry>,
) -> AppResult<HttpResponse> {
    policies.authorize("HR Only", &user)?;

    Ok(HttpResponse::Ok().json(EmployeeResource::create()))
}

/// GET /api/employee/{id}
pub async fn get_by_id(
    path: web::Path<Uuid>,
    user: AuthenticatedUser,
    store: web::Data<dyn EmployeeStore>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    match store.find(id).await {
        Some(entity) => Ok(HttpResponse::Ok().json(EmployeeView::for_user(&entity, &user))),
        None => Err(AppError::NotFound(format!("Employee not found: {}", id))),
    }
}

/// GET /api/employee/email/{email}
pub async fn get_by_email(
    path: web::Path<String>,
    user: AuthenticatedUser,
    store: web::Data<dyn EmployeeStore>,
) -> AppResult<HttpResponse> {
    let email = path.into_inner();

    if email.trim().is_empty() {
        return Err(AppError::BadRequest("Email must be assigned".to_string()));
    }

    match store.find_by_email(&email).await {
        Some(entity) => Ok(HttpResponse::Ok().json(EmployeeView::for_user(&entity, &user))),
        None => Err(AppError::NotFound(format!("Employee not found: {}", email))),
    }
}

fn default_sort_direction() -> String {
    "asc".to_string()
}

#[derive(Debug, Deserialize)]
pub struct EmployeeListQuery {
    #[serde(default, alias = "sortBy")]
    pub sort_by: String,
    #[serde(default = "default_sort_direction", alias = "sortDirection")]
    pub sort_direction: String,
    #[serde(default)]
    pub skip: usize,
    #[serde(default)]
    pub take: usize,
    #[serde(default)]
    pub search: String,
    #[serde(default, alias = "searchFields")]
    pub search_fields: String,
}

/// GET /api/employee: filtered, sorted, paged listing for the grid.
pub async fn list(
    query: web::Query<EmployeeListQuery>,
    user: AuthenticatedUser,
    store: web::Data<dyn EmployeeStore>,
) -> AppResult<HttpResponse> {
    let employees = store.list().await;
    let count_unfiltered = employees.len();

    let selected = search_items(employees, &query);
    debug!(
        "Employee listing: {} of {} rows after filtering/paging",
        selected.len(),
        count_unfiltered
    );

    let items: Vec<EmployeeView> = selected
        .iter()
        .map(|entity| EmployeeView::for_user(entity, &user))
        .collect();

    Ok(HttpResponse::Ok().json(LoadResult {
        count_unfiltered,
        items,
    }))
}

/// POST /api/employee: insert a new employee.
pub async fn insert(
    web::Json(mut resource): web::Json<EmployeeResource>,
    user: AuthenticatedUser,
    policies: web::Data<PolicyRegistry>,
    store: web::Data<dyn EmployeeStore>,
) -> AppResult<HttpResponse> {
    policies.authorize("HR Only", &user)?;

    // Audit fields and the row version are set by the persistence layer
    resource.created_by = None;
    resource.created_at = None;
    resource.modified_by = None;
    resource.modified_at = None;
    resource.row_version = None;

    let errors = resource.validate_attributes();
    if !errors.is_empty() {
        let mut result = ResourceResult::new(Some(resource));
        result.errors = errors;
        return Ok(HttpResponse::BadRequest().json(result));
    }

    match store
        .upsert(resource.clone().into_entity(), &user.username)
        .await
    {
        Ok(saved) => Ok(HttpResponse::Created().json(EmployeeResource::from_entity(&saved))),
        Err(error) => Ok(upsert_failure_response(resource, error)),
    }
}

/// PUT /api/employee: update an existing employee, guarded by the row
/// version the caller read.
pub async fn update(
    web::Json(resource): web::Json<EmployeeResource>,
    user: AuthenticatedUser,
    policies: web::Data<PolicyRegistry>,
    store: web::Data<dyn EmployeeStore>,
) -> AppResult<HttpResponse> {
    policies.authorize("HR Only", &user)?;

    if store.find(resource.id).await.is_none() {
        return Err(AppError::NotFound(format!(
            "Employee not found: {}",
            resource.id
        )));
    }

    let errors = resource.validate_attributes();
    if !errors.is_empty() {
        let mut result = ResourceResult::new(Some(resource));
        result.errors = errors;
        return Ok(HttpResponse::BadRequest().json(result));
    }

    match store
        .upsert(resource.clone().into_entity(), &user.username)
        .await
    {
        Ok(saved) => Ok(HttpResponse::Ok().json(EmployeeResource::from_entity(&saved))),
        Err(error) => Ok(upsert_failure_response(resource, error)),
    }
}

/// DELETE /api/employee/{id}
pub async fn delete(
    path: web::Path<Uuid>,
    user: AuthenticatedUser,
    policies: web::Data<PolicyRegistry>,
    store: web::Data<dyn EmployeeStore>,
) -> AppResult<HttpResponse> {
    policies.authorize("HR-Manager Only", &user)?;

    let id = path.into_inner();
    if store.delete(id).await {
        Ok(HttpResponse::Ok().finish())
    } else {
        Ok(HttpResponse::NoContent().finish())
    }
}

/// Conflicts keep their own status so the client can offer a reload;
/// everything else from the store is a plain bad request. Both carry the
/// structured result body with the failure message.
fn upsert_failure_response(resource: EmployeeResource, error: AppError) -> HttpResponse {
    let is_conflict = matches!(error, AppError::Conflict(_));
    let result = ResourceResult::with_exception(Some(resource), error.to_string());

    if is_conflict {
        HttpResponse::Conflict().json(result)
    } else {
        HttpResponse::BadRequest().json(result)
    }
}

fn field_value(entity: &Employee, field: &str) -> Option<String> {
    match field {
        "Id" => Some(entity.id.to_string()),
        "FirstName" => Some(entity.first_name.clone()),
        "LastName" => Some(entity.last_name.clone()),
        "Email" => Some(entity.email.clone()),
        "Gender" => Some(entity.gender.clone()),
        "Salary" => Some(entity.salary.to_string()),
        _ => None,
    }
}

fn compare_by_field(a: &Employee, b: &Employee, field: &str) -> Ordering {
    match field {
        "Id" => a.id.cmp(&b.id),
        "FirstName" => a.first_name.cmp(&b.first_name),
        "LastName" => a.last_name.cmp(&b.last_name),
        "Email" => a.email.cmp(&b.email),
        "Gender" => a.gender.cmp(&b.gender),
        "Salary" => a.salary.cmp(&b.salary),
        _ => Ordering::Equal,
    }
}

/// Filtering, ordering and paging over the full row set, following the
/// grid client's conventions: search runs over the requested field names
/// (invalid names are dropped, none valid means all), sorting only on
/// known fields, and an unset page size caps at 100 rows.
fn search_items(mut items: Vec<Employee>, query: &EmployeeListQuery) -> Vec<Employee> {
    if !query.search.is_empty() {
        let mut fields: Vec<&str> = query
            .search_fields
            .split('|')
            .filter(|f| !f.is_empty() && FIELD_NAMES.contains(f))
            .collect();
        if fields.is_empty() {
            fields = FIELD_NAMES.to_vec();
        }

        let needle = query.search.to_lowercase();
        items.retain(|entity| {
            fields.iter().any(|field| {
                field_value(entity, field)
                    .map(|value| value.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
        });
    }

    if FIELD_NAMES.contains(&query.sort_by.as_str()) {
        items.sort_by(|a, b| compare_by_field(a, b, &query.sort_by));
        if query.sort_direction.eq_ignore_ascii_case("desc") {
            items.reverse();
        }
    }

    // show 100 records if limit is not set
    let take = if query.take == 0 { 100 } else { query.take };

    items.into_iter().skip(query.skip).take(take).collect()
}
