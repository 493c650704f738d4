use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Stored employee row.
///
/// `row_version` is the optimistic-concurrency token: empty before the
/// first insert, reassigned to a fresh random value on every successful
/// write. The previous version is not kept.
#[derive(Clone, Debug)]
pub struct Employee {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: String,
    pub salary: BigDecimal,

    pub created_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_by: Option<String>,
    pub modified_at: Option<DateTime<Utc>>,
    pub row_version: Option<String>,
}
