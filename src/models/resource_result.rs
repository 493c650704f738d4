use serde::{Deserialize, Serialize};

/// One validation failure, tied to the offending field when known.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "MemberName")]
    pub member_name: String,
}

impl ValidationError {
    pub fn new(message: &str, member_name: &str) -> Self {
        Self {
            message: message.to_string(),
            member_name: member_name.to_string(),
        }
    }
}

/// Structured error body for mutating endpoints.
///
/// Field names follow the wire contract of the consuming grid client
/// (PascalCase), independent of this crate's own conventions.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResourceResult<TResource> {
    #[serde(rename = "Resource")]
    pub resource: Option<TResource>,
    #[serde(rename = "Errors")]
    pub errors: Vec<ValidationError>,
    #[serde(rename = "Exceptions")]
    pub exceptions: Vec<String>,
}

impl<TResource> ResourceResult<TResource> {
    pub fn new(resource: Option<TResource>) -> Self {
        Self {
            resource,
            errors: Vec::new(),
            exceptions: Vec::new(),
        }
    }

    pub fn with_exception(resource: Option<TResource>, exception: String) -> Self {
        let mut result = Self::new(resource);
        result.exceptions.push(exception);
        result
    }
}

impl<TResource> Default for ResourceResult<TResource> {
    fn default() -> Self {
        Self::new(None)
    }
}
