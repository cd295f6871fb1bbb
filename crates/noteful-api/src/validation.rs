//! Request field validation shared by every resource.

use uuid::Uuid;

use noteful_core::parse_id;

use crate::error::ApiError;

/// Parse an id taken from the request path.
pub fn path_id(raw: &str) -> Result<Uuid, ApiError> {
    parse_id(raw).ok_or(ApiError::InvalidId { field: "id" })
}

/// Require a non-blank string field.
pub fn required(field: &'static str, value: Option<String>) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::MissingField { field }),
    }
}

/// Parse an optional id field. Absent, null and empty values are all `None`.
pub fn optional_id(field: &'static str, value: Option<String>) -> Result<Option<Uuid>, ApiError> {
    match value.as_deref() {
        None | Some("") => Ok(None),
        Some(raw) => parse_id(raw)
            .map(Some)
            .ok_or(ApiError::InvalidId { field }),
    }
}

/// Parse every element of an optional id array.
pub fn id_list(
    field: &'static str,
    values: Option<Vec<String>>,
) -> Result<Option<Vec<Uuid>>, ApiError> {
    values
        .map(|raw| {
            raw.iter()
                .map(|v| parse_id(v).ok_or(ApiError::InvalidId { field }))
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()
}

/// Treat an empty string as an absent value.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
