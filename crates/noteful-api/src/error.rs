//! HTTP error mapping.
//!
//! Every failure a handler can produce is one [`ApiError`] variant, and a
//! single [`IntoResponse`] impl turns it into a status code plus a
//! `{"message": ...}` body.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A required body field was absent or empty.
    #[error("Missing `{field}` in request body")]
    MissingField { field: &'static str },

    /// A path, body or query value that must be an id was malformed.
    #[error("{}", invalid_id_message(.field))]
    InvalidId { field: &'static str },

    /// The body or query string could not be decoded.
    #[error("{0}")]
    BadRequest(String),

    /// A unique name collided with an existing record.
    #[error("The {entity} name already exists")]
    Conflict { entity: &'static str },

    #[error("Not Found")]
    NotFound { id: Option<Uuid> },

    /// Store failure. The cause is logged, never sent to the client.
    #[error("Internal Server Error")]
    Internal(#[source] noteful_core::Error),
}

fn invalid_id_message(field: &str) -> String {
    if field == "tags" {
        "The `tags` array contains an invalid `id`".to_string()
    } else {
        format!("The `{}` is not valid", field)
    }
}

impl ApiError {
    /// Translate a store error raised by a write on `entity`.
    pub fn from_write(entity: &'static str, err: noteful_core::Error) -> Self {
        if err.is_duplicate_key() {
            ApiError::Conflict { entity }
        } else {
            ApiError::Internal(err)
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingField { .. }
            | ApiError::InvalidId { .. }
            | ApiError::BadRequest(_)
            | ApiError::Conflict { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<noteful_core::Error> for ApiError {
    fn from(err: noteful_core::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// The only path parameter is the record id, so an undecodable segment
/// is reported the same way as a malformed id.
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(subsystem = "api", reason = %rejection.body_text(), "Rejected path");
        ApiError::InvalidId { field: "id" }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            ApiError::Internal(cause) => {
                tracing::error!(subsystem = "api", error = %cause, "Request failed");
            }
            ApiError::NotFound { id } => {
                tracing::debug!(subsystem = "api", id = ?id, "Not found");
            }
            other => {
                tracing::debug!(subsystem = "api", reason = %other, "Request rejected");
            }
        }

        let body = Json(serde_json::json!({
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ApiError::MissingField { field: "name" }.to_string(),
            "Missing `name` in request body"
        );
        assert_eq!(
            ApiError::InvalidId { field: "id" }.to_string(),
            "The `id` is not valid"
        );
        assert_eq!(
            ApiError::InvalidId { field: "folderId" }.to_string(),
            "The `folderId` is not valid"
        );
        assert_eq!(
            ApiError::InvalidId { field: "tags" }.to_string(),
            "The `tags` array contains an invalid `id`"
        );
        assert_eq!(
            ApiError::Conflict { entity: "tag" }.to_string(),
            "The tag name already exists"
        );
        assert_eq!(ApiError::NotFound { id: None }.to_string(), "Not Found");
    }

    #[test]
    fn test_internal_hides_cause() {
        let err = ApiError::Internal(noteful_core::Error::Internal("pool closed".into()));
        assert_eq!(err.to_string(), "Internal Server Error");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_from_write_maps_duplicate_key_to_conflict() {
        let dup = noteful_core::Error::DuplicateKey("folder_name_key".into());
        let err = ApiError::from_write("folder", dup);
        assert!(matches!(err, ApiError::Conflict { entity: "folder" }));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let other = noteful_core::Error::Internal("boom".into());
        assert!(matches!(
            ApiError::from_write("folder", other),
            ApiError::Internal(_)
        ));
    }

    #[test]
    fn test_not_found_status() {
        assert_eq!(
            ApiError::NotFound { id: None }.status(),
            StatusCode::NOT_FOUND
        );
    }
}
