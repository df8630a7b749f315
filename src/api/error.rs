//! Mapping of domain errors onto HTTP responses

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{DomainError, ValidationErrors};

/// JSON body of every error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = "Book not found")]
    pub error: String,
    /// Per-field messages, only present on validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>, example = json!({"isbn": ["The isbn field must be 13 digits."]}))]
    pub errors: Option<ValidationErrors>,
}

impl From<JsonRejection> for DomainError {
    fn from(rejection: JsonRejection) -> Self {
        DomainError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for DomainError {
    fn from(rejection: QueryRejection) -> Self {
        DomainError::BadRequest(rejection.body_text())
    }
}

/// Gives the bodyless 408 produced by the timeout layer the usual error shape.
pub async fn timeout_as_json(response: Response) -> Response {
    if response.status() != StatusCode::REQUEST_TIMEOUT {
        return response;
    }

    tracing::warn!("Request timed out");
    let body = ErrorBody {
        error: "Request timed out".to_string(),
        errors: None,
    };
    (StatusCode::REQUEST_TIMEOUT, Json(body)).into_response()
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            DomainError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: format!("{} not found", resource),
                    errors: None,
                },
            ),
            DomainError::Validation(errors) => {
                tracing::debug!("Validation failed: {}", errors);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorBody {
                        error: "The given data was invalid.".to_string(),
                        errors: Some(errors),
                    },
                )
            }
            DomainError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: message,
                    errors: None,
                },
            ),
            DomainError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "Internal server error".to_string(),
                        errors: None,
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_mapping() {
        let response = DomainError::NotFound("Book").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, json!({"error": "Book not found"}));
    }

    #[tokio::test]
    async fn test_validation_mapping_lists_fields() {
        let response = DomainError::invalid("isbn", "The isbn field must be 13 digits.")
            .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body_json(response).await,
            json!({
                "error": "The given data was invalid.",
                "errors": {"isbn": ["The isbn field must be 13 digits."]}
            })
        );
    }

    #[tokio::test]
    async fn test_database_error_is_not_leaked() {
        let error = DomainError::Database(sea_orm::DbErr::Custom("disk on fire".into()));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Internal server error"})
        );
    }

    #[tokio::test]
    async fn test_timeout_gets_json_body() {
        let timed_out = StatusCode::REQUEST_TIMEOUT.into_response();
        let response = timeout_as_json(timed_out).await;
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Request timed out"})
        );
    }

    #[tokio::test]
    async fn test_other_responses_pass_through() {
        let response = timeout_as_json(StatusCode::NO_CONTENT.into_response()).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn test_bad_request_mapping() {
        let response = DomainError::BadRequest("bad json".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
