//! Errors returned to clients, and how they map to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use query_engine_execution::error as execution;
use query_engine_translation::translation::error as translation;

/// The message sent in place of the cause of an internal failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The query string or body references fields or values we cannot accept.
    #[error("{0}")]
    Validation(translation::QueryErrors),
    #[error("{0}")]
    NotFound(String),
    /// The database refused a write.
    #[error("{0}")]
    Constraint(String),
    /// The request body is not a JSON object.
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Validation(_) | ServerError::Constraint(_) | ServerError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The error messages sent to the client.
    pub fn messages(&self) -> Vec<String> {
        match self {
            ServerError::Validation(errors) => errors.messages(),
            ServerError::NotFound(message)
            | ServerError::Constraint(message)
            | ServerError::BadRequest(message) => vec![message.clone()],
            ServerError::Internal(_) => vec![INTERNAL_ERROR_MESSAGE.to_string()],
        }
    }

    /// Build the response envelope, with `data` standing in for the missing result.
    fn into_envelope(self, data: serde_json::Value) -> Response {
        if let ServerError::Internal(cause) = &self {
            tracing::error!(
                meta.signal_type = "log",
                event.name = "Internal error",
                body = %cause,
                error = true,
            );
        }
        let body = serde_json::json!({
            "data": data,
            "errors": self.messages(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}

/// Errors of the item endpoints carry `"data": null`.
impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        self.into_envelope(serde_json::Value::Null)
    }
}

/// An error of the list endpoint, which always answers with `"data": []`.
#[derive(Debug)]
pub struct ListError(pub ServerError);

impl From<ServerError> for ListError {
    fn from(error: ServerError) -> ListError {
        ListError(error)
    }
}

impl IntoResponse for ListError {
    fn into_response(self) -> Response {
        self.0.into_envelope(serde_json::Value::Array(vec![]))
    }
}

impl From<translation::Error> for ServerError {
    fn from(error: translation::Error) -> ServerError {
        match error {
            translation::Error::Validation(errors) => ServerError::Validation(errors),
            translation::Error::InvalidLookup(_) => ServerError::NotFound(error.to_string()),
            translation::Error::Internal(cause) => ServerError::Internal(cause),
        }
    }
}

impl From<execution::Error> for ServerError {
    fn from(error: execution::Error) -> ServerError {
        match error {
            execution::Error::Constraint(message) => ServerError::Constraint(message),
            execution::Error::DB(err) => ServerError::Internal(err.to_string()),
        }
    }
}
