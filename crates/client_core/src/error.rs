use shared::{
    error::{ErrorCode, FieldError},
    protocol::ApiErrorBody,
};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SyncError {
    #[error("{message}")]
    Validation {
        message: String,
        fields: Vec<FieldError>,
    },
    #[error("{0}")]
    NotFound(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
}

impl SyncError {
    pub fn validation(message: impl Into<String>) -> Self {
        SyncError::Validation {
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn invalid_fields(fields: Vec<FieldError>) -> Self {
        let message = fields
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        SyncError::Validation { message, fields }
    }

    /// Maps a rejected HTTP response onto the error taxonomy. A 4xx with a
    /// parseable `{error}` body is a server-side validation failure; anything
    /// else without a usable message is a plain server error.
    pub fn from_status(status: u16, body: &str) -> Self {
        let parsed = ApiErrorBody::parse(body).map(|body| body.error);
        match (status, parsed) {
            (404, Some(message)) => SyncError::NotFound(message),
            (404, None) => SyncError::NotFound("employee not found".to_string()),
            (400..=499, Some(message)) => SyncError::validation(message),
            (_, Some(message)) => SyncError::Server { status, message },
            (_, None) => SyncError::Server {
                status,
                message: format!("request failed with status {status}"),
            },
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SyncError::Validation { .. } => ErrorCode::Validation,
            SyncError::NotFound(_) => ErrorCode::NotFound,
            SyncError::Network(_) => ErrorCode::Network,
            SyncError::Server { .. } => ErrorCode::Server,
        }
    }

    pub fn fields(&self) -> &[FieldError] {
        match self {
            SyncError::Validation { fields, .. } => fields,
            _ => &[],
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            SyncError::Validation { message, .. } => format!("Validation failed: {message}"),
            SyncError::NotFound(message) => format!("Not found: {message}"),
            SyncError::Network(_) => {
                "Server unreachable; check the API URL and network and retry.".to_string()
            }
            SyncError::Server { status, message } => format!("Server error {status}: {message}"),
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            let status = err.status().map(|s| s.as_u16()).unwrap_or(200);
            return SyncError::Server {
                status,
                message: format!("malformed response body: {err}"),
            };
        }
        if let Some(status) = err.status() {
            return SyncError::from_status(status.as_u16(), "");
        }
        SyncError::Network(err.to_string())
    }
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
