//! Error types for the gateway
//!
//! Provides unified error handling using thiserror.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::ConfirmationPrompt;

// == Gateway Error Enum ==
/// Unified error type for the gateway handlers.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Malformed or semantically invalid request
    #[error("{message}")]
    InvalidRequest {
        message: String,
        hint: Option<String>,
    },

    /// Destructive operation attempted without the required confirmation
    #[error("{}", .0.error)]
    ConfirmationRequired(ConfirmationPrompt),

    /// Requested entry does not exist
    #[error("{0}")]
    NotFound(String),

    /// Upstream failed and no cached copy was available
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Validation error without a usage hint.
    pub fn invalid(message: impl Into<String>) -> Self {
        GatewayError::InvalidRequest {
            message: message.into(),
            hint: None,
        }
    }

    /// Validation error carrying a hint on correct usage.
    pub fn invalid_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        GatewayError::InvalidRequest {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidRequest { .. } | GatewayError::ConfirmationRequired(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            GatewayError::InvalidRequest { message, hint } => match hint {
                Some(hint) => json!({ "error": message, "hint": hint }),
                None => json!({ "error": message }),
            },
            GatewayError::ConfirmationRequired(prompt) => json!(prompt),
            GatewayError::UpstreamUnavailable(message) => json!({
                "source": "none",
                "available": false,
                "error": "Upstream unavailable and no cached data",
                "message": message,
            }),
            GatewayError::NotFound(message) | GatewayError::Internal(message) => {
                json!({ "error": message })
            }
        };

        (status, Json(body)).into_response()
    }
}

// == Extractor Rejections ==
impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        GatewayError::invalid_with_hint(
            rejection.body_text(),
            "Send a JSON body with content-type: application/json",
        )
    }
}

impl From<QueryRejection> for GatewayError {
    fn from(rejection: QueryRejection) -> Self {
        GatewayError::invalid(rejection.body_text())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the gateway.
pub type Result<T> = std::result::Result<T, GatewayError>;

// == Normalize Error ==
/// Converts any error into a display string, including its source chain.
///
/// `reqwest` errors carry the interesting cause (timeout, connection refused)
/// in their sources, so the chain is flattened with `": "` separators.
pub fn normalize_error(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
