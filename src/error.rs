use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Upstream service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Recipe corpus error: {0}")]
    Corpus(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Get a sanitized error message safe for logging
    /// Filters out potentially sensitive information
    pub fn log_safe(&self) -> String {
        match self {
            // Upstream bodies and transport errors can echo request URLs or keys
            Error::Http(_) => "External HTTP request failed".to_string(),
            Error::UpstreamUnavailable(msg) | Error::MalformedUpstreamResponse(msg) => {
                redact(&format!("Upstream error: {msg}"))
            }
            Error::Internal(msg) => redact(&format!("Internal error: {msg}")),

            // These errors are generally safe to log as-is
            Error::MissingCredential(msg) => format!("Missing credential: {msg}"),
            Error::Corpus(msg) => format!("Recipe corpus error: {msg}"),
            Error::Config(msg) => format!("Configuration error: {msg}"),
            Error::Validation(msg) => format!("Validation error: {msg}"),
        }
    }

    /// HTTP status this error maps to when returned from a handler
    pub fn status(&self) -> StatusCode {
        match self {
            Error::UpstreamUnavailable(_) | Error::MalformedUpstreamResponse(_) | Error::Http(_) => {
                StatusCode::BAD_GATEWAY
            }
            Error::MissingCredential(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn redact(msg: &str) -> String {
    let lower = msg.to_lowercase();
    if lower.contains("password")
        || lower.contains("secret")
        || lower.contains("token")
        || lower.contains("key")
    {
        "Upstream or internal error (details redacted)".to_string()
    } else {
        msg.to_string()
    }
}

// Every failure leaves the handler as an explicit `{ "error": ... }` payload
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::error!("Request error: {}", self.log_safe());

        let status = self.status();
        let error_message = match &self {
            Error::Validation(msg) | Error::MissingCredential(msg) => {
                msg.clone()
            }
            Error::UpstreamUnavailable(_) | Error::Http(_) => {
                "External service unavailable".to_string()
            }
            Error::MalformedUpstreamResponse(_) => {
                "External service returned an unexpected response".to_string()
            }
            _ => "Internal server error".to_string(),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
