use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::export::ExportError;
use crate::extract::ExtractError;
use crate::llm_client::LlmError;

pub const HINT_DIFFERENT_FILE: &str =
    "Try a different file: a PDF or DOCX with selectable (not scanned) text.";
pub const HINT_REPHRASE: &str = "Try rephrasing your request.";
pub const HINT_CONFIGURATION: &str =
    "Check the AI service configuration and credentials (LLM_API_KEY, LLM_BASE_URL), then try again.";
const HINT_RETRY: &str = "Try again in a moment.";

/// Hint for a recovered delegate failure. Replies that could not be understood
/// get `on_malformed`; rejected credentials and failed calls point at configuration.
pub fn llm_hint(e: &LlmError, on_malformed: &'static str) -> &'static str {
    if e.is_malformed() {
        on_malformed
    } else {
        HINT_CONFIGURATION
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String, &'static str) {
        match self {
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                msg.clone(),
                "Start a new session by uploading or entering a resume.",
            ),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                "Check the submitted fields and try again.",
            ),
            AppError::Extraction(e) => {
                tracing::warn!("Extraction failed ({}): {e}", e.kind());
                let (status, code) = match e {
                    ExtractError::NotFound(_) => (StatusCode::NOT_FOUND, "FILE_NOT_FOUND"),
                    ExtractError::EmptyFile(_) => (StatusCode::BAD_REQUEST, "EMPTY_FILE"),
                    ExtractError::UnsupportedFormat(_) => {
                        (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_FORMAT")
                    }
                    ExtractError::NoTextExtracted | ExtractError::CorruptOrEncrypted(_) => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "EXTRACTION_FAILED")
                    }
                    ExtractError::Io(io) => {
                        tracing::error!("Upload staging failed: {io}");
                        return (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "INTERNAL_ERROR",
                            "The upload could not be staged".to_string(),
                            "Try again in a moment.",
                        );
                    }
                };
                (status, code, e.to_string(), HINT_DIFFERENT_FILE)
            }
            AppError::Llm(e) if e.is_auth_failure() => {
                tracing::error!("LLM credentials rejected: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "CONFIGURATION_ERROR",
                    "The AI service rejected the configured credentials".to_string(),
                    HINT_CONFIGURATION,
                )
            }
            AppError::Llm(e) if e.is_malformed() => {
                tracing::warn!("Malformed model response: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "MALFORMED_MODEL_RESPONSE",
                    "The AI service returned a response that could not be understood".to_string(),
                    HINT_REPHRASE,
                )
            }
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "EXTERNAL_CALL_FAILED",
                    "The AI service could not complete the request".to_string(),
                    HINT_CONFIGURATION,
                )
            }
            AppError::Export(e) => {
                tracing::error!("Export error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXPORT_FAILED",
                    e.to_string(),
                    "Try the other export format.",
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    HINT_RETRY,
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, hint) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
                "hint": hint
            }
        }));

        (status, body).into_response()
    }
}
