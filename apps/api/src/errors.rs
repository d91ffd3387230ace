use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::document::ExtractError;
use crate::llm_client::LlmError;
use crate::table::TableError;

/// Which of the two completion calls failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStage {
    Extraction,
    Evaluation,
}

impl fmt::Display for CompletionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionStage::Extraction => f.write_str("extraction"),
            CompletionStage::Evaluation => f.write_str("evaluation"),
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every variant halts the request it occurs in.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("File read error: {0}")]
    ExtractionRead(#[from] ExtractError),

    #[error("{stage} API error: {source}")]
    Completion {
        stage: CompletionStage,
        #[source]
        source: LlmError,
    },

    #[error("No software requirement sentences were found")]
    EmptyExtraction,

    #[error("Export error: {0}")]
    Export(#[from] TableError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn completion(stage: CompletionStage) -> impl FnOnce(LlmError) -> AppError {
        move |source| AppError::Completion { stage, source }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::MissingInput(_) => "MISSING_INPUT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::ExtractionRead(_) => "EXTRACTION_READ_ERROR",
            AppError::Completion { .. } => "COMPLETION_API_ERROR",
            AppError::EmptyExtraction => "EMPTY_EXTRACTION",
            AppError::Export(_) => "EXPORT_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingInput(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::ExtractionRead(_) | AppError::EmptyExtraction | AppError::Export(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Completion { .. } => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
            AppError::Completion { stage, source } => {
                tracing::error!(%stage, "Completion error: {source}");
                self.to_string()
            }
            AppError::ExtractionRead(e) => {
                tracing::warn!("Document extraction failed: {e}");
                self.to_string()
            }
            _ => {
                tracing::info!(code = self.code(), "Request halted: {}", self);
                self.to_string()
            }
        };

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
