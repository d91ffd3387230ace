//! Axum route handlers for the Evaluation API.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::document::{self, DocumentKind};
use crate::errors::AppError;
use crate::evaluation::export;
use crate::evaluation::models::{Artifact, EvaluationReport};
use crate::evaluation::rules::{self, RULES};
use crate::state::AppState;
use crate::table::TableError;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RuleOption {
    pub name: &'static str,
    pub description: &'static str,
    pub default_selected: bool,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub evaluation_markdown: String,
}

/// The uploaded file and rule names pulled out of the multipart form.
#[derive(Debug, Default)]
struct EvaluateForm {
    file: Option<UploadedFile>,
    rules: Vec<String>,
}

#[derive(Debug)]
struct UploadedFile {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Bytes,
}

impl IntoResponse for Artifact {
    fn into_response(self) -> Response {
        (
            [
                (
                    header::CONTENT_TYPE,
                    format!("{}; charset=utf-8", self.mime),
                ),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", self.filename),
                ),
            ],
            self.content,
        )
            .into_response()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/rules
///
/// The rule catalog in declaration order. Every rule is selected by default.
pub async fn handle_list_rules() -> Json<Vec<RuleOption>> {
    Json(
        RULES
            .iter()
            .map(|r| RuleOption {
                name: r.name,
                description: r.description,
                default_selected: true,
            })
            .collect(),
    )
}

/// POST /api/v1/evaluate
///
/// Multipart form: one `file` part (.docx or .pdf) and one `rules` part per
/// selected rule name (a single comma-separated part also works).
pub async fn handle_evaluate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<EvaluationReport>, AppError> {
    let form = read_form(multipart).await?;

    let file = form
        .file
        .filter(|f| !f.bytes.is_empty())
        .ok_or_else(|| AppError::MissingInput("upload a Word (.docx) or PDF (.pdf) file".to_string()))?;
    if form.rules.is_empty() {
        return Err(AppError::MissingInput(
            "select at least one rule".to_string(),
        ));
    }
    let selected = rules::select(&form.rules)?;

    let kind = DocumentKind::detect(file.content_type.as_deref(), file.file_name.as_deref());
    info!(
        ?kind,
        file_name = file.file_name.as_deref().unwrap_or("-"),
        bytes = file.bytes.len(),
        "Evaluation requested"
    );
    let text = document::extract_text(kind, file.bytes).await?;

    let report = state.evaluator.run(&text, &selected).await?;
    Ok(Json(report))
}

/// POST /api/v1/export/markdown
pub async fn handle_export_markdown(Json(req): Json<ExportRequest>) -> Artifact {
    export::markdown_artifact(&req.evaluation_markdown)
}

/// POST /api/v1/export/csv
///
/// 422 when the text holds no table rows.
pub async fn handle_export_csv(Json(req): Json<ExportRequest>) -> Result<Artifact, AppError> {
    let rows = export::evaluation_rows(&req.evaluation_markdown);
    export::csv_artifact(&rows)?.ok_or(AppError::Export(TableError::EmptyInput))
}

async fn read_form(mut multipart: Multipart) -> Result<EvaluateForm, AppError> {
    let mut form = EvaluateForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("failed to read upload: {e}")))?;
                form.file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            "rules" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("failed to read rules: {e}")))?;
                form.rules.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string),
                );
            }
            _ => {}
        }
    }

    Ok(form)
}
