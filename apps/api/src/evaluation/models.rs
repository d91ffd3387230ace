use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::table::Row;

/// One extracted requirement sentence with the chapter it was found in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirementRow {
    pub chapter: String,
    pub sentence: String,
}

impl RequirementRow {
    /// Builds a requirement from a conformed extraction row. Rows without a
    /// sentence carry nothing to evaluate and are skipped.
    pub fn from_row(row: &[String]) -> Option<Self> {
        let chapter = row.first().cloned().unwrap_or_default();
        let sentence = row.get(1).filter(|s| !s.is_empty())?.clone();
        Some(Self { chapter, sentence })
    }
}

/// A downloadable export of the evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub filename: &'static str,
    pub mime: &'static str,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Downloads {
    pub markdown: Artifact,
    /// Only present when at least one table row could be parsed.
    pub csv: Option<Artifact>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Raw model response, rendered as-is by clients.
    pub markdown: String,
    pub requirements: Vec<RequirementRow>,
    pub adjusted_rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResult {
    pub markdown: String,
    /// Schema header followed by the conformed body rows.
    pub rows: Vec<Row>,
    /// `rows` re-rendered as a clean Markdown table (empty when nothing parsed).
    pub table_markdown: String,
    pub header_matches: bool,
    pub adjusted_rows: usize,
}

/// Full outcome of one evaluation request.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub request_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub rules: Vec<&'static str>,
    pub extraction: ExtractionResult,
    pub evaluation: EvaluationResult,
    pub downloads: Downloads,
}
