//! Download artifacts built from an evaluation response.

use crate::evaluation::models::{Artifact, Downloads};
use crate::table::schema::EVALUATION;
use crate::table::{self, Row, TableError};

pub const MARKDOWN_FILENAME: &str = "evaluation.md";
pub const MARKDOWN_MIME: &str = "text/markdown";
pub const CSV_FILENAME: &str = "evaluation.csv";
pub const CSV_MIME: &str = "text/csv";

/// The raw evaluation text, unchanged.
pub fn markdown_artifact(evaluation_markdown: &str) -> Artifact {
    Artifact {
        filename: MARKDOWN_FILENAME,
        mime: MARKDOWN_MIME,
        content: evaluation_markdown.to_string(),
    }
}

/// CSV over `rows` (header first). `None` when there is nothing to export.
pub fn csv_artifact(rows: &[Row]) -> Result<Option<Artifact>, TableError> {
    match table::to_csv(rows) {
        Ok(content) => Ok(Some(Artifact {
            filename: CSV_FILENAME,
            mime: CSV_MIME,
            content,
        })),
        Err(TableError::EmptyInput) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Parses an evaluation response and conforms it to the evaluation schema.
pub fn evaluation_rows(evaluation_markdown: &str) -> Vec<Row> {
    EVALUATION.apply(table::parse(evaluation_markdown)).to_rows()
}

pub fn downloads(evaluation_markdown: &str, rows: &[Row]) -> Result<Downloads, TableError> {
    Ok(Downloads {
        markdown: markdown_artifact(evaluation_markdown),
        csv: csv_artifact(rows)?,
    })
}
