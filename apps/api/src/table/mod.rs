//! Table codec: moves pipe-delimited Markdown tables between LLM text and rows.
//!
//! The model answers in free text that contains a Markdown table somewhere in it.
//! `parse` pulls the table rows out of that text; `to_csv` and `to_markdown`
//! serialize rows back for export and display.
//!
//! There is no escaping: a literal `|` inside a cell is read as a column separator.

use thiserror::Error;

pub mod schema;

/// One table row: trimmed cell values in column order.
pub type Row = Vec<String>;

/// Prefix of the Markdown header/body divider (`|---|---|`).
const SEPARATOR_PREFIX: &str = "|---";

#[derive(Debug, Error)]
pub enum TableError {
    #[error("cannot export an empty table")]
    EmptyInput,

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer error: {0}")]
    Buffer(String),

    #[error("CSV output is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Extracts every table row from `text`, in the order encountered.
///
/// A line counts as a row when, once trimmed, it starts with `|` and is not a
/// separator line. Everything else (prose, headings, blank lines) is dropped.
/// Column counts are not checked; see [`schema::TableSchema::apply`] for that.
pub fn parse(text: &str) -> Vec<Row> {
    text.lines()
        .map(str::trim)
        .filter(|line| is_table_row(line))
        .map(split_cells)
        .collect()
}

fn is_table_row(line: &str) -> bool {
    line.starts_with('|') && !is_separator(line)
}

/// `|---|---|`, and also spaced forms such as `| --- | --- |`.
fn is_separator(line: &str) -> bool {
    line.starts_with(SEPARATOR_PREFIX)
        || (line.contains('-')
            && line
                .chars()
                .all(|c| c == '|' || c == '-' || c.is_whitespace()))
}

fn split_cells(line: &str) -> Row {
    let inner = line.strip_prefix('|').unwrap_or(line);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|cell| cell.trim().to_string()).collect()
}

/// Serializes rows as CSV text, one record per row, CRLF-terminated.
///
/// Fields are quoted only when they contain a comma, quote or line break.
/// Rows of differing width are written as they are.
pub fn to_csv(rows: &[Row]) -> Result<String, TableError> {
    if rows.is_empty() {
        return Err(TableError::EmptyInput);
    }

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    for row in rows {
        writer.write_record(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| TableError::Buffer(e.error().to_string()))?;

    Ok(String::from_utf8(bytes)?)
}

/// Renders rows as a Markdown table: `| a | b |` per row.
///
/// Unlike a bare list of row lines, a `|---|` divider follows the first row so
/// the output renders as a table. `parse` skips the divider, so
/// `parse(&to_markdown(rows)) == rows` for well-formed rows.
pub fn to_markdown(rows: &[Row]) -> String {
    let mut out = String::new();

    for (i, row) in rows.iter().enumerate() {
        out.push_str("| ");
        out.push_str(&row.join(" | "));
        out.push_str(" |\n");

        if i == 0 {
            out.push('|');
            for _ in 0..row.len().max(1) {
                out.push_str("---|");
            }
            out.push('\n');
        }
    }

    out
}
