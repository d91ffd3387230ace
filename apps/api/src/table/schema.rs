//! Named column schemas shared by the prompt builders and the table parser.
//!
//! The prompts tell the model which header to emit; the parser checks the header
//! it got back and squares every body row up to the agreed width.

use serde::Serialize;
use tracing::warn;

use super::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

/// Requirement sentences pulled out of the source document.
pub const EXTRACTION: TableSchema = TableSchema {
    name: "extraction",
    columns: &["章番号・章名", "文"],
};

/// Sentences that break at least one selected rule.
pub const EVALUATION: TableSchema = TableSchema {
    name: "evaluation",
    columns: &["章番号・章名", "元の記述", "指摘理由", "改善案"],
};

/// Parsed rows after a schema has been applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaTable {
    /// Header row as the model wrote it (empty when nothing parsed or the
    /// model left the header out).
    pub header: Row,
    pub header_matches: bool,
    /// Body rows, each exactly `columns.len()` wide.
    pub body: Vec<Row>,
    /// Body rows that had to be padded or truncated.
    pub adjusted: usize,
    #[serde(skip)]
    schema: TableSchema,
}

impl TableSchema {
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// `|col1|col2|...|`, the exact header line the prompts ask for.
    pub fn header_markdown(&self) -> String {
        format!("|{}|", self.columns.join("|"))
    }

    pub fn header_row(&self) -> Row {
        self.columns.iter().map(|c| c.to_string()).collect()
    }

    /// Splits off the header row and conforms the rest to this schema.
    ///
    /// A header that differs from the schema is tolerated (the model paraphrases
    /// it now and then) but logged. When the first row does not look like a
    /// header at all, the model left it out and the row is kept as data.
    /// Short rows are padded with empty cells and long rows truncated, so
    /// positional access downstream is always safe.
    pub fn apply(&self, rows: Vec<Row>) -> SchemaTable {
        let mut rows = rows.into_iter().peekable();
        let Some(first) = rows.peek() else {
            return SchemaTable {
                header: Vec::new(),
                header_matches: false,
                body: Vec::new(),
                adjusted: 0,
                schema: *self,
            };
        };

        let header_matches = first.iter().map(String::as_str).eq(self.columns.iter().copied());
        let header = if header_matches {
            rows.next().unwrap_or_default()
        } else if self.resembles_header(first) {
            warn!(
                schema = self.name,
                expected = %self.columns.join("|"),
                found = %first.join("|"),
                "Table header does not match schema"
            );
            rows.next().unwrap_or_default()
        } else {
            warn!(
                schema = self.name,
                found = %first.join("|"),
                "Table has no header row; keeping first row as data"
            );
            Vec::new()
        };

        let width = self.width();
        let mut adjusted = 0;
        let body: Vec<Row> = rows
            .enumerate()
            .map(|(i, mut row)| {
                if row.len() != width {
                    warn!(
                        schema = self.name,
                        row = i + 1,
                        cells = row.len(),
                        expected = width,
                        "Conforming malformed table row"
                    );
                    adjusted += 1;
                    row.resize(width, String::new());
                }
                row
            })
            .collect();

        SchemaTable {
            header,
            header_matches,
            body,
            adjusted,
            schema: *self,
        }
    }

    /// Every non-empty cell names its column loosely (`章` for `章番号・章名`,
    /// `要求文` for `文`). Data rows almost never do.
    fn resembles_header(&self, row: &[String]) -> bool {
        row.iter().any(|cell| !cell.is_empty())
            && row.iter().enumerate().all(|(i, cell)| {
                cell.is_empty()
                    || self
                        .columns
                        .get(i)
                        .is_some_and(|col| col.contains(cell.as_str()) || cell.contains(col))
            })
    }
}

impl SchemaTable {
    /// Schema header followed by the conformed body. Empty when nothing parsed.
    pub fn to_rows(&self) -> Vec<Row> {
        if self.header.is_empty() && self.body.is_empty() {
            return Vec::new();
        }
        std::iter::once(self.schema.header_row())
            .chain(self.body.iter().cloned())
            .collect()
    }
}
