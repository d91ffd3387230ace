//! Document text extraction for uploaded Word and PDF files.
//!
//! Both parsers are synchronous and can be slow on large files, so `extract_text`
//! runs them on the blocking pool. A panic inside a parser library surfaces as
//! an `ExtractError` instead of taking the worker down.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

pub mod docx;

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid .docx archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error(".docx package has no {0} part")]
    MissingPart(&'static str),

    #[error("invalid document XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF read error: {0}")]
    Pdf(#[from] pdf_extract::OutputError),

    #[error("document parser aborted: {0}")]
    Aborted(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Docx,
    Pdf,
}

impl DocumentKind {
    /// Word when the declared MIME type or the file name says so; anything else
    /// is handed to the PDF reader.
    pub fn detect(content_type: Option<&str>, file_name: Option<&str>) -> Self {
        let is_docx_mime = content_type.is_some_and(|ct| ct.eq_ignore_ascii_case(DOCX_MIME));
        let is_docx_name =
            file_name.is_some_and(|name| name.to_ascii_lowercase().ends_with(".docx"));

        if is_docx_mime || is_docx_name {
            DocumentKind::Docx
        } else {
            DocumentKind::Pdf
        }
    }
}

/// Extracts the trimmed plain text of `bytes` on the blocking thread pool.
pub async fn extract_text(kind: DocumentKind, bytes: bytes::Bytes) -> Result<String, ExtractError> {
    let size = bytes.len();
    let text = tokio::task::spawn_blocking(move || extract_text_blocking(kind, &bytes))
        .await
        .map_err(|e| ExtractError::Aborted(e.to_string()))??;

    info!(?kind, bytes = size, chars = text.chars().count(), "Document text extracted");
    Ok(text)
}

pub fn extract_text_blocking(kind: DocumentKind, bytes: &[u8]) -> Result<String, ExtractError> {
    debug!(?kind, bytes = bytes.len(), "Extracting document text");
    match kind {
        DocumentKind::Docx => docx::extract_text(bytes),
        DocumentKind::Pdf => Ok(pdf_extract::extract_text_from_mem(bytes)?.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_mime() {
        assert_eq!(
            DocumentKind::detect(Some(DOCX_MIME), Some("upload.bin")),
            DocumentKind::Docx
        );
        assert_eq!(
            DocumentKind::detect(Some("application/pdf"), Some("upload.pdf")),
            DocumentKind::Pdf
        );
    }

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(
            DocumentKind::detect(Some("application/octet-stream"), Some("要求仕様.DOCX")),
            DocumentKind::Docx
        );
    }

    #[test]
    fn test_detect_falls_back_to_pdf() {
        assert_eq!(DocumentKind::detect(None, None), DocumentKind::Pdf);
        assert_eq!(
            DocumentKind::detect(Some("text/plain"), Some("notes.txt")),
            DocumentKind::Pdf
        );
    }

    #[tokio::test]
    async fn test_extract_docx_on_blocking_pool() {
        let docx = docx::tests::build_docx("<w:p><w:r><w:t>  要求  </w:t></w:r></w:p>");
        let text = extract_text(DocumentKind::Docx, bytes::Bytes::from(docx))
            .await
            .unwrap();
        assert_eq!(text, "要求");
    }

    #[tokio::test]
    async fn test_invalid_pdf_is_an_error() {
        let result = extract_text(DocumentKind::Pdf, bytes::Bytes::from_static(b"not a pdf")).await;
        assert!(result.is_err());
    }
}
