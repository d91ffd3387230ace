//! Plain-text extraction from WordprocessingML (`.docx`) packages.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use super::ExtractError;

const DOCUMENT_PART: &str = "word/document.xml";
const FALLBACK: &[u8] = b"mc:Fallback";

/// Returns the text of every paragraph in the main document part, one per line.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|_| ExtractError::MissingPart(DOCUMENT_PART))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)?;

    paragraphs_from_xml(&xml).map(|paragraphs| paragraphs.join("\n").trim().to_string())
}

/// Paragraph text in document order.
///
/// Paragraphs nest (a textbox inside a run holds its own `w:p`), so each open
/// paragraph writes into its own slot and an inner one never disturbs the
/// outer text. `mc:Fallback` repeats the content of its `mc:Choice` sibling
/// and is skipped.
fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut paragraphs: Vec<String> = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    let mut in_text_run = false;
    let mut fallback_depth = 0usize;

    loop {
        let event = reader.read_event()?;
        match &event {
            Event::Start(e) if e.name().as_ref() == FALLBACK => {
                fallback_depth += 1;
                continue;
            }
            Event::End(e) if e.name().as_ref() == FALLBACK => {
                fallback_depth = fallback_depth.saturating_sub(1);
                continue;
            }
            Event::Eof => break,
            _ if fallback_depth > 0 => continue,
            _ => {}
        }

        let current = open.last().copied();
        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:t" => in_text_run = true,
                b"w:p" => {
                    open.push(paragraphs.len());
                    paragraphs.push(String::new());
                }
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => {
                    open.pop();
                }
                _ => {}
            },
            Event::Empty(e) => match (e.name().as_ref(), current) {
                (b"w:tab", Some(i)) => paragraphs[i].push('\t'),
                (b"w:br" | b"w:cr", Some(i)) => paragraphs[i].push('\n'),
                (b"w:p", _) => paragraphs.push(String::new()),
                _ => {}
            },
            Event::Text(t) => {
                if let (true, Some(i)) = (in_text_run, current) {
                    paragraphs[i].push_str(&t.unescape()?);
                }
            }
            Event::CData(t) => {
                if let (true, Some(i)) = (in_text_run, current) {
                    paragraphs[i].push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            _ => {}
        }
    }

    Ok(paragraphs)
}
