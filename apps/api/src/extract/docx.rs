use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use super::ExtractError;

/// Main body part inside the DOCX zip container.
const DOCUMENT_PART: &str = "word/document.xml";

pub(super) fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| ExtractError::Docx(e.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractError::Docx(format!("{DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractError::Docx(format!("{DOCUMENT_PART}: {e}")))?;

    Ok(paragraph_texts(&xml)?.join("\n").trim().to_string())
}

/// Collects the text of every body-level `w:p` paragraph in document order.
/// Runs are concatenated; tabs and line breaks inside a paragraph are kept.
/// Paragraphs nested inside another one (text boxes) belong to drawing
/// content, not to the enclosing paragraph, and are skipped.
fn paragraph_texts(xml: &str) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_text_run = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ExtractError::Docx(format!("malformed {DOCUMENT_PART}: {e}")))?;
        let in_outer_paragraph = depth == 1;

        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => {
                    depth += 1;
                    if depth == 1 {
                        current.clear();
                    }
                }
                b"w:t" => in_text_run = true,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" if depth == 0 => paragraphs.push(String::new()),
                b"w:tab" if in_outer_paragraph => current.push('\t'),
                b"w:br" | b"w:cr" if in_outer_paragraph => current.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text_run && in_outer_paragraph => {
                let text = t
                    .unescape()
                    .map_err(|e| ExtractError::Docx(format!("bad text run: {e}")))?;
                current.push_str(&text);
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => {
                    if depth == 1 {
                        paragraphs.push(std::mem::take(&mut current));
                    }
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}
