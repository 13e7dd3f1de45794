use std::collections::btree_map;
use std::panic;

use lopdf::{Document, ObjectId};
use tracing::{debug, warn};

use super::ExtractError;

pub(super) fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let document = Document::load_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))?;

    let text = PageTexts::new(&document)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();
    if !text.is_empty() {
        return Ok(text);
    }

    // The page walker found nothing. pdf-extract decodes some font encodings
    // lopdf does not, so give it the whole buffer. It is known to panic on
    // odd inputs.
    match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => Ok(text.trim().to_string()),
        Ok(Err(e)) => {
            debug!("pdf-extract found no text either: {e}");
            Ok(String::new())
        }
        Err(_) => {
            warn!("pdf-extract panicked; treating PDF as having no text layer");
            Ok(String::new())
        }
    }
}

/// Yields the text of each page in document order. A page whose extraction
/// fails is logged and skipped; the walk continues with the next page.
pub struct PageTexts<'a> {
    document: &'a Document,
    pages: btree_map::IntoKeys<u32, ObjectId>,
}

impl<'a> PageTexts<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self {
            document,
            pages: document.get_pages().into_keys(),
        }
    }
}

impl Iterator for PageTexts<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        for page in self.pages.by_ref() {
            match self.document.extract_text(&[page]) {
                Ok(text) => return Some(text),
                Err(e) => warn!(page, "Skipping unreadable PDF page: {e}"),
            }
        }
        None
    }
}
