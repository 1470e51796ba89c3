//! Plain-text formatter.
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::types::{OcrResult, PageRecognizedText};

/// Lossless pass-through formatter: one text string per page, no document
/// bytes, no metadata. Pure and total; cannot fail on well-formed input.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextFormatter;

impl PlainTextFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl OutputFormatter for PlainTextFormatter {
    fn generate(&self, pages: &[PageRecognizedText]) -> Result<OcrResult> {
        Ok(OcrResult::plain(pages.iter().map(|page| page.text.clone()).collect()))
    }
}
