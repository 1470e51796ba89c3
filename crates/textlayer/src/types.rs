//! Request, result and geometry types for the OCR pipeline.
//!
//! All of these are immutable value objects. A request is validated at
//! construction and read-only afterwards; recognized pages and results are
//! produced once and never mutated. Geometry is carried as plain records so
//! that formatters and downstream consumers depend only on page index, text
//! and boxes, never on a platform image handle.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Result, TextLayerError};

/// Encoded image bytes for a single input page.
///
/// The pipeline treats the bytes as opaque; the configured engine decides
/// which encodings it accepts (the reference engine handles anything the
/// `image` crate decodes).
#[derive(Debug, Clone)]
pub struct PageImage {
    bytes: Vec<u8>,
}

impl PageImage {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<Vec<u8>> for PageImage {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

/// Desired shape of the final artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputKind {
    /// Per-page plain text only.
    PlainText,
    /// A PDF whose pages carry the recognized text as an invisible,
    /// selectable layer, plus the per-page plain texts.
    SearchablePdf,
}

/// Sub-rectangle of every page to which recognition is restricted.
///
/// Pixel coordinates with the origin at the top-left of the page image,
/// matching how decoders address pixels. A request carrying a region applies
/// it to all of its pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionOfInterest {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl RegionOfInterest {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

/// One OCR job: an ordered, non-empty sequence of page images plus
/// recognition and output options.
///
/// Construction is the validation point: a request with zero pages (or a
/// page with zero bytes) never exists, so downstream components can assume
/// `page_count() >= 1`. Owned by the caller and read-only to the pipeline.
///
/// # Example
///
/// ```rust
/// use textlayer::{OcrRequest, OutputKind, PageImage};
///
/// # fn example(png: Vec<u8>) -> textlayer::Result<()> {
/// let request = OcrRequest::new(vec![PageImage::new(png)], OutputKind::PlainText)?
///     .with_languages(vec!["eng".to_string(), "deu".to_string()]);
/// assert_eq!(request.page_count(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct OcrRequest {
    pages: Vec<PageImage>,
    languages: Vec<String>,
    region: Option<RegionOfInterest>,
    output: OutputKind,
}

impl OcrRequest {
    /// Build a request over the given pages.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `pages` is empty or any page has no bytes.
    pub fn new(pages: Vec<PageImage>, output: OutputKind) -> Result<Self> {
        if pages.is_empty() {
            return Err(TextLayerError::invalid_input("request contains no pages"));
        }
        if let Some(index) = pages.iter().position(|p| p.is_empty()) {
            return Err(TextLayerError::invalid_input(format!(
                "page {} contains no image data",
                index
            )));
        }
        Ok(Self {
            pages,
            languages: Vec::new(),
            region: None,
            output,
        })
    }

    /// Ordered language hints, most preferred first.
    ///
    /// Hints are advisory: an engine that supports none of them falls back
    /// to its own default language instead of failing.
    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        self.languages = languages;
        self
    }

    /// Restrict recognition to a sub-rectangle of every page.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the region has zero area.
    pub fn with_region(mut self, region: RegionOfInterest) -> Result<Self> {
        if region.width == 0 || region.height == 0 {
            return Err(TextLayerError::invalid_input("region of interest has zero area"));
        }
        self.region = Some(region);
        Ok(self)
    }

    pub fn pages(&self) -> &[PageImage] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn region(&self) -> Option<RegionOfInterest> {
        self.region
    }

    pub fn output(&self) -> OutputKind {
        self.output
    }
}

/// Bounding box of one detected text region, in image pixel coordinates
/// with the origin at the bottom-left corner of the page.
///
/// Engines that detect in top-left raster coordinates flip the y axis
/// before emitting boxes, so consumers see the source image's convention
/// uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl TextBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

/// Recognition output for a single page.
///
/// `page_index` is zero-based and equals the page's position in the request;
/// it is the join key between engine output and formatter input. `text`
/// holds the page's lines joined by `\n` in top-to-bottom recognition order,
/// `boxes` one entry per detected text region in the same order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecognizedText {
    pub page_index: usize,
    pub text: String,
    pub boxes: Vec<TextBox>,
}

impl PageRecognizedText {
    pub fn new(page_index: usize, text: String, boxes: Vec<TextBox>) -> Self {
        Self {
            page_index,
            text,
            boxes,
        }
    }
}

/// Terminal artifact of one pipeline run.
///
/// `texts` always has one entry per input page, in input order. `pdf_data`
/// is present exactly when the request asked for [`OutputKind::SearchablePdf`]
/// and formatting succeeded. `metadata` carries free-form diagnostic and
/// provenance entries from the formatter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    pub texts: Vec<String>,
    pub pdf_data: Option<Vec<u8>>,
    pub metadata: HashMap<String, String>,
}

impl OcrResult {
    /// A plain-text result with no document bytes and no metadata.
    pub fn plain(texts: Vec<String>) -> Self {
        Self {
            texts,
            pdf_data: None,
            metadata: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> PageImage {
        PageImage::new(vec![0u8; 16])
    }

    #[test]
    fn test_request_rejects_zero_pages() {
        let result = OcrRequest::new(vec![], OutputKind::PlainText);
        assert!(matches!(result, Err(TextLayerError::InvalidInput { .. })));
    }

    #[test]
    fn test_request_rejects_empty_page_bytes() {
        let result = OcrRequest::new(vec![page(), PageImage::new(vec![])], OutputKind::PlainText);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("page 1"));
    }

    #[test]
    fn test_request_accessors() {
        let request = OcrRequest::new(vec![page(), page()], OutputKind::SearchablePdf)
            .unwrap()
            .with_languages(vec!["eng".to_string()]);

        assert_eq!(request.page_count(), 2);
        assert_eq!(request.languages(), ["eng".to_string()]);
        assert_eq!(request.output(), OutputKind::SearchablePdf);
        assert!(request.region().is_none());
    }

    #[test]
    fn test_request_region_validation() {
        let request = OcrRequest::new(vec![page()], OutputKind::PlainText).unwrap();
        let err = request.clone().with_region(RegionOfInterest::new(0, 0, 100, 0));
        assert!(matches!(err, Err(TextLayerError::InvalidInput { .. })));

        let ok = request.with_region(RegionOfInterest::new(10, 20, 100, 50)).unwrap();
        assert_eq!(ok.region(), Some(RegionOfInterest::new(10, 20, 100, 50)));
    }

    #[test]
    fn test_page_image_from_vec() {
        let image: PageImage = vec![1u8, 2, 3].into();
        assert_eq!(image.bytes(), &[1, 2, 3]);
        assert_eq!(image.len(), 3);
        assert!(!image.is_empty());
    }

    #[test]
    fn test_recognized_page_construction() {
        let boxes = vec![TextBox::new(0, 700, 612, 24)];
        let recognized = PageRecognizedText::new(0, "hello\nworld".to_string(), boxes.clone());
        assert_eq!(recognized.page_index, 0);
        assert_eq!(recognized.text, "hello\nworld");
        assert_eq!(recognized.boxes, boxes);
    }

    #[test]
    fn test_plain_result_has_no_document() {
        let result = OcrResult::plain(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(result.texts.len(), 2);
        assert!(result.pdf_data.is_none());
        assert!(result.metadata.is_empty());
    }

    #[test]
    fn test_result_serde_round_trip() {
        let result = OcrResult {
            texts: vec!["page one".to_string()],
            pdf_data: Some(vec![0x25, 0x50, 0x44, 0x46]),
            metadata: HashMap::from([("page_count".to_string(), "1".to_string())]),
        };
        let json = serde_json::to_string(&result).unwrap();
        let back: OcrResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
