//! Searchable-PDF formatter.
//!
//! Produces one PDF page per recognized page: a blank white canvas at US
//! Letter size with the page's text overlaid in text render mode 3 -
//! invisible per the PDF spec, but still selectable and searchable. Lines
//! are laid out top-to-bottom with a leading chosen so the layer spans the
//! page bounds, keeping text selection roughly aligned with where the
//! content sat on the source page.
use std::collections::HashMap;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::error::{Result, TextLayerError};
use crate::format::OutputFormatter;
use crate::types::{OcrResult, PageRecognizedText};

/// US Letter at 72 pt/inch.
const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const PAGE_MARGIN: i64 = 36;

const MAX_FONT_SIZE: i64 = 12;

/// Formatter producing a searchable PDF plus the per-page plain texts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchablePdfFormatter;

impl SearchablePdfFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl OutputFormatter for SearchablePdfFormatter {
    fn generate(&self, pages: &[PageRecognizedText]) -> Result<OcrResult> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for page in pages {
            let content = page_content(&page.text);
            let encoded = content
                .encode()
                .map_err(|e| TextLayerError::serialization_with_source("could not encode page content", e))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let page_count = pages.len();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count as i64,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| TextLayerError::serialization_with_source("could not serialize PDF", e))?;

        tracing::debug!(pages = page_count, bytes = bytes.len(), "searchable PDF assembled");

        Ok(OcrResult {
            texts: pages.iter().map(|page| page.text.clone()).collect(),
            pdf_data: Some(bytes),
            metadata: HashMap::from([
                ("page_count".to_string(), page_count.to_string()),
                ("page_size".to_string(), format!("{}x{}", PAGE_WIDTH, PAGE_HEIGHT)),
                (
                    "producer".to_string(),
                    format!("textlayer {}", env!("CARGO_PKG_VERSION")),
                ),
            ]),
        })
    }
}

/// Build one page's content stream: white canvas fill, then the invisible
/// text layer spread over the printable area.
fn page_content(text: &str) -> Content {
    let mut operations = vec![
        Operation::new("q", vec![]),
        Operation::new("rg", vec![1.into(), 1.into(), 1.into()]),
        Operation::new(
            "re",
            vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        ),
        Operation::new("f", vec![]),
        Operation::new("Q", vec![]),
    ];

    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return Content { operations };
    }

    let printable_height = PAGE_HEIGHT - 2 * PAGE_MARGIN;
    let leading = (printable_height / lines.len() as i64).max(1);
    let font_size = leading.min(MAX_FONT_SIZE);

    operations.push(Operation::new("BT", vec![]));
    operations.push(Operation::new("Tr", vec![3.into()]));
    operations.push(Operation::new("Tf", vec!["F1".into(), font_size.into()]));
    operations.push(Operation::new("TL", vec![leading.into()]));
    operations.push(Operation::new(
        "Td",
        vec![PAGE_MARGIN.into(), (PAGE_HEIGHT - PAGE_MARGIN - font_size).into()],
    ));
    for (index, line) in lines.iter().enumerate() {
        if index > 0 {
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
    }
    operations.push(Operation::new("ET", vec![]));

    Content { operations }
}
