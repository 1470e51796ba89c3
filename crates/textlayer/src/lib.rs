//! textlayer - Batch OCR Pipeline
//!
//! textlayer turns a sequence of page images into recognized text and a
//! final deliverable: per-page plain text, or a searchable PDF whose pages
//! are blank standard-size canvases carrying the recognized text as an
//! invisible, selectable layer. While a job runs, the caller receives a
//! single monotonic overall-progress stream, and may cancel cooperatively
//! at any point.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use textlayer::{
//!     CancelToken, OcrPipeline, OcrRequest, OutputKind, PageImage, ProgressUpdate, TesseractEngine,
//! };
//!
//! # async fn example() -> textlayer::Result<()> {
//! let pipeline = OcrPipeline::new(Arc::new(TesseractEngine::new()));
//!
//! let page = std::fs::read("scan.png").expect("failed to read page image");
//! let request = OcrRequest::new(vec![PageImage::new(page)], OutputKind::PlainText)?;
//!
//! let result = pipeline
//!     .process(request, |_: ProgressUpdate| {}, CancelToken::new())
//!     .await?;
//! println!("{}", result.texts[0]);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Types** ([`types`]): immutable request/result value objects, validated
//!   at construction
//! - **Engine** ([`engine`]): the pluggable recognition capability; the
//!   reference implementation drives the `tesseract` executable (feature
//!   `tesseract`)
//! - **Formatter** ([`format`]): the pluggable output capability; plain text,
//!   or a searchable PDF via `lopdf` (feature `pdf`)
//! - **Pipeline** ([`pipeline`]): the per-job orchestrator tying engine,
//!   progress rescaling, cancellation and formatting together
//!
//! Engine and formatter are capability traits held as `Arc<dyn ...>`, so
//! either side swaps independently: test doubles, alternative recognition
//! backends, alternative output kinds.

#![deny(unsafe_code)]

pub mod cancel;
pub mod engine;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod progress;
pub mod types;

pub use cancel::CancelToken;
pub use error::{Result, TextLayerError};

pub use engine::RecognitionEngine;
#[cfg(feature = "tesseract")]
pub use engine::{RecognitionLevel, TesseractConfig, TesseractEngine};

pub use format::{OutputFormatter, PlainTextFormatter};
#[cfg(feature = "pdf")]
pub use format::SearchablePdfFormatter;

pub use pipeline::OcrPipeline;
pub use progress::{ProgressReporter, ProgressSink, ProgressUpdate};
pub use types::{
    OcrRequest, OcrResult, OutputKind, PageImage, PageRecognizedText, RegionOfInterest, TextBox,
};
