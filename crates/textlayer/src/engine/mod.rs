//! Recognition engine capability.
//!
//! The engine is the pluggable half of the pipeline that turns page pixels
//! into text plus geometry. The pipeline only depends on the
//! [`RecognitionEngine`] trait; the reference implementation lives in
//! [`tesseract`] behind the `tesseract` feature, and tests slot in scripted
//! in-memory engines the same way.
#[cfg(feature = "tesseract")]
pub mod tesseract;

use async_trait::async_trait;

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::progress::ProgressReporter;
use crate::types::{OcrRequest, PageRecognizedText};

#[cfg(feature = "tesseract")]
pub use tesseract::{RecognitionLevel, TesseractConfig, TesseractEngine};

/// Trait for recognition engines.
///
/// # Contract
///
/// - Pages are processed in request order and results returned index-aligned
///   with `request.pages()`.
/// - Page-local progress is reported through the [`ProgressReporter`], which
///   rescales to the overall fraction; an engine should tick at least at the
///   start and end of each page.
/// - Cancellation is cooperative: the token must be checked before starting
///   each page, and a cancelled call returns
///   [`TextLayerError::Cancelled`](crate::TextLayerError::Cancelled) with no
///   partial results.
/// - A failure on any single page fails the whole call.
///
/// # Thread Safety
///
/// Engines are stateless, reentrant capabilities (`Send + Sync`), configured
/// once and shared via `Arc` by any number of concurrent jobs; they must not
/// retain per-job mutable state between calls.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use textlayer::{
///     CancelToken, OcrRequest, PageRecognizedText, ProgressReporter, RecognitionEngine, Result,
/// };
///
/// struct FixedTextEngine;
///
/// #[async_trait]
/// impl RecognitionEngine for FixedTextEngine {
///     async fn recognize(
///         &self,
///         request: &OcrRequest,
///         progress: &ProgressReporter,
///         cancel: &CancelToken,
///     ) -> Result<Vec<PageRecognizedText>> {
///         let mut pages = Vec::with_capacity(request.page_count());
///         for index in 0..request.page_count() {
///             if cancel.is_cancelled() {
///                 return Err(textlayer::TextLayerError::Cancelled);
///             }
///             progress.page(index, 0.0);
///             pages.push(PageRecognizedText::new(index, "fixed".to_string(), vec![]));
///             progress.page(index, 1.0);
///         }
///         Ok(pages)
///     }
/// }
/// ```
#[async_trait]
pub trait RecognitionEngine: Send + Sync {
    /// Recognize every page of the request, in order.
    async fn recognize(
        &self,
        request: &OcrRequest,
        progress: &ProgressReporter,
        cancel: &CancelToken,
    ) -> Result<Vec<PageRecognizedText>>;
}
