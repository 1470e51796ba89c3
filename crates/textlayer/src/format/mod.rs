//! Output formatter capability.
//!
//! A formatter turns the ordered recognized pages into the final artifact.
//! Two implementations ship with the crate: [`PlainTextFormatter`] (pure,
//! total, lossless) and, behind the `pdf` feature,
//! [`SearchablePdfFormatter`] (blank standard-size pages carrying the text
//! as an invisible selectable layer).
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod plain;

use crate::error::Result;
use crate::types::{OcrResult, PageRecognizedText};

#[cfg(feature = "pdf")]
pub use pdf::SearchablePdfFormatter;
pub use plain::PlainTextFormatter;

/// Trait for output formatters.
///
/// # Contract
///
/// - The returned result's `texts` has the same length and order as `pages`;
///   formatters never reorder or drop pages.
/// - Formatters are stateless, reentrant capabilities (`Send + Sync`)
///   shared across jobs.
/// - `generate` is a bounded unit of blocking work; the orchestrator runs it
///   on a blocking worker thread.
pub trait OutputFormatter: Send + Sync {
    /// Materialize the final artifact from the ordered recognized pages.
    fn generate(&self, pages: &[PageRecognizedText]) -> Result<OcrResult>;
}
