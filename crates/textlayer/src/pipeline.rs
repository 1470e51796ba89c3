//! Batch orchestration.
//!
//! [`OcrPipeline`] owns one job end-to-end: it hands the request to the
//! configured engine, re-validates the engine's page contract, hands the
//! ordered pages to the formatter matching the request's output kind, and
//! guarantees the progress stream terminates at exactly 1.0. It is a serial
//! per-job orchestrator; page-level parallelism is the engine's business.
use std::sync::Arc;

use crate::cancel::CancelToken;
use crate::engine::RecognitionEngine;
use crate::error::{Result, TextLayerError};
use crate::format::{OutputFormatter, PlainTextFormatter};
use crate::progress::{ProgressReporter, ProgressSink};
use crate::types::{OcrRequest, OcrResult, OutputKind, PageRecognizedText};

/// Lifecycle of one `process` invocation. `Idle` is the implicit state
/// before the call; `Cancelled` and `Failed` are terminal alternatives
/// reachable from `Recognizing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobState {
    Recognizing,
    Formatting,
    Done,
    Cancelled,
    Failed,
}

fn transition(state: JobState) {
    tracing::debug!(state = ?state, "job state");
}

/// Per-job OCR orchestrator with swappable engine and formatters.
///
/// The engine and the formatters are stateless, reentrant capabilities
/// configured once; a single pipeline serves any number of concurrent jobs,
/// each with its own progress sink and cancellation token. The formatter is
/// selected per request from the request's [`OutputKind`]: one slot for
/// plain text, one for the searchable PDF. With the `pdf` feature enabled
/// both slots carry the stock implementations; either can be replaced for
/// testing or alternative output backends.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use textlayer::{
///     CancelToken, OcrPipeline, OcrRequest, OutputKind, PageImage, ProgressUpdate, TesseractEngine,
/// };
///
/// # async fn example() -> textlayer::Result<()> {
/// let pipeline = OcrPipeline::new(Arc::new(TesseractEngine::new()));
///
/// let scan = std::fs::read("scan.png").expect("failed to read page image");
/// let request = OcrRequest::new(vec![PageImage::new(scan)], OutputKind::SearchablePdf)?
///     .with_languages(vec!["eng".to_string()]);
///
/// let result = pipeline
///     .process(
///         request,
///         |update: ProgressUpdate| eprintln!("{:>3.0}%", update.overall * 100.0),
///         CancelToken::new(),
///     )
///     .await?;
///
/// assert!(result.pdf_data.is_some());
/// # Ok(())
/// # }
/// ```
pub struct OcrPipeline {
    engine: Arc<dyn RecognitionEngine>,
    text_formatter: Arc<dyn OutputFormatter>,
    pdf_formatter: Option<Arc<dyn OutputFormatter>>,
}

impl OcrPipeline {
    /// Build a pipeline around the given engine with the stock formatters.
    pub fn new(engine: Arc<dyn RecognitionEngine>) -> Self {
        let pdf_formatter: Option<Arc<dyn OutputFormatter>> = {
            #[cfg(feature = "pdf")]
            {
                Some(Arc::new(crate::format::SearchablePdfFormatter::new()))
            }
            #[cfg(not(feature = "pdf"))]
            {
                None
            }
        };
        Self {
            engine,
            text_formatter: Arc::new(PlainTextFormatter::new()),
            pdf_formatter,
        }
    }

    /// Replace the formatter used for [`OutputKind::PlainText`] requests.
    pub fn with_text_formatter(mut self, formatter: Arc<dyn OutputFormatter>) -> Self {
        self.text_formatter = formatter;
        self
    }

    /// Replace the formatter used for [`OutputKind::SearchablePdf`] requests.
    pub fn with_pdf_formatter(mut self, formatter: Arc<dyn OutputFormatter>) -> Self {
        self.pdf_formatter = Some(formatter);
        self
    }

    fn formatter_for(&self, output: OutputKind) -> Result<Arc<dyn OutputFormatter>> {
        match output {
            OutputKind::PlainText => Ok(Arc::clone(&self.text_formatter)),
            OutputKind::SearchablePdf => self.pdf_formatter.clone().ok_or_else(|| {
                TextLayerError::formatting_unavailable(
                    "no searchable-pdf formatter is configured; enable the `pdf` feature or supply one",
                )
            }),
        }
    }

    /// Run one OCR job to completion.
    ///
    /// Suspends the caller until the job settles: the result, a failure, or
    /// `Cancelled`. Progress ticks arrive on `progress` already rescaled to
    /// the overall fraction; the final tick is always exactly 1.0. See the
    /// crate-level docs for the error taxonomy.
    pub async fn process<S>(&self, request: OcrRequest, progress: S, cancel: CancelToken) -> Result<OcrResult>
    where
        S: ProgressSink + 'static,
    {
        let total = request.page_count();
        // Resolve the formatter up front: an unavailable output kind fails
        // before any recognition cost is paid.
        let formatter = self.formatter_for(request.output())?;
        let reporter = ProgressReporter::new(total, Arc::new(progress));

        transition(JobState::Recognizing);
        if cancel.is_cancelled() {
            transition(JobState::Cancelled);
            return Err(TextLayerError::Cancelled);
        }

        let pages = match self.engine.recognize(&request, &reporter, &cancel).await {
            Ok(pages) => pages,
            Err(error) => {
                transition(if error.is_cancelled() {
                    JobState::Cancelled
                } else {
                    JobState::Failed
                });
                return Err(error);
            }
        };
        if let Err(error) = validate_engine_output(&pages, total) {
            transition(JobState::Failed);
            return Err(error);
        }

        // A cancellation that lands after the last page still wins over
        // formatting.
        if cancel.is_cancelled() {
            transition(JobState::Cancelled);
            return Err(TextLayerError::Cancelled);
        }

        transition(JobState::Formatting);
        let formatted = tokio::task::spawn_blocking(move || formatter.generate(&pages))
            .await
            .map_err(|e| TextLayerError::serialization(format!("formatting task panicked: {}", e)));
        let result = match formatted {
            Ok(Ok(result)) => result,
            Ok(Err(error)) | Err(error) => {
                transition(JobState::Failed);
                return Err(error);
            }
        };

        if result.texts.len() != total {
            transition(JobState::Failed);
            return Err(TextLayerError::serialization(format!(
                "formatter returned {} texts for a {}-page job",
                result.texts.len(),
                total
            )));
        }

        reporter.finish();
        transition(JobState::Done);
        Ok(result)
    }
}

/// Enforce the engine's page contract: exactly one result per input page,
/// indices equal to input positions.
fn validate_engine_output(pages: &[PageRecognizedText], total: usize) -> Result<()> {
    if pages.len() != total {
        return Err(TextLayerError::recognition(format!(
            "engine returned {} pages for a {}-page request",
            pages.len(),
            total
        )));
    }
    for (position, page) in pages.iter().enumerate() {
        if page.page_index != position {
            return Err(TextLayerError::recognition(format!(
                "engine returned page index {} at position {}",
                page.page_index, position
            )));
        }
    }
    Ok(())
}
