//! Reference recognition engine driving the `tesseract` executable.
//!
//! Runs tesseract as a subprocess with TSV output, one invocation per page.
//! The TSV stream carries both the recognized words and their line boxes, so
//! a single run yields the page text and its geometry. Image decoding and
//! region-of-interest cropping happen on a blocking worker thread; the
//! subprocess itself is awaited asynchronously with a hard timeout.
//!
//! The engine needs the `tesseract` binary on `PATH` at call time. Its
//! absence is a recognition failure naming the missing dependency, not a
//! construction failure, so a pipeline can be built unconditionally and
//! probed by use.
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use image::GenericImageView;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use crate::cancel::CancelToken;
use crate::engine::RecognitionEngine;
use crate::error::{Result, TextLayerError};
use crate::progress::ProgressReporter;
use crate::types::{OcrRequest, PageRecognizedText, RegionOfInterest, TextBox};

/// Hard ceiling for one tesseract invocation (120 seconds).
const TESSERACT_TIMEOUT_SECONDS: u64 = 120;

/// Languages the stock tesseract distribution ships traineddata for.
const SUPPORTED_LANGUAGES: &[&str] = &[
    "eng", "deu", "fra", "spa", "ita", "por", "rus", "chi_sim", "chi_tra", "jpn", "kor", "ara",
    "hin", "ben", "tha", "vie", "heb", "tur", "pol", "nld", "swe", "dan", "fin", "nor", "ces",
    "hun", "ron", "ukr", "bul", "hrv", "srp", "slk", "slv", "lit", "lav", "est",
];

/// Accuracy/speed trade-off for recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecognitionLevel {
    /// LSTM engine (`--oem 1`). The default; accuracy-optimized.
    Accurate,
    /// Legacy engine (`--oem 0`). Faster and less accurate; requires
    /// traineddata that includes the legacy model.
    Fast,
}

impl RecognitionLevel {
    fn oem_arg(self) -> &'static str {
        match self {
            RecognitionLevel::Accurate => "1",
            RecognitionLevel::Fast => "0",
        }
    }
}

/// Configuration for [`TesseractEngine`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TesseractConfig {
    pub level: RecognitionLevel,
    /// Dictionary-based spelling correction
    /// (`tessedit_enable_dict_correction` + `language_model_ngram_on`).
    pub dict_correction: bool,
    /// Language used when no request hint is supported.
    pub default_language: String,
    /// Page segmentation mode (tesseract `--psm`).
    pub psm: u8,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            level: RecognitionLevel::Accurate,
            dict_correction: true,
            default_language: "eng".to_string(),
            psm: 3,
        }
    }
}

/// Recognition engine backed by the `tesseract` executable.
///
/// Stateless and reentrant: one instance can serve any number of concurrent
/// jobs. Each page costs one subprocess invocation plus a temp PNG that is
/// removed when the page finishes.
pub struct TesseractEngine {
    config: TesseractConfig,
}

impl TesseractEngine {
    pub fn new() -> Self {
        Self::with_config(TesseractConfig::default())
    }

    pub fn with_config(config: TesseractConfig) -> Self {
        Self { config }
    }

    /// Resolve the request's language hints into a tesseract `-l` argument.
    ///
    /// Unsupported hints are dropped; when nothing survives, the configured
    /// default language is used so recognition never fails on hints alone.
    fn language_arg(&self, hints: &[String]) -> String {
        let supported: Vec<&str> = hints
            .iter()
            .map(String::as_str)
            .filter(|hint| {
                let known = SUPPORTED_LANGUAGES.contains(hint);
                if !known {
                    tracing::debug!(hint = %hint, "dropping unsupported language hint");
                }
                known
            })
            .collect();

        if supported.is_empty() {
            self.config.default_language.clone()
        } else {
            supported.join("+")
        }
    }

    async fn recognize_page(
        &self,
        index: usize,
        bytes: Vec<u8>,
        region: Option<RegionOfInterest>,
        language: &str,
        progress: &ProgressReporter,
    ) -> Result<PageRecognizedText> {
        progress.page(index, 0.0);

        let prepared = tokio::task::spawn_blocking(move || prepare_page(&bytes, region))
            .await
            .map_err(|e| TextLayerError::recognition(format!("page preparation task panicked: {}", e)))??;
        let temp = TempFile::new(prepared.path.clone());
        progress.page(index, 0.25);

        let tsv = self.run_tesseract(&temp.path, language).await?;
        let (text, boxes) = parse_tsv(&tsv, prepared.height);
        tracing::debug!(page = index, regions = boxes.len(), "page recognized");

        progress.page(index, 1.0);
        Ok(PageRecognizedText::new(index, text, boxes))
    }

    async fn run_tesseract(&self, image_path: &Path, language: &str) -> Result<String> {
        let child = Command::new("tesseract")
            .arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(language)
            .arg("--oem")
            .arg(self.config.level.oem_arg())
            .arg("--psm")
            .arg(self.config.psm.to_string())
            .arg("-c")
            .arg(format!(
                "tessedit_enable_dict_correction={}",
                self.config.dict_correction as u8
            ))
            .arg("-c")
            .arg(format!("language_model_ngram_on={}", self.config.dict_correction as u8))
            .arg("tsv")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TextLayerError::recognition(
                        "tesseract executable not found; install tesseract-ocr to use the reference engine",
                    )
                } else {
                    TextLayerError::recognition_with_source("failed to spawn tesseract", e)
                }
            })?;

        let output = match timeout(
            Duration::from_secs(TESSERACT_TIMEOUT_SECONDS),
            child.wait_with_output(),
        )
        .await
        {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(TextLayerError::recognition_with_source(
                    "failed to wait for tesseract",
                    e,
                ))
            }
            Err(_) => {
                return Err(TextLayerError::recognition(format!(
                    "tesseract timed out after {} seconds",
                    TESSERACT_TIMEOUT_SECONDS
                )))
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TextLayerError::recognition(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| TextLayerError::recognition_with_source("tesseract produced invalid UTF-8", e))
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecognitionEngine for TesseractEngine {
    async fn recognize(
        &self,
        request: &OcrRequest,
        progress: &ProgressReporter,
        cancel: &CancelToken,
    ) -> Result<Vec<PageRecognizedText>> {
        let language = self.language_arg(request.languages());
        let mut pages = Vec::with_capacity(request.page_count());

        for (index, page) in request.pages().iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(TextLayerError::Cancelled);
            }
            tracing::debug!(page = index, total = request.page_count(), "recognizing page");
            let recognized = self
                .recognize_page(index, page.bytes().to_vec(), request.region(), &language, progress)
                .await?;
            pages.push(recognized);
        }

        Ok(pages)
    }
}

struct PreparedPage {
    path: PathBuf,
    height: u32,
}

/// Decode a page, apply the region of interest and write the temp PNG
/// tesseract will read. Runs on a blocking worker thread.
fn prepare_page(bytes: &[u8], region: Option<RegionOfInterest>) -> Result<PreparedPage> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| TextLayerError::recognition_with_source("could not decode page image", e))?;

    let decoded = match region {
        Some(roi) => {
            let (width, height) = decoded.dimensions();
            if roi.x >= width || roi.y >= height {
                return Err(TextLayerError::recognition(
                    "region of interest lies outside the page",
                ));
            }
            let crop_width = roi.width.min(width - roi.x);
            let crop_height = roi.height.min(height - roi.y);
            decoded.crop_imm(roi.x, roi.y, crop_width, crop_height)
        }
        None => decoded,
    };

    let height = decoded.dimensions().1;
    let path = std::env::temp_dir().join(format!("textlayer-page-{}.png", uuid::Uuid::new_v4()));
    decoded
        .save_with_format(&path, image::ImageFormat::Png)
        .map_err(|e| TextLayerError::recognition_with_source("could not write temp page image", e))?;

    Ok(PreparedPage { path, height })
}

/// Parse tesseract TSV output into line-joined text and line boxes.
///
/// Level-4 rows open a line and carry its box; level-5 rows append words to
/// the open line. Lines that end up without words are dropped together with
/// their boxes. Box y coordinates are flipped from tesseract's top-left
/// raster origin to the bottom-left image origin.
fn parse_tsv(tsv: &str, page_height: u32) -> (String, Vec<TextBox>) {
    let mut lines: Vec<String> = Vec::new();
    let mut boxes: Vec<TextBox> = Vec::new();

    for row in tsv.lines() {
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 12 {
            continue;
        }
        let level: u8 = match cols[0].parse() {
            Ok(value) => value,
            Err(_) => continue, // header row
        };

        match level {
            4 => {
                let geometry: Option<[u32; 4]> = cols[6..10]
                    .iter()
                    .map(|col| col.parse().ok())
                    .collect::<Option<Vec<u32>>>()
                    .and_then(|v| v.try_into().ok());
                if let Some([left, top, width, height]) = geometry {
                    boxes.push(TextBox::new(
                        left,
                        page_height.saturating_sub(top + height),
                        width,
                        height,
                    ));
                    lines.push(String::new());
                }
            }
            5 => {
                let word = cols[11].trim();
                if word.is_empty() {
                    continue;
                }
                if let Some(current) = lines.last_mut() {
                    if !current.is_empty() {
                        current.push(' ');
                    }
                    current.push_str(word);
                }
            }
            _ => {}
        }
    }

    let mut texts = Vec::with_capacity(lines.len());
    let mut kept = Vec::with_capacity(boxes.len());
    for (line, text_box) in lines.into_iter().zip(boxes) {
        if !line.is_empty() {
            texts.push(line);
            kept.push(text_box);
        }
    }

    (texts.join("\n"), kept)
}

/// RAII guard for the per-page temp image.
struct TempFile {
    path: PathBuf,
}

impl TempFile {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        // Best-effort cleanup; a leaked temp file is not worth failing a page.
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_TSV: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext\n\
1\t1\t0\t0\t0\t0\t0\t0\t640\t480\t-1\t\n\
4\t1\t1\t1\t1\t0\t10\t20\t300\t30\t-1\t\n\
5\t1\t1\t1\t1\t1\t10\t20\t80\t30\t96.1\tHello\n\
5\t1\t1\t1\t1\t2\t100\t20\t90\t30\t95.0\tworld\n\
4\t1\t1\t1\t2\t0\t10\t60\t200\t28\t-1\t\n\
5\t1\t1\t1\t2\t1\t10\t60\t200\t28\t91.3\tsecond\n\
4\t1\t1\t1\t3\t0\t10\t100\t50\t20\t-1\t\n";

    #[test]
    fn test_parse_tsv_joins_lines() {
        let (text, boxes) = parse_tsv(SAMPLE_TSV, 480);
        assert_eq!(text, "Hello world\nsecond");
        assert_eq!(boxes.len(), 2);
    }

    #[test]
    fn test_parse_tsv_flips_to_bottom_left_origin() {
        let (_, boxes) = parse_tsv(SAMPLE_TSV, 480);
        // Raster box at top=20, height=30 sits at 480 - 50 = 430 from the bottom.
        assert_eq!(boxes[0], TextBox::new(10, 430, 300, 30));
        assert_eq!(boxes[1], TextBox::new(10, 392, 200, 28));
    }

    #[test]
    fn test_parse_tsv_drops_wordless_lines() {
        let (text, boxes) = parse_tsv(SAMPLE_TSV, 480);
        // The trailing level-4 row has no level-5 words under it.
        assert_eq!(text.lines().count(), 2);
        assert_eq!(boxes.len(), 2);
    }

    #[test]
    fn test_parse_tsv_empty_page() {
        let (text, boxes) = parse_tsv("level\tpage_num\n", 480);
        assert!(text.is_empty());
        assert!(boxes.is_empty());
    }

    #[test]
    fn test_language_arg_filters_unsupported_hints() {
        let engine = TesseractEngine::new();
        assert_eq!(
            engine.language_arg(&["eng".to_string(), "xyz".to_string()]),
            "eng"
        );
        assert_eq!(
            engine.language_arg(&["deu".to_string(), "fra".to_string()]),
            "deu+fra"
        );
    }

    #[test]
    fn test_language_arg_falls_back_to_default() {
        let engine = TesseractEngine::new();
        assert_eq!(engine.language_arg(&[]), "eng");
        assert_eq!(engine.language_arg(&["klingon".to_string()]), "eng");

        let engine = TesseractEngine::with_config(TesseractConfig {
            default_language: "deu".to_string(),
            ..Default::default()
        });
        assert_eq!(engine.language_arg(&["klingon".to_string()]), "deu");
    }

    #[test]
    fn test_recognition_level_oem_args() {
        assert_eq!(RecognitionLevel::Accurate.oem_arg(), "1");
        assert_eq!(RecognitionLevel::Fast.oem_arg(), "0");
    }

    #[test]
    fn test_config_default_is_accurate_with_correction() {
        let config = TesseractConfig::default();
        assert_eq!(config.level, RecognitionLevel::Accurate);
        assert!(config.dict_correction);
        assert_eq!(config.default_language, "eng");
        assert_eq!(config.psm, 3);
    }

    fn sample_png(width: u32, height: u32) -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 255, 255, 255]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_prepare_page_writes_temp_png() {
        let prepared = prepare_page(&sample_png(64, 48), None).unwrap();
        assert!(prepared.path.exists());
        assert_eq!(prepared.height, 48);
        let _ = std::fs::remove_file(&prepared.path);
    }

    #[test]
    fn test_prepare_page_crops_region_of_interest() {
        let region = RegionOfInterest::new(8, 8, 32, 16);
        let prepared = prepare_page(&sample_png(64, 48), Some(region)).unwrap();
        assert_eq!(prepared.height, 16);

        let cropped = image::open(&prepared.path).unwrap();
        assert_eq!(cropped.dimensions(), (32, 16));
        let _ = std::fs::remove_file(&prepared.path);
    }

    #[test]
    fn test_prepare_page_clamps_oversized_region() {
        let region = RegionOfInterest::new(48, 40, 100, 100);
        let prepared = prepare_page(&sample_png(64, 48), Some(region)).unwrap();
        assert_eq!(prepared.height, 8);
        let _ = std::fs::remove_file(&prepared.path);
    }

    #[test]
    fn test_prepare_page_rejects_region_outside_page() {
        let region = RegionOfInterest::new(100, 0, 10, 10);
        let result = prepare_page(&sample_png(64, 48), Some(region));
        assert!(matches!(result, Err(TextLayerError::RecognitionFailed { .. })));
    }

    #[test]
    fn test_prepare_page_rejects_undecodable_bytes() {
        let result = prepare_page(b"not an image", None);
        assert!(matches!(result, Err(TextLayerError::RecognitionFailed { .. })));
    }

    #[test]
    fn test_temp_file_removed_on_drop() {
        let path = std::env::temp_dir().join(format!("textlayer-test-{}", uuid::Uuid::new_v4()));
        std::fs::write(&path, b"x").unwrap();
        drop(TempFile::new(path.clone()));
        assert!(!path.exists());
    }

    /// Full subprocess round trip against a blank page.
    #[tokio::test]
    #[ignore = "requires the tesseract executable on PATH"]
    async fn test_recognize_blank_page_with_real_binary() {
        use crate::types::{OcrRequest, OutputKind, PageImage};
        use std::sync::Arc;

        let request =
            OcrRequest::new(vec![PageImage::new(sample_png(640, 480))], OutputKind::PlainText).unwrap();
        let sink: Arc<dyn crate::progress::ProgressSink> =
            Arc::new(|_: crate::progress::ProgressUpdate| {});
        let progress = ProgressReporter::new(1, sink);
        let engine = TesseractEngine::new();

        let pages = engine
            .recognize(&request, &progress, &CancelToken::new())
            .await
            .unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].page_index, 0);
        // A blank canvas recognizes to no text.
        assert!(pages[0].text.is_empty());
    }
}
