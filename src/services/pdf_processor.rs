use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use lopdf::Document;

use crate::error::{AppError, AppResult};
use crate::models::UploadedFile;

/// The text extraction capability. Implementations are called on the
/// blocking pool and may take as long as the document requires.
pub trait PdfExtractor: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn extract_text(&self, content: &[u8]) -> anyhow::Result<String>;

    fn is_available(&self) -> bool {
        true
    }
}

/// Extraction backed by the `pdf-extract` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractTextExtractor;

impl PdfExtractor for PdfExtractTextExtractor {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn extract_text(&self, content: &[u8]) -> anyhow::Result<String> {
        pdf_extract::extract_text_from_mem(content).context("pdf-extract could not read document")
    }
}

#[derive(Debug)]
pub struct ExtractionResult {
    pub text: String,
    pub pages: Option<usize>,
    pub processing_time_ms: u64,
}

pub struct PdfProcessor {
    extractor: Arc<dyn PdfExtractor>,
    timeout: Duration,
}

impl PdfProcessor {
    pub fn new(extractor: Arc<dyn PdfExtractor>, timeout: Duration) -> Self {
        Self { extractor, timeout }
    }

    pub async fn extract_text(&self, file: &UploadedFile) -> AppResult<ExtractionResult> {
        let start = Instant::now();

        tracing::info!(
            "Starting PDF text extraction for file: {} ({} bytes, backend: {})",
            file.name,
            file.size,
            self.extractor.name()
        );

        let content = file
            .content
            .read_contents()
            .await
            .map_err(|e| AppError::extraction(format!("Failed to read spooled upload: {}", e)))?;

        let extractor = Arc::clone(&self.extractor);
        let task = tokio::task::spawn_blocking(move || {
            let pages = count_pages(&content);
            extractor.extract_text(&content).map(|text| (text, pages))
        });

        // A timed-out task keeps running on the blocking pool; only the response is released.
        let (text, pages) = match tokio::time::timeout(self.timeout, task).await {
            Err(_) => {
                return Err(AppError::extraction(format!(
                    "Extraction exceeded {:?} timeout",
                    self.timeout
                )))
            }
            Ok(Err(join_err)) if join_err.is_panic() => {
                return Err(AppError::extraction("Extraction library panicked"))
            }
            Ok(Err(join_err)) => return Err(join_err.into()),
            Ok(Ok(Err(e))) => return Err(AppError::extraction(format!("{:#}", e))),
            Ok(Ok(Ok(output))) => output,
        };

        let processing_time = start.elapsed().as_millis() as u64;

        if text.trim().is_empty() {
            tracing::info!("PDF contains no extractable text layer, returning empty text");
        }

        tracing::info!(
            "PDF processing completed in {}ms, extracted {} characters from {:?} pages",
            processing_time,
            text.len(),
            pages
        );

        Ok(ExtractionResult {
            text,
            pages,
            processing_time_ms: processing_time,
        })
    }

    pub fn is_available(&self) -> bool {
        self.extractor.is_available()
    }

    pub fn backend(&self) -> &'static str {
        self.extractor.name()
    }
}

/// Best-effort page count for logging.
fn count_pages(content: &[u8]) -> Option<usize> {
    match Document::load_mem(content) {
        Ok(doc) => Some(doc.get_pages().len()),
        Err(e) => {
            tracing::debug!("PDF structure could not be loaded for page count: {}", e);
            None
        }
    }
}
