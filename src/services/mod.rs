pub mod pdf_processor;
pub mod upload;

pub use pdf_processor::{ExtractionResult, PdfExtractTextExtractor, PdfExtractor, PdfProcessor};
pub use upload::SpooledUpload;
