use crate::services::SpooledUpload;

/// A `file` part received by the extraction endpoint.
#[derive(Debug)]
pub struct UploadedFile {
    pub name: String,
    pub size: usize,
    pub mime_type: Option<String>,
    pub content: SpooledUpload,
}

impl UploadedFile {
    pub fn new(name: String, mime_type: Option<String>, content: SpooledUpload) -> Self {
        Self {
            name,
            size: content.size(),
            mime_type,
            content,
        }
    }

    /// Whether the declared media type is exactly `application/pdf`.
    pub fn declares_pdf(&self) -> bool {
        self.mime_type.as_deref() == Some(crate::PDF_MEDIA_TYPE)
    }
}
