use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;

use crate::{MAX_UPLOAD_BYTES, PDF_MEDIA_TYPE};

/// How long "Copied!" stays up after a copy.
pub const COPY_FEEDBACK: Duration = Duration::from_millis(2000);

/// Shown when the server gave no usable message.
pub const GENERIC_FAILURE: &str = "Something went wrong while processing the file.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Only PDF files are supported.")]
    UnsupportedType { media_type: String },

    #[error("File size exceeds 10MB limit.")]
    TooLarge { size: usize },

    #[error("{message}")]
    RequestFailed { message: String },
}

impl ClientError {
    pub fn request_failed(message: impl Into<String>) -> Self {
        ClientError::RequestFailed {
            message: message.into(),
        }
    }

    pub fn generic() -> Self {
        Self::request_failed(GENERIC_FAILURE)
    }
}

/// A file picked by the user, held in memory until it is sent.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk, declaring `application/pdf` for `.pdf` names.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.pdf".to_string());
        let is_pdf = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        let media_type = if is_pdf { PDF_MEDIA_TYPE } else { "application/octet-stream" };

        Ok(Self::new(name, media_type, bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Checks run before any request is made: exact media type, then size.
pub fn validate(file: &SelectedFile) -> Result<(), ClientError> {
    if file.media_type != PDF_MEDIA_TYPE {
        return Err(ClientError::UnsupportedType {
            media_type: file.media_type.clone(),
        });
    }
    if file.size() > MAX_UPLOAD_BYTES {
        return Err(ClientError::TooLarge { size: file.size() });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    Loading,
    Success,
    Error,
}

/// Everything the upload page renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientViewState {
    pub file_name: String,
    pub text: String,
    pub error: String,
    pub loading: bool,
    pub copied: bool,
    pub dark_mode: bool,
}

impl ClientViewState {
    pub fn phase(&self) -> UploadPhase {
        if self.loading {
            UploadPhase::Loading
        } else if !self.error.is_empty() {
            UploadPhase::Error
        } else if !self.text.is_empty() {
            UploadPhase::Success
        } else {
            UploadPhase::Idle
        }
    }

    /// Text to show in the result block. Hidden while loading or when an
    /// error is set, even if `text` is non-empty.
    pub fn visible_text(&self) -> Option<&str> {
        match self.phase() {
            UploadPhase::Success => Some(&self.text),
            _ => None,
        }
    }

    pub fn copy_label(&self) -> &'static str {
        if self.copied {
            "Copied!"
        } else {
            "Copy Text"
        }
    }

    /// Label of the theme toggle, naming the theme it switches to.
    pub fn theme_label(&self) -> &'static str {
        if self.dark_mode {
            "Light Mode"
        } else {
            "Dark Mode"
        }
    }

    pub(crate) fn begin_selection(&mut self, file_name: &str) {
        self.text.clear();
        self.error.clear();
        self.copied = false;
        self.file_name = file_name.to_string();
    }

    pub(crate) fn clear(&mut self) {
        self.file_name.clear();
        self.text.clear();
        self.error.clear();
        self.copied = false;
        self.loading = false;
    }
}
