use std::path::Path;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::Method,
    response::Json,
};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::app::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{ExtractResponse, UploadedFile};
use crate::services::SpooledUpload;

/// `POST /api/pdf`: extract the text of the uploaded `file` part.
pub async fn extract_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<ExtractResponse>> {
    let start = Instant::now();

    info!("Starting PDF extraction request");

    let mut multipart = multipart.map_err(|e| AppError::upload(e.body_text()))?;

    let file = extract_file_from_multipart(&mut multipart, &state.upload_dir).await?;
    info!(
        file_name = %file.name,
        file_size = file.size,
        mime_type = ?file.mime_type,
        "File extracted from multipart form"
    );
    if !file.declares_pdf() {
        debug!(mime_type = ?file.mime_type, "Upload does not declare application/pdf, extracting anyway");
    }

    let result = state.processor.extract_text(&file).await?;

    info!(
        text_length = result.text.len(),
        pages = ?result.pages,
        processing_time_ms = result.processing_time_ms,
        total_time_ms = start.elapsed().as_millis() as u64,
        "Request completed successfully"
    );

    // `file` drops here, removing the spooled copy.
    Ok(Json(ExtractResponse::new(result.text)))
}

/// Fallback for every method other than POST on `/api/pdf`.
pub async fn method_not_allowed_handler(method: Method) -> AppError {
    AppError::method_not_allowed(method.as_str())
}

/// Spools the first `file` part to disk. Other parts are drained and ignored.
async fn extract_file_from_multipart(
    multipart: &mut Multipart,
    upload_dir: &Path,
) -> AppResult<UploadedFile> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::upload(format!("Failed to read multipart field: {}", e)))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        // Only file parts count as uploads; a plain text field named `file` does not.
        let Some(file_name) = field.file_name().map(str::to_string) else {
            debug!(field = %field_name, "Skipping non-file form field");
            drain(&mut field).await?;
            continue;
        };

        if field_name != "file" {
            debug!(field = %field_name, "Skipping unexpected file field");
            drain(&mut field).await?;
            continue;
        }

        let mime_type = field.content_type().map(str::to_string);
        let mut spooled = SpooledUpload::create_in(upload_dir)
            .map_err(|e| AppError::upload(format!("Failed to create temporary file: {}", e)))?;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::upload(format!("Failed to read file data: {}", e)))?
        {
            spooled
                .write_chunk(&chunk)
                .await
                .map_err(|e| AppError::upload(format!("Failed to spool file data: {}", e)))?;
        }
        spooled
            .finish()
            .await
            .map_err(|e| AppError::upload(format!("Failed to spool file data: {}", e)))?;

        return Ok(UploadedFile::new(file_name, mime_type, spooled));
    }

    warn!("Multipart body contained no file part named `file`");
    Err(AppError::MissingFile)
}

async fn drain(field: &mut axum::extract::multipart::Field<'_>) -> AppResult<()> {
    while field
        .chunk()
        .await
        .map_err(|e| AppError::upload(format!("Failed to read multipart field: {}", e)))?
        .is_some()
    {}
    Ok(())
}
