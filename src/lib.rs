//! PDF Helper
//!
//! Upload a PDF, get its plain text back. The server half exposes
//! `POST /api/pdf` and a browser page; the client half drives the same
//! upload flow from Rust.

pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use app::{apply_layers, build_router, AppState};
pub use config::Config;
pub use error::{AppError, AppResult};

/// The only media type the upload flow accepts.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Largest file the client will send: 10 MiB.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Path of the extraction endpoint.
pub const EXTRACT_PATH: &str = "/api/pdf";
