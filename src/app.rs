use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::config::Config;
use crate::handlers::{
    extract_handler, health_handler, index_handler, method_not_allowed_handler, ready_handler,
};
use crate::middleware::{logging_middleware, panic_response};
use crate::services::{PdfExtractor, PdfProcessor};
use crate::EXTRACT_PATH;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<PdfProcessor>,
    pub upload_dir: PathBuf,
}

impl AppState {
    pub fn new(config: &Config, extractor: Arc<dyn PdfExtractor>) -> Self {
        Self {
            processor: Arc::new(PdfProcessor::new(extractor, config.extraction_timeout())),
            upload_dir: config.upload_dir.clone(),
        }
    }
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let routes = Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route(
            EXTRACT_PATH,
            post(extract_handler).fallback(method_not_allowed_handler),
        );

    apply_layers(routes, config).with_state(state)
}

/// Wraps routes in the service-wide stack: panic recovery outermost, then
/// tracing, request ids and the body size cap.
pub fn apply_layers<S>(routes: Router<S>, config: &Config) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    routes.layer(
        ServiceBuilder::new()
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(TraceLayer::new_for_http())
            .layer(axum::middleware::from_fn(logging_middleware))
            .layer(DefaultBodyLimit::max(
                config.max_file_size_bytes() + MULTIPART_OVERHEAD_BYTES,
            )),
    )
}
