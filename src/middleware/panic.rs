use std::any::Any;

use axum::response::{IntoResponse, Response};

use crate::error::AppError;

/// Turns a panic anywhere below the catch-panic layer into the generic
/// JSON 500 body.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    AppError::internal(format!("Handler panicked: {}", detail)).into_response()
}
