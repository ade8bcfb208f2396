pub mod admin;
pub mod public;

use axum::http::StatusCode;
use axum::response::Response;
use axum::{Json, Router};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use admin::admin_api_router;
use public::public_api_router;

use crate::middleware::logging::{logging_middleware, to_response, ApiError};

pub fn create_api_router(shared_db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .nest("/api", public_api_router(shared_db.clone()))
        .nest("/api/admin", admin_api_router(shared_db.clone()))
        .layer(axum::middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}

//Rejections share one shape: a JSON error body plus the outcome extension
//for the logging middleware.
pub(crate) fn reject(status: StatusCode, message: impl Into<String>) -> Response {
    let message = message.into();
    to_response(
        (status, Json(json!({ "error": message }))),
        Err(ApiError::General(message)),
    )
}

pub(crate) fn reject_with(
    status: StatusCode,
    message: impl Into<String>,
    err: ApiError,
) -> Response {
    to_response((status, Json(json!({ "error": message.into() }))), Err(err))
}
