use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::fmt;
use std::time::Instant;
use tracing::{error, info};

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let elapsed = start.elapsed();
    match response.extensions().get::<Result<(), ApiError>>() {
        Some(Err(value)) => error!(
            method = %method,
            uri = %uri,
            status = %status,
            elapsed = ?elapsed,
            value = %value,
            "Failed to process request"
        ),
        Some(Ok(())) | None => info!(
            method = %method,
            uri = %uri,
            status = %status,
            elapsed = ?elapsed,
            "Processed request"
        ),
    }

    response
}

#[derive(Clone, Debug)]
pub enum ApiError {
    TransactionCreationFailed,
    DbError(String),
    ValidationFail(String),
    AssetStoreFailed(String),
    General(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::TransactionCreationFailed => write!(f, "Failed to create transaction"),
            ApiError::DbError(value) => write!(f, "Database error: {value}"),
            ApiError::ValidationFail(value) => write!(f, "Failed to validate: {value}"),
            ApiError::AssetStoreFailed(value) => write!(f, "Failed to store asset: {value}"),
            ApiError::General(value) => write!(f, "{value}"),
        }
    }
}

pub fn to_response<T: IntoResponse>(
    response: T,               //The response that we are sending + StatusCode
    ext: Result<(), ApiError>, //The extension, that we want to give logging middleware
) -> Response {
    let mut response = response.into_response();

    response.extensions_mut().insert(ext);

    response
}
