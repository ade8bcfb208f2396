use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait};
use std::sync::Arc;

use crate::api::reject_with;
use crate::entities::{category, sub_subcategory, subcategory};
use crate::hierarchy::assemble_tree;
use crate::middleware::logging::ApiError;

pub fn category_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/categories", get(get_category_tree))
        .layer(Extension(db))
}

/// Active classification tree. An inactive node hides its whole subtree.
async fn get_category_tree(Extension(db): Extension<Arc<DatabaseConnection>>) -> Response {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return reject_with(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                ApiError::TransactionCreationFailed,
            );
        }
    };

    let categories = match category::Entity::find()
        .filter(category::Column::IsActive.eq(true))
        .all(&txn)
        .await
    {
        Ok(rows) => rows,
        Err(err) => {
            return reject_with(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                ApiError::DbError(err.to_string()),
            );
        }
    };

    let subcategories = match subcategory::Entity::find()
        .filter(subcategory::Column::IsActive.eq(true))
        .all(&txn)
        .await
    {
        Ok(rows) => rows,
        Err(err) => {
            return reject_with(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                ApiError::DbError(err.to_string()),
            );
        }
    };

    let sub_subcategories = match sub_subcategory::Entity::find()
        .filter(sub_subcategory::Column::IsActive.eq(true))
        .all(&txn)
        .await
    {
        Ok(rows) => rows,
        Err(err) => {
            return reject_with(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                ApiError::DbError(err.to_string()),
            );
        }
    };

    (
        StatusCode::OK,
        Json(assemble_tree(categories, subcategories, sub_subcategories)),
    )
        .into_response()
}
