use axum::{
    extract::{Extension, Multipart, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::api::{reject, reject_with};
use crate::assets::{self, AssetError, ImageUpload};
use crate::entities::image::{self, Entity as ImageEntity};
use crate::middleware::logging::ApiError;

//ROUTERS
pub fn admin_image_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/images", post(upload_image).get(get_images))
        .route("/images/:id", axum::routing::delete(delete_image))
        .layer(Extension(db))
}

//ROUTES
async fn upload_image(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    mut multipart: Multipart,
) -> Response {
    let mut upload: Option<ImageUpload> = None;

    while let Some(field) = multipart.next_field().await.unwrap_or(None) {
        if field.name() != Some("image") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("image").to_string();
        let content_type = field.content_type().map(|value| value.to_string());
        let data = match field.bytes().await {
            Ok(data) => data.to_vec(),
            Err(_) => {
                return reject(StatusCode::BAD_REQUEST, "Failed to read image bytes");
            }
        };
        upload = Some(ImageUpload {
            file_name,
            content_type,
            data,
        });
    }

    let upload = match upload {
        Some(upload) => upload,
        None => return reject(StatusCode::BAD_REQUEST, "image file is required"),
    };

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

    let model = match assets::store_image(&txn, upload).await {
        Ok(model) => model,
        Err(AssetError::Db(err)) => {
            let _ = txn.rollback().await;
            return reject_with(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                ApiError::DbError(err.to_string()),
            );
        }
        Err(AssetError::Io(err)) => {
            let _ = txn.rollback().await;
            return reject_with(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to upload file to the server",
                ApiError::AssetStoreFailed(err.to_string()),
            );
        }
        Err(err) => {
            let _ = txn.rollback().await;
            return reject_with(
                StatusCode::BAD_REQUEST,
                err.to_string(),
                ApiError::AssetStoreFailed(err.to_string()),
            );
        }
    };

    match txn.commit().await {
        Ok(_) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "File uploaded successfully.",
                "id": model.id,
            })),
        )
            .into_response(),
        Err(err) => reject_with(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error.",
            ApiError::DbError(err.to_string()),
        ),
    }
}

async fn get_images(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Query(query): Query<ImagesQuery>,
) -> Response {
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

    let filter = if let Some(query) = query.query {
        let mut query_condition =
            Condition::any().add(image::Column::FileName.contains(query.clone()));
        if let Some(id) = query.parse::<i32>().ok() {
            query_condition = query_condition.add(image::Column::Id.eq(id));
        };

        query_condition
    } else {
        Condition::any()
    };

    match ImageEntity::find().filter(filter).all(&txn).await {
        Ok(images) => (StatusCode::OK, Json(images)).into_response(),
        Err(err) => reject_with(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error.",
            ApiError::DbError(err.to_string()),
        ),
    }
}

async fn delete_image(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
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

    let model = match ImageEntity::find_by_id(id).one(&txn).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            return reject(
                StatusCode::NOT_FOUND,
                format!("No image with id {} was found.", id),
            );
        }
        Err(err) => {
            return reject_with(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch image from database",
                ApiError::DbError(err.to_string()),
            );
        }
    };

    if let Err(err) = ImageEntity::delete_by_id(model.id).exec(&txn).await {
        let _ = txn.rollback().await;
        return reject_with(
            StatusCode::BAD_REQUEST,
            "Image is still referenced by a category or product",
            ApiError::DbError(err.to_string()),
        );
    }

    match txn.commit().await {
        Ok(_) => {
            assets::discard_file(&model);
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Resource deleted successfully."
                })),
            )
                .into_response()
        }
        Err(err) => reject_with(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            ApiError::DbError(err.to_string()),
        ),
    }
}

//structs
#[derive(Deserialize)]
struct ImagesQuery {
    query: Option<String>,
}
