use axum::{
    extract::{multipart::Field, Extension, Multipart, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::api::{reject, reject_with};
use crate::assets::{self, AssetError, ImageUpload};
use crate::classify::{self, ClassifyError};
use crate::entities::{
    category, image, product::{self, Entity as ProductEntity}, sub_subcategory, subcategory,
};
use crate::middleware::logging::ApiError;

//ROUTERS
pub fn admin_product_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/products", post(create_product))
        .route(
            "/products/:id",
            get(admin_get_product)
                .patch(patch_product)
                .delete(delete_product),
        )
        .layer(Extension(db))
}

//ROUTES
async fn admin_get_product(
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

    match ProductEntity::find_by_id(id).one(&txn).await {
        Ok(Some(prod)) => (StatusCode::OK, Json(prod)).into_response(),
        Ok(None) => reject(
            StatusCode::NOT_FOUND,
            format!("No product with {} id was found.", id),
        ),
        Err(err) => reject_with(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error.",
            ApiError::DbError(err.to_string()),
        ),
    }
}

/// Creates a product: validates the payload, rejects duplicate skus,
/// resolves the supplied classification names to a frozen id chain and
/// increments product_count along that chain in the same transaction.
async fn create_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    mut multipart: Multipart,
) -> Response {
    let form = match read_product_form(&mut multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    let name = match form.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return reject(StatusCode::BAD_REQUEST, "name is required"),
    };
    let sku = match form.sku.as_deref().map(str::trim) {
        Some(sku) if !sku.is_empty() => sku.to_string(),
        _ => return reject(StatusCode::BAD_REQUEST, "sku is required"),
    };
    let price = match form.price {
        Some(price) => price,
        None => return reject(StatusCode::BAD_REQUEST, "price is required"),
    };

    let payload = CreateProductPayload {
        name: name.clone(),
        sku: sku.clone(),
        price,
        price_per_case: form.price_per_case,
        stock_quantity: form.stock_quantity.unwrap_or(0),
        min_stock: form.min_stock.unwrap_or(0),
    };
    if let Err(err) = payload.validate() {
        return reject_with(
            StatusCode::BAD_REQUEST,
            format!("Invalid payload: {err}"),
            ApiError::ValidationFail(err.to_string()),
        );
    }

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

    match ProductEntity::find()
        .filter(product::Column::Sku.eq(&sku))
        .one(&txn)
        .await
    {
        Ok(Some(_)) => {
            return reject(
                StatusCode::BAD_REQUEST,
                format!("Product with sku '{sku}' already exists"),
            );
        }
        Ok(None) => {}
        Err(err) => {
            return reject_with(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                ApiError::DbError(err.to_string()),
            );
        }
    }

    let classification = match classify::resolve(
        &txn,
        form.category.as_deref(),
        form.subcategory.as_deref(),
        form.sub_subcategory.as_deref(),
    )
    .await
    {
        Ok(classification) => classification,
        Err(ClassifyError::Db(err)) => {
            return reject_with(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                ApiError::DbError(err.to_string()),
            );
        }
        Err(err) => return reject(StatusCode::BAD_REQUEST, err.to_string()),
    };

    let image_id = match form.image {
        Some(upload) => match store_product_image(&txn, upload).await {
            Ok(id) => Some(id),
            Err(response) => {
                let _ = txn.rollback().await;
                return response;
            }
        },
        None => None,
    };

    let stock_quantity = payload.stock_quantity;
    let now = chrono::Utc::now();
    let new_product = product::ActiveModel {
        name: Set(name),
        sku: Set(sku),
        category: Set(classification.display_name.clone()),
        category_id: Set(classification.category_id),
        subcategory_id: Set(classification.subcategory_id),
        sub_subcategory_id: Set(classification.sub_subcategory_id),
        brand: Set(form.brand),
        price: Set(price),
        price_per_case: Set(form.price_per_case),
        pack_size: Set(form.pack_size),
        unit: Set(form.unit),
        description: Set(form.description),
        image_id: Set(image_id),
        stock_quantity: Set(stock_quantity),
        min_stock: Set(payload.min_stock),
        in_stock: Set(stock_quantity > 0),
        is_featured: Set(form.is_featured.unwrap_or(false)),
        is_on_offer: Set(form.is_on_offer.unwrap_or(false)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let id = match ProductEntity::insert(new_product).exec(&txn).await {
        Ok(res) => res.last_insert_id,
        Err(err) => {
            let _ = txn.rollback().await;
            return reject_with(
                StatusCode::CONFLICT,
                "Product already exists",
                ApiError::DbError(err.to_string()),
            );
        }
    };

    if let Err(err) = adjust_product_counts(
        &txn,
        classification.category_id,
        classification.subcategory_id,
        classification.sub_subcategory_id,
        1,
    )
    .await
    {
        let _ = txn.rollback().await;
        return reject_with(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            ApiError::DbError(err.to_string()),
        );
    }

    match txn.commit().await {
        Ok(_) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Product created successfully",
                "id": id,
            })),
        )
            .into_response(),
        Err(err) => reject_with(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            ApiError::DbError(err.to_string()),
        ),
    }
}

/// Classification is frozen at creation, a patch can touch everything else.
async fn patch_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchProductPayload>,
) -> Response {
    if let Err(err) = payload.validate() {
        return reject_with(
            StatusCode::BAD_REQUEST,
            format!("Invalid payload: {err}"),
            ApiError::ValidationFail(err.to_string()),
        );
    }

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

    let model = match ProductEntity::find_by_id(id).one(&txn).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            return reject(
                StatusCode::NOT_FOUND,
                format!("No product with {} id was found.", id),
            );
        }
        Err(err) => {
            return reject_with(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error.",
                ApiError::DbError(err.to_string()),
            );
        }
    };

    let mut prod: product::ActiveModel = model.into();

    if let Some(name) = payload.name {
        prod.name = Set(name);
    }
    if let Some(brand) = payload.brand {
        prod.brand = Set(Some(brand));
    }
    if let Some(price) = payload.price {
        prod.price = Set(price);
    }
    if let Some(price_per_case) = payload.price_per_case {
        prod.price_per_case = Set(Some(price_per_case));
    }
    if let Some(pack_size) = payload.pack_size {
        prod.pack_size = Set(Some(pack_size));
    }
    if let Some(unit) = payload.unit {
        prod.unit = Set(Some(unit));
    }
    if let Some(description) = payload.description {
        prod.description = Set(Some(description));
    }
    if let Some(stock_quantity) = payload.stock_quantity {
        prod.stock_quantity = Set(stock_quantity);
        prod.in_stock = Set(stock_quantity > 0);
    }
    if let Some(min_stock) = payload.min_stock {
        prod.min_stock = Set(min_stock);
    }
    if let Some(is_featured) = payload.is_featured {
        prod.is_featured = Set(is_featured);
    }
    if let Some(is_on_offer) = payload.is_on_offer {
        prod.is_on_offer = Set(is_on_offer);
    }
    if let Some(image_id) = payload.image_id {
        match image::Entity::find_by_id(image_id).one(&txn).await {
            Ok(Some(_)) => prod.image_id = Set(Some(image_id)),
            Ok(None) => {
                return reject(
                    StatusCode::BAD_REQUEST,
                    format!("No image with {image_id} id was found"),
                );
            }
            Err(err) => {
                return reject_with(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error.",
                    ApiError::DbError(err.to_string()),
                );
            }
        }
    }
    prod.updated_at = Set(chrono::Utc::now());

    match prod.update(&txn).await {
        Ok(_) => match txn.commit().await {
            Ok(_) => (
                StatusCode::OK,
                Json(json!({
                    "message": "Resource patched successfully."
                })),
            )
                .into_response(),
            Err(err) => reject_with(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                ApiError::DbError(err.to_string()),
            ),
        },
        Err(err) => {
            let _ = txn.rollback().await;
            reject_with(
                StatusCode::BAD_REQUEST,
                "Failed to patch this resource",
                ApiError::DbError(err.to_string()),
            )
        }
    }
}

/// Deletes the product and decrements product_count along its stored
/// chain by exactly one. A repeated delete is a 404, never a second
/// decrement.
async fn delete_product(
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

    let model = match ProductEntity::find_by_id(id).one(&txn).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            return reject(
                StatusCode::NOT_FOUND,
                format!("No product with {} id was found.", id),
            );
        }
        Err(err) => {
            return reject_with(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error.",
                ApiError::DbError(err.to_string()),
            );
        }
    };

    let category_id = model.category_id;
    let subcategory_id = model.subcategory_id;
    let sub_subcategory_id = model.sub_subcategory_id;
    let image_id = model.image_id;

    let prod: product::ActiveModel = model.into();
    if let Err(err) = prod.delete(&txn).await {
        let _ = txn.rollback().await;
        return reject_with(
            StatusCode::BAD_REQUEST,
            "Failed to delete this resource",
            ApiError::DbError(err.to_string()),
        );
    }

    if let Err(err) =
        adjust_product_counts(&txn, category_id, subcategory_id, sub_subcategory_id, -1).await
    {
        let _ = txn.rollback().await;
        return reject_with(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            ApiError::DbError(err.to_string()),
        );
    }

    if let Some(image_id) = image_id {
        if let Err(err) = assets::remove_image(&txn, image_id).await {
            tracing::warn!(image_id, error = %err, "Failed to remove product image record");
        }
    }

    match txn.commit().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "message": "Resource deleted successfully."
            })),
        )
            .into_response(),
        Err(err) => reject_with(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            ApiError::DbError(err.to_string()),
        ),
    }
}

//product_count is an eventually consistent counter: only product create
//and delete touch it, hierarchy edits never recompute it.
async fn adjust_product_counts(
    txn: &DatabaseTransaction,
    category_id: Option<i32>,
    subcategory_id: Option<i32>,
    sub_subcategory_id: Option<i32>,
    delta: i32,
) -> Result<(), DbErr> {
    if let Some(id) = category_id {
        if let Some(node) = category::Entity::find_by_id(id).one(txn).await? {
            let count = node.product_count;
            let mut node: category::ActiveModel = node.into();
            node.product_count = Set((count + delta).max(0));
            node.update(txn).await?;
        }
    }
    if let Some(id) = subcategory_id {
        if let Some(node) = subcategory::Entity::find_by_id(id).one(txn).await? {
            let count = node.product_count;
            let mut node: subcategory::ActiveModel = node.into();
            node.product_count = Set((count + delta).max(0));
            node.update(txn).await?;
        }
    }
    if let Some(id) = sub_subcategory_id {
        if let Some(node) = sub_subcategory::Entity::find_by_id(id).one(txn).await? {
            let count = node.product_count;
            let mut node: sub_subcategory::ActiveModel = node.into();
            node.product_count = Set((count + delta).max(0));
            node.update(txn).await?;
        }
    }
    Ok(())
}

async fn store_product_image(
    txn: &DatabaseTransaction,
    upload: ImageUpload,
) -> Result<i32, Response> {
    match assets::store_image(txn, upload).await {
        Ok(model) => Ok(model.id),
        Err(AssetError::Db(err)) => Err(reject_with(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            ApiError::DbError(err.to_string()),
        )),
        Err(AssetError::Io(err)) => Err(reject_with(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to upload file to the server",
            ApiError::AssetStoreFailed(err.to_string()),
        )),
        Err(err) => Err(reject_with(
            StatusCode::BAD_REQUEST,
            err.to_string(),
            ApiError::AssetStoreFailed(err.to_string()),
        )),
    }
}

//Form plumbing
#[derive(Debug, Default)]
struct ProductForm {
    name: Option<String>,
    sku: Option<String>,
    category: Option<String>,
    subcategory: Option<String>,
    sub_subcategory: Option<String>,
    brand: Option<String>,
    price: Option<f32>,
    price_per_case: Option<f32>,
    pack_size: Option<String>,
    unit: Option<String>,
    description: Option<String>,
    stock_quantity: Option<i32>,
    min_stock: Option<i32>,
    is_featured: Option<bool>,
    is_on_offer: Option<bool>,
    image: Option<ImageUpload>,
}

#[derive(Debug, Validate)]
struct CreateProductPayload {
    #[validate(length(min = 1, max = 200))]
    name: String,
    #[validate(length(min = 1, max = 64))]
    sku: String,
    #[validate(range(min = 0.0))]
    price: f32,
    #[validate(range(min = 0.0))]
    price_per_case: Option<f32>,
    #[validate(range(min = 0))]
    stock_quantity: i32,
    #[validate(range(min = 0))]
    min_stock: i32,
}

#[derive(Deserialize, Validate)]
struct PatchProductPayload {
    #[validate(length(min = 1, max = 200))]
    name: Option<String>,
    brand: Option<String>,
    #[validate(range(min = 0.0))]
    price: Option<f32>,
    #[validate(range(min = 0.0))]
    price_per_case: Option<f32>,
    pack_size: Option<String>,
    unit: Option<String>,
    description: Option<String>,
    #[validate(range(min = 0))]
    stock_quantity: Option<i32>,
    #[validate(range(min = 0))]
    min_stock: Option<i32>,
    is_featured: Option<bool>,
    is_on_offer: Option<bool>,
    image_id: Option<i32>,
}

async fn read_product_form(multipart: &mut Multipart) -> Result<ProductForm, Response> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart.next_field().await.unwrap_or(None) {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => form.name = Some(read_text(field).await?),
            "sku" => form.sku = Some(read_text(field).await?),
            "category" => form.category = Some(read_text(field).await?),
            "subcategory" => form.subcategory = Some(read_text(field).await?),
            "sub_subcategory" => form.sub_subcategory = Some(read_text(field).await?),
            "brand" => form.brand = Some(read_text(field).await?),
            "pack_size" => form.pack_size = Some(read_text(field).await?),
            "unit" => form.unit = Some(read_text(field).await?),
            "description" => form.description = Some(read_text(field).await?),
            "price" => form.price = Some(parse_field(field, "price").await?),
            "price_per_case" => {
                form.price_per_case = Some(parse_field(field, "price_per_case").await?)
            }
            "stock_quantity" => {
                form.stock_quantity = Some(parse_field(field, "stock_quantity").await?)
            }
            "min_stock" => form.min_stock = Some(parse_field(field, "min_stock").await?),
            "is_featured" => form.is_featured = Some(parse_field(field, "is_featured").await?),
            "is_on_offer" => form.is_on_offer = Some(parse_field(field, "is_on_offer").await?),
            "image" => {
                let file_name = field.file_name().unwrap_or("image").to_string();
                let content_type = field.content_type().map(|value| value.to_string());
                let data = match field.bytes().await {
                    Ok(data) => data.to_vec(),
                    Err(_) => {
                        return Err(reject(
                            StatusCode::BAD_REQUEST,
                            "Failed to read image bytes",
                        ));
                    }
                };
                form.image = Some(ImageUpload {
                    file_name,
                    content_type,
                    data,
                });
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: Field<'_>) -> Result<String, Response> {
    field
        .text()
        .await
        .map_err(|_| reject(StatusCode::BAD_REQUEST, "Malformed multipart payload"))
}

async fn parse_field<T: std::str::FromStr>(
    field: Field<'_>,
    field_name: &str,
) -> Result<T, Response> {
    let text = read_text(field).await?;
    text.trim().parse::<T>().map_err(|_| {
        reject(
            StatusCode::BAD_REQUEST,
            format!("Invalid {} '{}'", field_name, text.trim()),
        )
    })
}
