use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::api::{reject, reject_with};
use crate::entities::product::{self, Entity as ProductEntity};
use crate::middleware::logging::ApiError;

pub fn product_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/products", get(get_products))
        .route("/products/:id", get(get_product))
        .layer(Extension(db))
}

const MAX_PAGE_SIZE: u64 = 100;

async fn get_products(
    Query(params): Query<GetProductsQuery>,
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

    let mut half_result = ProductEntity::find();

    if let Some(category) = params.category.as_deref().map(str::trim) {
        if !category.is_empty() {
            half_result = half_result.filter(product::Column::Category.contains(category));
        }
    }

    if let Some(search) = params.search.as_deref().map(str::trim) {
        if !search.is_empty() {
            half_result = half_result.filter(
                Condition::any()
                    .add(product::Column::Name.contains(search))
                    .add(product::Column::Description.contains(search))
                    .add(product::Column::Brand.contains(search))
                    .add(product::Column::Sku.contains(search)),
            );
        }
    }

    if Some(true) == params.featured {
        half_result = half_result.filter(product::Column::IsFeatured.eq(true));
    }

    if Some(true) == params.on_offer {
        half_result = half_result.filter(product::Column::IsOnOffer.eq(true));
    }

    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(20).clamp(1, MAX_PAGE_SIZE);

    let paginator = half_result
        .order_by_asc(product::Column::Name)
        .order_by_asc(product::Column::Id)
        .paginate(&txn, limit);

    let totals = match paginator.num_items_and_pages().await {
        Ok(totals) => totals,
        Err(err) => {
            return reject_with(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                ApiError::DbError(err.to_string()),
            );
        }
    };

    let products = match paginator.fetch_page(page - 1).await {
        Ok(rows) => rows,
        Err(err) => {
            return reject_with(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                ApiError::DbError(err.to_string()),
            );
        }
    };

    let response: Vec<PublicProductResponse> = products
        .into_iter()
        .map(PublicProductResponse::new)
        .collect();

    (
        StatusCode::OK,
        Json(json!({
            "products": response,
            "page": page,
            "limit": limit,
            "total_items": totals.number_of_items,
            "total_pages": totals.number_of_pages,
        })),
    )
        .into_response()
}

async fn get_product(
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

    let result = ProductEntity::find_by_id(id).one(&txn).await;
    match result {
        Ok(Some(prod)) => {
            (StatusCode::OK, Json(PublicProductResponse::new(prod))).into_response()
        }
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

#[derive(Deserialize)]
struct GetProductsQuery {
    category: Option<String>,
    search: Option<String>,
    featured: Option<bool>,
    on_offer: Option<bool>,
    page: Option<u64>,
    limit: Option<u64>,
}

#[derive(Serialize)]
struct PublicProductResponse {
    id: i32,
    name: String,
    sku: String,
    category: String,
    category_id: Option<i32>,
    subcategory_id: Option<i32>,
    sub_subcategory_id: Option<i32>,
    brand: Option<String>,
    price: f32,
    price_per_case: Option<f32>,
    pack_size: Option<String>,
    unit: Option<String>,
    description: Option<String>,
    image_id: Option<i32>,
    stock_quantity: i32,
    in_stock: bool,
    is_featured: bool,
    is_on_offer: bool,
}

impl PublicProductResponse {
    fn new(value: product::Model) -> PublicProductResponse {
        PublicProductResponse {
            id: value.id,
            name: value.name,
            sku: value.sku,
            category: value.category,
            category_id: value.category_id,
            subcategory_id: value.subcategory_id,
            sub_subcategory_id: value.sub_subcategory_id,
            brand: value.brand,
            price: value.price,
            price_per_case: value.price_per_case,
            pack_size: value.pack_size,
            unit: value.unit,
            description: value.description,
            image_id: value.image_id,
            stock_quantity: value.stock_quantity,
            in_stock: value.in_stock,
            is_featured: value.is_featured,
            is_on_offer: value.is_on_offer,
        }
    }
}
