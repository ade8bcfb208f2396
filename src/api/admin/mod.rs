pub mod category;
pub mod image;
pub mod product;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use category::admin_category_router;
use image::admin_image_router;
use product::admin_product_router;

pub fn admin_api_router(db: Arc<DatabaseConnection>) -> Router {
    let admin_category_router = admin_category_router(db.clone());
    let admin_product_router = admin_product_router(db.clone());
    let admin_image_router = admin_image_router(db.clone());

    Router::new()
        .nest("/", admin_category_router)
        .nest("/", admin_product_router)
        .nest("/", admin_image_router)
}
