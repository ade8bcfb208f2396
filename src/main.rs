use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use wholesale_storefront::api::create_api_router;
use wholesale_storefront::entities::setup_schema;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db: DatabaseConnection = Database::connect(&database_url)
        .await
        .expect("Failed to connect to the database");
    setup_schema(&db).await;

    let shared_db = Arc::new(db);

    let app = create_api_router(shared_db);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(addr = %bind_addr, "Storefront API listening");
    axum::serve(listener, app).await.expect("Server error");
}
