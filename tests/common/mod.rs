#![allow(dead_code)]

use sea_orm::{ConnectOptions, Database};
use std::sync::Arc;

use wholesale_storefront::api::create_api_router;
use wholesale_storefront::entities::setup_schema;

/// Boots the full router over an isolated in-memory database on an
/// ephemeral port and returns the base url.
pub async fn spawn_app() -> String {
    std::env::set_var("UPLOAD_DIR", "target/test-uploads");

    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options)
        .await
        .expect("Failed to connect to in-memory database");
    setup_schema(&db).await;

    let app = create_api_router(Arc::new(db));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener
        .local_addr()
        .expect("Failed to read test listener address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server error");
    });

    format!("http://{}", addr)
}

pub async fn create_node(
    client: &reqwest::Client,
    base: &str,
    tier: &str,
    name: &str,
    parent_id: Option<i64>,
    display_order: Option<i32>,
    is_active: Option<bool>,
) -> reqwest::Response {
    let mut form = reqwest::multipart::Form::new()
        .text("tier", tier.to_string())
        .text("name", name.to_string());
    if let Some(parent_id) = parent_id {
        form = form.text("parent_id", parent_id.to_string());
    }
    if let Some(display_order) = display_order {
        form = form.text("display_order", display_order.to_string());
    }
    if let Some(is_active) = is_active {
        form = form.text("is_active", is_active.to_string());
    }

    client
        .post(format!("{base}/api/admin/categories"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send create node request")
}

pub async fn created_id(response: reqwest::Response) -> i64 {
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    body["id"].as_i64().expect("id missing from response")
}

pub async fn create_product(
    client: &reqwest::Client,
    base: &str,
    fields: &[(&str, &str)],
) -> reqwest::Response {
    let mut form = reqwest::multipart::Form::new();
    for (key, value) in fields {
        form = form.text(key.to_string(), value.to_string());
    }

    client
        .post(format!("{base}/api/admin/products"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send create product request")
}

/// Beverages -> Soda -> Cola, all active. Returns the three node ids.
pub async fn seed_chain(client: &reqwest::Client, base: &str) -> (i64, i64, i64) {
    let category_id = created_id(
        create_node(client, base, "category", "Beverages", None, None, None).await,
    )
    .await;
    let subcategory_id = created_id(
        create_node(
            client,
            base,
            "subcategory",
            "Soda",
            Some(category_id),
            None,
            None,
        )
        .await,
    )
    .await;
    let sub_subcategory_id = created_id(
        create_node(
            client,
            base,
            "sub_subcategory",
            "Cola",
            Some(subcategory_id),
            None,
            None,
        )
        .await,
    )
    .await;

    (category_id, subcategory_id, sub_subcategory_id)
}

pub async fn admin_tree(client: &reqwest::Client, base: &str) -> serde_json::Value {
    let response = client
        .get(format!("{base}/api/admin/categories"))
        .send()
        .await
        .expect("Failed to fetch admin tree");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON")
}

pub async fn public_tree(client: &reqwest::Client, base: &str) -> serde_json::Value {
    let response = client
        .get(format!("{base}/api/categories"))
        .send()
        .await
        .expect("Failed to fetch public tree");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON")
}
