use reqwest::{Client, StatusCode};

mod common;

use common::{create_node, create_product, created_id, spawn_app};

async fn list_products(client: &Client, base: &str, query: &str) -> serde_json::Value {
    let response = client
        .get(format!("{base}/api/products{query}"))
        .send()
        .await
        .expect("Failed to fetch products");
    assert_eq!(response.status(), StatusCode::OK);
    response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON")
}

#[tokio::test]
async fn test_pagination() {
    let base = spawn_app().await;
    let client = Client::new();

    created_id(create_node(&client, &base, "category", "Pantry", None, None, None).await).await;

    for (name, sku) in [
        ("Item A", "P-1"),
        ("Item B", "P-2"),
        ("Item C", "P-3"),
        ("Item D", "P-4"),
        ("Item E", "P-5"),
    ] {
        created_id(
            create_product(
                &client,
                &base,
                &[
                    ("name", name),
                    ("sku", sku),
                    ("category", "Pantry"),
                    ("price", "1.00"),
                ],
            )
            .await,
        )
        .await;
    }

    let body = list_products(&client, &base, "?limit=2").await;
    assert_eq!(body["products"].as_array().expect("array").len(), 2);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 2);
    assert_eq!(body["total_items"], 5);
    assert_eq!(body["total_pages"], 3);
    assert_eq!(body["products"][0]["name"], "Item A");

    let body = list_products(&client, &base, "?limit=2&page=3").await;
    assert_eq!(body["products"].as_array().expect("array").len(), 1);
    assert_eq!(body["products"][0]["name"], "Item E");
}

#[tokio::test]
async fn test_category_substring_filter_is_case_insensitive() {
    let base = spawn_app().await;
    let client = Client::new();

    created_id(create_node(&client, &base, "category", "Beverages", None, None, None).await).await;
    created_id(create_node(&client, &base, "category", "Bakery", None, None, None).await).await;

    for (name, sku, category) in [
        ("Cola Can", "B-1", "Beverages"),
        ("Orange Juice", "B-2", "Beverages"),
        ("Sourdough Loaf", "K-1", "Bakery"),
    ] {
        created_id(
            create_product(
                &client,
                &base,
                &[
                    ("name", name),
                    ("sku", sku),
                    ("category", category),
                    ("price", "2.00"),
                ],
            )
            .await,
        )
        .await;
    }

    let body = list_products(&client, &base, "?category=bever").await;
    assert_eq!(body["total_items"], 2);

    let body = list_products(&client, &base, "?category=BAKERY").await;
    assert_eq!(body["total_items"], 1);
    assert_eq!(body["products"][0]["name"], "Sourdough Loaf");

    let body = list_products(&client, &base, "?category=frozen").await;
    assert_eq!(body["total_items"], 0);
}

#[tokio::test]
async fn test_free_text_search_spans_name_brand_and_sku() {
    let base = spawn_app().await;
    let client = Client::new();

    created_id(create_node(&client, &base, "category", "Pantry", None, None, None).await).await;

    created_id(
        create_product(
            &client,
            &base,
            &[
                ("name", "Baked Beans"),
                ("sku", "ZZ-9"),
                ("category", "Pantry"),
                ("brand", "Acme Foods"),
                ("price", "0.99"),
            ],
        )
        .await,
    )
    .await;
    created_id(
        create_product(
            &client,
            &base,
            &[
                ("name", "Chopped Tomatoes"),
                ("sku", "TOM-1"),
                ("category", "Pantry"),
                ("description", "Italian plum tomatoes"),
                ("price", "0.89"),
            ],
        )
        .await,
    )
    .await;

    let body = list_products(&client, &base, "?search=acme").await;
    assert_eq!(body["total_items"], 1);
    assert_eq!(body["products"][0]["sku"], "ZZ-9");

    let body = list_products(&client, &base, "?search=zz-9").await;
    assert_eq!(body["total_items"], 1);

    let body = list_products(&client, &base, "?search=plum").await;
    assert_eq!(body["total_items"], 1);
    assert_eq!(body["products"][0]["name"], "Chopped Tomatoes");

    let body = list_products(&client, &base, "?search=caviar").await;
    assert_eq!(body["total_items"], 0);
}

#[tokio::test]
async fn test_flag_filters() {
    let base = spawn_app().await;
    let client = Client::new();

    created_id(create_node(&client, &base, "category", "Pantry", None, None, None).await).await;

    created_id(
        create_product(
            &client,
            &base,
            &[
                ("name", "Featured Item"),
                ("sku", "F-1"),
                ("category", "Pantry"),
                ("price", "1.00"),
                ("is_featured", "true"),
            ],
        )
        .await,
    )
    .await;
    created_id(
        create_product(
            &client,
            &base,
            &[
                ("name", "Offer Item"),
                ("sku", "O-1"),
                ("category", "Pantry"),
                ("price", "1.00"),
                ("is_on_offer", "true"),
            ],
        )
        .await,
    )
    .await;
    created_id(
        create_product(
            &client,
            &base,
            &[
                ("name", "Plain Item"),
                ("sku", "N-1"),
                ("category", "Pantry"),
                ("price", "1.00"),
            ],
        )
        .await,
    )
    .await;

    let body = list_products(&client, &base, "?featured=true").await;
    assert_eq!(body["total_items"], 1);
    assert_eq!(body["products"][0]["sku"], "F-1");

    let body = list_products(&client, &base, "?on_offer=true").await;
    assert_eq!(body["total_items"], 1);
    assert_eq!(body["products"][0]["sku"], "O-1");

    let body = list_products(&client, &base, "").await;
    assert_eq!(body["total_items"], 3);
}
