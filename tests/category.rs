use reqwest::{Client, StatusCode};

mod common;

use common::{admin_tree, create_node, created_id, public_tree, spawn_app};

#[tokio::test]
async fn test_create_three_tier_hierarchy() {
    let base = spawn_app().await;
    let client = Client::new();

    let category_id = created_id(
        create_node(&client, &base, "category", "Beverages", None, None, None).await,
    )
    .await;
    let subcategory_id = created_id(
        create_node(
            &client,
            &base,
            "subcategory",
            "Soda",
            Some(category_id),
            None,
            None,
        )
        .await,
    )
    .await;
    created_id(
        create_node(
            &client,
            &base,
            "sub_subcategory",
            "Cola",
            Some(subcategory_id),
            None,
            None,
        )
        .await,
    )
    .await;

    let tree = public_tree(&client, &base).await;
    let categories = tree.as_array().expect("Tree should be an array");
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0]["name"], "Beverages");
    assert_eq!(categories[0]["slug"], "beverages");
    assert_eq!(categories[0]["product_count"], 0);
    assert_eq!(categories[0]["subcategories"][0]["name"], "Soda");
    assert_eq!(
        categories[0]["subcategories"][0]["sub_subcategories"][0]["name"],
        "Cola"
    );
}

#[tokio::test]
async fn test_subcategory_with_unknown_parent_rejected() {
    let base = spawn_app().await;
    let client = Client::new();

    created_id(create_node(&client, &base, "category", "Beverages", None, None, None).await).await;

    let response = create_node(&client, &base, "subcategory", "Soda", Some(999), None, None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let tree = admin_tree(&client, &base).await;
    assert_eq!(
        tree[0]["subcategories"],
        serde_json::Value::Array(vec![]),
        "rejected subcategory must not be created"
    );
}

#[tokio::test]
async fn test_subcategory_under_inactive_parent_rejected() {
    let base = spawn_app().await;
    let client = Client::new();

    let category_id = created_id(
        create_node(
            &client,
            &base,
            "category",
            "Beverages",
            None,
            None,
            Some(false),
        )
        .await,
    )
    .await;

    let response = create_node(
        &client,
        &base,
        "subcategory",
        "Soda",
        Some(category_id),
        None,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    assert!(body["error"]
        .as_str()
        .expect("error message missing")
        .contains("not found or inactive"));
}

#[tokio::test]
async fn test_missing_or_unknown_tier_rejected() {
    let base = spawn_app().await;
    let client = Client::new();

    let form = reqwest::multipart::Form::new().text("name", "Beverages");
    let response = client
        .post(format!("{base}/api/admin/categories"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = create_node(&client, &base, "aisle", "Beverages", None, None, None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_category_name_rejected() {
    let base = spawn_app().await;
    let client = Client::new();

    created_id(create_node(&client, &base, "category", "Beverages", None, None, None).await).await;
    let response = create_node(&client, &base, "category", "Beverages", None, None, None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    //same slug, different case
    let response = create_node(&client, &base, "category", "BEVERAGES", None, None, None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_tree_ordered_by_display_order_then_name() {
    let base = spawn_app().await;
    let client = Client::new();

    let beverages_id = created_id(
        create_node(&client, &base, "category", "Beverages", None, Some(2), None).await,
    )
    .await;
    created_id(create_node(&client, &base, "category", "Produce", None, Some(1), None).await)
        .await;
    created_id(create_node(&client, &base, "category", "Bakery", None, Some(1), None).await).await;

    created_id(
        create_node(
            &client,
            &base,
            "subcategory",
            "Soda",
            Some(beverages_id),
            Some(1),
            None,
        )
        .await,
    )
    .await;
    created_id(
        create_node(
            &client,
            &base,
            "subcategory",
            "Juice",
            Some(beverages_id),
            Some(1),
            None,
        )
        .await,
    )
    .await;
    created_id(
        create_node(
            &client,
            &base,
            "subcategory",
            "Water",
            Some(beverages_id),
            Some(0),
            None,
        )
        .await,
    )
    .await;

    let tree = public_tree(&client, &base).await;
    let names: Vec<&str> = tree
        .as_array()
        .expect("Tree should be an array")
        .iter()
        .map(|node| node["name"].as_str().expect("name missing"))
        .collect();
    assert_eq!(names, vec!["Bakery", "Produce", "Beverages"]);

    let beverages = &tree[2];
    let sub_names: Vec<&str> = beverages["subcategories"]
        .as_array()
        .expect("subcategories should be an array")
        .iter()
        .map(|node| node["name"].as_str().expect("name missing"))
        .collect();
    assert_eq!(sub_names, vec!["Water", "Juice", "Soda"]);
}

#[tokio::test]
async fn test_public_tree_hides_inactive_admin_includes() {
    let base = spawn_app().await;
    let client = Client::new();

    created_id(create_node(&client, &base, "category", "Bakery", None, None, None).await).await;
    created_id(
        create_node(
            &client,
            &base,
            "category",
            "Seasonal",
            None,
            None,
            Some(false),
        )
        .await,
    )
    .await;

    let public = public_tree(&client, &base).await;
    assert_eq!(public.as_array().expect("array").len(), 1);
    assert_eq!(public[0]["name"], "Bakery");

    let admin = admin_tree(&client, &base).await;
    assert_eq!(admin.as_array().expect("array").len(), 2);
}

#[tokio::test]
async fn test_inactive_subcategory_hides_its_subtree_publicly() {
    let base = spawn_app().await;
    let client = Client::new();

    let category_id = created_id(
        create_node(&client, &base, "category", "Beverages", None, None, None).await,
    )
    .await;
    let subcategory_id = created_id(
        create_node(
            &client,
            &base,
            "subcategory",
            "Soda",
            Some(category_id),
            None,
            Some(false),
        )
        .await,
    )
    .await;
    created_id(
        create_node(
            &client,
            &base,
            "sub_subcategory",
            "Cola",
            Some(subcategory_id),
            None,
            None,
        )
        .await,
    )
    .await;

    let public = public_tree(&client, &base).await;
    assert_eq!(
        public[0]["subcategories"],
        serde_json::Value::Array(vec![]),
        "inactive subcategory and its subtree must be hidden"
    );

    let admin = admin_tree(&client, &base).await;
    assert_eq!(admin[0]["subcategories"][0]["name"], "Soda");
    assert_eq!(
        admin[0]["subcategories"][0]["sub_subcategories"][0]["name"],
        "Cola"
    );
}

#[tokio::test]
async fn test_update_renames_node_and_rederives_slug() {
    let base = spawn_app().await;
    let client = Client::new();

    let category_id = created_id(
        create_node(&client, &base, "category", "Beverages", None, None, None).await,
    )
    .await;

    let form = reqwest::multipart::Form::new().text("name", "Hot Drinks");
    let response = client
        .put(format!("{base}/api/admin/categories/category/{category_id}"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send update request");
    assert_eq!(response.status(), StatusCode::OK);

    let admin = admin_tree(&client, &base).await;
    assert_eq!(admin[0]["name"], "Hot Drinks");
    assert_eq!(admin[0]["slug"], "hot-drinks");
}

#[tokio::test]
async fn test_update_missing_node_is_404() {
    let base = spawn_app().await;
    let client = Client::new();

    let form = reqwest::multipart::Form::new().text("name", "Ghost");
    let response = client
        .put(format!("{base}/api/admin/categories/category/999"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send update request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deactivating_node_removes_it_from_public_tree() {
    let base = spawn_app().await;
    let client = Client::new();

    let category_id = created_id(
        create_node(&client, &base, "category", "Beverages", None, None, None).await,
    )
    .await;

    let form = reqwest::multipart::Form::new().text("is_active", "false");
    let response = client
        .put(format!("{base}/api/admin/categories/category/{category_id}"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send update request");
    assert_eq!(response.status(), StatusCode::OK);

    let public = public_tree(&client, &base).await;
    assert_eq!(public, serde_json::Value::Array(vec![]));
}

#[tokio::test]
async fn test_delete_with_children_rejected() {
    let base = spawn_app().await;
    let client = Client::new();

    let category_id = created_id(
        create_node(&client, &base, "category", "Beverages", None, None, None).await,
    )
    .await;
    let subcategory_id = created_id(
        create_node(
            &client,
            &base,
            "subcategory",
            "Soda",
            Some(category_id),
            None,
            None,
        )
        .await,
    )
    .await;

    let response = client
        .delete(format!("{base}/api/admin/categories/category/{category_id}"))
        .send()
        .await
        .expect("Failed to send delete request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .delete(format!(
            "{base}/api/admin/categories/subcategory/{subcategory_id}"
        ))
        .send()
        .await
        .expect("Failed to send delete request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .delete(format!("{base}/api/admin/categories/category/{category_id}"))
        .send()
        .await
        .expect("Failed to send delete request");
    assert_eq!(response.status(), StatusCode::OK);

    //the node is gone, a second delete misses
    let response = client
        .delete(format!("{base}/api/admin/categories/category/{category_id}"))
        .send()
        .await
        .expect("Failed to send delete request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
