use reqwest::{Client, StatusCode};

mod common;

use common::{admin_tree, spawn_app};

const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52,
];

async fn upload_png(client: &Client, base: &str, file_name: &str) -> reqwest::Response {
    let part = reqwest::multipart::Part::bytes(PNG_BYTES.to_vec())
        .file_name(file_name.to_string())
        .mime_str("image/png")
        .expect("Failed to set mime type");
    let form = reqwest::multipart::Form::new().part("image", part);

    client
        .post(format!("{base}/api/admin/images"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send upload request")
}

#[tokio::test]
async fn test_upload_fetch_delete_image() {
    let base = spawn_app().await;
    let client = Client::new();

    let response = upload_png(&client, &base, "cola-shelf.png").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    let image_id = body["id"].as_i64().expect("id missing from response");

    let response = client
        .get(format!("{base}/api/image/{image_id}"))
        .send()
        .await
        .expect("Failed to fetch image");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .expect("content-type missing"),
        "image/png"
    );
    let bytes = response.bytes().await.expect("Failed to read image body");
    assert_eq!(&bytes[..], PNG_BYTES);

    let response = client
        .delete(format!("{base}/api/admin/images/{image_id}"))
        .send()
        .await
        .expect("Failed to send delete request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!("{base}/api/image/{image_id}"))
        .send()
        .await
        .expect("Failed to fetch image");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unsupported_content_type_rejected() {
    let base = spawn_app().await;
    let client = Client::new();

    let part = reqwest::multipart::Part::bytes(b"not an image".to_vec())
        .file_name("notes.txt")
        .mime_str("text/plain")
        .expect("Failed to set mime type");
    let form = reqwest::multipart::Form::new().part("image", part);

    let response = client
        .post(format!("{base}/api/admin/images"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send upload request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_image_field_rejected() {
    let base = spawn_app().await;
    let client = Client::new();

    let form = reqwest::multipart::Form::new().text("caption", "no file here");
    let response = client
        .post(format!("{base}/api/admin/images"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send upload request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_node_created_with_image() {
    let base = spawn_app().await;
    let client = Client::new();

    let part = reqwest::multipart::Part::bytes(PNG_BYTES.to_vec())
        .file_name("beverages.png")
        .mime_str("image/png")
        .expect("Failed to set mime type");
    let form = reqwest::multipart::Form::new()
        .text("tier", "category")
        .text("name", "Beverages")
        .part("image", part);

    let response = client
        .post(format!("{base}/api/admin/categories"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send create node request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let tree = admin_tree(&client, &base).await;
    let image_id = tree[0]["image_id"]
        .as_i64()
        .expect("node should carry an image id");

    let response = client
        .get(format!("{base}/api/image/{image_id}"))
        .send()
        .await
        .expect("Failed to fetch image");
    assert_eq!(response.status(), StatusCode::OK);
}
