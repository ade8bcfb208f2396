use axum::{
    extract::{multipart::Field, Extension, Multipart, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::api::{reject, reject_with};
use crate::assets::{self, AssetError, ImageUpload};
use crate::entities::{category, sub_subcategory, subcategory};
use crate::hierarchy::{assemble_tree, slugify, Tier};
use crate::middleware::logging::ApiError;

//ROUTERS
pub fn admin_category_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route(
            "/categories",
            get(admin_get_category_tree).post(create_category_node),
        )
        .route(
            "/categories/:tier/:id",
            put(update_category_node).delete(delete_category_node),
        )
        .layer(Extension(db))
}

//ROUTES
/// Full tree for the back office, inactive nodes included.
async fn admin_get_category_tree(Extension(db): Extension<Arc<DatabaseConnection>>) -> Response {
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

    let categories = match category::Entity::find().all(&txn).await {
        Ok(rows) => rows,
        Err(err) => {
            return reject_with(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                ApiError::DbError(err.to_string()),
            );
        }
    };

    let subcategories = match subcategory::Entity::find().all(&txn).await {
        Ok(rows) => rows,
        Err(err) => {
            return reject_with(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                ApiError::DbError(err.to_string()),
            );
        }
    };

    let sub_subcategories = match sub_subcategory::Entity::find().all(&txn).await {
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

async fn create_category_node(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    mut multipart: Multipart,
) -> Response {
    let form = match read_node_form(&mut multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    let tier = match form.tier {
        Some(tier) => tier,
        None => return reject(StatusCode::BAD_REQUEST, "tier is required"),
    };
    let name = match form.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return reject(StatusCode::BAD_REQUEST, "name is required"),
    };

    let payload = NodePayload {
        name: name.clone(),
        description: form.description.clone(),
    };
    if let Err(err) = payload.validate() {
        return reject_with(
            StatusCode::BAD_REQUEST,
            format!("Invalid payload: {err}"),
            ApiError::ValidationFail(err.to_string()),
        );
    }

    let slug = slugify(&name);
    if slug.is_empty() {
        return reject(
            StatusCode::BAD_REQUEST,
            "name must contain at least one letter or digit",
        );
    }

    let node = CreateNode {
        name,
        slug,
        description: form.description,
        parent_id: form.parent_id,
        display_order: form.display_order.unwrap_or(0),
        is_active: form.is_active.unwrap_or(true),
        image: form.image,
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

    let result = match tier {
        Tier::Category => create_category_row(&txn, node).await,
        Tier::Subcategory => create_subcategory_row(&txn, node).await,
        Tier::SubSubcategory => create_sub_subcategory_row(&txn, node).await,
    };

    match result {
        Ok(id) => match txn.commit().await {
            Ok(_) => (
                StatusCode::CREATED,
                Json(json!({
                    "message": format!("{tier} created successfully"),
                    "id": id,
                })),
            )
                .into_response(),
            Err(err) => reject_with(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                ApiError::DbError(err.to_string()),
            ),
        },
        Err(response) => {
            let _ = txn.rollback().await;
            response
        }
    }
}

async fn update_category_node(
    Path((tier, id)): Path<(Tier, i32)>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    mut multipart: Multipart,
) -> Response {
    let form = match read_node_form(&mut multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    if let Some(name) = form.name.as_deref().map(str::trim) {
        if name.is_empty() || slugify(name).is_empty() {
            return reject(
                StatusCode::BAD_REQUEST,
                "name must contain at least one letter or digit",
            );
        }
        let payload = NodePayload {
            name: name.to_string(),
            description: form.description.clone(),
        };
        if let Err(err) = payload.validate() {
            return reject_with(
                StatusCode::BAD_REQUEST,
                format!("Invalid payload: {err}"),
                ApiError::ValidationFail(err.to_string()),
            );
        }
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

    let result = match tier {
        Tier::Category => patch_category_row(&txn, id, form).await,
        Tier::Subcategory => patch_subcategory_row(&txn, id, form).await,
        Tier::SubSubcategory => patch_sub_subcategory_row(&txn, id, form).await,
    };

    match result {
        Ok(()) => match txn.commit().await {
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
        Err(response) => {
            let _ = txn.rollback().await;
            response
        }
    }
}

/// Deleting a node with children is rejected, the hierarchy never holds
/// orphaned parent references.
async fn delete_category_node(
    Path((tier, id)): Path<(Tier, i32)>,
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

    let result = match tier {
        Tier::Category => delete_category_row(&txn, id).await,
        Tier::Subcategory => delete_subcategory_row(&txn, id).await,
        Tier::SubSubcategory => delete_sub_subcategory_row(&txn, id).await,
    };

    match result {
        Ok(()) => match txn.commit().await {
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
        },
        Err(response) => {
            let _ = txn.rollback().await;
            response
        }
    }
}

//Per-tier rows
async fn create_category_row(txn: &DatabaseTransaction, node: CreateNode) -> Result<i32, Response> {
    if node.parent_id.is_some() {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            "parent_id is not accepted for tier 'category'",
        ));
    }

    match category::Entity::find()
        .filter(category::Column::Slug.eq(&node.slug))
        .one(txn)
        .await
    {
        Ok(Some(_)) => {
            return Err(reject(
                StatusCode::BAD_REQUEST,
                format!("Category '{}' already exists", node.name),
            ));
        }
        Ok(None) => {}
        Err(err) => return Err(db_failure(err)),
    }

    let image_id = store_form_image(txn, node.image).await?;

    let now = chrono::Utc::now();
    let new_node = category::ActiveModel {
        name: Set(node.name),
        slug: Set(node.slug),
        description: Set(node.description),
        image_id: Set(image_id),
        display_order: Set(node.display_order),
        is_active: Set(node.is_active),
        product_count: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    match category::Entity::insert(new_node).exec(txn).await {
        Ok(res) => Ok(res.last_insert_id),
        Err(_) => Err(reject(StatusCode::CONFLICT, "Category already exists")),
    }
}

async fn create_subcategory_row(
    txn: &DatabaseTransaction,
    node: CreateNode,
) -> Result<i32, Response> {
    let parent_id = match node.parent_id {
        Some(parent_id) => parent_id,
        None => {
            return Err(reject(
                StatusCode::BAD_REQUEST,
                "parent_id is required for tier 'subcategory'",
            ));
        }
    };

    match category::Entity::find_by_id(parent_id)
        .filter(category::Column::IsActive.eq(true))
        .one(txn)
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Err(reject(
                StatusCode::BAD_REQUEST,
                format!("Parent category with id {parent_id} not found or inactive"),
            ));
        }
        Err(err) => return Err(db_failure(err)),
    }

    match subcategory::Entity::find()
        .filter(subcategory::Column::Slug.eq(&node.slug))
        .one(txn)
        .await
    {
        Ok(Some(_)) => {
            return Err(reject(
                StatusCode::BAD_REQUEST,
                format!("Subcategory '{}' already exists", node.name),
            ));
        }
        Ok(None) => {}
        Err(err) => return Err(db_failure(err)),
    }

    let image_id = store_form_image(txn, node.image).await?;

    let now = chrono::Utc::now();
    let new_node = subcategory::ActiveModel {
        name: Set(node.name),
        slug: Set(node.slug),
        description: Set(node.description),
        parent_category_id: Set(parent_id),
        image_id: Set(image_id),
        display_order: Set(node.display_order),
        is_active: Set(node.is_active),
        product_count: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    match subcategory::Entity::insert(new_node).exec(txn).await {
        Ok(res) => Ok(res.last_insert_id),
        Err(_) => Err(reject(StatusCode::CONFLICT, "Subcategory already exists")),
    }
}

async fn create_sub_subcategory_row(
    txn: &DatabaseTransaction,
    node: CreateNode,
) -> Result<i32, Response> {
    let parent_id = match node.parent_id {
        Some(parent_id) => parent_id,
        None => {
            return Err(reject(
                StatusCode::BAD_REQUEST,
                "parent_id is required for tier 'sub_subcategory'",
            ));
        }
    };

    match subcategory::Entity::find_by_id(parent_id)
        .filter(subcategory::Column::IsActive.eq(true))
        .one(txn)
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Err(reject(
                StatusCode::BAD_REQUEST,
                format!("Parent subcategory with id {parent_id} not found or inactive"),
            ));
        }
        Err(err) => return Err(db_failure(err)),
    }

    match sub_subcategory::Entity::find()
        .filter(sub_subcategory::Column::Slug.eq(&node.slug))
        .one(txn)
        .await
    {
        Ok(Some(_)) => {
            return Err(reject(
                StatusCode::BAD_REQUEST,
                format!("Sub-subcategory '{}' already exists", node.name),
            ));
        }
        Ok(None) => {}
        Err(err) => return Err(db_failure(err)),
    }

    let image_id = store_form_image(txn, node.image).await?;

    let now = chrono::Utc::now();
    let new_node = sub_subcategory::ActiveModel {
        name: Set(node.name),
        slug: Set(node.slug),
        description: Set(node.description),
        parent_subcategory_id: Set(parent_id),
        image_id: Set(image_id),
        display_order: Set(node.display_order),
        is_active: Set(node.is_active),
        product_count: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    match sub_subcategory::Entity::insert(new_node).exec(txn).await {
        Ok(res) => Ok(res.last_insert_id),
        Err(_) => Err(reject(
            StatusCode::CONFLICT,
            "Sub-subcategory already exists",
        )),
    }
}

//Parent references are deliberately not re-validated on update, matching
//the create-time-only rule.
async fn patch_category_row(
    txn: &DatabaseTransaction,
    id: i32,
    form: NodeForm,
) -> Result<(), Response> {
    let model = match category::Entity::find_by_id(id).one(txn).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            return Err(reject(
                StatusCode::NOT_FOUND,
                format!("No category with {} id was found.", id),
            ));
        }
        Err(err) => return Err(db_failure(err)),
    };

    if form.parent_id.is_some() {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            "parent_id is not accepted for tier 'category'",
        ));
    }

    let old_image_id = model.image_id;
    let mut node: category::ActiveModel = model.into();

    if let Some(name) = form.name {
        let name = name.trim().to_string();
        node.slug = Set(slugify(&name));
        node.name = Set(name);
    }
    if let Some(description) = form.description {
        node.description = Set(non_empty(description));
    }
    if let Some(display_order) = form.display_order {
        node.display_order = Set(display_order);
    }
    if let Some(is_active) = form.is_active {
        node.is_active = Set(is_active);
    }

    let replaced = form.image.is_some();
    if let Some(upload) = form.image {
        let image = store_image_or_reject(txn, upload).await?;
        node.image_id = Set(Some(image));
    }
    node.updated_at = Set(chrono::Utc::now());

    if let Err(err) = node.update(txn).await {
        return Err(reject_with(
            StatusCode::BAD_REQUEST,
            "Failed to patch this resource",
            ApiError::DbError(err.to_string()),
        ));
    }

    if replaced {
        drop_old_image(txn, old_image_id).await;
    }

    Ok(())
}

async fn patch_subcategory_row(
    txn: &DatabaseTransaction,
    id: i32,
    form: NodeForm,
) -> Result<(), Response> {
    let model = match subcategory::Entity::find_by_id(id).one(txn).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            return Err(reject(
                StatusCode::NOT_FOUND,
                format!("No subcategory with {} id was found.", id),
            ));
        }
        Err(err) => return Err(db_failure(err)),
    };

    let old_image_id = model.image_id;
    let mut node: subcategory::ActiveModel = model.into();

    if let Some(name) = form.name {
        let name = name.trim().to_string();
        node.slug = Set(slugify(&name));
        node.name = Set(name);
    }
    if let Some(description) = form.description {
        node.description = Set(non_empty(description));
    }
    if let Some(parent_id) = form.parent_id {
        node.parent_category_id = Set(parent_id);
    }
    if let Some(display_order) = form.display_order {
        node.display_order = Set(display_order);
    }
    if let Some(is_active) = form.is_active {
        node.is_active = Set(is_active);
    }

    let replaced = form.image.is_some();
    if let Some(upload) = form.image {
        let image = store_image_or_reject(txn, upload).await?;
        node.image_id = Set(Some(image));
    }
    node.updated_at = Set(chrono::Utc::now());

    if let Err(err) = node.update(txn).await {
        return Err(reject_with(
            StatusCode::BAD_REQUEST,
            "Failed to patch this resource",
            ApiError::DbError(err.to_string()),
        ));
    }

    if replaced {
        drop_old_image(txn, old_image_id).await;
    }

    Ok(())
}

async fn patch_sub_subcategory_row(
    txn: &DatabaseTransaction,
    id: i32,
    form: NodeForm,
) -> Result<(), Response> {
    let model = match sub_subcategory::Entity::find_by_id(id).one(txn).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            return Err(reject(
                StatusCode::NOT_FOUND,
                format!("No sub-subcategory with {} id was found.", id),
            ));
        }
        Err(err) => return Err(db_failure(err)),
    };

    let old_image_id = model.image_id;
    let mut node: sub_subcategory::ActiveModel = model.into();

    if let Some(name) = form.name {
        let name = name.trim().to_string();
        node.slug = Set(slugify(&name));
        node.name = Set(name);
    }
    if let Some(description) = form.description {
        node.description = Set(non_empty(description));
    }
    if let Some(parent_id) = form.parent_id {
        node.parent_subcategory_id = Set(parent_id);
    }
    if let Some(display_order) = form.display_order {
        node.display_order = Set(display_order);
    }
    if let Some(is_active) = form.is_active {
        node.is_active = Set(is_active);
    }

    let replaced = form.image.is_some();
    if let Some(upload) = form.image {
        let image = store_image_or_reject(txn, upload).await?;
        node.image_id = Set(Some(image));
    }
    node.updated_at = Set(chrono::Utc::now());

    if let Err(err) = node.update(txn).await {
        return Err(reject_with(
            StatusCode::BAD_REQUEST,
            "Failed to patch this resource",
            ApiError::DbError(err.to_string()),
        ));
    }

    if replaced {
        drop_old_image(txn, old_image_id).await;
    }

    Ok(())
}

async fn delete_category_row(txn: &DatabaseTransaction, id: i32) -> Result<(), Response> {
    let model = match category::Entity::find_by_id(id).one(txn).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            return Err(reject(
                StatusCode::NOT_FOUND,
                format!("No category with {} id was found.", id),
            ));
        }
        Err(err) => return Err(db_failure(err)),
    };

    let children = match subcategory::Entity::find()
        .filter(subcategory::Column::ParentCategoryId.eq(id))
        .count(txn)
        .await
    {
        Ok(children) => children,
        Err(err) => return Err(db_failure(err)),
    };
    if children > 0 {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            format!(
                "Cannot delete category '{}' while {} subcategories reference it",
                model.name, children
            ),
        ));
    }

    let image_id = model.image_id;
    let node: category::ActiveModel = model.into();
    if let Err(err) = node.delete(txn).await {
        return Err(reject_with(
            StatusCode::BAD_REQUEST,
            "Failed to delete this resource",
            ApiError::DbError(err.to_string()),
        ));
    }

    drop_old_image(txn, image_id).await;
    Ok(())
}

async fn delete_subcategory_row(txn: &DatabaseTransaction, id: i32) -> Result<(), Response> {
    let model = match subcategory::Entity::find_by_id(id).one(txn).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            return Err(reject(
                StatusCode::NOT_FOUND,
                format!("No subcategory with {} id was found.", id),
            ));
        }
        Err(err) => return Err(db_failure(err)),
    };

    let children = match sub_subcategory::Entity::find()
        .filter(sub_subcategory::Column::ParentSubcategoryId.eq(id))
        .count(txn)
        .await
    {
        Ok(children) => children,
        Err(err) => return Err(db_failure(err)),
    };
    if children > 0 {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            format!(
                "Cannot delete subcategory '{}' while {} sub-subcategories reference it",
                model.name, children
            ),
        ));
    }

    let image_id = model.image_id;
    let node: subcategory::ActiveModel = model.into();
    if let Err(err) = node.delete(txn).await {
        return Err(reject_with(
            StatusCode::BAD_REQUEST,
            "Failed to delete this resource",
            ApiError::DbError(err.to_string()),
        ));
    }

    drop_old_image(txn, image_id).await;
    Ok(())
}

async fn delete_sub_subcategory_row(txn: &DatabaseTransaction, id: i32) -> Result<(), Response> {
    let model = match sub_subcategory::Entity::find_by_id(id).one(txn).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            return Err(reject(
                StatusCode::NOT_FOUND,
                format!("No sub-subcategory with {} id was found.", id),
            ));
        }
        Err(err) => return Err(db_failure(err)),
    };

    let image_id = model.image_id;
    let node: sub_subcategory::ActiveModel = model.into();
    if let Err(err) = node.delete(txn).await {
        return Err(reject_with(
            StatusCode::BAD_REQUEST,
            "Failed to delete this resource",
            ApiError::DbError(err.to_string()),
        ));
    }

    drop_old_image(txn, image_id).await;
    Ok(())
}

//Form plumbing
#[derive(Debug, Default)]
struct NodeForm {
    tier: Option<Tier>,
    name: Option<String>,
    description: Option<String>,
    parent_id: Option<i32>,
    display_order: Option<i32>,
    is_active: Option<bool>,
    image: Option<ImageUpload>,
}

#[derive(Debug, Validate)]
struct NodePayload {
    #[validate(length(min = 1, max = 120))]
    name: String,
    #[validate(length(max = 2000))]
    description: Option<String>,
}

#[derive(Debug)]
struct CreateNode {
    name: String,
    slug: String,
    description: Option<String>,
    parent_id: Option<i32>,
    display_order: i32,
    is_active: bool,
    image: Option<ImageUpload>,
}

async fn read_node_form(multipart: &mut Multipart) -> Result<NodeForm, Response> {
    let mut form = NodeForm::default();

    while let Some(field) = multipart.next_field().await.unwrap_or(None) {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "tier" => {
                let text = read_text(field).await?;
                match text.trim().parse::<Tier>() {
                    Ok(tier) => form.tier = Some(tier),
                    Err(_) => {
                        return Err(reject(
                            StatusCode::BAD_REQUEST,
                            format!(
                                "Unknown tier '{}'. Expected category, subcategory or sub_subcategory",
                                text.trim()
                            ),
                        ));
                    }
                }
            }
            "name" => form.name = Some(read_text(field).await?),
            "description" => form.description = Some(read_text(field).await?),
            "parent_id" => {
                let text = read_text(field).await?;
                match text.trim().parse::<i32>() {
                    Ok(parent_id) => form.parent_id = Some(parent_id),
                    Err(_) => {
                        return Err(reject(
                            StatusCode::BAD_REQUEST,
                            format!("Invalid parent_id '{}'", text.trim()),
                        ));
                    }
                }
            }
            "display_order" => {
                let text = read_text(field).await?;
                match text.trim().parse::<i32>() {
                    Ok(display_order) => form.display_order = Some(display_order),
                    Err(_) => {
                        return Err(reject(
                            StatusCode::BAD_REQUEST,
                            format!("Invalid display_order '{}'", text.trim()),
                        ));
                    }
                }
            }
            "is_active" => {
                let text = read_text(field).await?;
                match text.trim().parse::<bool>() {
                    Ok(is_active) => form.is_active = Some(is_active),
                    Err(_) => {
                        return Err(reject(
                            StatusCode::BAD_REQUEST,
                            format!("Invalid is_active '{}'", text.trim()),
                        ));
                    }
                }
            }
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

async fn store_form_image(
    txn: &DatabaseTransaction,
    image: Option<ImageUpload>,
) -> Result<Option<i32>, Response> {
    match image {
        Some(upload) => Ok(Some(store_image_or_reject(txn, upload).await?)),
        None => Ok(None),
    }
}

async fn store_image_or_reject(
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

//Replaced or orphaned image records go away with the node; the file removal
//itself is fire and forget.
async fn drop_old_image(txn: &DatabaseTransaction, image_id: Option<i32>) {
    if let Some(old_id) = image_id {
        if let Err(err) = assets::remove_image(txn, old_id).await {
            tracing::warn!(image_id = old_id, error = %err, "Failed to remove replaced image record");
        }
    }
}

fn db_failure(err: sea_orm::DbErr) -> Response {
    reject_with(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error",
        ApiError::DbError(err.to_string()),
    )
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
