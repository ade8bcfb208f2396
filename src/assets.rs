use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use thiserror::Error;
use uuid::Uuid;

use crate::entities::image::{self, Entity as ImageEntity, FileExtension};

static FILE_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9 _\-]{1,64}(\.[a-zA-Z0-9]{1,8})?$").unwrap());

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Image content type is not set")]
    MissingContentType,
    #[error("Unsupported image content type '{0}'")]
    UnsupportedContentType(String),
    #[error("Invalid image file name. It should contain only Latin letters, numbers, spaces, '-' or '_'")]
    InvalidFileName,
    #[error("Image exceeds the size limit of {0} bytes")]
    TooLarge(usize),
    #[error("Failed to store image file: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),
}

/// An image file lifted out of a multipart request, not yet persisted.
#[derive(Clone, Debug)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

pub fn upload_dir() -> String {
    std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string())
}

pub fn file_size_limit() -> usize {
    std::env::var("FILE_SIZE_LIMIT")
        .ok()
        .and_then(|raw| raw.parse::<usize>().ok())
        .unwrap_or(5 * 1024 * 1024)
}

fn extension_for(content_type: &str) -> Option<FileExtension> {
    match content_type {
        "image/jpeg" => Some(FileExtension::Jpg),
        "image/png" => Some(FileExtension::Png),
        _ => None,
    }
}

pub fn asset_path(model: &image::Model) -> String {
    format!("{}/{}.{}", upload_dir(), model.asset_key, model.extension)
}

/// Validates the upload, inserts the image record on the caller's
/// connection (usually a transaction) and writes the file under a fresh
/// uuid asset key.
pub async fn store_image<C: ConnectionTrait>(
    conn: &C,
    upload: ImageUpload,
) -> Result<image::Model, AssetError> {
    let content_type = upload.content_type.ok_or(AssetError::MissingContentType)?;
    let extension = extension_for(&content_type)
        .ok_or_else(|| AssetError::UnsupportedContentType(content_type.clone()))?;

    if !FILE_NAME_REGEX.is_match(&upload.file_name) {
        return Err(AssetError::InvalidFileName);
    }

    let limit = file_size_limit();
    if upload.data.len() > limit {
        return Err(AssetError::TooLarge(limit));
    }

    let asset_key = Uuid::new_v4().to_string();
    let model = image::ActiveModel {
        file_name: Set(upload.file_name),
        asset_key: Set(asset_key.clone()),
        extension: Set(extension),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    let dir = upload_dir();
    tokio::fs::create_dir_all(&dir).await?;
    tokio::fs::write(format!("{}/{}.{}", dir, asset_key, extension), &upload.data).await?;

    Ok(model)
}

/// Removes the stored file for an image record. Fire and forget: the task
/// logs a warning on failure and never blocks or fails the caller.
pub fn discard_file(model: &image::Model) {
    let path = asset_path(model);
    tokio::spawn(async move {
        if let Err(err) = tokio::fs::remove_file(&path).await {
            tracing::warn!(path = %path, error = %err, "Failed to remove stored image file");
        }
    });
}

/// Deletes the image record on the caller's connection and schedules the
/// file removal. A missing record is not an error.
pub async fn remove_image<C: ConnectionTrait>(conn: &C, id: i32) -> Result<(), sea_orm::DbErr> {
    if let Some(model) = ImageEntity::find_by_id(id).one(conn).await? {
        ImageEntity::delete_by_id(model.id).exec(conn).await?;
        discard_file(&model);
    }
    Ok(())
}
