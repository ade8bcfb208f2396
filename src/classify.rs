use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use thiserror::Error;

use crate::entities::{category, sub_subcategory, subcategory};

/// Write-time snapshot frozen onto a product: the display name of the
/// deepest supplied node plus the id chain up to the root.
#[derive(Clone, Debug, PartialEq)]
pub struct Classification {
    pub display_name: String,
    pub category_id: Option<i32>,
    pub subcategory_id: Option<i32>,
    pub sub_subcategory_id: Option<i32>,
}

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("Sub-subcategory '{0}' not found or inactive")]
    SubSubcategoryNotFound(String),
    #[error("Subcategory '{0}' not found or inactive")]
    SubcategoryNotFound(String),
    #[error("Category '{0}' not found or inactive")]
    CategoryNotFound(String),
    #[error("Classification chain for '{0}' references a missing parent")]
    BrokenChain(String),
    #[error("Category is required")]
    Missing,
    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),
}

/// Resolves a human-supplied classification to hierarchy ids, deepest
/// supplied name first. The match is a case-insensitive exact name match
/// among active nodes of that tier; ancestors are collected by walking the
/// parent links upward.
pub async fn resolve<C: ConnectionTrait>(
    conn: &C,
    category: Option<&str>,
    subcategory: Option<&str>,
    sub_subcategory: Option<&str>,
) -> Result<Classification, ClassifyError> {
    if let Some(name) = supplied(sub_subcategory) {
        let leaf = sub_subcategory::Entity::find()
            .filter(sub_subcategory::Column::IsActive.eq(true))
            .filter(
                Expr::expr(Func::lower(Expr::col(sub_subcategory::Column::Name)))
                    .eq(name.to_lowercase()),
            )
            .one(conn)
            .await?
            .ok_or_else(|| ClassifyError::SubSubcategoryNotFound(name.to_string()))?;

        let parent = subcategory::Entity::find_by_id(leaf.parent_subcategory_id)
            .one(conn)
            .await?
            .ok_or_else(|| ClassifyError::BrokenChain(leaf.name.clone()))?;

        return Ok(Classification {
            display_name: leaf.name.clone(),
            category_id: Some(parent.parent_category_id),
            subcategory_id: Some(parent.id),
            sub_subcategory_id: Some(leaf.id),
        });
    }

    if let Some(name) = supplied(subcategory) {
        let node = subcategory::Entity::find()
            .filter(subcategory::Column::IsActive.eq(true))
            .filter(
                Expr::expr(Func::lower(Expr::col(subcategory::Column::Name)))
                    .eq(name.to_lowercase()),
            )
            .one(conn)
            .await?
            .ok_or_else(|| ClassifyError::SubcategoryNotFound(name.to_string()))?;

        return Ok(Classification {
            display_name: node.name.clone(),
            category_id: Some(node.parent_category_id),
            subcategory_id: Some(node.id),
            sub_subcategory_id: None,
        });
    }

    if let Some(name) = supplied(category) {
        let node = category::Entity::find()
            .filter(category::Column::IsActive.eq(true))
            .filter(
                Expr::expr(Func::lower(Expr::col(category::Column::Name)))
                    .eq(name.to_lowercase()),
            )
            .one(conn)
            .await?
            .ok_or_else(|| ClassifyError::CategoryNotFound(name.to_string()))?;

        return Ok(Classification {
            display_name: node.name.clone(),
            category_id: Some(node.id),
            subcategory_id: None,
            sub_subcategory_id: None,
        });
    }

    Err(ClassifyError::Missing)
}

fn supplied(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
