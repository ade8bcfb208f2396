use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::entities::image::Entity as Image;

//category_id/subcategory_id/sub_subcategory_id are a write-time snapshot of
//the classification chain, not enforced foreign keys. Hierarchy edits never
//touch existing products.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub sku: String,
    pub category: String,
    pub category_id: Option<i32>,
    pub subcategory_id: Option<i32>,
    pub sub_subcategory_id: Option<i32>,
    pub brand: Option<String>,
    pub price: f32,
    pub price_per_case: Option<f32>,
    pub pack_size: Option<String>,
    pub unit: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub image_id: Option<i32>,
    #[sea_orm(default = 0)]
    pub stock_quantity: i32,
    #[sea_orm(default = 0)]
    pub min_stock: i32,
    #[sea_orm(default = false)]
    pub in_stock: bool,
    #[sea_orm(default = false)]
    pub is_featured: bool,
    #[sea_orm(default = false)]
    pub is_on_offer: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Image",
        from = "crate::entities::product::Column::ImageId",
        to = "crate::entities::image::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict",
    )]
    Image,
}

impl ActiveModelBehavior for ActiveModel {}
