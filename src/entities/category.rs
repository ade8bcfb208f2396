use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::entities::image::Entity as Image;
use crate::entities::subcategory::Entity as Subcategory;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "category")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub image_id: Option<i32>,
    #[sea_orm(default = 0)]
    pub display_order: i32,
    #[sea_orm(default = true)]
    pub is_active: bool,
    #[sea_orm(default = 0)]
    pub product_count: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Image",
        from = "crate::entities::category::Column::ImageId",
        to = "crate::entities::image::Column::Id",
        on_update = "Cascade",
    )]
    Image,
    #[sea_orm(has_many = "Subcategory")]
    Subcategory,
}

impl Related<Subcategory> for Entity {
    fn to() -> RelationDef {
        Relation::Subcategory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
