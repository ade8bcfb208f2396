use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::entities::category::Entity as Category;
use crate::entities::image::Entity as Image;
use crate::entities::sub_subcategory::Entity as SubSubcategory;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "subcategory")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub parent_category_id: i32,
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
        belongs_to = "Category",
        from = "crate::entities::subcategory::Column::ParentCategoryId",
        to = "crate::entities::category::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict",
    )]
    Category,
    #[sea_orm(
        belongs_to = "Image",
        from = "crate::entities::subcategory::Column::ImageId",
        to = "crate::entities::image::Column::Id",
        on_update = "Cascade",
    )]
    Image,
    #[sea_orm(has_many = "SubSubcategory")]
    SubSubcategory,
}

impl Related<Category> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<SubSubcategory> for Entity {
    fn to() -> RelationDef {
        Relation::SubSubcategory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
