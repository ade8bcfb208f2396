pub mod category;
pub mod image;
pub mod product;
pub mod sub_subcategory;
pub mod subcategory;

use sea_orm::{ConnectionTrait, DatabaseConnection, Schema};

use crate::entities::{
    category::Entity as Category, image::Entity as Image, product::Entity as Product,
    sub_subcategory::Entity as SubSubcategory, subcategory::Entity as Subcategory,
};

pub async fn setup_schema(db: &DatabaseConnection) {
    let schema = Schema::new(db.get_database_backend());

    let mut create_image_table = schema.create_table_from_entity(Image);
    let mut create_category_table = schema.create_table_from_entity(Category);
    let mut create_subcategory_table = schema.create_table_from_entity(Subcategory);
    let mut create_sub_subcategory_table = schema.create_table_from_entity(SubSubcategory);
    let mut create_product_table = schema.create_table_from_entity(Product);

    //parents before children, the hierarchy tables carry foreign keys
    db.execute(db.get_database_backend().build(create_image_table.if_not_exists()))
        .await
        .expect("Failed to create image schema");
    db.execute(db.get_database_backend().build(create_category_table.if_not_exists()))
        .await
        .expect("Failed to create category schema");
    db.execute(db.get_database_backend().build(create_subcategory_table.if_not_exists()))
        .await
        .expect("Failed to create subcategory schema");
    db.execute(db.get_database_backend().build(create_sub_subcategory_table.if_not_exists()))
        .await
        .expect("Failed to create sub_subcategory schema");
    db.execute(db.get_database_backend().build(create_product_table.if_not_exists()))
        .await
        .expect("Failed to create product schema");
}
