use deck_common::Rupiah;

use super::setup;
use crate::{
    api::catalog_objects::ProductQueryFilter,
    db_types::CategoryType,
    CatalogApi,
    CatalogError,
};

#[tokio::test]
async fn product_listing() {
    let (db, menu) = setup().await;
    let api = CatalogApi::new(db);
    let all = api.products(ProductQueryFilter::default()).await.unwrap();
    assert_eq!(all.len(), 3);

    let available = api.products(ProductQueryFilter::default().only_available()).await.unwrap();
    assert_eq!(available.len(), 2);
    assert!(available.iter().all(|p| p.is_available));

    let desserts = api.products(ProductQueryFilter::default().with_category(CategoryType::Desserts)).await.unwrap();
    assert_eq!(desserts.len(), 1);
    assert_eq!(desserts[0].id, menu.cake);

    let named = api.products(ProductQueryFilter::default().with_name("GORENG")).await.unwrap();
    assert_eq!(named.len(), 1);
    assert_eq!(named[0].price, Rupiah::from(50_000));
}

#[tokio::test]
async fn single_product() {
    let (db, menu) = setup().await;
    let api = CatalogApi::new(db);
    let tea = api.product(menu.tea).await.unwrap();
    assert_eq!(tea.name, "Es Teh");
    assert_eq!(tea.category, CategoryType::Snacks);
    assert!(matches!(api.product(404).await, Err(CatalogError::ProductNotFound(404))));
}

#[tokio::test]
async fn categories_are_listed_with_display_names() {
    let (db, _) = setup().await;
    let api = CatalogApi::new(db);
    let categories = api.categories();
    assert_eq!(categories.len(), 7);
    let main = categories.iter().find(|c| c.value == CategoryType::MainCourse).unwrap();
    assert_eq!(main.name, CategoryType::MainCourse.display_name());
}
