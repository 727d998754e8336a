use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use deck_common::Rupiah;
use deck_engine::{
    db_types::{CategoryType, Product},
    CatalogApi,
};

use super::{helpers::send_request, mocks::MockCatalog};
use crate::routes::{CategoriesRoute, ProductRoute, ProductsRoute};

fn configure_with(catalog: MockCatalog) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        cfg.app_data(web::Data::new(CatalogApi::new(catalog)))
            .service(ProductsRoute::<MockCatalog>::new())
            .service(ProductRoute::<MockCatalog>::new())
            .service(CategoriesRoute::<MockCatalog>::new());
    }
}

fn product(id: i64, name: &str, category: CategoryType, price: i64) -> Product {
    let ts = Utc.with_ymd_and_hms(2024, 4, 1, 8, 0, 0).unwrap();
    Product {
        id,
        name: name.into(),
        category,
        description: String::new(),
        image: String::new(),
        price: Rupiah::from(price),
        is_available: true,
        created_at: ts,
        updated_at: ts,
    }
}

#[actix_web::test]
async fn list_products_with_filters() {
    let mut catalog = MockCatalog::new();
    catalog.expect_search_products().times(1).returning(|q| {
        assert_eq!(q.category, Some(CategoryType::MainCourse));
        assert_eq!(q.available, Some(true));
        assert_eq!(q.name.as_deref(), Some("nasi"));
        Ok(vec![product(1, "Nasi Goreng", CategoryType::MainCourse, 50_000)])
    });
    let req = TestRequest::get().uri("/products?category=main_course&available=true&name=nasi");
    let (status, body) = send_request(req, configure_with(catalog)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "1 products found");
    assert_eq!(body["data"][0]["category"], "main_course");
    assert_eq!(body["data"][0]["price"], 50_000);
}

#[actix_web::test]
async fn list_products_with_bad_filters() {
    let mut catalog = MockCatalog::new();
    catalog.expect_search_products().times(0);
    let req = TestRequest::get().uri("/products?category=drinks&available=maybe");
    let (status, body) = send_request(req, configure_with(catalog)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["category"].is_string());
    assert!(body["errors"]["available"].is_string());
}

#[actix_web::test]
async fn fetch_single_product() {
    let mut catalog = MockCatalog::new();
    catalog.expect_fetch_product().returning(|id| Ok((id == 2).then(|| product(2, "Es Teh", CategoryType::Snacks, 8_000))));
    let (status, body) = send_request(TestRequest::get().uri("/products/2"), configure_with(catalog)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Es Teh");

    let mut catalog = MockCatalog::new();
    catalog.expect_fetch_product().returning(|_| Ok(None));
    let (status, body) = send_request(TestRequest::get().uri("/products/99"), configure_with(catalog)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product 99 does not exist");
}

#[actix_web::test]
async fn list_categories() {
    let (status, body) = send_request(TestRequest::get().uri("/categories"), configure_with(MockCatalog::new())).await;
    assert_eq!(status, StatusCode::OK);
    let categories = body["data"].as_array().expect("categories should be a list");
    assert_eq!(categories.len(), CategoryType::ALL.len());
    assert_eq!(categories[1]["value"], "main_course");
    assert_eq!(categories[1]["name"], "Main Course");
}

#[actix_web::test]
async fn unreadable_path_and_query_use_the_envelope() {
    let mut catalog = MockCatalog::new();
    catalog.expect_fetch_product().times(0);
    let (status, body) = send_request(TestRequest::get().uri("/products/abc"), configure_with(catalog)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("abc"));
    assert!(body["errors"]["path"].is_string());

    let mut catalog = MockCatalog::new();
    catalog.expect_search_products().times(0);
    let req = TestRequest::get().uri("/products?category=snacks&category=food");
    let (status, body) = send_request(req, configure_with(catalog)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert!(body["errors"]["query"].is_string());
}
