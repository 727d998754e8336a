use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::{Duration, Utc};
use deck_engine::{
    db_types::{OrderNumber, PaymentStatus},
    events::EventProducers,
    OrderFlowApi,
    OrderFlowError,
};
use serde_json::json;

use super::{
    helpers::{issue_token, sample_order, send_request, with_admin, ORDER_NUMBER},
    mocks::MockOrderManager,
};
use crate::routes::{CreateOrderRoute, OrderByIdRoute, OrderByNumberRoute, SearchOrdersRoute, UpdateOrderStatusRoute};

fn configure_with(orders: MockOrderManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = OrderFlowApi::new(orders, EventProducers::default());
        cfg.app_data(web::Data::new(api))
            .service(CreateOrderRoute::<MockOrderManager>::new())
            .service(SearchOrdersRoute::<MockOrderManager>::new())
            .service(OrderByIdRoute::<MockOrderManager>::new())
            .service(UpdateOrderStatusRoute::<MockOrderManager>::new())
            .service(OrderByNumberRoute::<MockOrderManager>::new());
    }
}

fn ana() -> serde_json::Value {
    json!({ "buyer_name": "Ana", "phone": "0811", "items": [{ "product_id": 1, "quantity": 2 }] })
}

#[actix_web::test]
async fn create_order() {
    let mut orders = MockOrderManager::new();
    orders.expect_create_order().times(1).returning(|o| {
        assert_eq!(o.buyer_name, "Ana");
        assert_eq!(o.items.len(), 1);
        Ok(sample_order(PaymentStatus::Pending))
    });
    let req = TestRequest::post().uri("/transactions").set_json(ana());
    let (status, body) = send_request(req, configure_with(orders)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(data["order_number"], ORDER_NUMBER);
    assert_eq!(data["sub_total"], 100_000);
    assert_eq!(data["total_amount"], 100_000);
    assert_eq!(data["payment_status"], "pending");
    assert_eq!(data["transaction_details"][0]["quantity"], 2);
    assert_eq!(data["transaction_details"][0]["total_price"], 100_000);
    assert!(data.get("gateway_token").is_none());
}

#[actix_web::test]
async fn create_order_with_invalid_fields() {
    let mut orders = MockOrderManager::new();
    orders.expect_create_order().times(0);
    let req = TestRequest::post()
        .uri("/transactions")
        .set_json(json!({ "buyer_name": "Ana", "phone": " ", "items": [{ "product_id": 1, "quantity": 0 }] }));
    let (status, body) = send_request(req, configure_with(orders)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert!(body["errors"]["phone"].is_string());
    assert!(body["errors"]["items[0].quantity"].is_string());
    assert!(body["errors"].get("buyer_name").is_none());
}

#[actix_web::test]
async fn create_order_with_unreadable_body() {
    let mut orders = MockOrderManager::new();
    orders.expect_create_order().times(0);
    let req = TestRequest::post()
        .uri("/transactions")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(r#"{"buyer_name": "Ana", "items": "#);
    let (status, body) = send_request(req, configure_with(orders)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["body"].is_string());
}

#[actix_web::test]
async fn create_order_with_unavailable_product() {
    let mut orders = MockOrderManager::new();
    orders.expect_create_order().returning(|_| Err(OrderFlowError::ProductUnavailable(1)));
    let req = TestRequest::post().uri("/transactions").set_json(ana());
    let (status, body) = send_request(req, configure_with(orders)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found or not available: 1");
}

#[actix_web::test]
async fn fetch_order_by_number() {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order_by_number().returning(|n| {
        Ok((n.as_str() == ORDER_NUMBER).then(|| sample_order(PaymentStatus::Pending)))
    });
    let req = TestRequest::get().uri(&format!("/transactions/{ORDER_NUMBER}"));
    let (status, body) = send_request(req, configure_with(orders)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["buyer_name"], "Ana");

    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order_by_number().returning(|_| Ok(None));
    let req = TestRequest::get().uri("/transactions/ORD-00000000000000000000");
    let (status, body) = send_request(req, configure_with(orders)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn admin_routes_need_a_token() {
    let cases = [
        TestRequest::get().uri("/transactions"),
        TestRequest::get().uri("/transactions/id/1"),
        TestRequest::patch().uri(&format!("/transactions/{ORDER_NUMBER}/status")).set_json(json!({"payment_status": "paid"})),
    ];
    for req in cases {
        let mut orders = MockOrderManager::new();
        orders.expect_search_orders().times(0);
        orders.expect_fetch_order_by_id().times(0);
        orders.expect_update_order().times(0);
        let (status, body) = send_request(req, configure_with(orders)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
    }
}

#[actix_web::test]
async fn admin_routes_reject_bad_tokens() {
    let expired = issue_token("admin", Utc::now() - Duration::hours(2));
    let tampered = {
        let mut t = issue_token("admin", Utc::now() + Duration::hours(1));
        t.replace_range(t.len() - 6.., "AAAAAA");
        t
    };
    for auth in [format!("Bearer {expired}"), format!("Bearer {tampered}"), "Basic YWRtaW46YWRtaW4=".to_string()] {
        let mut orders = MockOrderManager::new();
        orders.expect_search_orders().times(0);
        let req = TestRequest::get().uri("/transactions").insert_header(("Authorization", auth));
        let (status, _) = send_request(req, configure_with(orders)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

#[actix_web::test]
async fn search_orders_as_admin() {
    let mut orders = MockOrderManager::new();
    orders.expect_search_orders().times(1).returning(|q| {
        assert_eq!(q.payment_status, Some(PaymentStatus::Paid));
        assert_eq!(q.buyer_name.as_deref(), Some("ana"));
        Ok(vec![sample_order(PaymentStatus::Paid)])
    });
    let req = with_admin(TestRequest::get().uri("/transactions?status=paid&buyer_name=ana"));
    let (status, body) = send_request(req, configure_with(orders)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(|a| a.len()), Some(1));
    assert_eq!(body["data"][0]["payment_status"], "paid");
}

#[actix_web::test]
async fn search_orders_with_bad_filter() {
    let mut orders = MockOrderManager::new();
    orders.expect_search_orders().times(0);
    let req = with_admin(TestRequest::get().uri("/transactions?status=refunded"));
    let (status, body) = send_request(req, configure_with(orders)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["status"].is_string());
}

#[actix_web::test]
async fn fetch_order_by_id_as_admin() {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order_by_id().returning(|id| Ok((id == 1).then(|| sample_order(PaymentStatus::Pending))));
    let (status, body) = send_request(with_admin(TestRequest::get().uri("/transactions/id/1")), configure_with(orders)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], 1);

    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order_by_id().returning(|_| Ok(None));
    let (status, _) = send_request(with_admin(TestRequest::get().uri("/transactions/id/42")), configure_with(orders)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn admin_marks_order_paid() {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order_by_number().returning(|_| Ok(Some(sample_order(PaymentStatus::Pending))));
    orders.expect_update_order().times(1).returning(|n, update| {
        assert_eq!(n, &OrderNumber::new(ORDER_NUMBER));
        assert_eq!(update.payment_status, Some(PaymentStatus::Paid));
        assert!(update.paid_at.is_some());
        Ok(Some(sample_order(PaymentStatus::Paid)))
    });
    let req = with_admin(
        TestRequest::patch().uri(&format!("/transactions/{ORDER_NUMBER}/status")).set_json(json!({"payment_status": "paid"})),
    );
    let (status, body) = send_request(req, configure_with(orders)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["payment_status"], "paid");
}

#[actix_web::test]
async fn admin_cannot_unpay_an_order() {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order_by_number().returning(|_| Ok(Some(sample_order(PaymentStatus::Paid))));
    orders.expect_update_order().times(0);
    let req = with_admin(
        TestRequest::patch()
            .uri(&format!("/transactions/{ORDER_NUMBER}/status"))
            .set_json(json!({"payment_status": "pending"})),
    );
    let (status, body) = send_request(req, configure_with(orders)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let mut orders = MockOrderManager::new();
    orders.expect_update_order().times(0);
    let req = with_admin(
        TestRequest::patch()
            .uri(&format!("/transactions/{ORDER_NUMBER}/status"))
            .set_json(json!({"payment_status": "refunded"})),
    );
    let (status, body) = send_request(req, configure_with(orders)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["body"].is_string());
}

#[actix_web::test]
async fn non_numeric_order_id() {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order_by_id().times(0);
    let (status, body) = send_request(with_admin(TestRequest::get().uri("/transactions/id/abc")), configure_with(orders)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["errors"]["path"].is_string());
}

#[actix_web::test]
async fn admin_update_that_loses_a_race() {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order_by_number().returning(|_| Ok(Some(sample_order(PaymentStatus::Pending))));
    orders.expect_update_order().times(1).returning(|n, _| {
        Err(OrderFlowError::StatusChanged { order_number: n.clone(), expected: PaymentStatus::Pending })
    });
    let req = with_admin(
        TestRequest::patch()
            .uri(&format!("/transactions/{ORDER_NUMBER}/status"))
            .set_json(json!({"payment_status": "cancelled"})),
    );
    let (status, body) = send_request(req, configure_with(orders)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}
