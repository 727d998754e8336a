use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use deck_common::Secret;
use deck_engine::{
    api::payment_objects::PaymentSession,
    db_types::{OrderNumber, PaymentStatus},
    events::EventProducers,
    helpers::{callback_signature, CallbackSigner},
    GatewayError,
    OrderFlowApi,
    OrderFlowError,
    PaymentApi,
};
use serde_json::json;

use super::{
    helpers::{sample_order, send_request, ORDER_NUMBER, SERVER_KEY},
    mocks::{MockGateway, MockOrderManager},
};
use crate::routes::{CreatePaymentRoute, PaymentNotificationRoute, PaymentStatusRoute};

fn configure_with(orders: MockOrderManager, gateway: MockGateway) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let signer = CallbackSigner::new(Secret::new(SERVER_KEY.to_string()));
        let api = PaymentApi::new(orders, gateway, signer, EventProducers::default());
        cfg.app_data(web::Data::new(api))
            .service(PaymentNotificationRoute::<MockOrderManager, MockGateway>::new())
            .service(CreatePaymentRoute::<MockOrderManager, MockGateway>::new());
    }
}

fn notification(status: &str, gross_amount: &str) -> serde_json::Value {
    json!({
        "order_id": ORDER_NUMBER,
        "status_code": "200",
        "gross_amount": gross_amount,
        "signature_key": callback_signature(ORDER_NUMBER, "200", gross_amount, SERVER_KEY),
        "transaction_status": status,
        "payment_type": "qris",
        "transaction_id": "9aed5972-5b6a-401e-894b-a32c91ed1a3a",
        "fraud_status": "accept"
    })
}

#[actix_web::test]
async fn create_payment_session() {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order_by_number().returning(|_| Ok(Some(sample_order(PaymentStatus::Pending))));
    orders
        .expect_update_order()
        .withf(|n, u| n.as_str() == ORDER_NUMBER && u.gateway_token.as_deref() == Some("snap-token-1"))
        .times(1)
        .returning(|_, _| Ok(Some(sample_order(PaymentStatus::Pending))));
    let mut gateway = MockGateway::new();
    gateway.expect_create_session().times(1).returning(|req| {
        assert_eq!(req.order_number.as_str(), ORDER_NUMBER);
        assert_eq!(req.gross_amount.value(), 100_000);
        Ok(PaymentSession {
            token: "snap-token-1".into(),
            redirect_url: "https://app.sandbox.midtrans.com/snap/v4/redirection/snap-token-1".into(),
        })
    });
    let req = TestRequest::post().uri("/payments").set_json(json!({ "order_number": ORDER_NUMBER }));
    let (status, body) = send_request(req, configure_with(orders, gateway)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["token"], "snap-token-1");
    assert!(body["data"]["redirect_url"].as_str().unwrap().ends_with("snap-token-1"));
}

#[actix_web::test]
async fn paid_orders_get_no_session() {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order_by_number().returning(|_| Ok(Some(sample_order(PaymentStatus::Paid))));
    orders.expect_update_order().times(0);
    let mut gateway = MockGateway::new();
    gateway.expect_create_session().times(0);
    let req = TestRequest::post().uri("/payments").set_json(json!({ "order_number": ORDER_NUMBER }));
    let (status, body) = send_request(req, configure_with(orders, gateway)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], format!("Transaction {ORDER_NUMBER} is already paid"));
}

#[actix_web::test]
async fn gateway_failure_is_a_server_error() {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order_by_number().returning(|_| Ok(Some(sample_order(PaymentStatus::Pending))));
    orders.expect_update_order().times(0);
    let mut gateway = MockGateway::new();
    gateway.expect_create_session().returning(|_| Err(GatewayError("Access denied due to unauthorized transaction".into())));
    let req = TestRequest::post().uri("/payments").set_json(json!({ "order_number": ORDER_NUMBER }));
    let (status, body) = send_request(req, configure_with(orders, gateway)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn session_for_unknown_order() {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order_by_number().returning(|_| Ok(None));
    let mut gateway = MockGateway::new();
    gateway.expect_create_session().times(0);
    let req = TestRequest::post().uri("/payments").set_json(json!({ "order_number": "ORD-missing" }));
    let (status, _) = send_request(req, configure_with(orders, gateway)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn settlement_notification_marks_order_paid() {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order_by_number().returning(|_| Ok(Some(sample_order(PaymentStatus::Pending))));
    orders.expect_update_order().times(1).returning(|_, update| {
        assert_eq!(update.payment_status, Some(PaymentStatus::Paid));
        assert_eq!(update.payment_method.as_deref(), Some("qris"));
        assert!(update.paid_at.is_some());
        Ok(Some(sample_order(PaymentStatus::Paid)))
    });
    let req = TestRequest::post().uri("/payments/notification").set_json(notification("settlement", "100000.00"));
    let (status, body) = send_request(req, configure_with(orders, MockGateway::new())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["order_number"], ORDER_NUMBER);
    assert_eq!(body["data"]["payment_status"], "paid");
}

#[actix_web::test]
async fn notification_with_bad_signature() {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order_by_number().times(0);
    orders.expect_update_order().times(0);
    let mut body = notification("settlement", "100000.00");
    body["gross_amount"] = json!("1.00");
    let req = TestRequest::post().uri("/payments/notification").set_json(body);
    let (status, body) = send_request(req, configure_with(orders, MockGateway::new())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid signature");
}

#[actix_web::test]
async fn malformed_notification() {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order_by_number().times(0);
    let req = TestRequest::post()
        .uri("/payments/notification")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(r#"{"order_id": "ORD-1", "status_code": 200"#);
    let (status, body) = send_request(req, configure_with(orders, MockGateway::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["body"].is_string());
}

#[actix_web::test]
async fn notification_for_unknown_order() {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order_by_number().returning(|_| Ok(None));
    orders.expect_update_order().times(0);
    let req = TestRequest::post().uri("/payments/notification").set_json(notification("settlement", "100000.00"));
    let (status, _) = send_request(req, configure_with(orders, MockGateway::new())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn notification_that_cannot_be_saved() {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order_by_number().returning(|_| Ok(Some(sample_order(PaymentStatus::Pending))));
    orders
        .expect_update_order()
        .returning(|_, _| Err(OrderFlowError::DatabaseError("database is locked".into())));
    let req = TestRequest::post().uri("/payments/notification").set_json(notification("expire", "100000.00"));
    let (status, body) = send_request(req, configure_with(orders, MockGateway::new())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn replayed_settlement_is_acknowledged() {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order_by_number().returning(|_| {
        let mut order = sample_order(PaymentStatus::Paid);
        order.payment_method = "qris".into();
        Ok(Some(order))
    });
    orders.expect_update_order().times(0);
    let req = TestRequest::post().uri("/payments/notification").set_json(notification("capture", "100000.00"));
    let (status, body) = send_request(req, configure_with(orders, MockGateway::new())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["payment_status"], "paid");
}

#[actix_web::test]
async fn payment_status_snapshot() {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order_by_number().returning(|n: &OrderNumber| {
        Ok((n.as_str() == ORDER_NUMBER).then(|| sample_order(PaymentStatus::Paid)))
    });
    let configure = move |cfg: &mut ServiceConfig| {
        cfg.app_data(web::Data::new(OrderFlowApi::new(orders, EventProducers::default())))
            .service(PaymentStatusRoute::<MockOrderManager>::new());
    };
    let req = TestRequest::get().uri(&format!("/payments/{ORDER_NUMBER}"));
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["order_number"], ORDER_NUMBER);
    assert_eq!(body["data"]["payment_status"], "paid");
    assert_eq!(body["data"]["payment_method"], "midtrans");
    assert_eq!(body["data"]["paid_at"], "2024-05-01 10:20:00");
    assert!(body["data"]["expired_at"].is_null());
}
