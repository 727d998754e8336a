use chrono::{Duration, Utc};
use deck_common::{Rupiah, Secret};

use super::{
    mocks::{session, MockGateway, MockOrderStore},
    place_order,
    setup,
};
use crate::{
    db_types::{OrderNumber, OrderUpdate, PaymentStatus},
    events::EventProducers,
    helpers::CallbackSigner,
    GatewayError,
    OrderFlowError,
    OrderManagement,
    PaymentApi,
};

fn signer() -> CallbackSigner {
    CallbackSigner::new(Secret::new("SB-Mid-server-TEST".to_string()))
}

#[tokio::test]
async fn session_is_created_and_saved() {
    let (db, menu) = setup().await;
    let order = place_order(&db, &menu).await;
    let expected_number = order.order_number.clone();
    let mut gateway = MockGateway::new();
    gateway
        .expect_create_session()
        .withf(move |req| {
            req.order_number == expected_number &&
                req.gross_amount == Rupiah::from(100_000) &&
                req.items.len() == 1 &&
                req.items[0].id == menu.nasi.to_string() &&
                req.items[0].quantity == 2 &&
                req.customer.name == "Ana" &&
                req.customer.phone == "0811" &&
                req.expiry_minutes == 15
        })
        .times(1)
        .returning(|_| Ok(session("tok-123")));
    let api = PaymentApi::new(db.clone(), gateway, signer(), EventProducers::default())
        .with_session_ttl(Duration::minutes(15));
    let before = Utc::now();
    let result = api.create_payment_session(&order.order_number).await.unwrap();
    assert_eq!(result.token, "tok-123");
    assert!(result.redirect_url.ends_with("tok-123"));

    let stored = db.fetch_order_by_number(&order.order_number).await.unwrap().unwrap();
    assert_eq!(stored.gateway_token.as_deref(), Some("tok-123"));
    assert_eq!(stored.gateway_order_id.as_deref(), Some(order.order_number.as_str()));
    assert_eq!(stored.payment_status, PaymentStatus::Pending);
    let expires_at = stored.expires_at.expect("expiry should be set");
    assert!(expires_at >= before + Duration::minutes(15));
    assert!(expires_at <= Utc::now() + Duration::minutes(15));
}

#[tokio::test]
async fn paid_orders_never_reach_the_gateway() {
    let (db, menu) = setup().await;
    let order = place_order(&db, &menu).await;
    db.update_order(
        &order.order_number,
        OrderUpdate::default().with_payment_status(PaymentStatus::Paid).with_paid_at(Utc::now()),
    )
    .await
    .unwrap();
    let mut gateway = MockGateway::new();
    gateway.expect_create_session().times(0);
    let api = PaymentApi::new(db.clone(), gateway, signer(), EventProducers::default());
    let err = api.create_payment_session(&order.order_number).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::AlreadyPaid(_)));
}

#[tokio::test]
async fn unknown_order() {
    let (db, _) = setup().await;
    let mut gateway = MockGateway::new();
    gateway.expect_create_session().times(0);
    let api = PaymentApi::new(db, gateway, signer(), EventProducers::default());
    let err = api.create_payment_session(&OrderNumber::new("ORD-missing")).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::OrderNotFound(_)));
}

#[tokio::test]
async fn gateway_failure_leaves_order_untouched() {
    let (db, menu) = setup().await;
    let order = place_order(&db, &menu).await;
    let mut gateway = MockGateway::new();
    gateway
        .expect_create_session()
        .times(1)
        .returning(|_| Err(GatewayError("transaction_details.gross_amount is not equal to the sum of item_details".into())));
    let api = PaymentApi::new(db.clone(), gateway, signer(), EventProducers::default());
    let err = api.create_payment_session(&order.order_number).await.unwrap_err();
    match err {
        OrderFlowError::GatewayError(msg) => assert!(msg.contains("gross_amount")),
        e => panic!("Expected a gateway error, got {e:?}"),
    }
    let stored = db.fetch_order_by_number(&order.order_number).await.unwrap().unwrap();
    assert_eq!(stored, order);
}

#[tokio::test]
async fn save_failure_after_session_is_reported() {
    let (db, menu) = setup().await;
    let order = place_order(&db, &menu).await;
    let number = order.order_number.clone();
    let mut store = MockOrderStore::new();
    store.expect_fetch_order_by_number().returning(move |_| Ok(Some(order.clone())));
    store.expect_update_order().times(1).returning(|_, _| Err(OrderFlowError::DatabaseError("disk I/O error".into())));
    let mut gateway = MockGateway::new();
    gateway.expect_create_session().times(1).returning(|_| Ok(session("tok-orphan")));
    let api = PaymentApi::new(store, gateway, signer(), EventProducers::default());
    let err = api.create_payment_session(&number).await.unwrap_err();
    match err {
        OrderFlowError::PersistenceAfterExternalSideEffect { order_number, message } => {
            assert_eq!(order_number, number);
            assert!(message.contains("disk I/O error"));
        },
        e => panic!("Expected a persistence error, got {e:?}"),
    }
}
