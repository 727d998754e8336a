use actix_web::{
    body::to_bytes,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use deck_common::Rupiah;
use deck_engine::db_types::{Order, OrderLine, OrderNumber, PaymentStatus};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::debug;

use crate::{
    config::AuthConfig,
    middleware::AdminClaims,
    routes::{json_config, path_config, query_config},
};

// Test-only secret. DO NOT re-use it anywhere.
pub const JWT_SECRET: &str = "deck-endpoint-tests-0f9a1c3e5b7d";
pub const SERVER_KEY: &str = "SB-Mid-server-ENDPOINT-TESTS";
pub const ORDER_NUMBER: &str = "ORD-20240501101500123456";

pub fn issue_token(sub: &str, expiry: DateTime<Utc>) -> String {
    let claims = AdminClaims { sub: sub.to_string(), exp: expiry.timestamp() as usize };
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(JWT_SECRET.as_bytes()))
        .expect("Failed to sign token")
}

pub fn admin_token() -> String {
    issue_token("admin", Utc::now() + Duration::hours(1))
}

/// Runs a single request against an app built by `configure`, with the auth settings and JSON handling the real
/// server uses. Errors raised by middleware are rendered the same way actix renders them for a real client.
pub async fn send_request<F>(req: TestRequest, configure: F) -> (StatusCode, serde_json::Value)
where F: FnOnce(&mut ServiceConfig) {
    let _ = env_logger::try_init();
    let app = App::new()
        .app_data(web::Data::new(AuthConfig::new(JWT_SECRET)))
        .app_data(json_config())
        .app_data(path_config())
        .app_data(query_config())
        .configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => res.into_parts().1,
        Err(e) => e.error_response(),
    };
    let status = res.status();
    let bytes = to_bytes(res.into_body()).await.expect("Could not read body");
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, body)
}

pub fn with_admin(req: TestRequest) -> TestRequest {
    req.insert_header(("Authorization", format!("Bearer {}", admin_token())))
}

pub fn sample_order(status: PaymentStatus) -> Order {
    let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 15, 0).unwrap();
    let line = OrderLine {
        id: 1,
        order_id: 1,
        product_id: 1,
        product_name: "Nasi Goreng".into(),
        quantity: 2,
        price: Rupiah::from(50_000),
        total_price: Rupiah::from(100_000),
        notes: None,
        created_at,
    };
    Order {
        id: 1,
        order_number: OrderNumber::new(ORDER_NUMBER),
        buyer_name: "Ana".into(),
        phone: "0811".into(),
        notes: None,
        sub_total: Rupiah::from(100_000),
        total_amount: Rupiah::from(100_000),
        payment_status: status,
        payment_method: "midtrans".into(),
        gateway_token: None,
        gateway_order_id: None,
        paid_at: status.is_paid().then_some(created_at + Duration::minutes(5)),
        expires_at: None,
        created_at,
        updated_at: created_at,
        lines: vec![line],
    }
}
