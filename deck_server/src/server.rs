use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use deck_engine::{
    events::EventProducers,
    helpers::CallbackSigner,
    CatalogApi,
    NotificationApi,
    OrderFlowApi,
    PaymentApi,
    SqliteDatabase,
};
use log::*;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::{midtrans::MidtransGateway, notifications::create_notification_event_handlers},
    routes::{
        health,
        json_config,
        path_config,
        query_config,
        CategoriesRoute,
        CreateOrderRoute,
        CreatePaymentRoute,
        MarkAllReadRoute,
        MarkReadRoute,
        NotificationsRoute,
        OrderByIdRoute,
        OrderByNumberRoute,
        PaymentNotificationRoute,
        PaymentStatusRoute,
        ProductRoute,
        ProductsRoute,
        SearchOrdersRoute,
        UnreadCountRoute,
        UpdateOrderStatusRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway =
        MidtransGateway::new(config.midtrans.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = create_notification_event_handlers(db.clone(), config.event_buffer_size);
    let producers = handlers.producers();
    handlers.start_handlers();
    info!("📬️ Notification event handlers started");
    let srv = create_server_instance(config, db, gateway, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: MidtransGateway,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), producers.clone());
        let signer = CallbackSigner::new(config.webhook_secret.clone());
        let payments_api = PaymentApi::new(db.clone(), gateway.clone(), signer, producers.clone())
            .with_session_ttl(config.payment_expiry);
        let catalog_api = CatalogApi::new(db.clone());
        let notifications_api = NotificationApi::new(db.clone());
        let api_scope = web::scope("/api")
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(SearchOrdersRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
            .service(OrderByNumberRoute::<SqliteDatabase>::new())
            .service(CreatePaymentRoute::<SqliteDatabase, MidtransGateway>::new())
            .service(PaymentNotificationRoute::<SqliteDatabase, MidtransGateway>::new())
            .service(PaymentStatusRoute::<SqliteDatabase>::new())
            .service(ProductsRoute::<SqliteDatabase>::new())
            .service(ProductRoute::<SqliteDatabase>::new())
            .service(CategoriesRoute::<SqliteDatabase>::new())
            .service(NotificationsRoute::<SqliteDatabase>::new())
            .service(UnreadCountRoute::<SqliteDatabase>::new())
            .service(MarkAllReadRoute::<SqliteDatabase>::new())
            .service(MarkReadRoute::<SqliteDatabase>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("deck::access_log"))
            .app_data(json_config())
            .app_data(path_config())
            .app_data(query_config())
            .app_data(web::Data::new(config.auth.clone()))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(payments_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(notifications_api))
            .service(health)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
