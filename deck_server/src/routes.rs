//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Anything that waits on I/O (the database, Midtrans) must be awaited,
//! never blocked on.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use deck_engine::{
    api::{
        catalog_objects::ProductQueryFilter,
        order_objects::{OrderQueryFilter, StatusUpdateRequest},
        payment_objects::PaymentRequest,
    },
    db_types::{FieldErrors, NewOrder, OrderNumber},
    traits::{CatalogManagement, NotificationManagement, OrderManagement, PaymentGateway},
    CatalogApi,
    NotificationApi,
    OrderFlowApi,
    PaymentApi,
};
use log::*;
use snap_tools::SnapNotification;

use crate::{
    data_objects::{JsonResponse, OrderSearchParams, ProductSearchParams},
    errors::ServerError,
    integrations::midtrans::gateway_notification,
    middleware::AdminClaims,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires admin) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>)
                    .wrap($crate::middleware::AdminAuthFactory::new());
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

/// JSON body settings shared by every route: bodies that cannot be decoded are answered with a 422.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        debug!("💻️ Could not decode request body. {err}");
        ServerError::UnprocessableBody(err.to_string()).into()
    })
}

/// Path segments that do not parse (e.g. a non-numeric id) are answered with a 400 in the usual envelope.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, req: &HttpRequest| {
        debug!("💻️ Could not read path {}. {err}", req.path());
        ServerError::InvalidRequestPath(err.to_string()).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, req: &HttpRequest| {
        debug!("💻️ Could not read query string '{}'. {err}", req.query_string());
        ServerError::InvalidQuery(FieldErrors::single("query", err.to_string())).into()
    })
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Transactions  ----------------------------------------------------
route!(create_order => Post "/transactions" impl OrderManagement);
/// Places an order. Prices and totals come from the catalog; the body only names products and quantities.
pub async fn create_order<B: OrderManagement>(
    body: web::Json<NewOrder>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order = body.into_inner();
    debug!("💻️ POST new order for {} with {} items", order.buyer_name, order.items.len());
    let order = api.create_order(order).await?;
    Ok(HttpResponse::Created().json(JsonResponse::with_data("Transaction created successfully", order)))
}

route!(order_by_number => Get "/transactions/{order_number}" impl OrderManagement);
pub async fn order_by_number<B: OrderManagement>(
    path: web::Path<OrderNumber>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_number = path.into_inner();
    trace!("💻️ GET order {order_number}");
    let order = api.order_by_number(&order_number).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::with_data("Transaction found", order)))
}

route!(order_by_id => Get "/transactions/id/{id}" impl OrderManagement where requires admin);
pub async fn order_by_id<B: OrderManagement>(
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    trace!("💻️ GET order #{id}");
    let order = api.order_by_id(id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::with_data("Transaction found", order)))
}

route!(search_orders => Get "/transactions" impl OrderManagement where requires admin);
/// Admin order listing, newest first. Accepts `status`, `buyer_name` and `since` query parameters.
pub async fn search_orders<B: OrderManagement>(
    query: web::Query<OrderSearchParams>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let filter = OrderQueryFilter::try_from(query.into_inner()).map_err(ServerError::InvalidQuery)?;
    debug!("💻️ GET orders matching {filter:?}");
    let orders = api.search_orders(filter).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::with_data(format!("{} transactions found", orders.len()), orders)))
}

route!(update_order_status => Patch "/transactions/{order_number}/status" impl OrderManagement where requires admin);
pub async fn update_order_status<B: OrderManagement>(
    claims: AdminClaims,
    path: web::Path<OrderNumber>,
    body: web::Json<StatusUpdateRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_number = path.into_inner();
    let status = body.into_inner().payment_status;
    info!("💻️ {} is setting the payment status of {order_number} to {status}", claims.sub);
    let order = api.update_payment_status(&order_number, status).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::with_data("Payment status updated", order)))
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(create_payment => Post "/payments" impl OrderManagement, PaymentGateway);
/// Opens a hosted payment session for an unpaid order.
pub async fn create_payment<B: OrderManagement, G: PaymentGateway>(
    body: web::Json<PaymentRequest>,
    api: web::Data<PaymentApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let order_number = body.into_inner().order_number;
    debug!("💻️ POST payment session for {order_number}");
    let session = api.create_payment_session(&order_number).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::with_data("Payment session created", session)))
}

route!(payment_notification => Post "/payments/notification" impl OrderManagement, PaymentGateway);
/// Midtrans payment status callback.
///
/// The body is read raw so that malformed JSON gets a 400 rather than the usual 422; Midtrans treats 4xx and 5xx
/// differently when deciding whether to retry. The request is authenticated by its signature, not by a token.
pub async fn payment_notification<B: OrderManagement, G: PaymentGateway>(
    body: web::Bytes,
    api: web::Data<PaymentApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let notification = serde_json::from_slice::<SnapNotification>(&body).map_err(|e| {
        warn!("💻️ Received a malformed payment notification. {e}");
        ServerError::MalformedPayload(e.to_string())
    })?;
    info!(
        "💻️ Payment notification for {}: {} ({})",
        notification.order_id,
        notification.transaction_status,
        notification.payment_type.as_deref().unwrap_or("unknown payment type")
    );
    let ack = api.handle_callback(gateway_notification(notification)).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::with_data("Notification processed", ack)))
}

route!(payment_status => Get "/payments/{order_number}" impl OrderManagement);
pub async fn payment_status<B: OrderManagement>(
    path: web::Path<OrderNumber>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_number = path.into_inner();
    trace!("💻️ GET payment status for {order_number}");
    let snapshot = api.payment_status(&order_number).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::with_data("Payment status", snapshot)))
}

//----------------------------------------------   Catalog  ----------------------------------------------------
route!(products => Get "/products" impl CatalogManagement);
pub async fn products<B: CatalogManagement>(
    query: web::Query<ProductSearchParams>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let filter = ProductQueryFilter::try_from(query.into_inner()).map_err(ServerError::InvalidQuery)?;
    trace!("💻️ GET products matching {filter:?}");
    let products = api.products(filter).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::with_data(format!("{} products found", products.len()), products)))
}

route!(product => Get "/products/{id}" impl CatalogManagement);
pub async fn product<B: CatalogManagement>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product = api.product(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::with_data("Product found", product)))
}

route!(categories => Get "/categories" impl CatalogManagement);
pub async fn categories<B: CatalogManagement>(api: web::Data<CatalogApi<B>>) -> Result<HttpResponse, ServerError> {
    Ok(HttpResponse::Ok().json(JsonResponse::with_data("Categories", api.categories())))
}

//----------------------------------------------   Notifications  ----------------------------------------------------
route!(notifications => Get "/notifications" impl NotificationManagement where requires admin);
pub async fn notifications<B: NotificationManagement>(
    claims: AdminClaims,
    api: web::Data<NotificationApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET notifications for {}", claims.sub);
    let list = api.notifications(&claims.sub).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::with_data("Notifications", list)))
}

route!(unread_count => Get "/notifications/unread-count" impl NotificationManagement where requires admin);
pub async fn unread_count<B: NotificationManagement>(
    claims: AdminClaims,
    api: web::Data<NotificationApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let count = api.unread_count(&claims.sub).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::with_data("Unread notifications", count)))
}

route!(mark_all_read => Patch "/notifications/read-all" impl NotificationManagement where requires admin);
pub async fn mark_all_read<B: NotificationManagement>(
    claims: AdminClaims,
    api: web::Data<NotificationApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let marked = api.mark_all_as_read(&claims.sub).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::with_data("All notifications marked as read", marked)))
}

route!(mark_read => Patch "/notifications/{id}/read" impl NotificationManagement where requires admin);
pub async fn mark_read<B: NotificationManagement>(
    claims: AdminClaims,
    path: web::Path<i64>,
    api: web::Data<NotificationApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    api.mark_as_read(id, &claims.sub).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Notification {id} marked as read"))))
}
