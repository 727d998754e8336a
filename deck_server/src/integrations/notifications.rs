//! Turns order events into admin notifications.
use std::{future::Future, pin::Pin, sync::Arc};

use deck_engine::{
    events::{EventHandlers, EventHooks, HandlerResult},
    NotificationApi,
    SqliteDatabase,
};
use log::*;

type HookFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send>>;

pub fn create_notification_event_handlers(db: SqliteDatabase, buffer_size: usize) -> EventHandlers {
    let api = Arc::new(NotificationApi::new(db));
    let mut hooks = EventHooks::default();
    let api_clone = Arc::clone(&api);
    // --- On OrderCreated Handler ---
    hooks.on_order_created(move |ev| {
        let api = Arc::clone(&api_clone);
        Box::pin(async move {
            let order_number = ev.order.order_number.clone();
            api.notify_new_order(&ev.order)
                .await
                .map(|n| debug!("📬️ Notification #{} raised for new order {order_number}", n.id))
                .map_err(|e| {
                    error!("📬️ Could not raise a notification for new order {order_number}. {e}");
                    e.to_string()
                })
        }) as HookFuture
    });
    // --- On OrderPaid Handler ---
    hooks.on_order_paid(move |ev| {
        let api = Arc::clone(&api);
        Box::pin(async move {
            let order_number = ev.order.order_number.clone();
            api.notify_payment_received(&ev.order)
                .await
                .map(|n| debug!("📬️ Notification #{} raised for payment of {order_number}", n.id))
                .map_err(|e| {
                    error!("📬️ Could not raise a payment notification for {order_number}. {e}");
                    e.to_string()
                })
        }) as HookFuture
    });
    EventHandlers::new(buffer_size, hooks)
}
