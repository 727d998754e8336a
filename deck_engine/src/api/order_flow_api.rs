use std::fmt::Debug;

use chrono::Utc;
use log::*;

use crate::{
    api::{errors::OrderFlowError, order_objects::OrderQueryFilter, payment_objects::PaymentStatusSnapshot},
    db_types::{NewOrder, Order, OrderNumber, OrderUpdate, PaymentStatus},
    events::{EventProducers, OrderCreatedEvent, OrderPaidEvent},
    traits::OrderManagement,
};

/// `OrderFlowApi` handles order placement, order lookups and manual status changes.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> OrderFlowApi<B>
where B: OrderManagement
{
    /// Places a new order.
    ///
    /// The request is validated, then the backend prices and stores the order atomically. Totals on the returned order
    /// are computed from the catalog, never taken from the request.
    ///
    /// Once the order is committed, an [`OrderCreatedEvent`] is queued for the notification hooks. Queueing never
    /// blocks, and hook failures never reach the caller.
    pub async fn create_order(&self, order: NewOrder) -> Result<Order, OrderFlowError> {
        order.validate()?;
        let order = self.db.create_order(order).await.map_err(|e| {
            debug!("🔄️📦️ Could not create order. {e}");
            e
        })?;
        info!(
            "🔄️📦️ Order {} created for {} with {} lines. Total {}",
            order.order_number,
            order.buyer_name,
            order.lines.len(),
            order.total_amount
        );
        self.producers.publish_order_created(OrderCreatedEvent::new(order.clone()));
        Ok(order)
    }

    pub async fn order_by_number(&self, order_number: &OrderNumber) -> Result<Order, OrderFlowError> {
        self.db
            .fetch_order_by_number(order_number)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(order_number.clone()))
    }

    pub async fn order_by_id(&self, id: i64) -> Result<Order, OrderFlowError> {
        self.db.fetch_order_by_id(id).await?.ok_or(OrderFlowError::OrderIdNotFound(id))
    }

    pub async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderFlowError> {
        self.db.search_orders(query).await
    }

    pub async fn payment_status(&self, order_number: &OrderNumber) -> Result<PaymentStatusSnapshot, OrderFlowError> {
        let order = self.order_by_number(order_number).await?;
        Ok(PaymentStatusSnapshot::from(&order))
    }

    /// Manual status override for admins.
    ///
    /// Setting the status the order already has is a no-op. Moving into `paid` stamps `paid_at` (unless it is already
    /// set) and fires the order-paid hooks. An order that is `paid` cannot be moved to any other status this way.
    /// The write only lands if the order still has the status that was read; otherwise the call fails with
    /// [`OrderFlowError::StatusChanged`].
    pub async fn update_payment_status(
        &self,
        order_number: &OrderNumber,
        status: PaymentStatus,
    ) -> Result<Order, OrderFlowError> {
        let order = self.order_by_number(order_number).await?;
        if order.payment_status == status {
            debug!("🔄️📦️ Order {order_number} is already {status}. Nothing to do.");
            return Ok(order);
        }
        if order.payment_status.is_paid() {
            return Err(OrderFlowError::ForbiddenStatusChange {
                order_number: order_number.clone(),
                from: order.payment_status,
                to: status,
            });
        }
        let mut update = OrderUpdate::default().with_payment_status(status).expecting_status(order.payment_status);
        if status.is_paid() && order.paid_at.is_none() {
            update = update.with_paid_at(Utc::now());
        }
        let updated = self
            .db
            .update_order(order_number, update)
            .await
            .map_err(|e| match e {
                OrderFlowError::StatusChanged { .. } => {
                    warn!("🔄️📦️ Order {order_number} changed while its status was being set to {status}. {e}");
                    e
                },
                e => OrderFlowError::PersistenceError(e.to_string()),
            })?
            .ok_or_else(|| OrderFlowError::OrderNotFound(order_number.clone()))?;
        info!("🔄️📦️ Order {order_number} manually moved from {} to {status}", order.payment_status);
        if status.is_paid() {
            self.producers.publish_order_paid(OrderPaidEvent::new(updated.clone()));
        }
        Ok(updated)
    }
}
