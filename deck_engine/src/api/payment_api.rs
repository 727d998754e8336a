use std::fmt::Debug;

use chrono::{Duration, Utc};
use log::*;

use crate::{
    api::{
        errors::OrderFlowError,
        payment_objects::{CallbackAck, GatewayNotification, GatewayTransactionStatus, PaymentSession, PaymentSessionRequest},
    },
    db_types::{OrderNumber, OrderUpdate},
    events::{EventProducers, OrderPaidEvent},
    helpers::CallbackSigner,
    traits::{OrderManagement, PaymentGateway},
};

pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 30;
/// How many times a callback is re-evaluated when the order changes between reading and writing it.
pub const MAX_CALLBACK_ATTEMPTS: usize = 3;

/// `PaymentApi` opens hosted checkout sessions for orders and reconciles the gateway's status callbacks against them.
///
/// It is generic over the order store and the gateway, so neither the database nor the payment provider leak into the
/// flow logic.
pub struct PaymentApi<B, G> {
    db: B,
    gateway: G,
    signer: CallbackSigner,
    producers: EventProducers,
    session_ttl: Duration,
}

impl<B, G> Debug for PaymentApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentApi (session ttl: {}m)", self.session_ttl.num_minutes())
    }
}

impl<B, G> PaymentApi<B, G> {
    pub fn new(db: B, gateway: G, signer: CallbackSigner, producers: EventProducers) -> Self {
        Self { db, gateway, signer, producers, session_ttl: Duration::minutes(DEFAULT_SESSION_TTL_MINUTES) }
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }
}

impl<B, G> PaymentApi<B, G>
where
    B: OrderManagement,
    G: PaymentGateway,
{
    /// Requests a payment session for an existing order and records the session details on it.
    ///
    /// A paid order is rejected before the gateway is contacted. If the gateway fails, the order is left as it was.
    /// If the gateway succeeds but the session cannot be saved, the error says so explicitly, since the session now
    /// exists upstream.
    pub async fn create_payment_session(&self, order_number: &OrderNumber) -> Result<PaymentSession, OrderFlowError> {
        let order = self
            .db
            .fetch_order_by_number(order_number)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(order_number.clone()))?;
        if order.payment_status.is_paid() {
            debug!("💳️ Order {order_number} is already paid. Not creating a payment session.");
            return Err(OrderFlowError::AlreadyPaid(order_number.clone()));
        }
        let request = PaymentSessionRequest::for_order(&order, self.session_ttl);
        let session = self.gateway.create_session(request).await.map_err(|e| {
            warn!("💳️ Payment gateway refused a session for {order_number}. {e}");
            OrderFlowError::from(e)
        })?;
        let expires_at = Utc::now() + self.session_ttl;
        let update = OrderUpdate::default()
            .with_gateway_session(session.token.clone(), order_number.as_str())
            .with_expires_at(expires_at);
        match self.db.update_order(order_number, update).await {
            Ok(Some(_)) => {
                info!("💳️ Payment session created for {order_number}. Expires at {expires_at}");
                Ok(session)
            },
            Ok(None) => {
                error!("💳️ Order {order_number} disappeared after its payment session was created upstream.");
                Err(OrderFlowError::PersistenceAfterExternalSideEffect {
                    order_number: order_number.clone(),
                    message: "the order no longer exists".into(),
                })
            },
            Err(e) => {
                error!("💳️ Payment session for {order_number} was created upstream but could not be saved. {e}");
                Err(OrderFlowError::PersistenceAfterExternalSideEffect {
                    order_number: order_number.clone(),
                    message: e.to_string(),
                })
            },
        }
    }

    /// Applies a payment status callback from the gateway.
    ///
    /// The signature is checked before anything is read from the store. Statuses the gateway may add in future are
    /// acknowledged without changing the order. Replaying a callback that has already been applied changes nothing
    /// and still succeeds, so the gateway stops retrying.
    ///
    /// The status change is written on the condition that the order still looks the way it did when it was read. If
    /// another request got there first, the callback is re-evaluated against the fresh order.
    pub async fn handle_callback(&self, notification: GatewayNotification) -> Result<CallbackAck, OrderFlowError> {
        let GatewayNotification { order_id, status_code, gross_amount, signature_key, transaction_status, payment_type } =
            notification;
        if !self.signer.verify(&order_id, &status_code, &gross_amount, &signature_key) {
            warn!("💳️ Rejected a payment callback for {order_id} with an invalid signature");
            return Err(OrderFlowError::InvalidSignature);
        }
        let order_number = OrderNumber::new(order_id);
        for attempt in 1..=MAX_CALLBACK_ATTEMPTS {
            match self.apply_callback(&order_number, &transaction_status, payment_type.as_deref()).await {
                Err(OrderFlowError::StatusChanged { .. }) => {
                    debug!("💳️ Order {order_number} changed under callback attempt {attempt}. Re-reading.");
                },
                result => return result,
            }
        }
        error!("💳️ Order {order_number} kept changing while a gateway callback was applied. Giving up.");
        Err(OrderFlowError::PersistenceError(format!(
            "Order {order_number} kept changing while the callback was being applied"
        )))
    }

    async fn apply_callback(
        &self,
        order_number: &OrderNumber,
        transaction_status: &str,
        payment_type: Option<&str>,
    ) -> Result<CallbackAck, OrderFlowError> {
        let order = self
            .db
            .fetch_order_by_number(order_number)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(order_number.clone()))?;
        let ack = |payment_status| CallbackAck { order_number: order_number.clone(), payment_status };
        let new_status = match GatewayTransactionStatus::parse(transaction_status).payment_status() {
            Some(s) => s,
            None => {
                info!("💳️ Ignoring unrecognised transaction status '{transaction_status}' for {order_number}");
                return Ok(ack(order.payment_status));
            },
        };

        let mut update = OrderUpdate::default();
        if new_status != order.payment_status {
            if order.payment_status.is_paid() {
                warn!(
                    "💳️ Gateway moved paid order {order_number} to {new_status} (transaction status \
                     '{transaction_status}')"
                );
            }
            update = update.with_payment_status(new_status);
        }
        if new_status.is_paid() {
            if order.paid_at.is_none() {
                update = update.with_paid_at(Utc::now());
            }
            if let Some(method) = payment_type.filter(|m| !m.trim().is_empty() && *m != order.payment_method) {
                update = update.with_payment_method(method);
            }
        }
        if update.is_empty() {
            debug!("💳️ Callback for {order_number} is already applied ({new_status}). Nothing to do.");
            return Ok(ack(order.payment_status));
        }

        let update = update.expecting_status(order.payment_status);
        let updated = self
            .db
            .update_order(order_number, update)
            .await
            .map_err(|e| match e {
                OrderFlowError::StatusChanged { .. } => e,
                e => {
                    error!("💳️ Could not save the status of {order_number} after a gateway callback. {e}");
                    OrderFlowError::PersistenceError(e.to_string())
                },
            })?
            .ok_or_else(|| OrderFlowError::OrderNotFound(order_number.clone()))?;
        info!("💳️ Order {order_number} moved from {} to {}", order.payment_status, updated.payment_status);
        if updated.payment_status.is_paid() && !order.payment_status.is_paid() {
            self.producers.publish_order_paid(OrderPaidEvent::new(updated.clone()));
        }
        Ok(ack(updated.payment_status))
    }
}
