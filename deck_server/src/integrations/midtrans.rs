//! Glue between the engine's payment seams and the Midtrans Snap client.
use deck_engine::{
    api::payment_objects::{GatewayNotification, PaymentSession, PaymentSessionRequest},
    GatewayError,
    PaymentGateway,
};
use log::*;
use snap_tools::{
    CustomerDetails,
    ExpiryDetails,
    ItemDetails,
    SnapApi,
    SnapApiError,
    SnapConfig,
    SnapNotification,
    SnapRequest,
    TransactionDetails,
};

/// A [`PaymentGateway`] backed by Midtrans Snap.
#[derive(Clone)]
pub struct MidtransGateway {
    api: SnapApi,
}

impl MidtransGateway {
    pub fn new(config: SnapConfig) -> Result<Self, SnapApiError> {
        let api = SnapApi::new(config)?;
        Ok(Self { api })
    }
}

impl PaymentGateway for MidtransGateway {
    async fn create_session(&self, request: PaymentSessionRequest) -> Result<PaymentSession, GatewayError> {
        let order_number = request.order_number.clone();
        let snap_request = snap_request_for(request, &self.api.config().enabled_payments);
        let response = self.api.create_transaction(&snap_request).await.map_err(|e| {
            warn!("🛍️ Snap refused to create a transaction for {order_number}. {e}");
            GatewayError(e.to_string())
        })?;
        debug!("🛍️ Snap transaction created for {order_number}");
        Ok(PaymentSession { token: response.token, redirect_url: response.redirect_url })
    }
}

pub fn snap_request_for(request: PaymentSessionRequest, enabled_payments: &[String]) -> SnapRequest {
    let item_details = request
        .items
        .into_iter()
        .map(|i| ItemDetails { id: i.id, name: i.name, price: i.price.value(), quantity: i.quantity })
        .collect();
    SnapRequest {
        transaction_details: TransactionDetails {
            order_id: request.order_number.to_string(),
            gross_amount: request.gross_amount.value(),
        },
        item_details,
        customer_details: Some(CustomerDetails { first_name: request.customer.name, phone: request.customer.phone }),
        enabled_payments: enabled_payments.to_vec(),
        expiry: Some(ExpiryDetails::minutes(request.expiry_minutes)),
    }
}

/// Strips a Snap notification down to the fields the reconciler works with.
pub fn gateway_notification(n: SnapNotification) -> GatewayNotification {
    GatewayNotification {
        order_id: n.order_id,
        status_code: n.status_code,
        gross_amount: n.gross_amount,
        signature_key: n.signature_key,
        transaction_status: n.transaction_status,
        payment_type: n.payment_type,
    }
}
