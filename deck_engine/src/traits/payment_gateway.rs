use crate::api::{
    errors::GatewayError,
    payment_objects::{PaymentSession, PaymentSessionRequest},
};

/// An external payment processor that hosts the checkout page.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    /// Requests a hosted checkout session. Implementations must not retry on their own and should bound the call with a
    /// timeout.
    async fn create_session(&self, request: PaymentSessionRequest) -> Result<PaymentSession, GatewayError>;
}
