pub mod midtrans;
pub mod notifications;
