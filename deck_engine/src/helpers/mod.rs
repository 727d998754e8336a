mod callback_signature;

pub use callback_signature::{callback_signature, CallbackSigner};
