//! # Payment callback signatures
//!
//! Payment notifications arrive on an unauthenticated endpoint, so each one carries a signature that proves it was sent
//! by someone who knows the shared server key.
//!
//! ## Signature format
//!
//! ```text
//!    hex(SHA-512({order_id}{status_code}{gross_amount}{secret}))
//! ```
//!
//! The fields are concatenated without separators, exactly as they appear in the notification body (in particular,
//! `gross_amount` is the string as sent, e.g. `100000.00`). The hex digest is compared case-insensitively.
use deck_common::Secret;
use sha2::{Digest, Sha512};

/// Computes the lowercase hex SHA-512 signature for the given callback fields.
pub fn callback_signature(order_id: &str, status_code: &str, gross_amount: &str, secret: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Holds the shared secret and verifies incoming callback signatures against it.
#[derive(Clone, Debug, Default)]
pub struct CallbackSigner {
    secret: Secret<String>,
}

impl CallbackSigner {
    pub fn new(secret: Secret<String>) -> Self {
        Self { secret }
    }

    pub fn sign(&self, order_id: &str, status_code: &str, gross_amount: &str) -> String {
        callback_signature(order_id, status_code, gross_amount, self.secret.reveal())
    }

    /// Checks `provided` against the expected signature. With no secret configured, the signature would be a plain hash
    /// of public fields that anyone can compute, so nothing verifies.
    pub fn verify(&self, order_id: &str, status_code: &str, gross_amount: &str, provided: &str) -> bool {
        if self.secret.reveal().trim().is_empty() {
            return false;
        }
        let expected = self.sign(order_id, status_code, gross_amount);
        constant_time_eq_ignore_case(expected.as_bytes(), provided.trim().as_bytes())
    }
}

fn constant_time_eq_ignore_case(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x.to_ascii_lowercase() ^ y.to_ascii_lowercase())) == 0
}
