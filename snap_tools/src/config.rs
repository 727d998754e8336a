use std::time::Duration;

use deck_common::{parse_boolean_flag, parse_comma_list, Secret};
use log::*;

pub const SANDBOX_BASE_URL: &str = "https://app.sandbox.midtrans.com/snap/v1";
pub const PRODUCTION_BASE_URL: &str = "https://app.midtrans.com/snap/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_ENABLED_PAYMENTS: [&str; 3] = ["gopay", "shopeepay", "bank_transfer"];

#[derive(Debug, Clone)]
pub struct SnapConfig {
    pub server_key: Secret<String>,
    /// When false, all requests go to the sandbox environment.
    pub production: bool,
    /// Upper bound on every outbound request, connection setup included.
    pub timeout: Duration,
    pub enabled_payments: Vec<String>,
    /// Overrides the environment's base URL. Only useful for pointing the client at a local stub.
    pub base_url: Option<String>,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            server_key: Secret::default(),
            production: false,
            timeout: DEFAULT_TIMEOUT,
            enabled_payments: DEFAULT_ENABLED_PAYMENTS.iter().map(|s| s.to_string()).collect(),
            base_url: None,
        }
    }
}

impl SnapConfig {
    pub fn new_from_env_or_default() -> Self {
        let server_key = Secret::new(std::env::var("DECK_MIDTRANS_SERVER_KEY").unwrap_or_else(|_| {
            warn!("🪛️ DECK_MIDTRANS_SERVER_KEY not set. Payment session requests will be rejected by Midtrans.");
            String::default()
        }));
        let production = parse_boolean_flag(std::env::var("DECK_MIDTRANS_PRODUCTION").ok(), false);
        if production {
            info!("🪛️ Midtrans is running in PRODUCTION mode");
        } else {
            info!("🪛️ Midtrans is running in sandbox mode");
        }
        let timeout = std::env::var("DECK_MIDTRANS_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| {
                        error!(
                            "🪛️ {s} is not a valid value for DECK_MIDTRANS_TIMEOUT_SECS. {e}. Using the default of {}s",
                            DEFAULT_TIMEOUT.as_secs()
                        )
                    })
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        let mut enabled_payments = std::env::var("DECK_MIDTRANS_ENABLED_PAYMENTS")
            .map(|s| parse_comma_list(&s))
            .unwrap_or_default();
        if enabled_payments.is_empty() {
            enabled_payments = DEFAULT_ENABLED_PAYMENTS.iter().map(|s| s.to_string()).collect();
        }
        Self { server_key, production, timeout, enabled_payments, base_url: None }
    }

    pub fn base_url(&self) -> &str {
        match (&self.base_url, self.production) {
            (Some(url), _) => url.as_str(),
            (None, true) => PRODUCTION_BASE_URL,
            (None, false) => SANDBOX_BASE_URL,
        }
    }

    /// The value of the `Authorization` header Midtrans expects: HTTP Basic with the server key as the username and an
    /// empty password.
    pub fn authorization_header(&self) -> String {
        let credentials = format!("{}:", self.server_key.reveal());
        format!("Basic {}", base64::encode(credentials))
    }
}
