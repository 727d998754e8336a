use std::env;

use chrono::Duration;
use deck_common::Secret;
use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use snap_tools::SnapConfig;

const DEFAULT_DECK_HOST: &str = "127.0.0.1";
const DEFAULT_DECK_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/deck.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 25;
const DEFAULT_PAYMENT_EXPIRY_MINUTES: i64 = 30;
const DEFAULT_EVENT_BUFFER_SIZE: usize = 50;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub auth: AuthConfig,
    pub midtrans: SnapConfig,
    /// Shared secret for payment callback signatures. Midtrans signs with the server key, so this is normally the same
    /// value.
    pub webhook_secret: Secret<String>,
    /// How long a hosted payment session stays open.
    pub payment_expiry: Duration,
    /// Capacity of each notification event queue. Events beyond this are dropped with a warning.
    pub event_buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DECK_HOST.to_string(),
            port: DEFAULT_DECK_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            auth: AuthConfig::default(),
            midtrans: SnapConfig::default(),
            webhook_secret: Secret::default(),
            payment_expiry: Duration::minutes(DEFAULT_PAYMENT_EXPIRY_MINUTES),
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("DECK_HOST").ok().unwrap_or_else(|| DEFAULT_DECK_HOST.into());
        let port = env::var("DECK_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for DECK_PORT. {e} Using the default, {DEFAULT_DECK_PORT}, instead."
                    );
                    DEFAULT_DECK_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_DECK_PORT);
        let database_url = env::var("DECK_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ DECK_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.to_string()
        });
        let max_connections = parse_number("DECK_DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS);
        let auth = AuthConfig::from_env_or_default();
        let midtrans = SnapConfig::new_from_env_or_default();
        let webhook_secret = match env::var("DECK_WEBHOOK_SECRET") {
            Ok(s) if !s.trim().is_empty() => Secret::new(s),
            _ => {
                info!("🪛️ DECK_WEBHOOK_SECRET is not set. Payment callbacks will be verified with the Midtrans server key.");
                midtrans.server_key.clone()
            },
        };
        if webhook_secret.is_empty() {
            warn!("🪛️ Neither DECK_WEBHOOK_SECRET nor DECK_MIDTRANS_SERVER_KEY is set. Every payment callback will be rejected \
                 until one of them is configured.");
        }
        let payment_expiry =
            Duration::minutes(parse_number("DECK_PAYMENT_EXPIRY_MINUTES", DEFAULT_PAYMENT_EXPIRY_MINUTES).max(1));
        let event_buffer_size = parse_number("DECK_EVENT_BUFFER_SIZE", DEFAULT_EVENT_BUFFER_SIZE).max(1);
        Self {
            host,
            port,
            database_url,
            max_connections,
            auth,
            midtrans,
            webhook_secret,
            payment_expiry,
            event_buffer_size,
        }
    }
}

fn parse_number<T>(var: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            error!("🪛️ {s} is not a valid value for {var}. {e}. Using the default, {default}, instead.");
            default
        }),
        Err(_) => default,
    }
}

/// Verification settings for admin bearer tokens.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// HS256 secret shared with whatever issues admin tokens.
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    /// A random secret. Tokens issued elsewhere will not verify against it.
    fn default() -> Self {
        let secret: String = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect();
        Self { jwt_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn new<S: Into<String>>(secret: S) -> Self {
        Self { jwt_secret: Secret::new(secret.into()) }
    }

    pub fn from_env_or_default() -> Self {
        match env::var("DECK_JWT_SECRET") {
            Ok(s) if !s.trim().is_empty() => Self::new(s),
            _ => {
                warn!(
                    "🪛️ DECK_JWT_SECRET is not set. A random secret will be used, so no admin token will be accepted. \
                     Set DECK_JWT_SECRET to the secret used by your token issuer."
                );
                Self::default()
            },
        }
    }
}
