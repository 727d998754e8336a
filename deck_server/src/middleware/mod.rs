mod admin_auth;

pub use admin_auth::{AdminAuthFactory, AdminAuthService, AdminClaims};
