//! Admin bearer token middleware.
//!
//! Wrap any route or scope with [`AdminAuthFactory`] to require an `Authorization: Bearer <jwt>` header. The token must
//! be HS256-signed with the configured secret (see [`crate::config::AuthConfig`]) and carry a `sub` and an `exp`.
//! Tokens are issued elsewhere; this server only verifies them.
//!
//! On success the decoded [`AdminClaims`] are placed in the request extensions, where handlers can pick them up as an
//! extractor. Any failure short-circuits the request with a 401.
use std::{future::Future, pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web,
    Error,
    FromRequest,
    HttpMessage,
    HttpRequest,
};
use futures::future::{ok, ready, Ready};
use jsonwebtoken::{decode, errors::ErrorKind as JwtErrorKind, Algorithm, DecodingKey, Validation};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminClaims {
    /// The admin's username. Notifications are addressed to this name.
    pub sub: String,
    pub exp: usize,
}

impl FromRequest for AdminClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<AdminClaims>().cloned().ok_or_else(|| {
            warn!("🔐️ Admin claims requested on a route that is not protected by the admin middleware");
            ServerError::AuthenticationError(AuthError::MissingToken)
        });
        ready(claims)
    }
}

/// Checks a bearer token against `secret` and returns its claims.
pub fn verify_admin_token(token: &str, secret: &str) -> Result<AdminClaims, AuthError> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<AdminClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation).map(|data| data.claims).map_err(
        |e| match e.kind() {
            JwtErrorKind::ExpiredSignature => AuthError::Expired,
            JwtErrorKind::InvalidToken | JwtErrorKind::Base64(_) | JwtErrorKind::Json(_) | JwtErrorKind::Utf8(_) => {
                AuthError::PoorlyFormattedToken(e.to_string())
            },
            _ => AuthError::ValidationError(e.to_string()),
        },
    )
}

fn bearer_token(req: &ServiceRequest) -> Result<String, AuthError> {
    let header = req.headers().get(AUTHORIZATION).ok_or(AuthError::MissingToken)?;
    let value = header.to_str().map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .ok_or_else(|| AuthError::PoorlyFormattedToken("Expected a Bearer token".into()))?;
    Ok(token.trim().to_string())
}

pub struct AdminAuthFactory;

impl AdminAuthFactory {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        AdminAuthFactory
    }
}

impl<S, B> Transform<S, ServiceRequest> for AdminAuthFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AdminAuthService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AdminAuthService { service: Rc::new(service) })
    }
}

pub struct AdminAuthService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AdminAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let secret = req
                .app_data::<web::Data<AuthConfig>>()
                .map(|c| c.jwt_secret.clone())
                .ok_or_else(|| ServerError::ConfigurationError("No authentication configuration was registered".into()))?;
            let claims = bearer_token(&req).and_then(|token| verify_admin_token(&token, secret.reveal())).map_err(|e| {
                debug!("🔐️ Rejected admin request to {}. {e}", req.path());
                ServerError::AuthenticationError(e)
            })?;
            trace!("🔐️ Admin {} authenticated for {}", claims.sub, req.path());
            req.extensions_mut().insert(claims);
            service.call(req).await
        })
    }
}
