use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use deck_engine::{db_types::FieldErrors, CatalogError, ErrorKind, NotificationError, OrderFlowError};
use log::error;
use thiserror::Error;

use crate::data_objects::JsonResponse;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    /// The request body could not be decoded into the expected shape.
    #[error("Invalid request body. {0}")]
    UnprocessableBody(String),
    /// A payment callback body that is not valid JSON or is missing required fields.
    #[error("Malformed payment notification. {0}")]
    MalformedPayload(String),
    #[error("Invalid query parameters. {0}")]
    InvalidQuery(FieldErrors),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("{0}")]
    OrderFlow(#[from] OrderFlowError),
    #[error("{0}")]
    Catalog(#[from] CatalogError),
    #[error("{0}")]
    Notification(#[from] NotificationError),
}

impl ServerError {
    fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::OrderFlow(e) => Some(e.kind()),
            Self::Catalog(e) => Some(e.kind()),
            Self::Notification(e) => Some(e.kind()),
            _ => None,
        }
    }

    fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            Self::OrderFlow(OrderFlowError::Validation(errors)) => Some(errors.clone()),
            Self::UnprocessableBody(msg) | Self::MalformedPayload(msg) => Some(FieldErrors::single("body", msg.as_str())),
            Self::InvalidQuery(errors) => Some(errors.clone()),
            Self::InvalidRequestPath(msg) => Some(FieldErrors::single("path", msg.as_str())),
            _ => None,
        }
    }
}

fn status_for_kind(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::BAD_REQUEST,
        ErrorKind::Upstream => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::Security => StatusCode::UNAUTHORIZED,
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        if let Some(kind) = self.kind() {
            return status_for_kind(kind);
        }
        match self {
            Self::UnprocessableBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            Self::InvalidQuery(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::OrderFlow(_) | Self::Catalog(_) | Self::Notification(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("💻️ Request failed with {status}. {self}");
        }
        let mut body = JsonResponse::failure(self);
        if let Some(errors) = self.field_errors() {
            body = body.with_errors(errors);
        }
        HttpResponse::build(status)
            .insert_header(ContentType::json())
            .body(serde_json::to_string(&body).unwrap_or_else(|_| r#"{"success":false}"#.to_string()))
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No bearer token was provided.")]
    MissingToken,
    #[error("The access token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("The access token has expired.")]
    Expired,
    #[error("The access token is invalid. {0}")]
    ValidationError(String),
}
