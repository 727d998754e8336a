use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::SnapConfig,
    data_objects::{SnapErrorResponse, SnapRequest, SnapResponse},
    SnapApiError,
};

#[derive(Clone)]
pub struct SnapApi {
    config: SnapConfig,
    client: Arc<Client>,
}

impl SnapApi {
    pub fn new(config: SnapConfig) -> Result<Self, SnapApiError> {
        let mut headers = HeaderMap::with_capacity(3);
        let auth = HeaderValue::from_str(&config.authorization_header())
            .map_err(|e| SnapApiError::Initialization(e.to_string()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| SnapApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, SnapApiError> {
        let url = self.url(path);
        trace!("🛍️ Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                SnapApiError::Timeout
            } else {
                SnapApiError::RestRequestError(e.to_string())
            }
        })?;
        let status = response.status();
        if status.is_success() {
            trace!("🛍️ REST query successful. {status}");
            response.json::<T>().await.map_err(|e| SnapApiError::JsonError(e.to_string()))
        } else {
            let text = response.text().await.map_err(|e| SnapApiError::RestResponseError(e.to_string()))?;
            Err(SnapApiError::QueryError { status: status.as_u16(), message: error_message(&text) })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url())
    }

    /// Creates a hosted checkout session and returns its token and redirect URL.
    pub async fn create_transaction(&self, request: &SnapRequest) -> Result<SnapResponse, SnapApiError> {
        let order_id = request.transaction_details.order_id.as_str();
        debug!("🛍️ Requesting Snap session for {order_id}");
        let result = self.rest_query::<SnapResponse, _>(Method::POST, "/transactions", Some(request)).await?;
        info!("🛍️ Snap session created for {order_id}");
        Ok(result)
    }
}

/// Midtrans reports failures as `{"error_messages": [...]}`. Fall back to the raw body if it is anything else.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<SnapErrorResponse>(body) {
        Ok(e) if !e.error_messages.is_empty() => e.error_messages.join("; "),
        _ => body.to_string(),
    }
}
