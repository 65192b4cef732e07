//! HTTP helpers shared by the feeds

use std::time::Duration;

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION},
    Client,
};
use serde_json::Value;
use tracing::debug;

use crate::{error::FeedError, Result};

const USER_AGENT: &str = concat!("basketliga/", env!("CARGO_PKG_VERSION"));

/// Header carrying the SheetBest API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Build the shared HTTP client.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?)
}

/// `Accept: application/json`, plus `X-Api-Key` when a key is configured.
pub fn json_headers(api_key: Option<&str>) -> Result<HeaderMap> {
    let mut h = HeaderMap::new();
    h.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if let Some(key) = api_key.filter(|k| !k.is_empty()) {
        h.insert(
            HeaderName::from_static(API_KEY_HEADER),
            HeaderValue::from_str(key)?,
        );
    }
    Ok(h)
}

/// `Authorization: Bearer {token}`.
pub fn bearer_headers(token: &str) -> Result<HeaderMap> {
    let mut h = HeaderMap::new();
    h.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
    Ok(h)
}

/// GET `url` and decode the body as JSON. Non-2xx statuses are errors.
pub async fn get_json(client: &Client, url: &str, headers: HeaderMap) -> Result<Value> {
    debug!(url, "GET");
    let response = client.get(url).headers(headers).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FeedError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    Ok(response.json::<Value>().await?)
}
