//! HTTP transport helpers shared by every endpoint.

use crate::error::ApiError;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Build an HTTP client with timeout applied.
pub(super) fn build_http_client(timeout: Duration) -> reqwest::Client {
    // Fall back to reqwest defaults if builder creation fails for any reason.
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("cloudctl/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Send a prepared request and map non-2xx statuses into `ApiError::Status`.
pub(super) async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
    let response = request.send().await?;
    let status = response.status();
    debug!(url = %response.url(), status = status.as_u16(), "api response");
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::status(status.as_u16(), body));
    }
    Ok(response)
}

/// Send a request and decode the JSON response body.
pub(super) async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, ApiError> {
    let response = send(request).await?;
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}
