//! Shared plumbing for calls to external services.
//!
//! Every external call is a single attempt: transport failures and non-2xx
//! statuses become [`Error::UpstreamUnavailable`], bodies that don't decode
//! become [`Error::MalformedUpstreamResponse`].

use crate::{Error, Result};
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, error};

/// Build an HTTP client with JSON defaults and the given extra headers
pub fn build_client(mut headers: header::HeaderMap, timeout: Duration) -> Result<Client> {
    headers.insert(
        header::USER_AGENT,
        header::HeaderValue::from_static(concat!("recipe-recommender/", env!("CARGO_PKG_VERSION"))),
    );
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );

    Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {e}")))
}

/// Header value for a secret, kept out of debug output
pub fn secret_header(value: &str) -> Result<header::HeaderValue> {
    let mut value = header::HeaderValue::from_str(value)
        .map_err(|_| Error::Config("Credential contains invalid header characters".to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}

/// POST a JSON body and decode a JSON response
pub async fn post_json<B, T>(client: &Client, url: &str, body: &B, service: &str) -> Result<T>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    debug!("{} request: POST {}", service, url);

    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| Error::UpstreamUnavailable(format!("{service} request failed: {e}")))?;

    let status = response.status();

    if !status.is_success() {
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        error!("{} error: {} - {}", service, status, error_body);

        return Err(Error::UpstreamUnavailable(format!(
            "{service} returned {status}"
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::UpstreamUnavailable(format!("{service} response interrupted: {e}")))?;

    serde_json::from_slice(&bytes).map_err(|e| {
        Error::MalformedUpstreamResponse(format!("Failed to parse {service} response: {e}"))
    })
}
