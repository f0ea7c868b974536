//! Blocking HTTP transport for the remote service.
//!
//! Every call is a single synchronous request; there is no retry layer.
//! Responses are handed back raw so each caller decides which status codes
//! it accepts (most notably whether `409 Conflict` is benign).

use anyhow::Result;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            http: builder.build()?,
            base: config.host.trim_end_matches('/').to_string(),
        })
    }

    /// Absolute URL for a service path such as `/customers/1/folders`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Response, ApiError> {
        let url = self.url(path);
        self.send("GET", &url, self.http.get(&url).query(query))
    }

    pub fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, ApiError> {
        let url = self.url(path);
        self.send("POST", &url, self.http.post(&url).json(body))
    }

    pub fn put_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, ApiError> {
        let url = self.url(path);
        self.send("PUT", &url, self.http.put(&url).json(body))
    }

    pub fn put_empty(&self, path: &str) -> Result<Response, ApiError> {
        let url = self.url(path);
        self.send("PUT", &url, self.http.put(&url))
    }

    /// `PUT` raw bytes to an absolute URL outside the service (a presigned
    /// object-store target).
    pub fn put_bytes(
        &self,
        url: &str,
        bytes: Vec<u8>,
        mime: &str,
        filename: &str,
    ) -> Result<Response, ApiError> {
        let request = self
            .http
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, mime)
            .header(
                reqwest::header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            )
            .body(bytes);
        self.send("PUT", url, request)
    }

    fn send(
        &self,
        method: &'static str,
        url: &str,
        request: RequestBuilder,
    ) -> Result<Response, ApiError> {
        let shown = redact_url(url);
        debug!(method, url = %shown, "sending request");
        let response = request.send().map_err(|source| ApiError::Transport {
            method,
            url: shown.clone(),
            source: source.without_url(),
        })?;
        debug!(method, url = %shown, status = %response.status(), "received response");
        Ok(response)
    }
}

/// Pass the response through when its status is `expected`, otherwise turn it
/// into an [`ApiError::Status`] carrying the response body.
pub fn expect_status(
    response: Response,
    method: &'static str,
    expected: StatusCode,
) -> Result<Response, ApiError> {
    if response.status() == expected {
        return Ok(response);
    }
    Err(status_error(response, method))
}

/// Build an [`ApiError::Status`] from a response the caller rejected.
pub fn status_error(response: Response, method: &'static str) -> ApiError {
    let status = response.status();
    let url = redact_url(response.url().as_str());
    let body = response.text().unwrap_or_default();
    ApiError::Status {
        method,
        url,
        status,
        body: body.trim().to_string(),
    }
}

/// Decode a JSON body, reporting failures as [`ApiError::Protocol`].
pub fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let url = redact_url(response.url().as_str());
    let text = response.text().map_err(|e| ApiError::Protocol {
        url: url.clone(),
        reason: format!("failed to read body: {}", e),
    })?;
    serde_json::from_str(&text).map_err(|e| ApiError::Protocol {
        url,
        reason: e.to_string(),
    })
}

/// `url` without its query string or fragment. Presigned targets carry their
/// credentials in the query, which must not reach logs or error messages.
pub fn redact_url(url: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    }
}
