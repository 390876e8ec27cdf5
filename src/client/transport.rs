//! HTTP transport seam.
//!
//! The client builds a complete [`HttpRequest`] and hands it to a
//! [`Transport`]. Connection handling, TLS, redirects and timeouts all live
//! behind this trait; [`ReqwestTransport`] is the default implementation.

use crate::error::{CorticalError, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::fmt;
use tracing::trace;

/// HTTP method used by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET request.
    Get,
    /// POST request.
    Post,
}

impl Method {
    /// Returns the method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// A fully built request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Request method.
    pub method: Method,
    /// Target URL, without the query string.
    pub url: Url,
    /// Query string pairs.
    pub query: Vec<(String, String)>,
    /// Request headers.
    pub headers: Vec<(String, String)>,
    /// Serialized body.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Returns the first header value with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the value of a query parameter.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response: status code and body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

/// Sends requests over the network.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request. Any status code is a successful send; only
    /// failures to complete the exchange are errors.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with the default `reqwest` settings.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| CorticalError::config_with_source("Failed to create HTTP client", e))?;

        Ok(Self { client })
    }

    /// Wraps an existing `reqwest` client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let target = request.url.to_string();

        let mut builder = self
            .client
            .request(request.method.into(), request.url)
            .query(&request.query);

        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| CorticalError::transport_with_source(&target, e))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| CorticalError::transport_with_source(&target, e))?;

        trace!(url = %target, status, bytes = body.len(), "Transport exchange complete");

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}
