//! Cortical.io API client.
//!
//! Every call goes through [`CorticalClient::request`], which builds the URL,
//! headers and query string, sends the request through the configured
//! [`Transport`] and interprets the response.

use crate::client::models::{
    ApiResponse, Fingerprint, FingerprintItem, ImageInput, RetinaDescriptor, TextInput,
};
use crate::client::params::{Params, RETINA_PARAM};
use crate::client::transport::{HttpRequest, Method, ReqwestTransport, Transport};
use crate::config::{ClientConfig, ClientOptions};
use crate::error::{CorticalError, Result};
use reqwest::Url;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Path listing the available retinas.
pub const RETINAS_PATH: &str = "retinas";

/// Path of the single-text fingerprint endpoint.
pub const TEXT_PATH: &str = "text";

/// Path of the bulk fingerprint endpoint.
pub const BULK_TEXT_PATH: &str = "text/bulk";

/// Path of the image rendering endpoint.
pub const IMAGE_PATH: &str = "image";

const IMAGE_SEGMENT: &str = "/image";
const BULK_SEGMENT: &str = "/bulk";
const RETINAS_SEGMENT: &str = "/retinas";

const ACCEPT_IMAGE: &str = "image/png";
const ACCEPT_JSON: &str = "application/json";

/// Returns true if a response from `url` is an image rather than JSON.
pub fn is_image_request(url: &str) -> bool {
    url.contains(IMAGE_SEGMENT) && !url.contains(BULK_SEGMENT)
}

/// Async client for the Cortical.io REST API.
///
/// Cloning is cheap; clones share the configuration and the transport.
#[derive(Clone)]
pub struct CorticalClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
}

impl CorticalClient {
    /// Creates a client from partial options; unset fields take defaults.
    ///
    /// A missing API key is accepted here and only surfaces as an HTTP 401
    /// once a protected endpoint is called.
    pub fn new(options: ClientOptions) -> Result<Self> {
        Self::with_config(ClientConfig::from_options(options))
    }

    /// Creates a client from a resolved configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Ok(Self::with_transport(config, ReqwestTransport::new()?))
    }

    /// Creates a client using a custom transport.
    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
        }
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Gets the fingerprint of a single text.
    ///
    /// Fails with [`CorticalError::EmptyResult`] if the API returns no element.
    pub async fn get_fingerprint(&self, text: &str, params: Params) -> Result<Fingerprint> {
        let items: Vec<FingerprintItem> = self.post(TEXT_PATH, text, params).await?.decode()?;

        items
            .into_iter()
            .next()
            .map(|item| item.positions)
            .ok_or_else(|| CorticalError::EmptyResult {
                path: TEXT_PATH.to_string(),
            })
    }

    /// Gets the fingerprints of several texts in one bulk request.
    ///
    /// The result is index-aligned with `texts`.
    pub async fn get_fingerprints<S: AsRef<str>>(
        &self,
        texts: &[S],
        params: Params,
    ) -> Result<Vec<Fingerprint>> {
        let body: Vec<TextInput<'_>> = texts
            .iter()
            .map(|text| TextInput {
                text: text.as_ref(),
            })
            .collect();

        let items: Vec<FingerprintItem> =
            self.post(BULK_TEXT_PATH, &body, params).await?.decode()?;

        Ok(items.into_iter().map(|item| item.positions).collect())
    }

    /// Lists retinas, or describes a single one when `name` is given.
    pub async fn get_retinas(&self, name: Option<&str>) -> Result<Vec<RetinaDescriptor>> {
        let params = match name {
            Some(name) => Params::retina(name),
            None => Params::new(),
        };

        self.get(RETINAS_PATH, params).await?.decode()
    }

    /// Renders the fingerprint of `term` as a PNG image.
    pub async fn get_image(&self, term: &str, params: Params) -> Result<Vec<u8>> {
        match self.post(IMAGE_PATH, &ImageInput { term }, params).await? {
            ApiResponse::Image(bytes) => Ok(bytes),
            other => Err(CorticalError::unexpected(format!(
                "Expected image payload, got {:?}",
                other
            ))),
        }
    }

    /// Sends a GET request.
    pub async fn get(&self, path: &str, params: Params) -> Result<ApiResponse> {
        self.request(path, Method::Get, None, params).await
    }

    /// Sends a POST request with `data` serialized as the JSON body.
    pub async fn post<D: Serialize + ?Sized>(
        &self,
        path: &str,
        data: &D,
        params: Params,
    ) -> Result<ApiResponse> {
        let data = serde_json::to_value(data)?;
        self.request(path, Method::Post, Some(&data), params).await
    }

    /// Returns true if a response from `url` is an image rather than JSON.
    pub fn is_image_request(&self, url: &str) -> bool {
        is_image_request(url)
    }

    /// Sends a request to the API and interprets the response.
    ///
    /// `retina_name` is added to `params` unless already present or the URL
    /// targets the retinas listing. The `api-key` header is only sent when a
    /// key is configured; without one the API answers 401. Any status other
    /// than exactly 200 is an error carrying the raw body. On 200, image
    /// requests yield [`ApiResponse::Image`]; other bodies yield
    /// [`ApiResponse::Json`] when they parse and [`ApiResponse::Text`] when
    /// they don't.
    pub async fn request(
        &self,
        path: &str,
        method: Method,
        data: Option<&serde_json::Value>,
        mut params: Params,
    ) -> Result<ApiResponse> {
        let url = self.get_url(path);
        let image = is_image_request(&url);
        let accept = if image { ACCEPT_IMAGE } else { ACCEPT_JSON };

        if !params.contains_key(RETINA_PARAM) && !url.contains(RETINAS_SEGMENT) {
            params.insert(RETINA_PARAM, self.config.retina_name());
        }

        let parsed = Url::parse(&url).map_err(|e| CorticalError::InvalidUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        let mut headers = vec![
            ("Accept".to_string(), accept.to_string()),
            ("Content-type".to_string(), ACCEPT_JSON.to_string()),
        ];
        if let Some(key) = self.config.api_key() {
            headers.push(("api-key".to_string(), key.to_string()));
        }
        headers.push(("api-client".to_string(), self.config.client_id().to_string()));

        let body = data.map(serde_json::to_vec).transpose()?;

        debug!(
            method = %method,
            url = %url,
            image = image,
            params = params.len(),
            "Sending request"
        );

        let response = self
            .transport
            .send(HttpRequest {
                method,
                url: parsed,
                query: params.to_query(),
                headers,
                body,
            })
            .await?;

        debug!(url = %url, status = response.status, "Received response");

        if response.status != 200 {
            return Err(CorticalError::HttpStatus {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).into_owned(),
            });
        }

        if image {
            return Ok(ApiResponse::Image(response.body));
        }

        match serde_json::from_slice(&response.body) {
            Ok(value) => Ok(ApiResponse::Json(value)),
            Err(e) => {
                debug!(url = %url, error = %e, "Response is not JSON, returning raw body");
                Ok(ApiResponse::Text(
                    String::from_utf8_lossy(&response.body).into_owned(),
                ))
            }
        }
    }

    /// Builds a URL by appending `path` to the base URL.
    pub fn get_url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url(), path)
    }
}

impl fmt::Debug for CorticalClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorticalClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
