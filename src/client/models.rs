//! Request and response models for the Cortical.io endpoints.

use crate::error::{CorticalError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Positions of the active bits of a text's fingerprint.
pub type Fingerprint = Vec<u32>;

/// One element of a `text` or `text/bulk` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintItem {
    /// Active bit positions.
    pub positions: Fingerprint,
}

/// Retina description returned by `retinas`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetinaDescriptor {
    /// Retina name.
    pub retina_name: String,

    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Number of terms known to the retina.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_terms_in_retina: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_rows: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_columns: Option<u32>,

    /// Any other fields, kept verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body element of a bulk fingerprint request.
#[derive(Debug, Clone, Serialize)]
pub struct TextInput<'a> {
    pub text: &'a str,
}

/// Body of an image request.
#[derive(Debug, Clone, Serialize)]
pub struct ImageInput<'a> {
    pub term: &'a str,
}

/// Successful outcome of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// Body parsed as JSON.
    Json(serde_json::Value),
    /// Raw image payload; never parsed.
    Image(Vec<u8>),
    /// Body that was expected to be JSON but did not parse.
    Text(String),
}

impl ApiResponse {
    /// Returns the parsed JSON, if any.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ApiResponse::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Returns true for an image payload.
    pub fn is_image(&self) -> bool {
        matches!(self, ApiResponse::Image(_))
    }

    /// Raw bytes of a non-JSON payload.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ApiResponse::Image(bytes) => Some(bytes),
            ApiResponse::Text(text) => Some(text.as_bytes()),
            ApiResponse::Json(_) => None,
        }
    }

    /// Decodes a JSON outcome into `T`. Any other outcome, or a JSON value of
    /// the wrong shape, is an [`CorticalError::UnexpectedResponse`].
    pub fn decode<T: DeserializeOwned>(self) -> Result<T> {
        match self {
            ApiResponse::Json(value) => serde_json::from_value(value)
                .map_err(|e| CorticalError::unexpected(format!("Failed to decode response: {}", e))),
            ApiResponse::Image(bytes) => Err(CorticalError::unexpected(format!(
                "Expected JSON, got {} bytes of image data",
                bytes.len()
            ))),
            ApiResponse::Text(text) => Err(CorticalError::unexpected(format!(
                "Expected JSON, got: {}",
                text
            ))),
        }
    }
}
