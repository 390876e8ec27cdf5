//! HTTP Client module for cortical.
//!
//! This module provides the client for the Cortical.io REST API, the
//! transport it sends requests through, and the request/response models.

pub mod api;
pub mod models;
pub mod params;
pub mod transport;

#[cfg(test)]
mod api_tests;

pub use api::{is_image_request, CorticalClient};
pub use models::{ApiResponse, Fingerprint, FingerprintItem, RetinaDescriptor};
pub use params::{ParamValue, Params};
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};
