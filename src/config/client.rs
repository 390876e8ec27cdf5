//! Client configuration types.

use serde::{Deserialize, Serialize};

/// Default API language.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Default base URL of the public Cortical.io REST API.
pub const DEFAULT_URL: &str = "http://api.cortical.io/rest/";

/// Default retina.
pub const DEFAULT_RETINA: &str = "en_associative";

/// Default `api-client` header value.
pub const DEFAULT_CLIENT: &str = "rust_1.0";

/// Caller-supplied overrides. Any field left unset takes its default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// API key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Language.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Base URL, concatenated verbatim with request paths.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Retina name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retina: Option<String>,

    /// API-client identifier string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
}

impl ClientOptions {
    /// Sets the API key.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets the language.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Sets the base URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the retina name.
    pub fn retina(mut self, retina: impl Into<String>) -> Self {
        self.retina = Some(retina.into());
        self
    }

    /// Sets the API-client identifier.
    pub fn client(mut self, client: impl Into<String>) -> Self {
        self.client = Some(client.into());
        self
    }

    /// Layers `other` on top of `self`: fields set in `other` win.
    pub fn merge(self, other: ClientOptions) -> Self {
        Self {
            key: other.key.or(self.key),
            language: other.language.or(self.language),
            url: other.url.or(self.url),
            retina: other.retina.or(self.retina),
            client: other.client.or(self.client),
        }
    }
}

/// Resolved client configuration. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_key: Option<String>,
    language: String,
    base_url: String,
    retina_name: String,
    client_id: String,
}

impl ClientConfig {
    /// Resolves options against the defaults, field by field.
    pub fn from_options(options: ClientOptions) -> Self {
        Self {
            api_key: options.key,
            language: options
                .language
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            base_url: options.url.unwrap_or_else(|| DEFAULT_URL.to_string()),
            retina_name: options.retina.unwrap_or_else(|| DEFAULT_RETINA.to_string()),
            client_id: options.client.unwrap_or_else(|| DEFAULT_CLIENT.to_string()),
        }
    }

    /// API key, if any.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Language.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Default retina injected into requests.
    pub fn retina_name(&self) -> &str {
        &self.retina_name
    }

    /// Value of the `api-client` header.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_options(ClientOptions::default())
    }
}

impl From<ClientOptions> for ClientConfig {
    fn from(options: ClientOptions) -> Self {
        Self::from_options(options)
    }
}

// Keeps the key out of logs.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("language", &self.language)
            .field("base_url", &self.base_url)
            .field("retina_name", &self.retina_name)
            .field("client_id", &self.client_id)
            .finish()
    }
}
