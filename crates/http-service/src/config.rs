use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Builder for [`HttpServiceConfig`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct HttpServiceConfigBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    upload_path: Option<String>,
    ask_path: Option<String>,
}

impl HttpServiceConfigBuilder {
    /// Creates a builder pointing at the given base URL.
    #[inline]
    pub fn with_base_url<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Default::default()
        }
    }

    /// Sets a per-request timeout enforced by the HTTP client.
    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Overrides the path of the upload endpoint.
    #[inline]
    pub fn with_upload_path<S: Into<String>>(mut self, path: S) -> Self {
        self.upload_path = Some(path.into());
        self
    }

    /// Overrides the path of the ask endpoint.
    #[inline]
    pub fn with_ask_path<S: Into<String>>(mut self, path: S) -> Self {
        self.ask_path = Some(path.into());
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> HttpServiceConfig {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        HttpServiceConfig {
            base_url: base_url.trim_end_matches('/').to_owned(),
            timeout: self.timeout,
            upload_path: normalize_path(self.upload_path, "/upload"),
            ask_path: normalize_path(self.ask_path, "/ask"),
        }
    }
}

fn normalize_path(path: Option<String>, default: &str) -> String {
    match path {
        Some(path) if path.starts_with('/') => path,
        Some(path) => format!("/{path}"),
        None => default.to_owned(),
    }
}

/// Configuration for [`crate::HttpService`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HttpServiceConfig {
    pub(crate) base_url: String,
    pub(crate) timeout: Option<Duration>,
    pub(crate) upload_path: String,
    pub(crate) ask_path: String,
}

impl HttpServiceConfig {
    #[inline]
    pub(crate) fn upload_url(&self) -> String {
        format!("{}{}", self.base_url, self.upload_path)
    }

    #[inline]
    pub(crate) fn ask_url(&self) -> String {
        format!("{}{}", self.base_url, self.ask_path)
    }
}

impl Default for HttpServiceConfig {
    #[inline]
    fn default() -> Self {
        HttpServiceConfigBuilder::default().build()
    }
}
