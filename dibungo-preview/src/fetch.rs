//! Fetch layer: retrieves template pages and assets by path with a bounded wait.
//! No retries here; the UI offers a manual "Coba Lagi".

use log::debug;
use reqwest::header::ACCEPT;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Request timeout - {path} took longer than {timeout_ms} ms to load")]
    Timeout { path: String, timeout_ms: u64 },

    #[error("HTTP {status}: {reason}")]
    Http {
        path: String,
        status: u16,
        reason: String,
    },

    #[error("Network error fetching {path}: {message}")]
    Network { path: String, message: String },
}

impl FetchError {
    /// True when the server says the page does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::Http { status: 404 | 410, .. })
    }

    pub fn path(&self) -> &str {
        match self {
            FetchError::Timeout { path, .. }
            | FetchError::Http { path, .. }
            | FetchError::Network { path, .. } => path,
        }
    }
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Where pages come from. The router is generic over this.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    /// GET `path` (absolute, e.g. `/templates/template1/index.html`) and return the body.
    async fn get(&self, path: &str) -> FetchResult<String>;
}

/// `{base}{folder}/{file}`; `base` ends with `/`.
pub fn template_path(base: &str, folder: &str, file: &str) -> String {
    format!("{}{}/{}", base, folder.trim_matches('/'), file.trim_start_matches('/'))
}

/// Pages over HTTP from a base URL such as `https://dibungo.netlify.app`.
/// Redirects are followed; each request is bounded by `timeout`.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base: Url,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(base: Url, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base,
            timeout,
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn request_error(&self, path: &str, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                path: path.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            FetchError::Network {
                path: path.to_string(),
                message: err.to_string(),
            }
        }
    }
}

impl PageSource for HttpSource {
    async fn get(&self, path: &str) -> FetchResult<String> {
        let url = self.base.join(path).map_err(|e| FetchError::Network {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/html")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.request_error(path, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                path: path.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }
        response.text().await.map_err(|e| self.request_error(path, e))
    }
}
