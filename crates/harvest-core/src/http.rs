//! HTTP transport over a shared async client.
//!
//! Uses async reqwest on a shared tokio runtime, but presents a blocking
//! interface so rayon workers can call it directly.

use std::io;
use std::sync::{LazyLock, OnceLock};
use std::time::Duration;

use crate::error::FetchError;

/// Process-wide HTTP settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    /// Whole-request budget, body included
    pub request_timeout: Duration,
    /// Fixed pause between attempts of a failed fetch
    pub retry_delay: Duration,
    /// `None` = retry forever
    pub max_retries: Option<u32>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(60),
            retry_delay: Duration::from_secs(20),
            max_retries: None,
        }
    }
}

static HTTP_CONFIG: OnceLock<HttpConfig> = OnceLock::new();

/// Install HTTP settings. Must run before the first request; later calls are ignored.
pub fn set_http_config(config: HttpConfig) {
    if HTTP_CONFIG.set(config).is_err() {
        log::warn!("HTTP config already initialized, ignoring override");
    }
}

/// Current HTTP settings (defaults if never set).
pub fn http_config() -> &'static HttpConfig {
    HTTP_CONFIG.get_or_init(HttpConfig::default)
}

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(http_config().connect_timeout)
        .pool_max_idle_per_host(8)
        .build()
        .expect("failed to build HTTP client")
});

fn http_client() -> &'static reqwest::Client {
    &SHARED_CLIENT
}

/// Shared tokio runtime for HTTP operations.
static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// A blocking `GET url -> body` primitive.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        (**self).get(url)
    }
}

/// Real network transport backed by the shared pooled client.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpTransport;

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let timeout = http_config().request_timeout;

        SHARED_RUNTIME.handle().block_on(async {
            let request = async {
                let response = http_client()
                    .get(parsed)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| FetchError::from_reqwest(&e))?;
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| FetchError::from_reqwest(&e))?;
                Ok::<_, FetchError>(body.to_vec())
            };

            match tokio::time::timeout(timeout, request).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Io(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("request timeout ({}s)", timeout.as_secs()),
                ))),
            }
        })
    }
}
