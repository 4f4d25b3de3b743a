//! Error type for a single fetch attempt

use std::io;

/// Failure of one GET against the upstream data source.
///
/// Everything except [`FetchError::InvalidUrl`] is transient: the fetcher
/// waits and repeats the request.
#[derive(Debug)]
pub enum FetchError {
    /// URL could not be parsed; repeating the request cannot help
    InvalidUrl { url: String, message: String },
    /// Connection failure or non-success status
    Http {
        status: Option<u16>,
        message: String,
    },
    /// Timeout or failure while reading the body
    Io(io::Error),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUrl { url, message } => write!(f, "invalid URL {url}: {message}"),
            Self::Http {
                status: Some(s),
                message,
            } => write!(f, "HTTP {s}: {message}"),
            Self::Http {
                status: None,
                message,
            } => write!(f, "HTTP error: {message}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<io::Error> for FetchError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl FetchError {
    /// Classify a reqwest error. Timeouts become `Io(TimedOut)`.
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            return Self::Io(io::Error::new(io::ErrorKind::TimedOut, e.to_string()));
        }
        Self::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidUrl { .. })
    }

    /// Short failure category for retry log lines.
    pub fn category(&self) -> String {
        match self {
            Self::InvalidUrl { .. } => "invalid url".to_string(),
            Self::Http {
                status: Some(s), ..
            } => format!("http {s}"),
            Self::Http { status: None, .. } => "connect".to_string(),
            Self::Io(e) if e.kind() == io::ErrorKind::TimedOut => "timeout".to_string(),
            Self::Io(_) => "io".to_string(),
        }
    }
}
