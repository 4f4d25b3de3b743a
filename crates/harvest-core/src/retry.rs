//! Wait-and-retry fetching.
//!
//! A failed request is repeated after a constant delay. By default there is
//! no attempt ceiling: an unattended batch run waits out upstream outages
//! rather than abandoning a partition.

use std::time::Duration;

use crate::error::FetchError;
use crate::http::{HttpConfig, Transport, http_config};

/// How long to wait between attempts and how many retries to allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay: Duration,
    /// `None` = unbounded
    pub max_retries: Option<u32>,
}

impl RetryPolicy {
    pub fn from_config(cfg: &HttpConfig) -> Self {
        Self {
            delay: cfg.retry_delay,
            max_retries: cfg.max_retries,
        }
    }

    /// Retry forever with a fixed delay.
    pub const fn unbounded(delay: Duration) -> Self {
        Self {
            delay,
            max_retries: None,
        }
    }

    /// Whether another attempt is permitted after `retries` retries.
    fn allows(&self, retries: u32) -> bool {
        self.max_retries.is_none_or(|max| retries < max)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(http_config())
    }
}

/// A [`Transport`] wrapped with a [`RetryPolicy`].
pub struct Fetcher<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// GET `url`, retrying transient failures per the policy.
    ///
    /// `tag` prefixes the retry log lines. Blocks only the calling thread
    /// while waiting. Returns an error only for non-retryable failures or
    /// once a configured ceiling is exhausted.
    pub fn fetch(&self, url: &str, tag: &str) -> Result<Vec<u8>, FetchError> {
        let mut retries = 0u32;
        loop {
            match self.transport.get(url) {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && self.policy.allows(retries) => {
                    retries += 1;
                    log::warn!("[{tag}] {}: {e}", e.category());
                    log::warn!(
                        "[{tag}] could not load {url}, sleeping {}s before retry #{retries}...",
                        self.policy.delay.as_secs()
                    );
                    std::thread::sleep(self.policy.delay);
                }
                Err(e) => {
                    log::error!("[{tag}] giving up on {url} after {retries} retries: {e}");
                    return Err(e);
                }
            }
        }
    }
}
