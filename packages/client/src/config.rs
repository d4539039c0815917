//! Configuration types for the editing session and the HTTP store.

use std::time::Duration;

/// Tuning knobs for an editing session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Pause inserted between consecutive commit calls, throttling write
    /// contention on the shared store. Zero disables the pause; this is a
    /// scheduling knob, not a correctness requirement.
    pub commit_throttle: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            commit_throttle: Duration::from_millis(150),
        }
    }
}

/// Configuration for [`HttpMenuStore`](crate::http::HttpMenuStore).
///
/// No `Default` impl because the base URL has no sensible default.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Base URL of the admin API, without a trailing slash.
    pub base_url: String,
    /// Maximum time to wait for any single request.
    pub request_timeout: Duration,
}

impl HttpConfig {
    /// Creates a config with the default 30 second request timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            request_timeout: Duration::from_secs(30),
        }
    }
}
