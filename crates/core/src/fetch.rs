//! Page fetching with bounded retry.
//!
//! [`Fetcher::fetch`] performs a GET through a [`Transport`], retrying transport
//! errors and non-success statuses up to `max_retries` attempts with exponential
//! backoff (`base * 2^attempt`, zero-indexed, so 1 s then 2 s with the default
//! base). Exhausted retries come back as a [`FetchFailure`] value for the caller
//! to judge. `file://` URLs are read from disk without retry.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::FetchConfig;
use crate::{HeadlinerError, Result};

/// One GET request, no retry.
pub trait Transport {
    fn get(&self, url: &str) -> Result<String>;
}

/// Blocking reqwest client carrying the configured headers and timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    timeout_secs: u64,
}

impl HttpTransport {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| HeadlinerError::config(format!("invalid header name '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| HeadlinerError::config(format!("invalid header value: {}", e)))?;
            headers.insert(name, value);
        }

        let client = Client::builder().default_headers(headers).timeout(config.timeout()).build()?;

        Ok(Self { client, timeout_secs: config.timeout_secs })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() { HeadlinerError::Timeout { timeout: self.timeout_secs } } else { HeadlinerError::Http(e) }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HeadlinerError::HttpStatus { status: status.as_u16(), url: url.to_string() });
        }

        Ok(response.text()?)
    }
}

/// Blocking wait between attempts.
pub trait Sleep {
    fn sleep(&self, duration: Duration);
}

/// Sleeps the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl Sleep for ThreadSleep {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// A fetch that did not produce markup after every allowed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub url: String,
    pub attempts: u32,
    /// Detail of the last error seen.
    pub last_error: String,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to fetch {} after {} attempt(s): {}", self.url, self.attempts, self.last_error)
    }
}

impl std::error::Error for FetchFailure {}

/// Retrying page fetcher.
#[derive(Debug, Clone)]
pub struct Fetcher<T = HttpTransport, S = ThreadSleep> {
    transport: T,
    sleeper: S,
    max_retries: u32,
    backoff_base: Duration,
}

impl Fetcher {
    /// Fetcher over HTTP that sleeps the current thread between attempts.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new(config)?, ThreadSleep, config))
    }
}

impl<T: Transport, S: Sleep> Fetcher<T, S> {
    pub fn with_transport(transport: T, sleeper: S, config: &FetchConfig) -> Self {
        Self { transport, sleeper, max_retries: config.max_retries.max(1), backoff_base: config.backoff_base() }
    }

    /// Wait before retrying after the zero-indexed attempt `attempt_index`.
    pub fn backoff_delay(&self, attempt_index: u32) -> Duration {
        self.backoff_base.saturating_mul(2u32.saturating_pow(attempt_index))
    }

    /// Fetch `url`, retrying with backoff. Every attempt is logged.
    pub fn fetch(&self, url: &str) -> std::result::Result<String, FetchFailure> {
        if url.starts_with("file://") {
            return fetch_file_url(url)
                .map_err(|e| FetchFailure { url: url.to_string(), attempts: 1, last_error: e.to_string() });
        }

        let mut last_error = String::new();
        for attempt in 0..self.max_retries {
            let number = attempt + 1;
            debug!(attempt = number, max = self.max_retries, %url, "Fetching page");

            match self.transport.get(url) {
                Ok(body) => {
                    info!(attempt = number, bytes = body.len(), %url, "Fetched page");
                    return Ok(body);
                }
                Err(e) => {
                    error!(attempt = number, max = self.max_retries, %url, error = %e, "Fetch attempt failed");
                    last_error = e.to_string();

                    if number < self.max_retries {
                        let delay = self.backoff_delay(attempt);
                        warn!(?delay, %url, "Backing off before retry");
                        self.sleeper.sleep(delay);
                    }
                }
            }
        }

        error!(%url, attempts = self.max_retries, "Failed to fetch after all attempts");
        Err(FetchFailure { url: url.to_string(), attempts: self.max_retries, last_error })
    }
}

/// Read a `file://` URL from disk.
fn fetch_file_url(url: &str) -> Result<String> {
    let path = Url::parse(url)
        .ok()
        .and_then(|u| u.to_file_path().ok())
        .ok_or_else(|| HeadlinerError::InvalidUrl(url.to_string()))?;
    fetch_file(path)
}

/// Read a local markup file.
pub fn fetch_file(path: PathBuf) -> Result<String> {
    if !path.exists() { Err(HeadlinerError::FileNotFound(path)) } else { fs::read_to_string(&path).map_err(HeadlinerError::from) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays a scripted sequence of responses.
    struct ScriptedTransport {
        responses: RefCell<VecDeque<Result<String>>>,
        calls: RefCell<u32>,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<Result<String>>) -> Self {
            Self { responses: RefCell::new(responses.into()), calls: RefCell::new(0) }
        }
    }

    impl Transport for ScriptedTransport {
        fn get(&self, url: &str) -> Result<String> {
            *self.calls.borrow_mut() += 1;
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(HeadlinerError::HttpStatus { status: 500, url: url.to_string() }))
        }
    }

    #[derive(Default)]
    struct RecordingSleep {
        waits: RefCell<Vec<Duration>>,
    }

    impl Sleep for &RecordingSleep {
        fn sleep(&self, duration: Duration) {
            self.waits.borrow_mut().push(duration);
        }
    }

    fn server_error() -> Result<String> {
        Err(HeadlinerError::HttpStatus { status: 503, url: "https://example.com".to_string() })
    }

    #[test]
    fn test_fails_twice_then_succeeds() {
        let transport = ScriptedTransport::new(vec![server_error(), server_error(), Ok("<html>ok</html>".to_string())]);
        let sleep = RecordingSleep::default();
        let fetcher = Fetcher::with_transport(transport, &sleep, &FetchConfig::default());

        let body = fetcher.fetch("https://example.com").unwrap();
        assert_eq!(body, "<html>ok</html>");
        assert_eq!(*sleep.waits.borrow(), vec![Duration::from_secs(1), Duration::from_secs(2)]);
        assert_eq!(*fetcher.transport.calls.borrow(), 3);
    }

    #[test]
    fn test_exhausted_retries_return_failure() {
        let transport = ScriptedTransport::new(vec![server_error(), server_error(), server_error(), Ok("late".into())]);
        let sleep = RecordingSleep::default();
        let fetcher = Fetcher::with_transport(transport, &sleep, &FetchConfig::default());

        let failure = fetcher.fetch("https://example.com").unwrap_err();
        assert_eq!(failure.attempts, 3);
        assert!(failure.last_error.contains("503"));
        assert_eq!(sleep.waits.borrow().len(), 2);
        assert_eq!(*fetcher.transport.calls.borrow(), 3);
    }

    #[test]
    fn test_first_attempt_success_does_not_sleep() {
        let transport = ScriptedTransport::new(vec![Ok("body".into())]);
        let sleep = RecordingSleep::default();
        let fetcher = Fetcher::with_transport(transport, &sleep, &FetchConfig::default());

        assert_eq!(fetcher.fetch("https://example.com").unwrap(), "body");
        assert!(sleep.waits.borrow().is_empty());
    }

    #[test]
    fn test_backoff_delay_doubles() {
        let sleep = RecordingSleep::default();
        let config = FetchConfig { backoff_base_ms: 250, ..Default::default() };
        let fetcher = Fetcher::with_transport(ScriptedTransport::new(vec![]), &sleep, &config);

        assert_eq!(fetcher.backoff_delay(0), Duration::from_millis(250));
        assert_eq!(fetcher.backoff_delay(1), Duration::from_millis(500));
        assert_eq!(fetcher.backoff_delay(3), Duration::from_millis(2000));
    }

    #[test]
    fn test_file_url_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listing.html");
        fs::write(&path, "<html>local</html>").unwrap();
        let url = Url::from_file_path(&path).unwrap();

        let sleep = RecordingSleep::default();
        let fetcher = Fetcher::with_transport(ScriptedTransport::new(vec![]), &sleep, &FetchConfig::default());
        assert_eq!(fetcher.fetch(url.as_str()).unwrap(), "<html>local</html>");
        assert_eq!(*fetcher.transport.calls.borrow(), 0);
    }

    #[test]
    fn test_missing_file_url_fails_once() {
        let sleep = RecordingSleep::default();
        let fetcher = Fetcher::with_transport(ScriptedTransport::new(vec![]), &sleep, &FetchConfig::default());
        let failure = fetcher.fetch("file:///nonexistent/listing.html").unwrap_err();
        assert_eq!(failure.attempts, 1);
        assert!(failure.last_error.contains("not found"));
    }

    #[test]
    fn test_fetch_failure_display() {
        let failure = FetchFailure { url: "https://example.com".into(), attempts: 3, last_error: "boom".into() };
        let text = failure.to_string();
        assert!(text.contains("3 attempt"));
        assert!(text.contains("boom"));
    }

    #[test]
    fn test_http_transport_rejects_bad_header() {
        let mut config = FetchConfig::default();
        config.headers.insert("Bad Header".into(), "x".into());
        assert!(HttpTransport::new(&config).is_err());
    }
}
