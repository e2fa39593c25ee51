//! URL availability probing with retry and backoff.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::Result;

/// HTTP method used while probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMethod {
    Head,
    Get,
}

/// HTTP collaborator used by the prober.
///
/// Returns the response status code; transport-level failures surface as
/// errors and are treated as retryable by the prober.
pub trait HttpProbe: Send + Sync {
    fn request(
        &self,
        url: &str,
        method: ProbeMethod,
    ) -> impl Future<Output = Result<u16>> + Send;
}

/// Delay collaborator used between retry attempts.
pub trait Delay: Send + Sync {
    fn wait(&self, ms: u64) -> impl Future<Output = ()> + Send;
}

/// Tokio-backed delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

impl Delay for TokioDelay {
    async fn wait(&self, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

/// Options governing a single probe call.
#[derive(Debug, Clone, Copy)]
pub struct ProbeOptions {
    /// Retry budget for transient failures
    pub retries: u32,
    /// Initial backoff delay in milliseconds
    pub backoff_ms: u64,
    /// Whether 403/405 responses trigger a GET re-check
    pub allow_get_fallback: bool,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            retries: 2,
            backoff_ms: 300,
            allow_get_fallback: true,
        }
    }
}

/// Whether a status warrants a retry: network-level failure (0), server
/// errors, or rate limiting.
pub fn should_retry_status(status: u16) -> bool {
    status == 0 || status >= 500 || status == 429
}

/// Remaining retry budget plus the growing backoff delay.
///
/// The delay multiplies by 1.5 on every consumed retry, so a budget of two
/// with a 300ms base waits 300ms then 450ms.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Attempt {
    remaining: u32,
    delay_ms: f64,
}

impl Attempt {
    fn new(options: &ProbeOptions) -> Self {
        Self {
            remaining: options.retries,
            delay_ms: options.backoff_ms as f64,
        }
    }

    /// Consume one retry, yielding the pause to take and the next state.
    /// `None` once the budget is exhausted.
    fn backoff(self) -> Option<(u64, Attempt)> {
        if self.remaining == 0 {
            return None;
        }
        let pause = self.delay_ms.round() as u64;
        Some((
            pause,
            Attempt {
                remaining: self.remaining - 1,
                delay_ms: self.delay_ms * 1.5,
            },
        ))
    }
}

/// Probes single URLs for availability.
pub struct UrlProber<C, D> {
    http: C,
    delay: D,
    options: ProbeOptions,
}

impl<C: HttpProbe, D: Delay> UrlProber<C, D> {
    /// Create a prober with default options.
    pub fn new(http: C, delay: D) -> Self {
        Self {
            http,
            delay,
            options: ProbeOptions::default(),
        }
    }

    /// Replace the probe options.
    pub fn with_options(mut self, options: ProbeOptions) -> Self {
        self.options = options;
        self
    }

    /// Check a single URL via HEAD, with GET fallback on 403/405 and
    /// bounded exponential backoff on transient failures.
    ///
    /// Probing failure is an expected outcome: transport errors are
    /// absorbed into the retry policy and the final answer is a plain
    /// `bool`, never an error.
    pub async fn probe(&self, url: &str) -> bool {
        let mut attempt = Attempt::new(&self.options);

        loop {
            let last_status = match self.http.request(url, ProbeMethod::Head).await {
                Ok(status) if is_ok(status) => return true,
                Ok(status) => {
                    if self.options.allow_get_fallback && (status == 405 || status == 403) {
                        match self.http.request(url, ProbeMethod::Get).await {
                            Ok(get_status) if is_ok(get_status) => return true,
                            Ok(get_status) => get_status,
                            // Treat a failed GET like a network-level status
                            Err(_) => 0,
                        }
                    } else {
                        status
                    }
                }
                Err(err) => {
                    debug!(url, error = %err, "probe request failed");
                    0
                }
            };

            if should_retry_status(last_status) {
                if let Some((pause, next)) = attempt.backoff() {
                    debug!(url, status = last_status, pause_ms = pause, "probe retrying");
                    self.delay.wait(pause).await;
                    attempt = next;
                    continue;
                }
            }

            debug!(url, status = last_status, "probe failed");
            return false;
        }
    }
}

fn is_ok(status: u16) -> bool {
    (200..300).contains(&status)
}

/// reqwest-backed HTTP collaborator.
#[derive(Clone)]
pub struct ReqwestProbe {
    client: reqwest::Client,
}

impl ReqwestProbe {
    /// Build a client with connection pooling and sane timeouts.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(8)
            .user_agent(format!("dynload/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl HttpProbe for ReqwestProbe {
    async fn request(&self, url: &str, method: ProbeMethod) -> Result<u16> {
        let request = match method {
            ProbeMethod::Head => self.client.head(url),
            ProbeMethod::Get => self.client.get(url),
        };
        let response = request.header("Cache-Control", "no-store").send().await?;
        Ok(response.status().as_u16())
    }
}
