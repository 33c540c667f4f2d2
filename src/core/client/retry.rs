use crate::core::IrError;

/// Backoff schedule between retry attempts.
#[derive(Clone, Debug)]
pub enum Backoff {
    /// The same delay before every retry.
    Fixed(std::time::Duration),
    /// `base * factor^attempt`, capped at `max`, with optional ±50% jitter.
    Exponential {
        base: std::time::Duration,
        factor: f64,
        max: std::time::Duration,
        jitter: bool,
    },
}

/// Retry policy for screener and quote requests.
///
/// `max_retries` counts retries, so a request makes at most
/// `max_retries + 1` attempts.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    pub enabled: bool,
    pub max_retries: u32,
    pub backoff: Backoff,
    /// Status codes retried in addition to transport errors.
    pub retry_on_status: Vec<u16>,
    pub retry_on_timeout: bool,
    pub retry_on_connect: bool,
}

impl Default for RetryConfig {
    /// Four retries with jittered exponential backoff (200 ms base, 3 s cap),
    /// on the usual transient statuses plus timeouts and connect errors.
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 4,
            backoff: Backoff::Exponential {
                base: std::time::Duration::from_millis(200),
                factor: 2.0,
                max: std::time::Duration::from_secs(3),
                jitter: true,
            },
            retry_on_status: vec![408, 429, 500, 502, 503, 504],
            retry_on_timeout: true,
            retry_on_connect: true,
        }
    }
}

/// How one call interacts with the client's response cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheMode {
    /// Serve from cache when a fresh entry exists, otherwise fetch and store.
    /// (Default)
    Use,
    /// Fetch from the network and overwrite the cached entry.
    Refresh,
    /// Fetch from the network without touching the cache at all.
    Bypass,
}

fn backoff_delay(backoff: &Backoff, attempt: u32) -> std::time::Duration {
    match backoff {
        Backoff::Fixed(d) => *d,
        Backoff::Exponential {
            base,
            factor,
            max,
            jitter,
        } => {
            let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
            let mut secs = base.as_secs_f64() * factor.powi(exp);
            secs = secs.min(max.as_secs_f64());
            if *jitter {
                use rand::Rng;
                secs *= rand::thread_rng().gen_range(0.5..=1.5);
                secs = secs.min(max.as_secs_f64());
            }
            std::time::Duration::from_secs_f64(secs.max(0.0))
        }
    }
}

impl super::IrClient {
    /// Send a request, retrying on transient failures per the retry policy.
    ///
    /// A response with a retryable status (e.g. 429 or 5xx) is retried until the
    /// budget runs out; the final response is returned as-is so callers can map
    /// its status themselves. Transport errors are retried only for the error
    /// classes the policy enables, and surface as [`IrError::Http`] once the
    /// budget is spent.
    pub(crate) async fn send_with_retry(
        &self,
        req: reqwest::RequestBuilder,
        retry_override: Option<&RetryConfig>,
    ) -> Result<reqwest::Response, IrError> {
        let cfg = retry_override.unwrap_or_else(|| self.retry_config());

        let mut attempt: u32 = 0;
        loop {
            let this_try = req
                .try_clone()
                .ok_or_else(|| IrError::Data("request body is not clonable for retry".into()))?;

            match this_try.send().await {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    let retryable = cfg.enabled
                        && attempt < cfg.max_retries
                        && cfg.retry_on_status.contains(&status);
                    if !retryable {
                        return Ok(resp);
                    }
                    tracing::debug!(status, attempt, url = %resp.url(), "retrying after status");
                }
                Err(err) => {
                    let transient = (err.is_timeout() && cfg.retry_on_timeout)
                        || (err.is_connect() && cfg.retry_on_connect);
                    if !(cfg.enabled && attempt < cfg.max_retries && transient) {
                        return Err(err.into());
                    }
                    tracing::debug!(attempt, error = %err, "retrying after transport error");
                }
            }

            tokio::time::sleep(backoff_delay(&cfg.backoff, attempt)).await;
            attempt += 1;
        }
    }
}
