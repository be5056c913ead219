/// Shared HTTP plumbing for the market API clients and the Towns bot API
use crate::errors::ApiError;
use crate::logger::{self, LogTag};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};

/// Spacing-based rate limiter: one request in flight, at most N per minute
///
/// With no limit configured, requests are neither spaced nor serialized.
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    /// `max_per_minute == 0` disables limiting
    pub fn new(max_per_minute: usize) -> Self {
        let min_interval = if max_per_minute > 0 {
            Duration::from_secs_f64(60.0 / max_per_minute as f64)
        } else {
            Duration::ZERO
        };

        Self {
            semaphore: Arc::new(Semaphore::new(1)),
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    /// Wait until a request may be sent
    pub async fn acquire(&self) -> Result<RateLimitGuard, String> {
        if self.min_interval.is_zero() {
            return Ok(RateLimitGuard { _permit: None });
        }

        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| format!("Failed to acquire rate limiter permit: {}", e))?;

        let mut last = self.last_request.lock().await;
        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());

        Ok(RateLimitGuard {
            _permit: Some(permit),
        })
    }
}

/// RAII guard returned by [`RateLimiter::acquire`]
pub struct RateLimitGuard {
    _permit: Option<OwnedSemaphorePermit>,
}

/// reqwest client bound to one upstream: timeout, rate limit and JSON decoding
///
/// The timeout covers the whole call, time spent queued in the rate limiter
/// included.
pub struct HttpClient {
    name: &'static str,
    client: Client,
    timeout: Duration,
    rate_limiter: RateLimiter,
    bearer: Option<String>,
}

impl HttpClient {
    pub fn new(
        name: &'static str,
        timeout_secs: u64,
        rate_limit_per_minute: usize,
    ) -> Result<Self, String> {
        if timeout_secs == 0 {
            return Err(format!("{}: timeout must be greater than zero", name));
        }
        Self::with_timeout(name, Duration::from_secs(timeout_secs), rate_limit_per_minute)
    }

    pub(crate) fn with_timeout(
        name: &'static str,
        timeout: Duration,
        rate_limit_per_minute: usize,
    ) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to create HTTP client for {}: {}", name, e))?;

        Ok(Self {
            name,
            client,
            timeout,
            rate_limiter: RateLimiter::new(rate_limit_per_minute),
            bearer: None,
        })
    }

    /// Send `Authorization: Bearer <token>` on every request
    pub fn with_bearer(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_string());
        self
    }

    /// GET `url` and decode a JSON body; non-2xx statuses become `ApiError::HttpStatus`
    pub async fn get_json<T>(&self, url: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        self.bounded("GET", url, async {
            let response = self.send("GET", url, self.client.get(url)).await?;
            response
                .json::<T>()
                .await
                .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", self.name, e)))
        })
        .await
    }

    /// POST `body` as JSON, discarding the response body
    pub async fn post_json<B>(&self, url: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.bounded("POST", url, async {
            self.send("POST", url, self.client.post(url).json(body))
                .await
                .map(|_| ())
        })
        .await
    }

    async fn bounded<T, F>(&self, method: &str, url: &str, call: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                logger::debug(
                    LogTag::Api,
                    &format!(
                        "{} {} {} timed out after {}ms",
                        self.name,
                        method,
                        url,
                        self.timeout.as_millis()
                    ),
                );
                Err(ApiError::Timeout)
            }
        }
    }

    async fn send(
        &self,
        method: &str,
        url: &str,
        request: RequestBuilder,
    ) -> Result<Response, ApiError> {
        let _guard = self
            .rate_limiter
            .acquire()
            .await
            .map_err(ApiError::NetworkError)?;

        let mut request = request.header("Accept", "application/json");
        if let Some(token) = &self.bearer {
            request = request.bearer_auth(token);
        }

        let start = Instant::now();
        let response = request.send().await.map_err(ApiError::from)?;
        let elapsed_ms = start.elapsed().as_millis();

        let status = response.status();
        logger::debug(
            LogTag::Api,
            &format!(
                "{} {} {} -> {} in {}ms",
                self.name, method, url, status, elapsed_ms
            ),
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(response)
    }
}

/// Keep error bodies short enough for log lines
fn truncate_body(body: &str) -> String {
    const MAX_BODY_CHARS: usize = 200;
    if body.chars().count() <= MAX_BODY_CHARS {
        body.to_string()
    } else {
        let truncated: String = body.chars().take(MAX_BODY_CHARS).collect();
        format!("{}…", truncated)
    }
}
