use async_trait::async_trait;
use market_core::MarketDataError;
use reqwest::Client;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Raw HTTP response handed back by a transport.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues GET requests on behalf of the client.
///
/// Non-success statuses are returned as responses, not errors. Only failures
/// to obtain a response at all (DNS, connect, timeout, body read) are `Err`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<HttpResponse, MarketDataError>;
}

/// Sliding-window rate limiter: at most `max_requests` per `window` duration.
#[derive(Clone)]
pub struct RateLimiter {
    timestamps: Arc<Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: Arc::new(Mutex::new(VecDeque::new())),
            max_requests: max_requests.max(1),
            window,
        }
    }

    pub async fn acquire(&self) {
        loop {
            let mut ts = self.timestamps.lock().await;
            let now = Instant::now();

            while let Some(&front) = ts.front() {
                if now.duration_since(front) >= self.window {
                    ts.pop_front();
                } else {
                    break;
                }
            }

            if ts.len() < self.max_requests {
                ts.push_back(now);
                return;
            }
            let oldest = ts.front().copied().unwrap_or(now);

            // Wait until the oldest request falls out of the window
            let sleep_dur = (oldest + self.window).saturating_duration_since(now)
                + Duration::from_millis(50);
            drop(ts);
            tracing::debug!(
                "Rate limiter: waiting {:.1}s for Polygon API slot",
                sleep_dur.as_secs_f64()
            );
            tokio::time::sleep(sleep_dur).await;
        }
    }
}

/// Production transport backed by reqwest.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    rate_limiter: Option<RateLimiter>,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration, rate_limit_per_minute: usize) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        let rate_limiter = (rate_limit_per_minute > 0)
            .then(|| RateLimiter::new(rate_limit_per_minute, Duration::from_secs(60)));

        Self { client, rate_limiter }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<HttpResponse, MarketDataError> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.acquire().await;
        }

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| MarketDataError::Transport(e.without_url().to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| MarketDataError::Transport(e.without_url().to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range_is_2xx() {
        let ok = HttpResponse { status: 200, body: String::new() };
        let no_content = HttpResponse { status: 204, body: String::new() };
        let limited = HttpResponse { status: 429, body: String::new() };
        assert!(ok.is_success());
        assert!(no_content.is_success());
        assert!(!limited.is_success());
    }

    #[tokio::test]
    async fn limiter_admits_requests_within_budget() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let started = std::time::Instant::now();
        for _ in 0..3 {
            limiter.acquire().await;
        }
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(limiter.timestamps.lock().await.len(), 3);
    }

    #[tokio::test]
    async fn limiter_waits_for_window_to_clear() {
        let limiter = RateLimiter::new(1, Duration::from_millis(100));
        limiter.acquire().await;
        let started = std::time::Instant::now();
        limiter.acquire().await;
        assert!(started.elapsed() >= Duration::from_millis(100));
    }
}
