//! Polygon.io market-data client with a synthetic fallback.
//!
//! [`PolygonClient::fetch_bars`] is the single entry point for price bars and
//! never fails: without a key, or when the live request is rate limited,
//! errors, or comes back empty, the bars are generated locally and tagged
//! with the reason.

pub mod client;
pub mod config;
mod models;
pub mod transport;

pub use client::{PolygonClient, DEFAULT_WINDOW_DAYS};
pub use config::{ClientConfig, BASE_URL};
pub use transport::{HttpResponse, RateLimiter, ReqwestTransport, Transport};

use market_core::FetchedBars;

/// One-shot fetch with default settings and the given key.
///
/// Builds a fresh client per call; long-lived callers should keep a
/// [`PolygonClient`] so the rate limiter and connection pool are shared.
pub async fn fetch_bars(ticker: &str, api_key: &str) -> FetchedBars {
    PolygonClient::new(ClientConfig::default().with_api_key(api_key))
        .fetch_bars(ticker)
        .await
}
