use async_trait::async_trait;
use market_core::{FallbackReason, MarketDataError, DAY_MS};
use polygon_client::{ClientConfig, HttpResponse, PolygonClient, Transport};
use std::sync::Arc;
use std::time::Duration;

/// Serves live bars for one ticker and rate-limits everything else.
struct SplitTransport {
    live_ticker: &'static str,
}

#[async_trait]
impl Transport for SplitTransport {
    async fn get(
        &self,
        url: &str,
        _query: &[(&str, String)],
    ) -> Result<HttpResponse, MarketDataError> {
        if url.contains(&format!("/ticker/{}/", self.live_ticker)) {
            Ok(HttpResponse {
                status: 200,
                body: concat!(
                    r#"{"status":"OK","results":["#,
                    r#"{"t":1,"o":400,"h":401,"l":399,"c":400.5,"v":5000000}"#,
                    r#"]}"#
                )
                .to_string(),
            })
        } else {
            Ok(HttpResponse {
                status: 429,
                body: String::new(),
            })
        }
    }
}

fn client(transport: Arc<dyn Transport>) -> PolygonClient {
    PolygonClient::with_transport(
        ClientConfig::default()
            .with_api_key("key")
            .with_mock_latency(Duration::ZERO),
        transport,
    )
}

#[tokio::test]
async fn primary_and_benchmark_resolve_independently() {
    let client = client(Arc::new(SplitTransport { live_ticker: "SPY" }));

    let (primary, benchmark) = tokio::join!(client.fetch_bars("NVDA"), client.fetch_bars("SPY"));

    assert_eq!(primary.fallback_reason(), Some(&FallbackReason::RateLimited));
    assert_eq!(primary.bars.len(), 100);
    assert!(benchmark.is_live());
    assert_eq!(benchmark.bars.len(), 1);
    assert_eq!(benchmark.bars[0].close, 400.5);
}

#[tokio::test]
async fn synthetic_fallbacks_satisfy_bar_invariants() {
    let client = client(Arc::new(SplitTransport { live_ticker: "SPY" }));

    for _ in 0..5 {
        let bars = client.fetch_bars("QQQ").await.into_bars();
        assert_eq!(bars.len(), 100);
        for pair in bars.windows(2) {
            assert_eq!(pair[1].timestamp - pair[0].timestamp, DAY_MS);
            assert_eq!(pair[1].open, pair[0].close);
        }
        for b in &bars {
            assert!(b.high >= b.open.max(b.close));
            assert!(b.low <= b.open.min(b.close));
            assert!((1_000_000.0..6_000_000.0).contains(&b.volume));
        }
    }
}

#[tokio::test]
async fn keyless_client_paces_synthetic_response() {
    let client = PolygonClient::with_transport(
        ClientConfig::default().with_mock_latency(Duration::from_millis(20)),
        Arc::new(SplitTransport { live_ticker: "SPY" }),
    );

    let started = std::time::Instant::now();
    let fetched = client.fetch_bars("SPY").await;
    assert!(started.elapsed() >= Duration::from_millis(20));
    assert_eq!(fetched.fallback_reason(), Some(&FallbackReason::NoApiKey));
}

#[tokio::test]
async fn one_shot_fetch_without_key_is_synthetic() {
    let fetched = polygon_client::fetch_bars("NVDA", "").await;
    assert_eq!(fetched.bars.len(), 100);
    assert_eq!(fetched.fallback_reason(), Some(&FallbackReason::NoApiKey));
}
