//! Synthetic daily OHLCV bars for when live market data is unavailable.
//!
//! The generator runs a path-dependent random walk: each bar opens at the
//! previous bar's close and moves by at most half of a volatility budget that
//! scales with the current price. The shape of the output is fixed (length,
//! one-day spacing, wick containment, volume bounds); the values are not.

use chrono::Utc;
use market_core::{Bar, DAY_MS};
use rand::Rng;
use std::time::Duration;

/// Number of bars produced when the caller has no preference.
pub const DEFAULT_BAR_COUNT: usize = 100;

/// Lowest price the walk may print.
pub const PRICE_FLOOR: f64 = 0.01;

#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    /// Price the walk starts from.
    pub base_price: f64,
    /// Per-bar volatility budget as a fraction of the current price.
    pub volatility_ratio: f64,
    /// Maximum wick extension as a fraction of the volatility budget.
    pub wick_ratio: f64,
    /// Inclusive lower bound on volume.
    pub volume_min: u64,
    /// Exclusive upper bound on volume.
    pub volume_max: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            base_price: 450.0,
            volatility_ratio: 0.015,
            wick_ratio: 0.5,
            volume_min: 1_000_000,
            volume_max: 6_000_000,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BarGenerator {
    config: SyntheticConfig,
}

impl BarGenerator {
    pub fn new(config: SyntheticConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SyntheticConfig {
        &self.config
    }

    /// Generate `count` bars ending one day before now, using the thread RNG.
    pub fn generate(&self, count: usize) -> Vec<Bar> {
        let now_ms = Utc::now().timestamp_millis();
        self.generate_with_rng(count, now_ms, &mut rand::thread_rng())
    }

    /// Generate `count` bars oldest-first with an explicit clock and RNG.
    ///
    /// The bar `k` days before `now_ms` (k = count..=1) is stamped
    /// `now_ms - k * DAY_MS`, so the newest bar is exactly one day old.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        count: usize,
        now_ms: i64,
        rng: &mut R,
    ) -> Vec<Bar> {
        let cfg = &self.config;
        let mut bars = Vec::with_capacity(count);
        let mut price = cfg.base_price.max(PRICE_FLOOR);

        for k in (1..=count as i64).rev() {
            let volatility = price * cfg.volatility_ratio;
            let change = (rng.gen::<f64>() - 0.5) * volatility;

            let open = price;
            let close = (open + change).max(PRICE_FLOOR);
            let high = open.max(close) + rng.gen::<f64>() * cfg.wick_ratio * volatility;
            let low = (open.min(close) - rng.gen::<f64>() * cfg.wick_ratio * volatility)
                .max(PRICE_FLOOR);

            let volume = if cfg.volume_max > cfg.volume_min {
                rng.gen_range(cfg.volume_min..cfg.volume_max)
            } else {
                cfg.volume_min
            };

            bars.push(Bar {
                timestamp: now_ms - k * DAY_MS,
                open: round_cents(open),
                high: round_cents(high),
                low: round_cents(low),
                close: round_cents(close),
                volume: volume as f64,
                vwap: None,
                transactions: None,
            });

            // Carry the unrounded close so the next open rounds to the same cents.
            price = close;
        }

        tracing::debug!(
            "Generated {} synthetic bars (last close {:.2})",
            bars.len(),
            price
        );
        bars
    }
}

/// Generate `count` synthetic bars with the default configuration.
pub fn generate(count: usize) -> Vec<Bar> {
    BarGenerator::default().generate(count)
}

/// Default configuration with a caller-supplied clock and RNG.
pub fn generate_with_rng<R: Rng + ?Sized>(count: usize, now_ms: i64, rng: &mut R) -> Vec<Bar> {
    BarGenerator::default().generate_with_rng(count, now_ms, rng)
}

/// Generate after `delay`, pacing synthetic responses like a network call.
pub async fn generate_delayed(count: usize, delay: Duration) -> Vec<Bar> {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    generate(count)
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
