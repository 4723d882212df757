//! Research summaries derived from a bar sequence.
//!
//! These are the figures shown next to a price chart: the trend over the
//! window, the traded range, a benchmark overlay and human-friendly money
//! amounts. All of them are total functions: empty input produces a neutral
//! or `None` result rather than an error.

use crate::Bar;
use serde::{Deserialize, Serialize};

/// Percentage move beyond which a trend counts as "strong".
pub const STRONG_TREND_PCT: f64 = 20.0;

/// Trend classification over a window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TrendLabel {
    StrongBull,
    Bullish,
    Neutral,
    Bearish,
    StrongBear,
}

impl TrendLabel {
    pub fn from_change_pct(pct: f64) -> Self {
        if pct > STRONG_TREND_PCT {
            TrendLabel::StrongBull
        } else if pct > 0.0 {
            TrendLabel::Bullish
        } else if pct < -STRONG_TREND_PCT {
            TrendLabel::StrongBear
        } else {
            TrendLabel::Bearish
        }
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            TrendLabel::StrongBull => "Strong Bull",
            TrendLabel::Bullish => "Bullish",
            TrendLabel::Neutral => "Neutral",
            TrendLabel::Bearish => "Bearish",
            TrendLabel::StrongBear => "Strong Bear",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    /// First-to-last close change in percent.
    pub change_pct: f64,
    pub label: TrendLabel,
}

impl TrendSummary {
    /// Fewer than two bars, or a zero starting close, is reported as neutral.
    pub fn from_bars(bars: &[Bar]) -> Self {
        let neutral = Self {
            change_pct: 0.0,
            label: TrendLabel::Neutral,
        };
        if bars.len() < 2 {
            return neutral;
        }
        let start = bars[0].close;
        let end = bars[bars.len() - 1].close;
        if start.abs() < f64::EPSILON {
            return neutral;
        }
        let change_pct = (end - start) / start * 100.0;
        Self {
            change_pct,
            label: TrendLabel::from_change_pct(change_pct),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub last_close: f64,
    pub low: f64,
    pub high: f64,
}

impl PriceRange {
    pub fn from_bars(bars: &[Bar]) -> Option<Self> {
        let last = bars.last()?;
        let low = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let high = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            last_close: last.close,
            low,
            high,
        })
    }
}

/// Y-axis bounds for a price chart: 2% padding below the lowest low and above
/// the highest high.
pub fn price_domain(bars: &[Bar]) -> Option<(f64, f64)> {
    PriceRange::from_bars(bars).map(|r| (r.low * 0.98, r.high * 1.02))
}

/// A primary bar paired with the benchmark close at the same position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkPoint {
    pub bar: Bar,
    pub benchmark_close: Option<f64>,
}

/// Pair bars by index. Sequences of different lengths leave the tail of the
/// primary series without a benchmark value.
pub fn align_benchmark(primary: &[Bar], benchmark: &[Bar]) -> Vec<BenchmarkPoint> {
    primary
        .iter()
        .enumerate()
        .map(|(i, bar)| BenchmarkPoint {
            bar: bar.clone(),
            benchmark_close: benchmark.get(i).map(|b| b.close),
        })
        .collect()
}

/// Format a money amount the way the research panel shows it: `$1.23T`,
/// `$4.56B`, `$7.89M`, otherwise the full amount with thousands separators.
///
/// Negative amounts are scaled by magnitude and carry the sign ahead of the
/// currency symbol (`-$2.50B`), rather than printing the raw amount
/// (`$-2,500,000,000`) as a plain `>=` threshold check would.
pub fn format_large_number(value: Option<f64>) -> String {
    let Some(num) = value.filter(|v| v.is_finite()) else {
        return "N/A".to_string();
    };

    let sign = if num < 0.0 { "-" } else { "" };
    let abs = num.abs();

    if abs > 1e12 {
        format!("{}${:.2}T", sign, abs / 1e12)
    } else if abs > 1e9 {
        format!("{}${:.2}B", sign, abs / 1e9)
    } else if abs > 1e6 {
        format!("{}${:.2}M", sign, abs / 1e6)
    } else {
        format!("{}${}", sign, group_thousands(abs))
    }
}

fn group_thousands(value: f64) -> String {
    let fixed = format!("{:.3}", value);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if frac.is_empty() {
        grouped
    } else {
        format!("{}.{}", grouped, frac)
    }
}
