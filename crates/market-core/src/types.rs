use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One calendar day in milliseconds.
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// OHLCV bar data.
///
/// Field names on the wire follow the Polygon aggregates shape (`t`, `o`, `h`,
/// `l`, `c`, `v`) so live results deserialize straight into this type and are
/// handed back to callers untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Milliseconds since the Unix epoch.
    #[serde(rename = "t")]
    pub timestamp: i64,
    #[serde(rename = "o")]
    pub open: f64,
    #[serde(rename = "h")]
    pub high: f64,
    #[serde(rename = "l")]
    pub low: f64,
    #[serde(rename = "c")]
    pub close: f64,
    #[serde(rename = "v")]
    pub volume: f64,
    #[serde(rename = "vw", default, skip_serializing_if = "Option::is_none")]
    pub vwap: Option<f64>,
    #[serde(rename = "n", default, skip_serializing_if = "Option::is_none")]
    pub transactions: Option<u64>,
}

impl Bar {
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    /// True when the bar closed at or above its open.
    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }
}

/// Why a request was served from the synthetic generator instead of the live API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cause", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    NoApiKey,
    RateLimited,
    ErrorStatus(u16),
    EmptyResults,
    MalformedResponse(String),
    /// The trailing window reaches past the representable calendar.
    InvalidWindow(u32),
    Transport(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NoApiKey => write!(f, "no API key configured"),
            FallbackReason::RateLimited => write!(f, "rate limited"),
            FallbackReason::ErrorStatus(code) => write!(f, "HTTP {}", code),
            FallbackReason::EmptyResults => write!(f, "empty result set"),
            FallbackReason::MalformedResponse(e) => write!(f, "malformed response: {}", e),
            FallbackReason::InvalidWindow(days) => write!(f, "invalid window of {} days", days),
            FallbackReason::Transport(e) => write!(f, "transport error: {}", e),
        }
    }
}

/// Provenance of a bar sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum DataSource {
    Live,
    Synthetic(FallbackReason),
}

impl DataSource {
    pub fn is_live(&self) -> bool {
        matches!(self, DataSource::Live)
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            DataSource::Live => "live",
            DataSource::Synthetic(_) => "synthetic",
        }
    }
}

/// Bars returned by a fetch, tagged with where they came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedBars {
    pub bars: Vec<Bar>,
    pub source: DataSource,
}

impl FetchedBars {
    pub fn live(bars: Vec<Bar>) -> Self {
        Self {
            bars,
            source: DataSource::Live,
        }
    }

    pub fn synthetic(bars: Vec<Bar>, reason: FallbackReason) -> Self {
        Self {
            bars,
            source: DataSource::Synthetic(reason),
        }
    }

    pub fn is_live(&self) -> bool {
        self.source.is_live()
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match &self.source {
            DataSource::Live => None,
            DataSource::Synthetic(reason) => Some(reason),
        }
    }

    /// Drop the provenance tag and keep the plain sequence.
    pub fn into_bars(self) -> Vec<Bar> {
        self.bars
    }
}

/// Company reference data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyDetails {
    pub ticker: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sic_description: Option<String>,
    #[serde(default)]
    pub homepage_url: Option<String>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub currency_name: Option<String>,
    #[serde(default)]
    pub branding: Option<Branding>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branding {
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
}

/// Most recent reported financial statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialReport {
    pub symbol: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub filing_date: Option<String>,
    pub fiscal_period: Option<String>,
    pub fiscal_year: Option<String>,
    pub revenue: Option<f64>,
    pub net_income: Option<f64>,
    pub gross_profit: Option<f64>,
    pub operating_expenses: Option<f64>,
    pub total_assets: Option<f64>,
    pub total_liabilities: Option<f64>,
    pub shareholders_equity: Option<f64>,
    pub net_cash_flow: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_uses_polygon_wire_names() {
        let json = r#"{"t":1700000000000,"o":10.0,"h":11.0,"l":9.0,"c":10.5,
                       "v":1000,"vw":10.2,"n":42}"#;
        let bar: Bar = serde_json::from_str(json).unwrap();
        assert_eq!(bar.timestamp, 1_700_000_000_000);
        assert_eq!(bar.close, 10.5);
        assert_eq!(bar.volume, 1000.0);
        assert_eq!(bar.vwap, Some(10.2));
        assert_eq!(bar.transactions, Some(42));
        assert!(bar.is_up());
        assert!(bar.datetime().is_some());
    }

    #[test]
    fn optional_fields_are_omitted_when_absent() {
        let bar = Bar {
            timestamp: 1,
            open: 10.0,
            high: 11.0,
            low: 9.0,
            close: 9.5,
            volume: 1000.0,
            vwap: None,
            transactions: None,
        };
        let value = serde_json::to_value(&bar).unwrap();
        assert!(value.get("vw").is_none());
        assert!(value.get("n").is_none());
        assert!(!bar.is_up());
    }

    #[test]
    fn fetched_bars_exposes_provenance() {
        let live = FetchedBars::live(Vec::new());
        assert!(live.is_live());
        assert!(live.fallback_reason().is_none());

        let synthetic = FetchedBars::synthetic(Vec::new(), FallbackReason::RateLimited);
        assert!(!synthetic.is_live());
        assert_eq!(synthetic.fallback_reason(), Some(&FallbackReason::RateLimited));
        assert_eq!(synthetic.source.to_label(), "synthetic");
    }

    #[test]
    fn data_source_serializes_with_reason() {
        let source = DataSource::Synthetic(FallbackReason::ErrorStatus(503));
        let value = serde_json::to_value(&source).unwrap();
        assert_eq!(value["kind"], "synthetic");
        assert_eq!(value["reason"]["cause"], "error_status");
        assert_eq!(value["reason"]["detail"], 503);
    }
}
