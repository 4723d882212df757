use market_core::MarketDataError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const BASE_URL: &str = "https://api.polygon.io";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Polygon API key. Absent or empty means every bar request is synthetic.
    pub api_key: Option<String>,
    pub base_url: String,
    /// Client-side requests per minute. 0 disables the limiter. At 5 req/min
    /// a run that needs more than five requests waits for the next slot.
    pub rate_limit_per_minute: usize,
    pub timeout: Duration,
    /// Delay before answering a keyless bar request with synthetic data.
    pub mock_latency: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: BASE_URL.to_string(),
            // Paid-tier ceiling. Free-tier keys need POLYGON_RATE_LIMIT=5.
            rate_limit_per_minute: 500,
            timeout: Duration::from_secs(30),
            mock_latency: Duration::from_millis(500),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, MarketDataError> {
        let defaults = Self::default();
        Ok(Self {
            api_key: env::var("POLYGON_API_KEY").ok(),
            base_url: env::var("POLYGON_BASE_URL").unwrap_or(defaults.base_url),
            rate_limit_per_minute: parse_value(
                "POLYGON_RATE_LIMIT",
                env::var("POLYGON_RATE_LIMIT").ok(),
                defaults.rate_limit_per_minute,
            )?,
            timeout: Duration::from_secs(parse_value(
                "POLYGON_TIMEOUT_SECS",
                env::var("POLYGON_TIMEOUT_SECS").ok(),
                defaults.timeout.as_secs(),
            )?),
            mock_latency: Duration::from_millis(parse_value(
                "MOCK_LATENCY_MS",
                env::var("MOCK_LATENCY_MS").ok(),
                defaults.mock_latency.as_millis() as u64,
            )?),
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_mock_latency(mut self, latency: Duration) -> Self {
        self.mock_latency = latency;
        self
    }

    /// The key, if it is usable. Only emptiness is checked.
    pub fn usable_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

fn parse_value<T: FromStr>(
    name: &str,
    raw: Option<String>,
    default: T,
) -> Result<T, MarketDataError>
where
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|e| MarketDataError::Config(format!("{}={:?}: {}", name, v, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values_use_defaults() {
        assert_eq!(parse_value("X", None, 5usize).unwrap(), 5);
        assert_eq!(parse_value("X", Some(" 12 ".into()), 5usize).unwrap(), 12);
    }

    #[test]
    fn invalid_numbers_are_config_errors() {
        let err = parse_value("POLYGON_RATE_LIMIT", Some("fast".into()), 5usize).unwrap_err();
        assert!(matches!(err, MarketDataError::Config(_)));
        assert!(err.to_string().contains("POLYGON_RATE_LIMIT"));
    }

    #[test]
    fn default_rate_limit_does_not_throttle_a_cli_run() {
        let config = ClientConfig::default();
        assert_eq!(config.rate_limit_per_minute, 500);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.mock_latency, Duration::from_millis(500));
    }

    #[test]
    fn blank_key_is_not_usable() {
        let config = ClientConfig::default();
        assert!(config.usable_api_key().is_none());
        assert!(config.clone().with_api_key("").usable_api_key().is_none());
        assert!(config.clone().with_api_key("   ").usable_api_key().is_none());
        assert_eq!(config.with_api_key("abc").usable_api_key(), Some("abc"));
    }
}
