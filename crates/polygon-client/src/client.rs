use crate::config::ClientConfig;
use crate::models::{
    is_ok_status, line_item, AggregateResponse, FinancialsResponse, TickerDetailsResponse,
};
use crate::transport::{ReqwestTransport, Transport};
use chrono::{Duration as ChronoDuration, Utc};
use market_core::{
    Bar, CompanyDetails, FallbackReason, FetchedBars, FinancialReport, MarketDataError,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use synthetic_data::{BarGenerator, DEFAULT_BAR_COUNT};

/// Trailing window requested when the caller does not pick one.
pub const DEFAULT_WINDOW_DAYS: u32 = 90;

/// Upper bound on aggregates returned by a single request.
const AGGREGATES_LIMIT: u32 = 5000;

#[derive(Clone)]
pub struct PolygonClient {
    api_key: Option<String>,
    base_url: String,
    mock_latency: Duration,
    transport: Arc<dyn Transport>,
    generator: BarGenerator,
}

impl PolygonClient {
    pub fn new(config: ClientConfig) -> Self {
        let transport = Arc::new(ReqwestTransport::new(
            config.timeout,
            config.rate_limit_per_minute,
        ));
        Self::with_transport(config, transport)
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            api_key: config.usable_api_key().map(str::to_string),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            mock_latency: config.mock_latency,
            transport,
            generator: BarGenerator::default(),
        }
    }

    /// Replace the generator used for synthetic fallbacks.
    pub fn with_generator(mut self, generator: BarGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Daily bars for the default 90-day window. Never fails: any problem with
    /// the live source yields synthetic bars tagged with the reason.
    pub async fn fetch_bars(&self, ticker: &str) -> FetchedBars {
        self.fetch_bars_window(ticker, DEFAULT_WINDOW_DAYS).await
    }

    pub async fn fetch_bars_window(&self, ticker: &str, window_days: u32) -> FetchedBars {
        let Some(api_key) = self.api_key.as_deref() else {
            if !self.mock_latency.is_zero() {
                tokio::time::sleep(self.mock_latency).await;
            }
            return self.fallback(ticker, FallbackReason::NoApiKey);
        };

        match self.get_aggregates(ticker, window_days, api_key).await {
            Ok(bars) => {
                tracing::debug!("{}: {} live bars", ticker, bars.len());
                FetchedBars::live(bars)
            }
            Err(reason) => self.fallback(ticker, reason),
        }
    }

    /// Company reference data, or `None` when unavailable for any reason.
    pub async fn fetch_company_details(&self, ticker: &str) -> Option<CompanyDetails> {
        let api_key = self.api_key.as_deref()?;
        let url = format!(
            "{}/v3/reference/tickers/{}",
            self.base_url,
            ticker.to_uppercase()
        );

        let response: TickerDetailsResponse = match self
            .get_json(&url, &[("apiKey", api_key.to_string())])
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Ticker details for {} unavailable: {}", ticker, e);
                return None;
            }
        };

        if !is_ok_status(&response.status) {
            tracing::info!(
                "Ticker details for {} returned status {:?}, skipping",
                ticker,
                response.status
            );
            return None;
        }
        response.results
    }

    /// Latest financial report, or `None` when unavailable for any reason.
    pub async fn fetch_financials(&self, ticker: &str) -> Option<FinancialReport> {
        let api_key = self.api_key.as_deref()?;
        let symbol = ticker.to_uppercase();
        let url = format!("{}/vX/reference/financials", self.base_url);

        let response: FinancialsResponse = match self
            .get_json(
                &url,
                &[
                    ("ticker", symbol.clone()),
                    ("limit", "1".to_string()),
                    ("apiKey", api_key.to_string()),
                ],
            )
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Financials for {} unavailable: {}", ticker, e);
                return None;
            }
        };

        if !is_ok_status(&response.status) {
            return None;
        }

        response.results.into_iter().next().map(|r| {
            let income = r.financials.income_statement;
            let balance = r.financials.balance_sheet;
            let cash_flow = r.financials.cash_flow_statement;

            FinancialReport {
                symbol,
                start_date: r.start_date,
                end_date: r.end_date,
                filing_date: r.filing_date,
                fiscal_period: r.fiscal_period,
                fiscal_year: r.fiscal_year,
                revenue: line_item(&income, "revenues"),
                net_income: line_item(&income, "net_income_loss"),
                gross_profit: line_item(&income, "gross_profit"),
                operating_expenses: line_item(&income, "operating_expenses"),
                total_assets: line_item(&balance, "assets"),
                total_liabilities: line_item(&balance, "liabilities"),
                shareholders_equity: line_item(&balance, "equity"),
                net_cash_flow: line_item(&cash_flow, "net_cash_flow"),
            }
        })
    }

    async fn get_aggregates(
        &self,
        ticker: &str,
        window_days: u32,
        api_key: &str,
    ) -> Result<Vec<Bar>, FallbackReason> {
        let to = Utc::now().date_naive();
        let from = to
            .checked_sub_signed(ChronoDuration::days(i64::from(window_days)))
            .ok_or(FallbackReason::InvalidWindow(window_days))?;

        let url = format!(
            "{}/v2/aggs/ticker/{}/range/1/day/{}/{}",
            self.base_url,
            ticker.to_uppercase(),
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d")
        );

        let response: AggregateResponse = self
            .get_json(
                &url,
                &[
                    ("adjusted", "true".to_string()),
                    ("sort", "asc".to_string()),
                    ("limit", AGGREGATES_LIMIT.to_string()),
                    ("apiKey", api_key.to_string()),
                ],
            )
            .await?;

        match response.results {
            Some(bars) if !bars.is_empty() => Ok(bars),
            _ => {
                tracing::debug!(
                    "{}: aggregates status {:?} with no results",
                    ticker,
                    response.status
                );
                Err(FallbackReason::EmptyResults)
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, MarketDataError> {
        let response = self.transport.get(url, query).await?;

        if !response.is_success() {
            return Err(MarketDataError::Http {
                status: response.status,
                body: response.body,
            });
        }

        serde_json::from_str(&response.body).map_err(|e| MarketDataError::Decode(e.to_string()))
    }

    fn fallback(&self, ticker: &str, reason: FallbackReason) -> FetchedBars {
        match &reason {
            FallbackReason::Transport(_) => tracing::error!(
                ticker = %ticker,
                reason = %reason,
                "Failed to fetch Polygon data, using synthetic bars"
            ),
            _ => tracing::warn!(
                ticker = %ticker,
                reason = %reason,
                "Falling back to synthetic bars"
            ),
        }
        FetchedBars::synthetic(self.generator.generate(DEFAULT_BAR_COUNT), reason)
    }
}
