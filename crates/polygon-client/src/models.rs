//! Polygon response envelopes. Only the fields the client reads are declared.

use market_core::{Bar, CompanyDetails};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub(crate) struct AggregateResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<Bar>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TickerDetailsResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub results: Option<CompanyDetails>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FinancialsResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub results: Vec<FinancialResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FinancialResult {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub filing_date: Option<String>,
    pub fiscal_period: Option<String>,
    pub fiscal_year: Option<String>,
    #[serde(default)]
    pub financials: FinancialStatements,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FinancialStatements {
    #[serde(default)]
    pub income_statement: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub balance_sheet: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub cash_flow_statement: HashMap<String, serde_json::Value>,
}

/// `value` of a statement line item such as `revenues`.
pub(crate) fn line_item(statement: &HashMap<String, serde_json::Value>, key: &str) -> Option<f64> {
    statement.get(key).and_then(|v| v.get("value")).and_then(|v| v.as_f64())
}

pub(crate) fn is_ok_status(status: &Option<String>) -> bool {
    status.as_deref() == Some("OK")
}
