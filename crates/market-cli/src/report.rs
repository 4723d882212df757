use market_core::{
    align_benchmark, format_large_number, Bar, CompanyDetails, FetchedBars, FinancialReport,
    PriceRange, TrendSummary,
};
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, Serialize)]
pub struct SymbolReport {
    pub symbol: String,
    pub fetched: FetchedBars,
    pub details: Option<CompanyDetails>,
    pub financials: Option<FinancialReport>,
}

impl SymbolReport {
    pub fn trend(&self) -> TrendSummary {
        TrendSummary::from_bars(&self.fetched.bars)
    }

    pub fn render(&self, benchmark: Option<(&str, &FetchedBars)>) -> String {
        let mut out = String::new();
        let name = self
            .details
            .as_ref()
            .map(|d| d.name.as_str())
            .unwrap_or(self.symbol.as_str());

        let _ = writeln!(out, "{} ({})", self.symbol, name);

        let source = match self.fetched.fallback_reason() {
            None => "live".to_string(),
            Some(reason) => format!("synthetic ({})", reason),
        };
        let _ = writeln!(out, "  Source:      {}, {} bars", source, self.fetched.bars.len());

        let trend = self.trend();
        let _ = writeln!(
            out,
            "  Trend:       {}{:.2}% {}",
            if trend.change_pct > 0.0 { "+" } else { "" },
            trend.change_pct,
            trend.label.to_label()
        );

        if let Some(range) = PriceRange::from_bars(&self.fetched.bars) {
            let _ = writeln!(
                out,
                "  Price:       ${:.2} (low ${:.2}, high ${:.2})",
                range.last_close, range.low, range.high
            );
        }

        let _ = writeln!(
            out,
            "  Market cap:  {}",
            format_large_number(self.details.as_ref().and_then(|d| d.market_cap))
        );

        if let Some(fin) = &self.financials {
            let _ = writeln!(
                out,
                "  Financials:  {} {} revenue {}, net income {}, assets {}",
                fin.fiscal_period.as_deref().unwrap_or("-"),
                fin.fiscal_year.as_deref().unwrap_or("-"),
                format_large_number(fin.revenue),
                format_large_number(fin.net_income),
                format_large_number(fin.total_assets)
            );
        }

        if let Some((bench_symbol, bench)) = benchmark {
            let _ = writeln!(out, "  {}", benchmark_line(&self.fetched.bars, bench_symbol, bench));
        }

        out
    }
}

/// Relative performance against the benchmark over the overlapping bars.
fn benchmark_line(primary: &[Bar], bench_symbol: &str, bench: &FetchedBars) -> String {
    let points = align_benchmark(primary, &bench.bars);
    let overlap = points.iter().filter(|p| p.benchmark_close.is_some()).count();
    let own = TrendSummary::from_bars(&primary[..overlap]);
    let theirs = TrendSummary::from_bars(&bench.bars[..overlap]);

    format!(
        "vs {}:      {:+.2}% over {} bars ({} {:+.2}%, {})",
        bench_symbol,
        own.change_pct - theirs.change_pct,
        overlap,
        bench_symbol,
        theirs.change_pct,
        bench.source.to_label()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_core::FallbackReason;

    fn bars(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                timestamp: i as i64,
                open: c,
                high: c + 1.0,
                low: c - 1.0,
                close: c,
                volume: 1_000_000.0,
                vwap: None,
                transactions: None,
            })
            .collect()
    }

    fn report(fetched: FetchedBars) -> SymbolReport {
        SymbolReport {
            symbol: "NVDA".to_string(),
            fetched,
            details: None,
            financials: None,
        }
    }

    #[test]
    fn render_marks_synthetic_provenance() {
        let fetched = FetchedBars::synthetic(bars(&[100.0, 130.0]), FallbackReason::RateLimited);
        let text = report(fetched).render(None);
        assert!(text.starts_with("NVDA (NVDA)"));
        assert!(text.contains("synthetic (rate limited), 2 bars"));
        assert!(text.contains("+30.00% Strong Bull"));
        assert!(text.contains("Market cap:  N/A"));
        assert!(!text.contains("vs "));
    }

    #[test]
    fn render_includes_benchmark_comparison() {
        let primary = report(FetchedBars::live(bars(&[100.0, 110.0, 120.0])));
        let bench = FetchedBars::live(bars(&[400.0, 404.0]));
        let text = primary.render(Some(("SPY", &bench)));
        assert!(text.contains("Source:      live, 3 bars"));
        // Over the two overlapping bars: +10% vs +1%.
        assert!(text.contains("vs SPY:      +9.00% over 2 bars (SPY +1.00%, live)"), "{}", text);
    }

    #[test]
    fn serializes_with_source_tag() {
        let value = serde_json::to_value(report(FetchedBars::live(bars(&[1.0])))).unwrap();
        assert_eq!(value["fetched"]["source"]["kind"], "live");
        assert_eq!(value["fetched"]["bars"][0]["c"], 1.0);
    }
}
