//! market-cli: research one or more tickers from the terminal.
//!
//! Bars come from Polygon when `POLYGON_API_KEY` is set and fall back to the
//! synthetic generator otherwise (or whenever the live request fails).
//!
//! Usage:
//!   cargo run -p market-cli -- --symbols AAPL MSFT --compare
//!   cargo run -p market-cli -- --symbols NVDA --json
//!   cargo run -p market-cli -- --synthetic 30

mod args;
mod report;

use anyhow::{Context, Result};
use args::CliArgs;
use polygon_client::{ClientConfig, PolygonClient};
use report::SymbolReport;
use std::sync::Arc;
use tokio::sync::Semaphore;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = match CliArgs::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}\n\n{}", e, args::usage());
            std::process::exit(1);
        }
    };

    if let Some(count) = args.synthetic {
        let bars = synthetic_data::generate(count);
        println!("{}", serde_json::to_string_pretty(&bars)?);
        return Ok(());
    }

    let config = ClientConfig::from_env().context("loading Polygon configuration")?;
    let client = Arc::new(PolygonClient::new(config));
    if !client.has_api_key() {
        tracing::warn!("No POLYGON_API_KEY provided; all bars will be synthetic");
    }

    tracing::info!(
        "market-cli: {} symbols, window={}d, benchmark={:?}, concurrency={}",
        args.symbols.len(),
        args.window_days,
        args.benchmark,
        args.concurrency
    );

    let benchmark_task = args.benchmark.clone().map(|symbol| {
        let client = Arc::clone(&client);
        let window_days = args.window_days;
        tokio::spawn(async move {
            let fetched = client.fetch_bars_window(&symbol, window_days).await;
            (symbol, fetched)
        })
    });

    let semaphore = Arc::new(Semaphore::new(args.concurrency));
    let mut handles = Vec::with_capacity(args.symbols.len());

    for symbol in args.symbols.clone() {
        let client = Arc::clone(&client);
        let semaphore = Arc::clone(&semaphore);
        let window_days = args.window_days;

        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            let (fetched, details, financials) = tokio::join!(
                client.fetch_bars_window(&symbol, window_days),
                client.fetch_company_details(&symbol),
                client.fetch_financials(&symbol),
            );
            SymbolReport {
                symbol,
                fetched,
                details,
                financials,
            }
        }));
    }

    let benchmark = match benchmark_task {
        Some(task) => Some(task.await.context("benchmark task panicked")?),
        None => None,
    };

    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        reports.push(handle.await.context("symbol task panicked")?);
    }

    let synthetic = reports.iter().filter(|r| !r.fetched.is_live()).count();
    tracing::info!(
        "Fetched {} symbols ({} live, {} synthetic)",
        reports.len(),
        reports.len() - synthetic,
        synthetic
    );

    if args.json {
        let payload = serde_json::json!({
            "reports": reports,
            "benchmark": benchmark.as_ref().map(|(symbol, fetched)| {
                serde_json::json!({ "symbol": symbol, "fetched": fetched })
            }),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        let bench_ref = benchmark.as_ref().map(|(s, f)| (s.as_str(), f));
        for report in &reports {
            println!("{}", report.render(bench_ref));
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "market_cli=info,polygon_client=warn".into());

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    // Logs go to stderr so JSON output on stdout stays clean.
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
