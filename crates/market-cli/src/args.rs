use anyhow::{bail, Context, Result};
use polygon_client::DEFAULT_WINDOW_DAYS;

pub const DEFAULT_SYMBOL: &str = "NVDA";
pub const DEFAULT_BENCHMARK: &str = "SPY";
/// Max concurrent symbol lookups
pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub symbols: Vec<String>,
    pub benchmark: Option<String>,
    pub window_days: u32,
    pub concurrency: usize,
    /// Print this many generated bars and exit without any network access.
    pub synthetic: Option<usize>,
    pub json: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            symbols: vec![DEFAULT_SYMBOL.to_string()],
            benchmark: None,
            window_days: DEFAULT_WINDOW_DAYS,
            concurrency: DEFAULT_CONCURRENCY,
            synthetic: None,
            json: false,
        }
    }
}

impl CliArgs {
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let mut parsed = Self::default();
        let mut i = 0;

        while i < args.len() {
            match args[i].as_str() {
                "--symbols" => {
                    let symbols: Vec<String> = args[i + 1..]
                        .iter()
                        .take_while(|a| !a.starts_with("--"))
                        .map(|s| s.to_uppercase())
                        .collect();
                    if symbols.is_empty() {
                        bail!("--symbols needs at least one ticker");
                    }
                    i += symbols.len();
                    parsed.symbols = symbols;
                }
                "--benchmark" => {
                    parsed.benchmark = Some(value_of(&args, i)?.to_uppercase());
                    i += 1;
                }
                "--compare" => parsed.benchmark = Some(DEFAULT_BENCHMARK.to_string()),
                "--window-days" => {
                    parsed.window_days = parse_number(&args, i)?;
                    i += 1;
                }
                "--concurrency" => {
                    parsed.concurrency = parse_number::<usize>(&args, i)?.max(1);
                    i += 1;
                }
                "--synthetic" => {
                    parsed.synthetic = Some(parse_number(&args, i)?);
                    i += 1;
                }
                "--json" => parsed.json = true,
                other => bail!("unknown argument: {}", other),
            }
            i += 1;
        }

        Ok(parsed)
    }
}

pub fn usage() -> String {
    [
        "Usage:",
        "  market-cli --symbols AAPL MSFT ...   Tickers to research (default: NVDA)",
        "  market-cli --synthetic N             Print N synthetic bars and exit",
        "",
        "Options:",
        "  --benchmark SYM    Overlay a benchmark ticker",
        "  --compare          Shorthand for --benchmark SPY",
        "  --window-days N    Trailing window for live bars (default: 90)",
        "  --concurrency N    Max parallel symbols (default: 4)",
        "  --json             Print fetched data as JSON",
        "",
        "Environment: POLYGON_API_KEY, POLYGON_BASE_URL, POLYGON_RATE_LIMIT,",
        "             POLYGON_TIMEOUT_SECS, MOCK_LATENCY_MS, RUST_LOG, RUST_LOG_FORMAT",
        "",
        "POLYGON_RATE_LIMIT defaults to 500 req/min. Free-tier keys should set it",
        "to 5; each symbol then costs three requests, so runs with more than one",
        "symbol wait up to a minute for the next slot. 0 disables the limiter.",
    ]
    .join("\n")
}

fn value_of(args: &[String], flag_idx: usize) -> Result<&str> {
    args.get(flag_idx + 1)
        .filter(|v| !v.starts_with("--"))
        .map(String::as_str)
        .with_context(|| format!("{} needs a value", args[flag_idx]))
}

fn parse_number<T>(args: &[String], flag_idx: usize) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = value_of(args, flag_idx)?;
    raw.parse()
        .with_context(|| format!("invalid value for {}: {}", args[flag_idx], raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_arguments() {
        let args = CliArgs::parse(Vec::<String>::new()).unwrap();
        assert_eq!(args, CliArgs::default());
        assert_eq!(args.symbols, vec!["NVDA"]);
        assert_eq!(args.window_days, 90);
    }

    #[test]
    fn symbols_stop_at_next_flag() {
        let args = CliArgs::parse(["--symbols", "aapl", "msft", "--compare", "--json"]).unwrap();
        assert_eq!(args.symbols, vec!["AAPL", "MSFT"]);
        assert_eq!(args.benchmark.as_deref(), Some("SPY"));
        assert!(args.json);
    }

    #[test]
    fn numeric_options() {
        let args = CliArgs::parse([
            "--window-days", "30", "--concurrency", "0", "--synthetic", "12", "--benchmark", "qqq",
        ])
        .unwrap();
        assert_eq!(args.window_days, 30);
        assert_eq!(args.concurrency, 1);
        assert_eq!(args.synthetic, Some(12));
        assert_eq!(args.benchmark.as_deref(), Some("QQQ"));
    }

    #[test]
    fn bad_input_is_rejected() {
        assert!(CliArgs::parse(["--symbols"]).is_err());
        assert!(CliArgs::parse(["--window-days", "ninety"]).is_err());
        assert!(CliArgs::parse(["--benchmark", "--json"]).is_err());
        assert!(CliArgs::parse(["--verbose"]).is_err());
    }
}
