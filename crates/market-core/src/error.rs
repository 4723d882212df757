use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MarketDataError {
    /// Status code when the failure came from a non-success HTTP response.
    pub fn status(&self) -> Option<u16> {
        match self {
            MarketDataError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<MarketDataError> for crate::FallbackReason {
    fn from(err: MarketDataError) -> Self {
        use crate::FallbackReason;
        match err {
            MarketDataError::Http { status: 429, .. } => FallbackReason::RateLimited,
            MarketDataError::Http { status, .. } => FallbackReason::ErrorStatus(status),
            MarketDataError::Decode(e) => FallbackReason::MalformedResponse(e),
            MarketDataError::Transport(e) | MarketDataError::Config(e) => {
                FallbackReason::Transport(e)
            }
        }
    }
}
