/// Error types shared across the bot
///
/// `ApiError` covers every outbound HTTP integration (market APIs and the
/// Towns bot API). `BuyFlowError` is the taxonomy of the buy confirmation
/// pipeline; each variant maps to at most one user-visible chat message.
use crate::buy::swap::SwapBuildError;

// =============================================================================
// API ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    NetworkError(String),
    HttpStatus { status: u16, body: String },
    InvalidResponse(String),
    NotFound,
    Timeout,
    Disabled,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            ApiError::HttpStatus { status, body } => {
                if body.is_empty() {
                    write!(f, "HTTP {}", status)
                } else {
                    write!(f, "HTTP {}: {}", status, body)
                }
            }
            ApiError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            ApiError::NotFound => write!(f, "Not found"),
            ApiError::Timeout => write!(f, "Request timeout"),
            ApiError::Disabled => write!(f, "API disabled"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else {
            ApiError::NetworkError(err.to_string())
        }
    }
}

// =============================================================================
// BUY FLOW ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BuyFlowError {
    /// Native asset price could not be fetched or was implausible
    #[error("native price unavailable: {0}")]
    Oracle(ApiError),

    /// The requesting user has no linked wallet
    #[error("no wallet linked for user {0}")]
    WalletUnlinked(String),

    /// Wallet resolution itself failed
    #[error("wallet lookup failed: {0}")]
    WalletLookup(ApiError),

    /// Confirmation references an unknown, expired or consumed session
    #[error("unknown or already consumed session {0}")]
    SessionMiss(String),

    /// The interactive request channel rejected the form or transaction
    #[error("{kind} request unavailable: {source}")]
    InteractionUnavailable {
        kind: InteractionKind,
        source: ApiError,
    },

    /// Plain message delivery failed
    #[error("message delivery failed: {0}")]
    Send(ApiError),

    #[error("could not build swap: {0}")]
    SwapBuild(#[from] SwapBuildError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Confirmation,
    Transaction,
}

impl std::fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InteractionKind::Confirmation => write!(f, "Confirmation"),
            InteractionKind::Transaction => write!(f, "Transaction"),
        }
    }
}

pub const PREPARE_FAILED_MESSAGE: &str =
    "❌ Could not prepare swap (e.g. ETH price fetch failed). Try again in a moment.";

pub const LINK_WALLET_MESSAGE: &str =
    "❌ Link a wallet in Towns first (Settings → Wallet), then try again.";

impl BuyFlowError {
    /// Chat reply for this failure, `None` when the user should hear nothing
    pub fn user_message(&self) -> Option<String> {
        match self {
            BuyFlowError::Oracle(_) | BuyFlowError::SwapBuild(_) => {
                Some(PREPARE_FAILED_MESSAGE.to_string())
            }
            BuyFlowError::WalletUnlinked(_) => Some(LINK_WALLET_MESSAGE.to_string()),
            BuyFlowError::WalletLookup(_) => Some(
                "❌ Could not look up your linked wallet. Try again in a moment.".to_string(),
            ),
            BuyFlowError::InteractionUnavailable { kind, .. } => Some(format!(
                "❌ {} request is not available. Try again or use the app’s swap feature.",
                kind
            )),
            // Replays and expired forms are dropped quietly; a failed send
            // means the channel is unreachable anyway.
            BuyFlowError::SessionMiss(_) | BuyFlowError::Send(_) => None,
        }
    }
}
