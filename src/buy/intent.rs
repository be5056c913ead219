//! Purchase intent parsing from free-text chat messages.
//!
//! Recognizes `buy [$]AMOUNT[$] of 0x<40 hex>` anywhere in a message, e.g.
//! `hey @bot buy $25 of 0x1234...`. Pure and side-effect free.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Largest USD amount accepted when no configured ceiling is supplied
pub const DEFAULT_MAX_AMOUNT_USD: u64 = 1_000_000;

static BUY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)buy\s+\$?\s*([0-9.,]*[0-9][0-9.,]*)\s*\$?\s+of\s+(0x[a-f0-9]{40})\b")
        .expect("buy pattern is a valid regex")
});

static NORMALIZED_ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[a-f0-9]{40}$").expect("address pattern is a valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseIntent {
    pub amount_usd: Decimal,
    /// Lowercase `0x`-prefixed 40-hex-digit contract address
    pub token_address: String,
}

/// Parse a buy intent using the default USD ceiling
pub fn parse_buy_intent(message: &str) -> Option<PurchaseIntent> {
    parse_buy_intent_with_ceiling(message, Decimal::from(DEFAULT_MAX_AMOUNT_USD))
}

/// Parse a buy intent, rejecting amounts that are not in `(0, ceiling]`
pub fn parse_buy_intent_with_ceiling(message: &str, ceiling: Decimal) -> Option<PurchaseIntent> {
    let captures = BUY_PATTERN.captures(message.trim())?;

    let amount_raw = captures.get(1)?.as_str().replace(',', "");
    let amount_usd = Decimal::from_str(&amount_raw).ok()?;
    if amount_usd <= Decimal::ZERO || amount_usd > ceiling {
        return None;
    }

    let token_address = captures.get(2)?.as_str().to_lowercase();
    if !NORMALIZED_ADDRESS.is_match(&token_address) {
        return None;
    }

    Some(PurchaseIntent {
        amount_usd,
        token_address,
    })
}
