//! Swap transaction construction for the router's `swapExactETHForTokens`.
//!
//! The builder is pure apart from reading the clock for the deadline: it
//! converts a USD spend into wei at the given native price and encodes a
//! two-hop path `[wrapped native, token]`. It never signs or submits.
//!
//! `amountOutMin` is always zero. The user accepts whatever the pool returns
//! and sees the amount in their wallet before signing; adding price protection
//! requires a live quote and is a deliberate change of risk profile.

use alloy::primitives::{hex, utils::parse_ether, Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

sol! {
    function swapExactETHForTokens(
        uint256 amountOutMin,
        address[] path,
        address to,
        uint256 deadline
    ) external payable returns (uint256[] amounts);
}

/// Decimal places of the native asset
const NATIVE_DECIMALS: u32 = 18;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SwapBuildError {
    #[error("invalid native price: {0}")]
    InvalidPrice(f64),

    #[error("invalid USD amount: {0}")]
    InvalidAmount(Decimal),

    #[error("invalid address '{0}'")]
    InvalidAddress(String),

    #[error("value conversion failed: {0}")]
    Conversion(String),
}

/// Deployment-fixed chain parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainParams {
    pub chain_id: String,
    pub router: Address,
    pub wrapped_native: Address,
    /// Seconds between construction and expiry
    pub deadline_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SwapParams {
    pub amount_usd: Decimal,
    pub native_price_usd: f64,
    pub token: Address,
    pub recipient: Address,
    /// Informational only, see module docs
    pub slippage_percent: f64,
}

/// Unsigned router call ready for a wallet to sign
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapTransaction {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub chain_id: String,
    pub deadline: u64,
}

impl SwapTransaction {
    /// Value as a `0x`-prefixed hex quantity
    pub fn value_hex(&self) -> String {
        format!("0x{:x}", self.value)
    }

    pub fn data_hex(&self) -> String {
        hex::encode_prefixed(&self.data)
    }
}

pub fn parse_address(raw: &str) -> Result<Address, SwapBuildError> {
    Address::from_str(raw.trim()).map_err(|_| SwapBuildError::InvalidAddress(raw.to_string()))
}

/// Build the swap transaction with a deadline relative to the current time
pub fn build_swap_tx(
    params: &SwapParams,
    chain: &ChainParams,
) -> Result<SwapTransaction, SwapBuildError> {
    let now = chrono::Utc::now().timestamp().max(0) as u64;
    build_swap_tx_at(params, chain, now)
}

/// Build the swap transaction as if constructed at `now_unix` (seconds)
pub fn build_swap_tx_at(
    params: &SwapParams,
    chain: &ChainParams,
    now_unix: u64,
) -> Result<SwapTransaction, SwapBuildError> {
    if params.amount_usd <= Decimal::ZERO {
        return Err(SwapBuildError::InvalidAmount(params.amount_usd));
    }

    let value = native_value_wei(params.amount_usd, params.native_price_usd)?;
    let deadline = now_unix + chain.deadline_secs;

    let call = swapExactETHForTokensCall {
        amountOutMin: U256::ZERO,
        path: vec![chain.wrapped_native, params.token],
        to: params.recipient,
        deadline: U256::from(deadline),
    };

    Ok(SwapTransaction {
        to: chain.router,
        value,
        data: Bytes::from(call.abi_encode()),
        chain_id: chain.chain_id.clone(),
        deadline,
    })
}

/// Convert a USD amount to wei at `price_usd` per native unit
///
/// Arithmetic is decimal; the quotient is truncated to 18 places before
/// scaling so no binary floating point rounding reaches the value.
pub fn native_value_wei(amount_usd: Decimal, price_usd: f64) -> Result<U256, SwapBuildError> {
    if !price_usd.is_finite() || price_usd <= 0.0 {
        return Err(SwapBuildError::InvalidPrice(price_usd));
    }

    // f64 Display is the shortest round-trip form, never exponent notation
    let price = Decimal::from_str(&price_usd.to_string())
        .map_err(|_| SwapBuildError::InvalidPrice(price_usd))?;
    if price <= Decimal::ZERO {
        return Err(SwapBuildError::InvalidPrice(price_usd));
    }

    let native = amount_usd
        .checked_div(price)
        .ok_or_else(|| SwapBuildError::Conversion(format!("{} / {}", amount_usd, price)))?
        .round_dp_with_strategy(NATIVE_DECIMALS, RoundingStrategy::ToZero);

    // below one wei
    if native.is_zero() {
        return Err(SwapBuildError::InvalidAmount(amount_usd));
    }

    parse_ether(&native.to_string()).map_err(|e| SwapBuildError::Conversion(e.to_string()))
}
