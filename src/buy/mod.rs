//! Buy confirmation pipeline
//!
//! A mention like `buy $50 of 0x…` becomes a pending session and a
//! confirm/cancel form; confirming it prices the spend in ETH and hands the
//! user an unsigned router call to sign in their wallet.

pub mod flow;
pub mod intent;
pub mod session;
pub mod swap;

pub use flow::{BuyFlow, BuyFlowSettings};
pub use intent::{parse_buy_intent, parse_buy_intent_with_ceiling, PurchaseIntent};
pub use session::{PendingPurchase, SessionStore};
pub use swap::{build_swap_tx, ChainParams, SwapParams, SwapTransaction};
