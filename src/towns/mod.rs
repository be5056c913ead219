//! Towns platform plumbing: inbound events, outbound bot API, dispatch

pub mod client;
pub mod commands;
pub mod events;
pub mod handlers;

pub use client::{BotPlatform, InteractionRequest, MessageOptions, TownsClient};
pub use events::{InboundEvent, InteractionContent};
pub use handlers::BotHandler;
