//! HTTP surface: webhook intake, health and agent metadata

pub mod auth;
pub mod routes;
pub mod server;
pub mod state;

pub use server::start_server;
pub use state::AppState;
