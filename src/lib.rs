pub mod apis;
pub mod arguments;
pub mod buy;
pub mod config;
pub mod errors; // Shared error taxonomy
pub mod logger;
pub mod market;
pub mod towns; // Towns platform plumbing
pub mod webserver;
