pub mod classify;
pub mod client;
pub mod config;
pub mod data;
pub mod error;
pub mod render;
pub mod server;
pub mod session;
pub mod types;
