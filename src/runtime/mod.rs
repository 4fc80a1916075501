//! Gateway front: HTTP server wiring for the invocation filter.

mod config;
mod server;

pub use config::GatewayConfig;
pub use server::GatewayServer;
