//! trade-tape: live trade tape relay for the Hyperliquid WebSocket feed
//!
//! This library provides the core components for:
//! - A reconnecting WebSocket feed client with ping/pong keepalive
//! - Routing and normalization of `trades` channel messages
//! - Fan-out of normalized trades to live viewers
//! - Configuration, CLI and observability

pub mod cli;
pub mod config;
pub mod feed;
pub mod sink;
pub mod telemetry;
pub mod ws;
