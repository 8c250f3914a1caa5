//! Trade feed module
//!
//! Subscribes to the Hyperliquid `trades` channel for a fixed set of coins,
//! normalizes every trade and publishes it to a sink.

mod manager;
mod normalize;
mod router;
mod subscription;
mod types;

pub use manager::{ConnectionState, FeedError, FeedManager, SessionSummary};
pub use normalize::normalize;
pub use router::{MessageRouter, RouteOutcome, RouteReport};
pub use subscription::{SubscriptionSet, TRADES_CHANNEL};
pub use types::{NormalizedTrade, RawTrade, TradeError, TradeSide};

/// Hyperliquid WebSocket endpoint
pub const HYPERLIQUID_WS_URL: &str = "wss://api-ui.hyperliquid.xyz/ws";
