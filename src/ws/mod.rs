//! WebSocket client library
//!
//! Provides the transport seam used by the feed manager: a connector that
//! opens connections, and a connection that sends text frames and yields
//! inbound application frames while keeping the socket alive with pings.

mod client;
mod types;

pub use client::{LiveConnection, WsClient};
pub use types::{WsConfig, WsError, WsMessage};

use async_trait::async_trait;

/// Opens connections to a fixed endpoint
#[async_trait]
pub trait WsConnector: Send + Sync {
    type Connection: WsConnection;

    /// Establish a new connection
    async fn connect(&self) -> Result<Self::Connection, WsError>;
}

/// One established connection
#[async_trait]
pub trait WsConnection: Send {
    /// Send a text frame
    async fn send_text(&mut self, text: String) -> Result<(), WsError>;

    /// Wait for the next application frame.
    ///
    /// `Ok(None)` means the peer closed the connection with a close frame.
    async fn next_message(&mut self) -> Result<Option<WsMessage>, WsError>;

    /// Close the connection, bounded by the configured close timeout
    async fn close(&mut self);
}
