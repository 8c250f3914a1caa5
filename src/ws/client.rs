//! WebSocket client over tokio-tungstenite

use super::types::{WsConfig, WsError, WsMessage};
use super::{WsConnection, WsConnector};
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{interval_at, sleep_until, timeout, Instant, Interval, MissedTickBehavior};
use tokio_tungstenite::{
    connect_async, tungstenite, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connector for a single WebSocket endpoint
#[derive(Debug, Clone)]
pub struct WsClient {
    config: WsConfig,
}

impl WsClient {
    /// Create a new WebSocket client with the given configuration
    pub fn new(config: WsConfig) -> Self {
        Self { config }
    }

    /// Create a new client with just a URL using default config
    pub fn with_url(url: impl Into<String>) -> Self {
        Self::new(WsConfig::new(url))
    }

    /// Get the configured URL
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Get the client configuration
    pub fn config(&self) -> &WsConfig {
        &self.config
    }
}

#[async_trait]
impl WsConnector for WsClient {
    type Connection = LiveConnection;

    async fn connect(&self) -> Result<LiveConnection, WsError> {
        tracing::info!(url = %self.config.url, "Connecting to WebSocket");

        let (ws_stream, response) =
            timeout(self.config.connect_timeout, connect_async(&self.config.url))
                .await
                .map_err(|_| WsError::ConnectTimeout(self.config.connect_timeout))?
                .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

        tracing::info!(status = ?response.status(), "WebSocket connected");

        Ok(LiveConnection::new(ws_stream, &self.config))
    }
}

/// What woke up the receive loop
enum Wake {
    Frame(Option<Result<Message, tungstenite::Error>>),
    PingDue,
    PongOverdue,
}

/// An open WebSocket connection with ping/pong keepalive
pub struct LiveConnection {
    write: SplitSink<WsStream, Message>,
    read: SplitStream<WsStream>,
    ping_interval: Interval,
    pong_deadline: Option<Instant>,
    pong_timeout: Duration,
    close_timeout: Duration,
}

impl LiveConnection {
    fn new(ws_stream: WsStream, config: &WsConfig) -> Self {
        let (write, read) = ws_stream.split();

        // First ping one full interval after connecting
        let mut ping_interval =
            interval_at(Instant::now() + config.ping_interval, config.ping_interval);
        ping_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        Self {
            write,
            read,
            ping_interval,
            pong_deadline: None,
            pong_timeout: config.pong_timeout,
            close_timeout: config.close_timeout,
        }
    }

    async fn send_frame(&mut self, frame: Message) -> Result<(), WsError> {
        self.write
            .send(frame)
            .await
            .map_err(|e| WsError::SendFailed(e.to_string()))
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[async_trait]
impl WsConnection for LiveConnection {
    async fn send_text(&mut self, text: String) -> Result<(), WsError> {
        self.send_frame(Message::Text(text)).await
    }

    async fn next_message(&mut self) -> Result<Option<WsMessage>, WsError> {
        loop {
            let wake = tokio::select! {
                frame = self.read.next() => Wake::Frame(frame),
                _ = self.ping_interval.tick() => Wake::PingDue,
                _ = wait_for(self.pong_deadline) => Wake::PongOverdue,
            };

            match wake {
                Wake::Frame(Some(Ok(Message::Text(text)))) => {
                    return Ok(Some(WsMessage::Text(text)));
                }
                Wake::Frame(Some(Ok(Message::Binary(data)))) => {
                    return Ok(Some(WsMessage::Binary(data)));
                }
                Wake::Frame(Some(Ok(Message::Ping(data)))) => {
                    self.send_frame(Message::Pong(data)).await?;
                }
                Wake::Frame(Some(Ok(Message::Pong(_)))) => {
                    self.pong_deadline = None;
                }
                Wake::Frame(Some(Ok(Message::Close(frame)))) => {
                    tracing::info!(frame = ?frame, "Received close frame");
                    return Ok(None);
                }
                Wake::Frame(Some(Ok(Message::Frame(_)))) => {}
                Wake::Frame(Some(Err(e))) => {
                    return Err(WsError::ReceiveFailed(e.to_string()));
                }
                Wake::Frame(None) => return Err(WsError::StreamEnded),
                Wake::PingDue => {
                    self.send_frame(Message::Ping(Vec::new())).await?;
                    if self.pong_deadline.is_none() {
                        self.pong_deadline = Some(Instant::now() + self.pong_timeout);
                    }
                }
                Wake::PongOverdue => return Err(WsError::PongTimeout(self.pong_timeout)),
            }
        }
    }

    async fn close(&mut self) {
        match timeout(self.close_timeout, self.write.close()).await {
            Ok(Ok(())) => tracing::debug!("WebSocket closed"),
            Ok(Err(e)) => tracing::debug!(error = %e, "WebSocket close failed"),
            Err(_) => tracing::debug!(timeout = ?self.close_timeout, "WebSocket close timed out"),
        }
    }
}
