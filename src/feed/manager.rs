//! Feed connection manager
//!
//! Owns the lifecycle of the upstream connection: connect, subscribe, receive,
//! classify failures, and reconnect after a fixed delay, forever.
//!
//! ```text
//! Disconnected -> Connecting -> Subscribed -> Receiving
//!       ^                                        |
//!       +---- (delay) ---- Faulted <-------------+  (any failure, any state)
//! ```

use super::router::{MessageRouter, RouteOutcome};
use crate::sink::TradeSink;
use crate::telemetry::{increment, set_gauge, CounterMetric, GaugeMetric};
use crate::ws::{WsConnection, WsConnector, WsError, WsMessage};
use futures_util::FutureExt;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::Instrument;
use uuid::Uuid;

/// Lifecycle of the upstream connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Subscribed,
    Receiving,
    Faulted,
}

impl ConnectionState {
    fn gauge_value(self) -> f64 {
        match self {
            ConnectionState::Disconnected => 0.0,
            ConnectionState::Connecting => 1.0,
            ConnectionState::Subscribed => 2.0,
            ConnectionState::Receiving => 3.0,
            ConnectionState::Faulted => 4.0,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Subscribed => "subscribed",
            ConnectionState::Receiving => "receiving",
            ConnectionState::Faulted => "faulted",
        };
        f.write_str(name)
    }
}

/// Classified reasons a session ended abnormally
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("connect failed: {0}")]
    Connect(#[source] WsError),
    #[error("subscribe failed: {0}")]
    Subscribe(#[source] WsError),
    #[error("transport failed: {0}")]
    Transport(#[source] WsError),
    #[error("failed to encode subscribe request: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("session panicked: {0}")]
    Panicked(String),
}

/// Counters for a session the peer closed cleanly
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub messages: u64,
    pub published: u64,
}

/// Supervises the feed connection and drives the router
pub struct FeedManager<C, S> {
    connector: C,
    router: MessageRouter<S>,
    reconnect_delay: Duration,
    state: watch::Sender<ConnectionState>,
    attempt: u64,
}

impl<C, S> FeedManager<C, S>
where
    C: WsConnector,
    S: TradeSink,
{
    pub fn new(connector: C, router: MessageRouter<S>, reconnect_delay: Duration) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            connector,
            router,
            reconnect_delay,
            state,
            attempt: 0,
        }
    }

    /// Observe state transitions
    pub fn state_watch(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Run until the task is dropped. Never returns on its own.
    pub async fn run(mut self) {
        loop {
            self.attempt += 1;
            let span = tracing::info_span!(
                "feed_session",
                session = %Uuid::new_v4(),
                attempt = self.attempt
            );
            self.supervise_once().instrument(span).await;
        }
    }

    /// One session plus the fault report and reconnect delay that follow it
    async fn supervise_once(&mut self) {
        let outcome = AssertUnwindSafe(self.run_session())
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(FeedError::Panicked(panic_message(panic.as_ref()))));

        self.set_state(ConnectionState::Faulted);
        match outcome {
            Ok(summary) => tracing::warn!(
                messages = summary.messages,
                published = summary.published,
                "Feed closed the connection"
            ),
            Err(e) => tracing::error!(error = %e, "Feed connection failed"),
        }

        increment(CounterMetric::Reconnects, 1);
        tracing::info!(delay = ?self.reconnect_delay, "Retrying feed connection");
        tokio::time::sleep(self.reconnect_delay).await;
        self.set_state(ConnectionState::Disconnected);
    }

    /// One connect-subscribe-receive cycle
    pub async fn run_session(&mut self) -> Result<SessionSummary, FeedError> {
        let mut conn = self.connector.connect().await.map_err(FeedError::Connect)?;
        self.set_state(ConnectionState::Connecting);

        let result = self.drive(&mut conn).await;
        conn.close().await;
        result
    }

    async fn drive(&mut self, conn: &mut C::Connection) -> Result<SessionSummary, FeedError> {
        for request in self.router.subscriptions().subscribe_requests()? {
            conn.send_text(request).await.map_err(FeedError::Subscribe)?;
        }
        self.set_state(ConnectionState::Subscribed);
        tracing::info!(
            coins = ?self.router.subscriptions().iter().collect::<Vec<_>>(),
            "Subscribed to trades"
        );

        self.set_state(ConnectionState::Receiving);
        let mut summary = SessionSummary::default();
        while let Some(message) = conn.next_message().await.map_err(FeedError::Transport)? {
            summary.messages += 1;
            let outcome = match message {
                WsMessage::Text(text) => self.router.route(&text),
                WsMessage::Binary(data) => match std::str::from_utf8(&data) {
                    Ok(text) => self.router.route(text),
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            len = data.len(),
                            "Dropping non-UTF-8 binary frame"
                        );
                        increment(CounterMetric::MessagesMalformed, 1);
                        RouteOutcome::Malformed
                    }
                },
            };
            if let RouteOutcome::Trades(report) = outcome {
                summary.published += report.published as u64;
            }
        }

        Ok(summary)
    }

    fn set_state(&self, next: ConnectionState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            tracing::debug!(from = %previous, to = %next, "Feed state change");
        }
        set_gauge(GaugeMetric::ConnectionState, next.gauge_value());
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
