//! Trade sinks
//!
//! The ingestion pipeline publishes every normalized trade through the
//! [`TradeSink`] capability. Publishing never waits on a viewer: fan-out
//! reliability belongs to the sink, not the pipeline.

use crate::feed::NormalizedTrade;
use crate::telemetry::{set_gauge, GaugeMetric};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};

/// Event name viewers receive trades under
pub const NEW_TRADE_EVENT: &str = "new_trade";

/// Default broadcast channel capacity
pub const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SinkError {
    #[error("sink is full")]
    Full,
    #[error("sink is closed")]
    Closed,
}

/// Non-blocking publish capability
pub trait TradeSink: Send + Sync {
    /// Deliver a trade, returning how many viewers it reached
    fn publish(&self, trade: NormalizedTrade) -> Result<usize, SinkError>;
}

impl<T: TradeSink + ?Sized> TradeSink for Arc<T> {
    fn publish(&self, trade: NormalizedTrade) -> Result<usize, SinkError> {
        (**self).publish(trade)
    }
}

/// Single consumer hand-off
impl TradeSink for mpsc::Sender<NormalizedTrade> {
    fn publish(&self, trade: NormalizedTrade) -> Result<usize, SinkError> {
        self.try_send(trade).map(|()| 1).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SinkError::Full,
            mpsc::error::TrySendError::Closed(_) => SinkError::Closed,
        })
    }
}

/// Fan-out to every live viewer over a tokio broadcast channel.
///
/// A viewer that falls more than `capacity` records behind skips ahead and is
/// told how many it missed; ingestion never waits for it.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<NormalizedTrade>,
}

impl BroadcastSink {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            tx: broadcast::channel(capacity.max(1)).0,
        }
    }

    /// Register a new viewer
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<NormalizedTrade> {
        let rx = self.tx.subscribe();
        self.report_viewers();
        rx
    }

    #[must_use]
    pub fn viewer_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Refresh the viewer gauge; dropped viewers show up on the next publish
    fn report_viewers(&self) {
        set_gauge(GaugeMetric::Viewers, self.tx.receiver_count() as f64);
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl TradeSink for BroadcastSink {
    fn publish(&self, trade: NormalizedTrade) -> Result<usize, SinkError> {
        // Err only means nobody is watching right now
        let reached = self.tx.send(trade).unwrap_or(0);
        self.report_viewers();
        Ok(reached)
    }
}
