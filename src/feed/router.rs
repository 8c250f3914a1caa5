//! Feed payload routing: parse, filter, normalize, publish

use super::normalize::normalize;
use super::subscription::{SubscriptionSet, TRADES_CHANNEL};
use super::types::{RawTrade, TradeError};
use crate::sink::TradeSink;
use crate::telemetry::{increment, CounterMetric};
use serde::Deserialize;

/// Top-level shape shared by every feed message
#[derive(Debug, Deserialize)]
struct FeedEnvelope {
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    data: serde_json::Value,
}

/// Per-payload trade accounting
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RouteReport {
    /// Trades handed to the sink
    pub published: usize,
    /// Trades for instruments outside the subscription set
    pub filtered: usize,
    /// Trades skipped for bad fields or a failed publish
    pub rejected: usize,
}

/// What happened to one payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Trades(RouteReport),
    /// Valid message on another channel
    Ignored,
    /// Not JSON, or not the expected structure
    Malformed,
}

/// Routes raw payloads from the feed to a sink.
///
/// Never fails: every problem is logged and confined to the payload or trade
/// that caused it.
pub struct MessageRouter<S> {
    subscriptions: SubscriptionSet,
    sink: S,
}

impl<S: TradeSink> MessageRouter<S> {
    pub fn new(subscriptions: SubscriptionSet, sink: S) -> Self {
        Self {
            subscriptions,
            sink,
        }
    }

    pub fn subscriptions(&self) -> &SubscriptionSet {
        &self.subscriptions
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Handle one raw payload
    pub fn route(&self, payload: &str) -> RouteOutcome {
        increment(CounterMetric::MessagesReceived, 1);

        let envelope: FeedEnvelope = match serde_json::from_str(payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to decode feed message");
                increment(CounterMetric::MessagesMalformed, 1);
                return RouteOutcome::Malformed;
            }
        };

        if envelope.channel.as_deref() != Some(TRADES_CHANNEL) {
            tracing::debug!(channel = ?envelope.channel, "Ignoring feed message");
            return RouteOutcome::Ignored;
        }

        let serde_json::Value::Array(entries) = envelope.data else {
            tracing::warn!("Trades message without a trade list");
            increment(CounterMetric::MessagesMalformed, 1);
            return RouteOutcome::Malformed;
        };

        let mut report = RouteReport::default();
        for entry in entries {
            match self.route_trade(entry) {
                Ok(true) => report.published += 1,
                Ok(false) => report.filtered += 1,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping trade");
                    report.rejected += 1;
                }
            }
        }

        increment(CounterMetric::TradesPublished, report.published as u64);
        increment(CounterMetric::TradesFiltered, report.filtered as u64);
        increment(CounterMetric::TradesRejected, report.rejected as u64);

        RouteOutcome::Trades(report)
    }

    /// `Ok(false)` when the instrument is not subscribed
    fn route_trade(&self, entry: serde_json::Value) -> Result<bool, RouteError> {
        let raw: RawTrade = serde_json::from_value(entry).map_err(TradeError::from)?;
        if !self.subscriptions.contains(&raw.coin) {
            return Ok(false);
        }

        let trade = normalize(&raw)?;
        let viewers = self.sink.publish(trade)?;
        tracing::trace!(coin = %raw.coin, viewers, "Published trade");
        Ok(true)
    }
}

#[derive(Debug, thiserror::Error)]
enum RouteError {
    #[error(transparent)]
    Trade(#[from] TradeError),
    #[error("publish failed: {0}")]
    Sink(#[from] crate::sink::SinkError),
}
