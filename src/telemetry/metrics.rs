//! Prometheus metrics

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Payloads received from the feed
    MessagesReceived,
    /// Payloads dropped as undecodable
    MessagesMalformed,
    /// Trades handed to the sink
    TradesPublished,
    /// Trades for unsubscribed coins
    TradesFiltered,
    /// Trades skipped for bad fields or failed publish
    TradesRejected,
    /// Reconnection attempts
    Reconnects,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Current connection state (0 = disconnected .. 4 = faulted)
    ConnectionState,
    /// Connected viewers
    Viewers,
}

impl CounterMetric {
    pub fn name(self) -> &'static str {
        match self {
            CounterMetric::MessagesReceived => "tradetape_feed_messages_total",
            CounterMetric::MessagesMalformed => "tradetape_feed_messages_malformed_total",
            CounterMetric::TradesPublished => "tradetape_trades_published_total",
            CounterMetric::TradesFiltered => "tradetape_trades_filtered_total",
            CounterMetric::TradesRejected => "tradetape_trades_rejected_total",
            CounterMetric::Reconnects => "tradetape_feed_reconnects_total",
        }
    }
}

impl GaugeMetric {
    pub fn name(self) -> &'static str {
        match self {
            GaugeMetric::ConnectionState => "tradetape_feed_connection_state",
            GaugeMetric::Viewers => "tradetape_viewers",
        }
    }
}

/// Add to a counter
pub fn increment(metric: CounterMetric, by: u64) {
    if by > 0 {
        ::metrics::counter!(metric.name()).increment(by);
    }
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    ::metrics::gauge!(metric.name()).set(value);
}
