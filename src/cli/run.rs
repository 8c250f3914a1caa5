//! Run command implementation

use crate::config::Config;
use crate::feed::{FeedManager, MessageRouter, NormalizedTrade};
use crate::sink::{BroadcastSink, NEW_TRADE_EVENT};
use crate::ws::WsClient;
use clap::Args;
use serde::Serialize;
use tokio::sync::broadcast;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Coins to relay, overriding the config file
    #[arg(long, value_delimiter = ',')]
    pub coins: Vec<String>,

    /// Do not print trades
    #[arg(short, long)]
    pub quiet: bool,
}

/// One line of viewer output
#[derive(Serialize)]
struct ViewerEvent<'a> {
    event: &'static str,
    data: &'a NormalizedTrade,
}

impl RunArgs {
    pub async fn execute(&self, mut config: Config) -> anyhow::Result<()> {
        if !self.coins.is_empty() {
            config.feed.coins = self.coins.clone();
        }
        config.validate()?;

        let subscriptions = config.feed.subscriptions();
        let ws_config = config.feed.ws_config();
        let sink = BroadcastSink::new(config.broadcast.capacity);

        let viewer = (!self.quiet).then(|| {
            let rx = sink.subscribe();
            tokio::spawn(run_terminal_viewer(rx))
        });

        tracing::info!(
            url = %ws_config.url,
            coins = ?subscriptions.iter().collect::<Vec<_>>(),
            "Starting trade relay"
        );

        let reconnect_delay = ws_config.reconnect_delay;
        let router = MessageRouter::new(subscriptions, sink);
        let manager = FeedManager::new(WsClient::new(ws_config), router, reconnect_delay);

        tokio::select! {
            _ = manager.run() => {}
            result = tokio::signal::ctrl_c() => {
                result?;
                tracing::info!("Shutdown requested");
            }
        }

        if let Some(viewer) = viewer {
            viewer.abort();
        }
        Ok(())
    }
}

/// Print each broadcast trade as a JSON line
async fn run_terminal_viewer(mut rx: broadcast::Receiver<NormalizedTrade>) {
    loop {
        match rx.recv().await {
            Ok(trade) => {
                let event = ViewerEvent {
                    event: NEW_TRADE_EVENT,
                    data: &trade,
                };
                match serde_json::to_string(&event) {
                    Ok(line) => println!("{}", line),
                    Err(e) => tracing::warn!(error = %e, "Failed to encode trade"),
                }
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                tracing::warn!(missed, "Viewer fell behind, skipping trades");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
