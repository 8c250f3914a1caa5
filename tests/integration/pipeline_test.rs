//! Router to broadcast sink integration tests

use super::support::trades_payload;
use tokio::sync::broadcast::error::TryRecvError;
use trade_tape::feed::{
    normalize, MessageRouter, RawTrade, RouteOutcome, RouteReport, SubscriptionSet,
};
use trade_tape::sink::BroadcastSink;

#[tokio::test]
async fn test_every_viewer_sees_trades_in_wire_order() {
    let sink = BroadcastSink::new(64);
    let mut viewers = vec![sink.subscribe(), sink.subscribe(), sink.subscribe()];
    let router = MessageRouter::new(SubscriptionSet::new(["BTC", "ETH"]), sink.clone());

    router.route(&trades_payload(&[("BTC", "1"), ("DOGE", "9"), ("ETH", "2")]));
    router.route(&trades_payload(&[("ETH", "3"), ("BTC", "4")]));

    for viewer in &mut viewers {
        let mut seen = Vec::new();
        for _ in 0..4 {
            let trade = viewer.recv().await.unwrap();
            seen.push((trade.coin, trade.price));
        }
        assert_eq!(
            seen,
            vec![
                ("BTC".to_string(), "1.0000".to_string()),
                ("ETH".to_string(), "2.0000".to_string()),
                ("ETH".to_string(), "3.0000".to_string()),
                ("BTC".to_string(), "4.0000".to_string()),
            ]
        );
        assert!(matches!(viewer.try_recv(), Err(TryRecvError::Empty)));
    }
}

#[test]
fn test_published_sequence_matches_normalized_input() {
    let coins = ["BTC", "ETH", "SOL", "DOGE", "HYPE"];
    let subscribed = SubscriptionSet::new(["BTC", "SOL", "HYPE"]);
    let sink = BroadcastSink::new(1024);
    let mut viewer = sink.subscribe();
    let router = MessageRouter::new(subscribed.clone(), sink);

    let mut expected = Vec::new();
    for batch in 0..20_u64 {
        let mut entries = Vec::new();
        for i in 0..7_u64 {
            let coin = coins[((batch * 7 + i) % coins.len() as u64) as usize];
            let entry = serde_json::json!({
                "coin": coin,
                "side": if (batch + i) % 2 == 0 { "B" } else { "A" },
                "time": 1_700_000_000_000_i64 + (batch * 1000 + i) as i64,
                "px": format!("{}.{}", 100 + batch, i),
                "sz": format!("0.{}", i + 1),
                "liquidation": i == 3,
            });
            if subscribed.contains(coin) {
                let raw: RawTrade = serde_json::from_value(entry.clone()).unwrap();
                expected.push(normalize(&raw).unwrap());
            }
            entries.push(entry);
        }
        let payload = serde_json::json!({"channel": "trades", "data": entries}).to_string();
        assert!(matches!(router.route(&payload), RouteOutcome::Trades(_)));
    }

    let mut published = Vec::new();
    while let Ok(trade) = viewer.try_recv() {
        published.push(trade);
    }
    assert!(!expected.is_empty());
    assert_eq!(published, expected);
}

#[test]
fn test_unsubscribed_only_payload_publishes_nothing() {
    let sink = BroadcastSink::new(8);
    let mut viewer = sink.subscribe();
    let router = MessageRouter::new(SubscriptionSet::new(["BTC", "ETH"]), sink);

    let outcome = router.route(&trades_payload(&[("DOGE", "0.1"), ("DOGE", "0.2")]));
    assert_eq!(
        outcome,
        RouteOutcome::Trades(RouteReport {
            published: 0,
            filtered: 2,
            rejected: 0
        })
    );
    assert!(matches!(viewer.try_recv(), Err(TryRecvError::Empty)));
}

#[test]
fn test_router_without_viewers_still_counts_published() {
    let router = MessageRouter::new(SubscriptionSet::new(["BTC"]), BroadcastSink::new(8));
    assert_eq!(router.sink().viewer_count(), 0);

    let outcome = router.route(&trades_payload(&[("BTC", "1")]));
    assert_eq!(
        outcome,
        RouteOutcome::Trades(RouteReport {
            published: 1,
            filtered: 0,
            rejected: 0
        })
    );
}
