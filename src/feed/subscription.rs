//! Static instrument subscription set

use serde::Serialize;

/// Feed subscription channel for trades
pub const TRADES_CHANNEL: &str = "trades";

#[derive(Serialize)]
struct SubscribeRequest<'a> {
    method: &'static str,
    subscription: Subscription<'a>,
}

#[derive(Serialize)]
struct Subscription<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    coin: &'a str,
}

/// Ordered, duplicate-free set of instrument symbols fixed at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionSet {
    coins: Vec<String>,
}

impl SubscriptionSet {
    /// Build a set of trimmed symbols, keeping the first occurrence of each.
    /// Blank symbols are dropped.
    pub fn new<I, S>(coins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for coin in coins {
            let coin = coin.into().trim().to_string();
            if !coin.is_empty() && !unique.contains(&coin) {
                unique.push(coin);
            }
        }
        Self { coins: unique }
    }

    pub fn contains(&self, coin: &str) -> bool {
        self.coins.iter().any(|c| c == coin)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.coins.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    /// One `subscribe` request per instrument, in set order
    pub fn subscribe_requests(&self) -> Result<Vec<String>, serde_json::Error> {
        self.iter()
            .map(|coin| {
                serde_json::to_string(&SubscribeRequest {
                    method: "subscribe",
                    subscription: Subscription {
                        kind: TRADES_CHANNEL,
                        coin,
                    },
                })
            })
            .collect()
    }
}
