//! Feed data types

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Aggressor side of a trade as encoded on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    #[serde(rename = "B")]
    Buy,
    #[serde(rename = "A")]
    Sell,
}

impl TradeSide {
    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            TradeSide::Buy => "Buy",
            TradeSide::Sell => "Sell",
        }
    }
}

/// A single trade entry from a `trades` channel message
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawTrade {
    /// Instrument symbol (e.g., "BTC")
    pub coin: String,
    /// Aggressor side
    pub side: TradeSide,
    /// Trade time (epoch milliseconds)
    pub time: i64,
    /// Price as a decimal string
    pub px: String,
    /// Size as a decimal string
    pub sz: String,
    /// Forced position closure
    #[serde(default, deserialize_with = "truthy")]
    pub liquidation: bool,
    /// Users on either side of the trade
    #[serde(default, deserialize_with = "null_as_empty")]
    pub users: Vec<String>,
}

/// Display-ready trade record pushed to viewers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTrade {
    pub coin: String,
    /// ISO-8601 UTC timestamp
    pub time: String,
    /// "Buy" or "Sell"
    pub side: String,
    /// Price with 4 decimal places
    pub price: String,
    /// Size with 4 decimal places
    pub size: String,
    /// Notional with thousands separators and 2 decimal places
    pub value: String,
    /// "Y" or "N"
    pub liquidation: String,
    pub users: Vec<String>,
}

/// Reasons a single trade entry is skipped
#[derive(Debug, Error)]
pub enum TradeError {
    #[error("undecodable trade entry: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("timestamp out of range: {0}")]
    InvalidTimestamp(i64),
}

/// Liquidation may arrive as a bool, null, or a detail object.
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => false,
        Some(serde_json::Value::Bool(flag)) => flag,
        Some(serde_json::Value::Object(map)) => !map.is_empty(),
        Some(serde_json::Value::Array(items)) => !items.is_empty(),
        Some(serde_json::Value::String(s)) => !s.is_empty(),
        Some(serde_json::Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
