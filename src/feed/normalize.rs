//! Raw trade to display record conversion

use super::types::{NormalizedTrade, RawTrade, TradeError};
use chrono::{SecondsFormat, TimeZone, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Decimal places for price and size
const QUANTITY_DP: u32 = 4;
/// Decimal places for notional value
const VALUE_DP: u32 = 2;

/// Convert one raw trade into its display record.
///
/// Pure: the same input always yields the same output. Fails only on
/// unparsable price/size or an unrepresentable timestamp.
pub fn normalize(raw: &RawTrade) -> Result<NormalizedTrade, TradeError> {
    let price = parse_decimal("px", &raw.px)?;
    let size = parse_decimal("sz", &raw.sz)?;
    let value = price
        .checked_mul(size)
        .ok_or_else(|| TradeError::InvalidNumber {
            field: "value",
            value: format!("{} * {}", raw.px, raw.sz),
        })?;

    Ok(NormalizedTrade {
        coin: raw.coin.clone(),
        time: format_time(raw.time)?,
        side: raw.side.label().to_string(),
        price: fixed(price, QUANTITY_DP),
        size: fixed(size, QUANTITY_DP),
        value: group_thousands(&fixed(value, VALUE_DP)),
        liquidation: if raw.liquidation { "Y" } else { "N" }.to_string(),
        users: raw.users.clone(),
    })
}

fn parse_decimal(field: &'static str, input: &str) -> Result<Decimal, TradeError> {
    let trimmed = input.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| TradeError::InvalidNumber {
            field,
            value: input.to_string(),
        })
}

/// Round half to even and pad to exactly `dp` places
fn fixed(value: Decimal, dp: u32) -> String {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(dp);
    rounded.to_string()
}

/// Insert `,` every three integer digits
fn group_thousands(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (unsigned, None),
    };

    let mut out = String::with_capacity(formatted.len() + int_part.len() / 3);
    out.push_str(sign);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac_part) = frac_part {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

fn format_time(epoch_ms: i64) -> Result<String, TradeError> {
    let time = Utc
        .timestamp_millis_opt(epoch_ms)
        .single()
        .ok_or(TradeError::InvalidTimestamp(epoch_ms))?;

    let precision = if time.timestamp_subsec_nanos() == 0 {
        SecondsFormat::Secs
    } else {
        SecondsFormat::Micros
    };
    Ok(time.to_rfc3339_opts(precision, false))
}
