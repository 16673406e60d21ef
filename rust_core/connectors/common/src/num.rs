//! Exchanges quote numbers either as JSON numbers or as decimal strings.
//! Everything here rejects non-finite values so a malformed payload fails
//! the whole call instead of leaking NaN into a board or rate map.

use serde::{Deserialize, Deserializer};

use crate::errors::{ConnectorError, Result};

pub fn parse_f64(context: &str, raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|e| ConnectorError::parse(context, format!("{:?}: {}", raw, e)))?;
    finite(context, value)
}

pub fn finite(context: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConnectorError::parse(context, format!("non-finite value {}", value)))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

/// `deserialize_with` helper accepting `1.5` as well as `"1.5"`.
pub fn de_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => n,
        NumberOrString::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid number {:?}: {}", s, e)))?,
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err(serde::de::Error::custom(format!("non-finite value {}", value)))
    }
}

/// A bare number in either representation, for map values such as
/// `{"BTC": "0.59098578"}`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Number(#[serde(deserialize_with = "de_f64")] pub f64);

/// One `[price, amount]` order book entry. Exactly two elements, both finite.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Level(
    #[serde(deserialize_with = "de_f64")] pub f64,
    #[serde(deserialize_with = "de_f64")] pub f64,
);

/// Deserializes a JSON payload, tagging failures with `context`.
pub fn from_slice<T: serde::de::DeserializeOwned>(context: &str, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| ConnectorError::parse(context, e))
}
