//! Response shapes of the Poloniex public and trading APIs.

use connectors_common::num::{de_f64, Level, Number};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// Error payload Poloniex returns in place of the expected document.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TickerEntry {
    #[serde(deserialize_with = "de_f64")]
    pub last: f64,
    #[serde(deserialize_with = "de_f64")]
    pub quote_volume: f64,
}

pub(crate) type Tickers = HashMap<String, TickerEntry>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CurrencyInfo {
    #[serde(deserialize_with = "de_f64")]
    pub tx_fee: f64,
    #[serde(deserialize_with = "de_f64")]
    pub disabled: f64,
    #[serde(deserialize_with = "de_f64")]
    pub frozen: f64,
}

impl CurrencyInfo {
    pub fn is_suspended(&self) -> bool {
        self.disabled != 0.0 || self.frozen != 0.0
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrderBook {
    pub bids: Vec<Level>,
    pub asks: Vec<Level>,
}

pub(crate) type BalancesResponse = HashMap<String, Number>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CompleteBalanceEntry {
    #[serde(deserialize_with = "de_f64")]
    pub available: f64,
    #[serde(deserialize_with = "de_f64")]
    pub on_orders: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OpenOrder {
    #[serde(deserialize_with = "de_id")]
    pub order_number: String,
    #[serde(rename = "type")]
    pub side: String,
    #[serde(deserialize_with = "de_f64")]
    pub rate: f64,
    #[serde(deserialize_with = "de_f64")]
    pub amount: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderPlaced {
    #[serde(deserialize_with = "de_id")]
    pub order_number: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CancelResult {
    #[serde(deserialize_with = "de_f64")]
    pub success: f64,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FeeInfo {
    #[serde(deserialize_with = "de_f64")]
    pub maker_fee: f64,
    #[serde(deserialize_with = "de_f64")]
    pub taker_fee: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WithdrawResult {
    pub response: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum RawAddresses {
    Listed(HashMap<String, String>),
    Unlisted(Vec<IgnoredAny>),
}

/// Deposit address per currency. An account with no addresses gets `[]`.
#[derive(Debug, Default, Deserialize)]
#[serde(try_from = "RawAddresses")]
pub(crate) struct DepositAddresses(HashMap<String, String>);

impl DepositAddresses {
    pub fn get(&self, currency: &str) -> Option<&String> {
        self.0.get(currency)
    }
}

impl TryFrom<RawAddresses> for DepositAddresses {
    type Error = String;

    fn try_from(raw: RawAddresses) -> Result<Self, String> {
        match raw {
            RawAddresses::Listed(addresses) => Ok(DepositAddresses(addresses)),
            RawAddresses::Unlisted(items) if items.is_empty() => Ok(DepositAddresses::default()),
            RawAddresses::Unlisted(_) => Err("expected a map of deposit addresses".to_string()),
        }
    }
}

/// Order numbers come back as JSON numbers from `buy`/`sell` and as strings
/// from `returnOpenOrders`.
fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(u64),
        String(String),
    }
    Ok(match Id::deserialize(deserializer)? {
        Id::Number(n) => n.to_string(),
        Id::String(s) => s,
    })
}
