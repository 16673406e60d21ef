//! Response shapes of the bitFlyer REST API.

use connectors_common::num::de_f64;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct Market {
    pub product_code: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Ticker {
    #[serde(deserialize_with = "de_f64")]
    pub ltp: f64,
    #[serde(deserialize_with = "de_f64")]
    pub volume_by_product: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BoardLevel {
    #[serde(deserialize_with = "de_f64")]
    pub price: f64,
    #[serde(deserialize_with = "de_f64")]
    pub size: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BoardResponse {
    pub bids: Vec<BoardLevel>,
    pub asks: Vec<BoardLevel>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BalanceEntry {
    pub currency_code: String,
    #[serde(deserialize_with = "de_f64")]
    pub amount: f64,
    #[serde(deserialize_with = "de_f64")]
    pub available: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChildOrder {
    pub product_code: String,
    pub side: String,
    #[serde(deserialize_with = "de_f64")]
    pub price: f64,
    #[serde(deserialize_with = "de_f64")]
    pub outstanding_size: f64,
    pub child_order_acceptance_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SendChildOrder<'a> {
    pub product_code: &'a str,
    pub child_order_type: &'static str,
    pub side: &'static str,
    pub price: f64,
    pub size: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrderAccepted {
    pub child_order_acceptance_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CancelChildOrder<'a> {
    pub product_code: &'a str,
    pub child_order_acceptance_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Commission {
    #[serde(deserialize_with = "de_f64")]
    pub commission_rate: f64,
}
