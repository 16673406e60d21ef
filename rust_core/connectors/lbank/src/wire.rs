use connectors_common::num::{de_f64, Level};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct TickerEntry {
    pub symbol: String,
    pub ticker: Ticker,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Ticker {
    #[serde(deserialize_with = "de_f64")]
    pub latest: f64,
    #[serde(deserialize_with = "de_f64")]
    pub vol: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Depth {
    pub bids: Vec<Level>,
    pub asks: Vec<Level>,
}
