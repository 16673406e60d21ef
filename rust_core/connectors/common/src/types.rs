use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::errors::{ConnectorError, Result};

/// Trading -> Settlement -> value. Used for rates, volumes and fee rates.
pub type PairMap<T> = HashMap<String, HashMap<String, T>>;

pub type RateMap = PairMap<f64>;
pub type VolumeMap = PairMap<f64>;
pub type FeeRates = PairMap<FeeRate>;
pub type Balances = HashMap<String, f64>;
pub type CompleteBalances = HashMap<String, CompleteBalance>;

/// A tradable market. Both legs are upper-cased on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub trading: String,
    pub settlement: String,
}

impl CurrencyPair {
    pub fn new(trading: &str, settlement: &str) -> Self {
        CurrencyPair {
            trading: trading.to_uppercase(),
            settlement: settlement.to_uppercase(),
        }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.trading, self.settlement)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    Bid,
    Ask,
}

impl OrderSide {
    /// Maps an exchange's native side vocabulary onto the canonical side.
    pub fn from_native(side: &str) -> Result<Self> {
        match side.trim().to_ascii_lowercase().as_str() {
            "buy" | "bid" => Ok(OrderSide::Bid),
            "sell" | "ask" => Ok(OrderSide::Ask),
            other => Err(ConnectorError::Parse {
                context: "order side".to_string(),
                message: format!("unknown side {:?}", other),
            }),
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Bid => f.write_str("Bid"),
            OrderSide::Ask => f.write_str("Ask"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardOrder {
    pub price: f64,
    pub amount: f64,
    pub side: OrderSide,
}

/// Point-in-time order book snapshot. Never cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub bids: Vec<BoardOrder>,
    pub asks: Vec<BoardOrder>,
}

impl Board {
    pub fn best_bid(&self) -> Option<&BoardOrder> {
        self.bids
            .iter()
            .max_by(|a, b| a.price.total_cmp(&b.price))
    }

    pub fn best_ask(&self) -> Option<&BoardOrder> {
        self.asks
            .iter()
            .min_by(|a, b| a.price.total_cmp(&b.price))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompleteBalance {
    pub available: f64,
    pub on_orders: f64,
}

impl CompleteBalance {
    pub fn total(&self) -> f64 {
        self.available + self.on_orders
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeRate {
    pub maker_fee: f64,
    pub taker_fee: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveOrder {
    pub exchange_order_id: String,
    pub trading: String,
    pub settlement: String,
    pub side: OrderSide,
    pub price: f64,
    /// Amount still open on the book.
    pub amount: f64,
}

/// Inserts `value` under `map[trading][settlement]`.
pub fn insert_pair<T>(map: &mut PairMap<T>, trading: &str, settlement: &str, value: T) {
    map.entry(trading.to_string())
        .or_default()
        .insert(settlement.to_string(), value);
}

/// Looks up `map[trading][settlement]`, reporting the unresolved pair on a miss.
pub fn lookup_pair<T: Clone>(map: &PairMap<T>, trading: &str, settlement: &str) -> Result<T> {
    map.get(trading)
        .and_then(|m| m.get(settlement))
        .cloned()
        .ok_or_else(|| ConnectorError::PairNotFound {
            trading: trading.to_string(),
            settlement: settlement.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_pair_is_upper_cased() {
        let pair = CurrencyPair::new("btc", "Jpy");
        assert_eq!(pair.trading, "BTC");
        assert_eq!(pair.settlement, "JPY");
        assert_eq!(pair.to_string(), "BTC/JPY");
    }

    #[test]
    fn native_sides_collapse_onto_bid_and_ask() {
        for s in ["BUY", "buy", "bid", "Bid"] {
            assert_eq!(OrderSide::from_native(s).unwrap(), OrderSide::Bid);
        }
        for s in ["SELL", "sell", "ask", "ASK"] {
            assert_eq!(OrderSide::from_native(s).unwrap(), OrderSide::Ask);
        }
        assert!(OrderSide::from_native("hold").is_err());
    }

    #[test]
    fn lookup_reports_missing_pair() {
        let mut map = RateMap::new();
        insert_pair(&mut map, "BTC", "JPY", 100.0);
        assert_eq!(lookup_pair(&map, "BTC", "JPY").unwrap(), 100.0);
        let err = lookup_pair(&map, "BTC", "USD").unwrap_err();
        assert!(err.is_lookup_failure());
        assert_eq!(err.to_string(), "currency pair not found: BTC/USD");
    }

    #[test]
    fn best_levels() {
        let board = Board {
            bids: vec![
                BoardOrder { price: 99.0, amount: 1.0, side: OrderSide::Bid },
                BoardOrder { price: 100.0, amount: 1.0, side: OrderSide::Bid },
            ],
            asks: vec![
                BoardOrder { price: 102.0, amount: 1.0, side: OrderSide::Ask },
                BoardOrder { price: 101.0, amount: 1.0, side: OrderSide::Ask },
            ],
        };
        assert_eq!(board.best_bid().unwrap().price, 100.0);
        assert_eq!(board.best_ask().unwrap().price, 101.0);
    }
}
