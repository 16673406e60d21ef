//! Market identifier conventions. Every exchange joins the two legs with a
//! separator, but the leg order and casing differ per exchange.

use crate::types::CurrencyPair;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegOrder {
    /// `BTC_JPY`: trading leg first.
    TradingFirst,
    /// `BTC_ETH` on Poloniex means ETH priced in BTC.
    SettlementFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolFormat {
    pub separator: char,
    pub order: LegOrder,
    pub lowercase: bool,
}

impl SymbolFormat {
    pub const fn new(separator: char, order: LegOrder, lowercase: bool) -> Self {
        SymbolFormat { separator, order, lowercase }
    }

    /// Splits a native market id. Returns `None` unless it has exactly two
    /// non-empty legs.
    pub fn split(&self, symbol: &str) -> Option<CurrencyPair> {
        let mut parts = symbol.split(self.separator);
        let first = parts.next()?;
        let second = parts.next()?;
        if parts.next().is_some() || first.is_empty() || second.is_empty() {
            return None;
        }
        Some(match self.order {
            LegOrder::TradingFirst => CurrencyPair::new(first, second),
            LegOrder::SettlementFirst => CurrencyPair::new(second, first),
        })
    }

    pub fn join(&self, trading: &str, settlement: &str) -> String {
        let (first, second) = match self.order {
            LegOrder::TradingFirst => (trading, settlement),
            LegOrder::SettlementFirst => (settlement, trading),
        };
        let symbol = format!("{}{}{}", first, self.separator, second);
        if self.lowercase {
            symbol.to_lowercase()
        } else {
            symbol.to_uppercase()
        }
    }
}

/// Settlement currencies in first-seen order, without duplicates.
pub fn settlements(pairs: &[CurrencyPair]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    pairs
        .iter()
        .filter(|p| seen.insert(p.settlement.as_str()))
        .map(|p| p.settlement.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNDERSCORE: SymbolFormat = SymbolFormat::new('_', LegOrder::TradingFirst, false);

    #[test]
    fn split_trading_first_any_case() {
        for raw in ["BTC_JPY", "btc_jpy", "Btc_Jpy"] {
            let pair = UNDERSCORE.split(raw).unwrap();
            assert_eq!(pair.trading, "BTC");
            assert_eq!(pair.settlement, "JPY");
        }
    }

    #[test]
    fn split_settlement_first() {
        let format = SymbolFormat::new('_', LegOrder::SettlementFirst, false);
        let pair = format.split("BTC_ETH").unwrap();
        assert_eq!(pair, CurrencyPair::new("ETH", "BTC"));
        assert_eq!(format.join("ETH", "BTC"), "BTC_ETH");
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(UNDERSCORE.split("FX_BTC_JPY").is_none());
        assert!(UNDERSCORE.split("BTCJPY28SEP2018").is_none());
        assert!(UNDERSCORE.split("_JPY").is_none());
    }

    #[test]
    fn join_respects_casing() {
        let lower = SymbolFormat::new('_', LegOrder::TradingFirst, true);
        assert_eq!(lower.join("ETH", "BTC"), "eth_btc");
        assert_eq!(UNDERSCORE.join("btc", "jpy"), "BTC_JPY");
    }

    #[test]
    fn settlements_keep_first_seen_order() {
        let pairs = vec![
            CurrencyPair::new("ETH", "BTC"),
            CurrencyPair::new("BTC", "JPY"),
            CurrencyPair::new("LTC", "BTC"),
            CurrencyPair::new("ETH", "JPY"),
        ];
        assert_eq!(settlements(&pairs), vec!["BTC".to_string(), "JPY".to_string()]);
    }
}
