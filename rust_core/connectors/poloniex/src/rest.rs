use async_trait::async_trait;
use log::warn;
use std::collections::HashMap;

use connectors_common::num::Level;
use connectors_common::types::{
    insert_pair, Board, BoardOrder, CurrencyPair, OrderSide, RateMap, VolumeMap,
};
use connectors_common::{PublicClient, Result};

use crate::wire::{CurrencyInfo, OrderBook, Tickers};
use crate::{PoloniexApi, EXCHANGE, SYMBOL};

impl PoloniexApi {
    async fn tickers(&self) -> Result<Tickers> {
        self.public_get("command=returnTicker", "poloniex ticker").await
    }

    pub(crate) async fn currencies(&self) -> Result<HashMap<String, CurrencyInfo>> {
        self.public_get("command=returnCurrencies", "poloniex currencies")
            .await
    }

    async fn fetch_currency_pairs(&self) -> Result<Vec<CurrencyPair>> {
        let tickers = self.tickers().await?;
        let mut markets: Vec<&String> = tickers.keys().collect();
        markets.sort();
        Ok(markets
            .into_iter()
            .filter_map(|market| {
                let pair = SYMBOL.split(market);
                if pair.is_none() {
                    warn!("poloniex: skipping malformed market id {}", market);
                }
                pair
            })
            .collect())
    }

    async fn fetch_rates(&self) -> Result<(RateMap, VolumeMap)> {
        let tickers = self.tickers().await?;
        let mut rates = RateMap::new();
        let mut volumes = VolumeMap::new();
        for (market, ticker) in &tickers {
            let Some(pair) = SYMBOL.split(market) else {
                warn!("poloniex: skipping malformed market id {}", market);
                continue;
            };
            insert_pair(&mut rates, &pair.trading, &pair.settlement, ticker.last);
            insert_pair(&mut volumes, &pair.trading, &pair.settlement, ticker.quote_volume);
        }
        Ok((rates, volumes))
    }
}

fn board_side(levels: Vec<Level>, side: OrderSide) -> Vec<BoardOrder> {
    levels
        .into_iter()
        .map(|Level(price, amount)| BoardOrder { price, amount, side })
        .collect()
}

#[async_trait]
impl PublicClient for PoloniexApi {
    fn exchange_name(&self) -> &'static str {
        EXCHANGE
    }

    async fn currency_pairs(&self) -> Result<Vec<CurrencyPair>> {
        self.pairs
            .currency_pairs(|| self.fetch_currency_pairs())
            .await
    }

    async fn settlements(&self) -> Result<Vec<String>> {
        self.pairs.settlements(|| self.fetch_currency_pairs()).await
    }

    async fn rate_map(&self) -> Result<RateMap> {
        self.rates.rate_map(|| self.fetch_rates()).await
    }

    async fn volume_map(&self) -> Result<VolumeMap> {
        self.rates.volume_map(|| self.fetch_rates()).await
    }

    async fn rate(&self, trading: &str, settlement: &str) -> Result<f64> {
        self.rates
            .rate(trading, settlement, || self.fetch_rates())
            .await
    }

    async fn volume(&self, trading: &str, settlement: &str) -> Result<f64> {
        self.rates
            .volume(trading, settlement, || self.fetch_rates())
            .await
    }

    async fn board(&self, trading: &str, settlement: &str) -> Result<Board> {
        let query = format!(
            "command=returnOrderBook&currencyPair={}&depth={}",
            SYMBOL.join(trading, settlement),
            self.board_depth
        );
        let book: OrderBook = self.public_get(&query, "poloniex order book").await?;
        Ok(Board {
            bids: board_side(book.bids, OrderSide::Bid),
            asks: board_side(book.asks, OrderSide::Ask),
        })
    }

    async fn frozen_currency(&self) -> Result<Vec<String>> {
        let mut frozen: Vec<String> = self
            .currencies()
            .await?
            .into_iter()
            .filter(|(_, info)| info.is_suspended())
            .map(|(currency, _)| currency.to_uppercase())
            .collect();
        frozen.sort();
        Ok(frozen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{client, TICKER};
    use connectors_common::testing::FakeTransport;
    use connectors_common::ConnectorError;
    use std::sync::Arc;
    use std::time::Duration;

    fn fake() -> Arc<FakeTransport> {
        let fake = Arc::new(FakeTransport::new());
        fake.respond("command=returnTicker", TICKER);
        fake
    }

    #[tokio::test]
    async fn market_ids_are_settlement_first() {
        let fake = fake();
        let api = client(&fake);
        let pairs = api.currency_pairs().await.unwrap();
        assert_eq!(
            pairs,
            vec![
                CurrencyPair::new("ETH", "BTC"),
                CurrencyPair::new("LTC", "BTC"),
                CurrencyPair::new("BTC", "USDT"),
            ]
        );
        assert_eq!(api.settlements().await.unwrap(), vec!["BTC", "USDT"]);
    }

    #[tokio::test(start_paused = true)]
    async fn one_ticker_request_per_window() {
        let fake = fake();
        let api = client(&fake);

        assert_eq!(api.rate("ETH", "BTC").await.unwrap(), 0.0312);
        assert_eq!(api.volume("LTC", "BTC").await.unwrap(), 245.82513926);
        assert_eq!(api.rate_map().await.unwrap()["BTC"]["USDT"], 6400.5);
        assert_eq!(fake.count_matching("returnTicker"), 1);

        tokio::time::advance(Duration::from_secs(30)).await;
        api.volume_map().await.unwrap();
        assert_eq!(fake.count_matching("returnTicker"), 2);
    }

    #[tokio::test]
    async fn unknown_pair_is_distinguishable_from_network_failure() {
        let fake = fake();
        let api = client(&fake);
        let err = api.rate("XRP", "BTC").await.unwrap_err();
        assert!(err.is_lookup_failure());
        assert!(!err.is_transport());
    }

    #[tokio::test]
    async fn failed_fetch_does_not_poison_the_cache() {
        let fake = Arc::new(FakeTransport::new());
        fake.fail_network("command=returnTicker");
        let api = client(&fake);

        assert!(api.rate("ETH", "BTC").await.unwrap_err().is_transport());
        fake.respond("command=returnTicker", TICKER);
        assert_eq!(api.rate("ETH", "BTC").await.unwrap(), 0.0312);
        assert_eq!(fake.count_matching("returnTicker"), 2);
    }

    #[tokio::test]
    async fn non_numeric_rate_is_a_parse_failure() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond(
            "command=returnTicker",
            r#"{"BTC_ETH": {"last": "n/a", "quoteVolume": "1"}}"#,
        );
        let api = client(&fake);
        assert!(matches!(
            api.rate_map().await.unwrap_err(),
            ConnectorError::Parse { .. }
        ));
    }

    #[tokio::test]
    async fn board_parses_string_prices() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond(
            "command=returnOrderBook",
            r#"{"asks": [["0.0274", 1.5], ["0.0275", 20]],
                "bids": [["0.02738", 2.3]],
                "isFrozen": "0", "seq": 18849}"#,
        );
        let api = client(&fake);
        let board = api.board("ETH", "BTC").await.unwrap();
        assert_eq!(board.bids, vec![BoardOrder { price: 0.02738, amount: 2.3, side: OrderSide::Bid }]);
        assert_eq!(board.asks.len(), 2);
        assert!(board.asks.iter().all(|o| o.side == OrderSide::Ask));
        assert!(fake.requests()[0]
            .url
            .ends_with("/public?command=returnOrderBook&currencyPair=BTC_ETH&depth=50"));
    }

    #[tokio::test]
    async fn truncated_board_entry_fails_the_whole_board() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond(
            "command=returnOrderBook",
            r#"{"asks": [["0.0274"]], "bids": [["0.02738", 2.3]]}"#,
        );
        let api = client(&fake);
        assert!(api.board("ETH", "BTC").await.is_err());
    }

    #[tokio::test]
    async fn frozen_currencies() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond(
            "command=returnCurrencies",
            r#"{"BTC": {"id": 28, "name": "Bitcoin", "txFee": "0.00050000", "minConf": 1,
                        "depositAddress": null, "disabled": 0, "delisted": 0, "frozen": 0},
                "NXT": {"id": 127, "name": "NXT", "txFee": "1.00000000", "minConf": 15,
                        "depositAddress": null, "disabled": 0, "delisted": 0, "frozen": 1},
                "BBR": {"id": 6, "name": "Boolberry", "txFee": "0.01", "minConf": 6,
                        "depositAddress": null, "disabled": 1, "delisted": 0, "frozen": 0}}"#,
        );
        let api = client(&fake);
        assert_eq!(api.frozen_currency().await.unwrap(), vec!["BBR", "NXT"]);
    }

    #[tokio::test]
    async fn error_payload_maps_to_api_error() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond("command=returnTicker", r#"{"error": "Invalid command."}"#);
        let api = client(&fake);
        let err = api.rate_map().await.unwrap_err();
        assert!(matches!(err, ConnectorError::Api { .. }));
        assert_eq!(err.to_string(), "poloniex api error: Invalid command.");
    }
}
