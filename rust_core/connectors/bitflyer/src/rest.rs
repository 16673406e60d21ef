use async_trait::async_trait;
use futures::future::try_join_all;
use log::warn;

use connectors_common::types::{
    insert_pair, Board, BoardOrder, CurrencyPair, OrderSide, RateMap, VolumeMap,
};
use connectors_common::{PublicClient, Result};

use crate::wire::{BoardLevel, BoardResponse, Market, Ticker};
use crate::{BitflyerApi, EXCHANGE, SYMBOL};

impl BitflyerApi {
    async fn fetch_currency_pairs(&self) -> Result<Vec<CurrencyPair>> {
        let markets: Vec<Market> = self.public_get("/v1/getmarkets", "bitflyer markets").await?;
        Ok(markets
            .iter()
            .filter_map(|m| {
                let pair = SYMBOL.split(&m.product_code);
                if pair.is_none() {
                    warn!("bitflyer: skipping non-spot market {}", m.product_code);
                }
                pair
            })
            .collect())
    }

    async fn fetch_ticker(&self, pair: &CurrencyPair) -> Result<Ticker> {
        let product = SYMBOL.join(&pair.trading, &pair.settlement);
        self.public_get(
            &format!("/v1/ticker?product_code={}", product),
            "bitflyer ticker",
        )
        .await
    }

    /// Pair list for the next rate refresh, or `None` when the rate table is
    /// still fresh and no refresh will run. Read before the rate lock is taken.
    async fn pairs_for_refresh(&self) -> Result<Option<Vec<CurrencyPair>>> {
        if self.rates.is_fresh().await {
            return Ok(None);
        }
        self.currency_pairs().await.map(Some)
    }

    /// The rate table can expire between `pairs_for_refresh` and the refresh
    /// itself; the listing then comes straight from the exchange.
    async fn refresh_rates(&self, pairs: Option<Vec<CurrencyPair>>) -> Result<(RateMap, VolumeMap)> {
        let pairs = match pairs {
            Some(pairs) => pairs,
            None => self.fetch_currency_pairs().await?,
        };
        self.fetch_rates(pairs).await
    }

    async fn fetch_rates(&self, pairs: Vec<CurrencyPair>) -> Result<(RateMap, VolumeMap)> {
        let tickers = try_join_all(pairs.iter().map(|p| self.fetch_ticker(p))).await?;
        let mut rates = RateMap::new();
        let mut volumes = VolumeMap::new();
        for (pair, ticker) in pairs.iter().zip(tickers) {
            insert_pair(&mut rates, &pair.trading, &pair.settlement, ticker.ltp);
            insert_pair(&mut volumes, &pair.trading, &pair.settlement, ticker.volume_by_product);
        }
        Ok((rates, volumes))
    }
}

fn board_side(levels: Vec<BoardLevel>, side: OrderSide) -> Vec<BoardOrder> {
    levels
        .into_iter()
        .map(|l| BoardOrder {
            price: l.price,
            amount: l.size,
            side,
        })
        .collect()
}

#[async_trait]
impl PublicClient for BitflyerApi {
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
        let pairs = self.pairs_for_refresh().await?;
        self.rates.rate_map(|| self.refresh_rates(pairs)).await
    }

    async fn volume_map(&self) -> Result<VolumeMap> {
        let pairs = self.pairs_for_refresh().await?;
        self.rates.volume_map(|| self.refresh_rates(pairs)).await
    }

    async fn rate(&self, trading: &str, settlement: &str) -> Result<f64> {
        if trading.eq_ignore_ascii_case(settlement) {
            return Ok(1.0);
        }
        let pairs = self.pairs_for_refresh().await?;
        self.rates
            .rate(trading, settlement, || self.refresh_rates(pairs))
            .await
    }

    async fn volume(&self, trading: &str, settlement: &str) -> Result<f64> {
        let pairs = self.pairs_for_refresh().await?;
        self.rates
            .volume(trading, settlement, || self.refresh_rates(pairs))
            .await
    }

    async fn board(&self, trading: &str, settlement: &str) -> Result<Board> {
        let product = SYMBOL.join(trading, settlement);
        let resp: BoardResponse = self
            .public_get(&format!("/v1/board?product_code={}", product), "bitflyer board")
            .await?;
        Ok(Board {
            bids: board_side(resp.bids, OrderSide::Bid),
            asks: board_side(resp.asks, OrderSide::Ask),
        })
    }

    async fn frozen_currency(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}
