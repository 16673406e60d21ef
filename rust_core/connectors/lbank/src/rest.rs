use async_trait::async_trait;
use log::warn;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use connectors_common::cache::{CurrencyPairCache, RateCache};
use connectors_common::num::{from_slice, Level};
use connectors_common::symbol::{LegOrder, SymbolFormat};
use connectors_common::types::{
    insert_pair, Board, BoardOrder, CurrencyPair, OrderSide, RateMap, VolumeMap,
};
use connectors_common::{ApiRequest, ClientConfig, HttpTransport, PublicClient, Result, Transport};

use crate::wire::{Depth, TickerEntry};
use crate::{EXCHANGE, LBANK_BASE_URL};

const SYMBOL: SymbolFormat = SymbolFormat::new('_', LegOrder::TradingFirst, true);

pub struct LbankApi {
    base_url: String,
    transport: Arc<dyn Transport>,
    rates: RateCache,
    pairs: CurrencyPairCache,
}

impl LbankApi {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.http_timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: &ClientConfig, transport: Arc<dyn Transport>) -> Self {
        LbankApi {
            base_url: config.base_url_or(LBANK_BASE_URL),
            transport,
            rates: RateCache::new(EXCHANGE, config.rate_cache_duration()),
            pairs: CurrencyPairCache::new(EXCHANGE, config.currency_pairs_cache_duration()),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, context: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let body = self.transport.execute(ApiRequest::get(url)).await?;
        from_slice(context, &body)
    }

    async fn fetch_currency_pairs(&self) -> Result<Vec<CurrencyPair>> {
        let symbols: Vec<String> = self.get("/v1/currencyPairs.do", "lbank currency pairs").await?;
        Ok(symbols
            .iter()
            .filter_map(|symbol| {
                let pair = SYMBOL.split(symbol);
                if pair.is_none() {
                    warn!("lbank: skipping malformed symbol {}", symbol);
                }
                pair
            })
            .collect())
    }

    async fn fetch_rates(&self) -> Result<(RateMap, VolumeMap)> {
        let entries: Vec<TickerEntry> = self.get("/v1/ticker.do?symbol=all", "lbank ticker").await?;
        let mut rates = RateMap::new();
        let mut volumes = VolumeMap::new();
        for entry in &entries {
            let Some(pair) = SYMBOL.split(&entry.symbol) else {
                warn!("lbank: skipping malformed symbol {}", entry.symbol);
                continue;
            };
            insert_pair(&mut rates, &pair.trading, &pair.settlement, entry.ticker.latest);
            insert_pair(&mut volumes, &pair.trading, &pair.settlement, entry.ticker.vol);
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
impl PublicClient for LbankApi {
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
        let path = format!("/v1/depth.do?symbol={}", SYMBOL.join(trading, settlement));
        let depth: Depth = self.get(&path, "lbank depth").await?;
        Ok(Board {
            bids: board_side(depth.bids, OrderSide::Bid),
            asks: board_side(depth.asks, OrderSide::Ask),
        })
    }

    async fn frozen_currency(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}
