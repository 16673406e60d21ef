use async_trait::async_trait;

use crate::errors::Result;
use crate::types::{
    ActiveOrder, Balances, Board, CompleteBalances, CurrencyPair, FeeRates, OrderSide, RateMap,
    VolumeMap,
};
use std::collections::HashMap;

/// Market data every adapter exposes. Calling code is written against this
/// trait and never against a concrete exchange.
#[async_trait]
pub trait PublicClient: Send + Sync {
    fn exchange_name(&self) -> &'static str;

    async fn currency_pairs(&self) -> Result<Vec<CurrencyPair>>;

    /// Settlement currencies of `currency_pairs`, deduplicated in first-seen order.
    async fn settlements(&self) -> Result<Vec<String>>;

    async fn rate_map(&self) -> Result<RateMap>;

    async fn volume_map(&self) -> Result<VolumeMap>;

    async fn rate(&self, trading: &str, settlement: &str) -> Result<f64>;

    async fn volume(&self, trading: &str, settlement: &str) -> Result<f64>;

    /// Fresh order book snapshot; never served from cache.
    async fn board(&self, trading: &str, settlement: &str) -> Result<Board>;

    /// Currencies the exchange has currently suspended.
    async fn frozen_currency(&self) -> Result<Vec<String>>;
}

/// Account operations. Each call is one authenticated request; nothing is
/// cached. Capabilities an exchange lacks fail with `NotImplemented`.
#[async_trait]
pub trait PrivateClient: Send + Sync {
    fn exchange_name(&self) -> &'static str;

    async fn balances(&self) -> Result<Balances>;

    async fn complete_balances(&self) -> Result<CompleteBalances>;

    /// Open orders on spot markets. Orders on products that are not a
    /// currency pair (futures, FX) are left out of the list and logged.
    async fn active_orders(&self) -> Result<Vec<ActiveOrder>>;

    /// Places a limit order and returns the exchange's order id.
    async fn order(
        &self,
        trading: &str,
        settlement: &str,
        side: OrderSide,
        price: f64,
        amount: f64,
    ) -> Result<String>;

    /// `market_symbol` is the exchange's native market id, e.g. `BTC_JPY`.
    async fn cancel_order(&self, order_id: &str, market_symbol: &str) -> Result<()>;

    async fn trade_fee_rate(&self) -> Result<FeeRates>;

    async fn purchase_fee_rate(&self) -> Result<f64>;

    async fn sell_fee_rate(&self) -> Result<f64>;

    /// Withdrawal fee per currency.
    async fn transfer_fee(&self) -> Result<HashMap<String, f64>>;

    async fn transfer(&self, currency: &str, destination: &str, amount: f64, fee: f64) -> Result<()>;

    async fn address(&self, currency: &str) -> Result<String>;
}
