use async_trait::async_trait;
use log::{info, warn};
use std::collections::HashMap;

use connectors_common::types::{
    insert_pair, ActiveOrder, Balances, CompleteBalance, CompleteBalances, FeeRate, FeeRates,
    OrderSide,
};
use connectors_common::{ConnectorError, PrivateClient, PublicClient, Result};

use crate::wire::{
    BalancesResponse, CancelResult, CompleteBalanceEntry, DepositAddresses, FeeInfo, OpenOrder,
    OrderPlaced, WithdrawResult,
};
use crate::{PoloniexApi, EXCHANGE, SYMBOL};

impl PoloniexApi {
    async fn fee_info(&self) -> Result<FeeInfo> {
        self.trading("returnFeeInfo", &[]).await
    }
}

#[async_trait]
impl PrivateClient for PoloniexApi {
    fn exchange_name(&self) -> &'static str {
        EXCHANGE
    }

    async fn balances(&self) -> Result<Balances> {
        let resp: BalancesResponse = self.trading("returnBalances", &[]).await?;
        Ok(resp
            .into_iter()
            .map(|(currency, amount)| (currency.to_uppercase(), amount.0))
            .collect())
    }

    async fn complete_balances(&self) -> Result<CompleteBalances> {
        let resp: HashMap<String, CompleteBalanceEntry> =
            self.trading("returnCompleteBalances", &[]).await?;
        Ok(resp
            .into_iter()
            .map(|(currency, b)| {
                let balance = CompleteBalance {
                    available: b.available,
                    on_orders: b.on_orders,
                };
                (currency.to_uppercase(), balance)
            })
            .collect())
    }

    async fn active_orders(&self) -> Result<Vec<ActiveOrder>> {
        let resp: HashMap<String, Vec<OpenOrder>> = self
            .trading("returnOpenOrders", &[("currencyPair", "all".to_string())])
            .await?;
        let mut markets: Vec<_> = resp.into_iter().filter(|(_, o)| !o.is_empty()).collect();
        markets.sort_by(|a, b| a.0.cmp(&b.0));

        let mut active = Vec::new();
        for (market, orders) in markets {
            let Some(pair) = SYMBOL.split(&market) else {
                warn!("poloniex: skipping orders on malformed market id {}", market);
                continue;
            };
            for order in orders {
                active.push(ActiveOrder {
                    exchange_order_id: order.order_number,
                    trading: pair.trading.clone(),
                    settlement: pair.settlement.clone(),
                    side: OrderSide::from_native(&order.side)?,
                    price: order.rate,
                    amount: order.amount,
                });
            }
        }
        Ok(active)
    }

    async fn order(
        &self,
        trading: &str,
        settlement: &str,
        side: OrderSide,
        price: f64,
        amount: f64,
    ) -> Result<String> {
        let command = match side {
            OrderSide::Bid => "buy",
            OrderSide::Ask => "sell",
        };
        let market = SYMBOL.join(trading, settlement);
        let placed: OrderPlaced = self
            .trading(
                command,
                &[
                    ("currencyPair", market.clone()),
                    ("rate", price.to_string()),
                    ("amount", amount.to_string()),
                ],
            )
            .await?;
        info!(
            "poloniex: placed {} {} {}@{} as {}",
            side, market, amount, price, placed.order_number
        );
        Ok(placed.order_number)
    }

    async fn cancel_order(&self, order_id: &str, market_symbol: &str) -> Result<()> {
        let result: CancelResult = self
            .trading(
                "cancelOrder",
                &[
                    ("orderNumber", order_id.to_string()),
                    ("currencyPair", market_symbol.to_uppercase()),
                ],
            )
            .await?;
        if result.success != 1.0 {
            return Err(ConnectorError::Api {
                exchange: EXCHANGE.to_string(),
                message: result
                    .message
                    .unwrap_or_else(|| format!("cancel of {} was not acknowledged", order_id)),
            });
        }
        Ok(())
    }

    /// Poloniex charges one maker/taker schedule across all markets.
    async fn trade_fee_rate(&self) -> Result<FeeRates> {
        let pairs = self.currency_pairs().await?;
        let info = self.fee_info().await?;
        let fee = FeeRate {
            maker_fee: info.maker_fee,
            taker_fee: info.taker_fee,
        };
        let mut fees = FeeRates::new();
        for pair in &pairs {
            insert_pair(&mut fees, &pair.trading, &pair.settlement, fee);
        }
        Ok(fees)
    }

    async fn purchase_fee_rate(&self) -> Result<f64> {
        Ok(self.fee_info().await?.taker_fee)
    }

    async fn sell_fee_rate(&self) -> Result<f64> {
        Ok(self.fee_info().await?.taker_fee)
    }

    async fn transfer_fee(&self) -> Result<HashMap<String, f64>> {
        Ok(self
            .currencies()
            .await?
            .into_iter()
            .map(|(currency, info)| (currency.to_uppercase(), info.tx_fee))
            .collect())
    }

    /// Poloniex deducts its own withdrawal fee, so `fee` is not sent.
    async fn transfer(&self, currency: &str, destination: &str, amount: f64, _fee: f64) -> Result<()> {
        let result: WithdrawResult = self
            .trading(
                "withdraw",
                &[
                    ("currency", currency.to_uppercase()),
                    ("amount", amount.to_string()),
                    ("address", destination.to_string()),
                ],
            )
            .await?;
        info!("poloniex: {}", result.response);
        Ok(())
    }

    async fn address(&self, currency: &str) -> Result<String> {
        let addresses: DepositAddresses = self.trading("returnDepositAddresses", &[]).await?;
        let currency = currency.to_uppercase();
        addresses
            .get(&currency)
            .cloned()
            .ok_or(ConnectorError::CurrencyNotFound { currency })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{client, TICKER};
    use connectors_common::testing::FakeTransport;
    use std::sync::Arc;

    fn form(body: &str) -> HashMap<String, String> {
        serde_urlencoded::from_str(body).unwrap()
    }

    #[tokio::test]
    async fn balances_and_complete_balances() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond(
            "command=returnBalances",
            r#"{"BTC": "4.12000000", "LTC": "3.31117268", "NXT": "0.00000000"}"#,
        )
        .respond(
            "command=returnCompleteBalances",
            r#"{"BTC": {"available": "4.12", "onOrders": "2.0", "btcValue": "6.12"},
                "LTC": {"available": "5.015", "onOrders": "1.0025", "btcValue": "0.078"}}"#,
        );
        let api = client(&fake);

        assert_eq!(api.balances().await.unwrap()["BTC"], 4.12);
        let complete = api.complete_balances().await.unwrap();
        assert_eq!(
            complete["BTC"],
            CompleteBalance { available: 4.12, on_orders: 2.0 }
        );
    }

    #[tokio::test]
    async fn trading_requests_are_signed_forms() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond("command=returnBalances", r#"{"BTC": "1"}"#);
        let api = client(&fake);
        api.balances().await.unwrap();
        api.balances().await.unwrap();

        let requests = fake.requests();
        let body = requests[1].body.clone().unwrap();
        let fields = form(&body);
        assert_eq!(fields["command"], "returnBalances");
        let first_nonce: u64 = form(requests[0].body.as_deref().unwrap())["nonce"].parse().unwrap();
        let second_nonce: u64 = fields["nonce"].parse().unwrap();
        assert!(second_nonce > first_nonce);

        let header = |name: &str| {
            requests[1]
                .headers
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        };
        assert_eq!(header("Key").as_deref(), Some("APIKEY"));
        assert_eq!(header("Sign"), Some(crate::auth::sign("SECRETKEY", &body).unwrap()));
    }

    #[tokio::test]
    async fn open_orders_across_markets() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond(
            "command=returnOpenOrders",
            r#"{"BTC_1CR": [],
                "BTC_ETH": [{"orderNumber": "120466", "type": "sell", "rate": "0.025",
                             "amount": "100", "total": "2.5"},
                            {"orderNumber": "120467", "type": "buy", "rate": "0.024",
                             "amount": "50", "total": "1.2"}]}"#,
        );
        let api = client(&fake);
        let orders = api.active_orders().await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].exchange_order_id, "120466");
        assert_eq!(orders[0].trading, "ETH");
        assert_eq!(orders[0].settlement, "BTC");
        assert_eq!(orders[0].side, OrderSide::Ask);
        assert_eq!(orders[1].side, OrderSide::Bid);
        assert_eq!(form(fake.requests()[0].body.as_deref().unwrap())["currencyPair"], "all");
    }

    #[tokio::test]
    async fn order_and_cancel() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond(
            "command=sell",
            r#"{"orderNumber": 31226040, "resultingTrades": []}"#,
        )
        .respond("command=cancelOrder", r#"{"success": 1}"#);
        let api = client(&fake);

        let id = api.order("ETH", "BTC", OrderSide::Ask, 0.031, 2.5).await.unwrap();
        assert_eq!(id, "31226040");
        let sent = form(fake.requests()[0].body.as_deref().unwrap());
        assert_eq!(sent["currencyPair"], "BTC_ETH");
        assert_eq!(sent["rate"], "0.031");
        assert_eq!(sent["amount"], "2.5");

        api.cancel_order(&id, "BTC_ETH").await.unwrap();
        let cancel = form(fake.requests()[1].body.as_deref().unwrap());
        assert_eq!(cancel["orderNumber"], "31226040");
    }

    #[tokio::test]
    async fn unacknowledged_cancel_is_an_error() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond("command=cancelOrder", r#"{"success": 0, "message": "Invalid order number"}"#);
        let api = client(&fake);
        let err = api.cancel_order("1", "BTC_ETH").await.unwrap_err();
        assert_eq!(err.to_string(), "poloniex api error: Invalid order number");
    }

    #[tokio::test]
    async fn fee_schedule_applies_to_every_market() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond("command=returnTicker", TICKER).respond(
            "command=returnFeeInfo",
            r#"{"makerFee": "0.0014", "takerFee": "0.0024",
                "thirtyDayVolume": "612.00248891", "nextTier": "1200.00000000"}"#,
        );
        let api = client(&fake);

        let fees = api.trade_fee_rate().await.unwrap();
        assert_eq!(fees["ETH"]["BTC"], FeeRate { maker_fee: 0.0014, taker_fee: 0.0024 });
        assert_eq!(fees["BTC"]["USDT"].maker_fee, 0.0014);
        assert_eq!(api.purchase_fee_rate().await.unwrap(), 0.0024);
        assert_eq!(api.sell_fee_rate().await.unwrap(), 0.0024);
    }

    #[tokio::test]
    async fn transfer_fee_transfer_and_address() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond(
            "command=returnCurrencies",
            r#"{"BTC": {"txFee": "0.0005", "disabled": 0, "frozen": 0},
                "ETH": {"txFee": "0.005", "disabled": 0, "frozen": 0}}"#,
        )
        .respond("command=withdraw", r#"{"response": "Withdrew 0.5 BTC."}"#)
        .respond(
            "command=returnDepositAddresses",
            r#"{"BTC": "19YqztHmspv2egyD6jQM3yn81x5t5krVdJ"}"#,
        );
        let api = client(&fake);

        assert_eq!(api.transfer_fee().await.unwrap()["ETH"], 0.005);

        api.transfer("btc", "1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2", 0.5, 0.0005)
            .await
            .unwrap();
        let withdraw = form(fake.last_request().unwrap().body.as_deref().unwrap());
        assert_eq!(withdraw["currency"], "BTC");
        assert_eq!(withdraw["address"], "1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2");

        assert_eq!(api.address("btc").await.unwrap(), "19YqztHmspv2egyD6jQM3yn81x5t5krVdJ");
        assert!(api.address("XMR").await.unwrap_err().is_lookup_failure());
    }

    #[tokio::test]
    async fn account_without_addresses_reports_missing_currency() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond("command=returnDepositAddresses", "[]");
        let api = client(&fake);
        let err = api.address("BTC").await.unwrap_err();
        assert!(matches!(err, ConnectorError::CurrencyNotFound { ref currency } if currency == "BTC"));

        fake.respond("command=returnDepositAddresses", r#"["19YqztHmspv2egyD6jQM3yn81x5t5krVdJ"]"#);
        assert!(matches!(
            api.address("BTC").await.unwrap_err(),
            ConnectorError::Parse { .. }
        ));
    }

    #[tokio::test]
    async fn rejected_key_surfaces_as_api_error() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond("command=returnBalances", r#"{"error": "Invalid API key/secret pair."}"#);
        let api = client(&fake);
        assert!(matches!(
            api.balances().await.unwrap_err(),
            ConnectorError::Api { .. }
        ));
    }
}
