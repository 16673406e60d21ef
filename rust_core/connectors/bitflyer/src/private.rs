use async_trait::async_trait;
use futures::future::try_join_all;
use log::{info, warn};
use std::collections::HashMap;

use connectors_common::num::from_slice;
use connectors_common::types::{
    insert_pair, ActiveOrder, Balances, CompleteBalance, CompleteBalances, FeeRate, FeeRates,
    OrderSide,
};
use connectors_common::{ConnectorError, PrivateClient, PublicClient, Result};

use crate::wire::{BalanceEntry, CancelChildOrder, ChildOrder, Commission, OrderAccepted, SendChildOrder};
use crate::{BitflyerApi, EXCHANGE, SYMBOL};

/// Withdrawal fees published by bitFlyer. There is no endpoint for them.
const WITHDRAWAL_FEES: &[(&str, f64)] = &[
    ("BTC", 0.0004),
    ("BCH", 0.0002),
    ("ETH", 0.005),
    ("ETC", 0.005),
    ("LTC", 0.001),
    ("MONA", 0.001),
    ("LSK", 0.1),
];

/// Product whose commission stands in for buy and sell fees.
const REFERENCE_PRODUCT: &str = "BTC_JPY";

fn native_side(side: OrderSide) -> &'static str {
    match side {
        OrderSide::Bid => "BUY",
        OrderSide::Ask => "SELL",
    }
}

impl BitflyerApi {
    async fn balance_entries(&self) -> Result<Vec<BalanceEntry>> {
        self.private_get("/v1/me/getbalance", "bitflyer balances").await
    }

    async fn commission(&self, product_code: &str) -> Result<f64> {
        let resp: Commission = self
            .private_get(
                &format!("/v1/me/gettradingcommission?product_code={}", product_code),
                "bitflyer commission",
            )
            .await?;
        Ok(resp.commission_rate)
    }

    async fn commission_for(&self, trading: &str, settlement: &str) -> Result<f64> {
        self.commission(&SYMBOL.join(trading, settlement)).await
    }
}

#[async_trait]
impl PrivateClient for BitflyerApi {
    fn exchange_name(&self) -> &'static str {
        EXCHANGE
    }

    async fn balances(&self) -> Result<Balances> {
        Ok(self
            .balance_entries()
            .await?
            .into_iter()
            .map(|b| (b.currency_code.to_uppercase(), b.available))
            .collect())
    }

    async fn complete_balances(&self) -> Result<CompleteBalances> {
        Ok(self
            .balance_entries()
            .await?
            .into_iter()
            .map(|b| {
                let balance = CompleteBalance {
                    available: b.available,
                    on_orders: b.amount - b.available,
                };
                (b.currency_code.to_uppercase(), balance)
            })
            .collect())
    }

    async fn active_orders(&self) -> Result<Vec<ActiveOrder>> {
        let orders: Vec<ChildOrder> = self
            .private_get(
                "/v1/me/getchildorders?child_order_state=ACTIVE",
                "bitflyer child orders",
            )
            .await?;
        let mut active = Vec::with_capacity(orders.len());
        for order in orders {
            let Some(pair) = SYMBOL.split(&order.product_code) else {
                warn!("bitflyer: skipping order on non-spot market {}", order.product_code);
                continue;
            };
            active.push(ActiveOrder {
                exchange_order_id: order.child_order_acceptance_id,
                trading: pair.trading,
                settlement: pair.settlement,
                side: OrderSide::from_native(&order.side)?,
                price: order.price,
                amount: order.outstanding_size,
            });
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
        let product_code = SYMBOL.join(trading, settlement);
        let body = serde_json::to_string(&SendChildOrder {
            product_code: &product_code,
            child_order_type: "LIMIT",
            side: native_side(side),
            price,
            size: amount,
        })
        .map_err(|e| ConnectorError::parse("bitflyer order request", e))?;
        let resp = self.private_request("/v1/me/sendchildorder", Some(body)).await?;
        let accepted: OrderAccepted = from_slice("bitflyer order", &resp)?;
        info!(
            "bitflyer: placed {} {} {}@{} as {}",
            side, product_code, amount, price, accepted.child_order_acceptance_id
        );
        Ok(accepted.child_order_acceptance_id)
    }

    async fn cancel_order(&self, order_id: &str, market_symbol: &str) -> Result<()> {
        let body = serde_json::to_string(&CancelChildOrder {
            product_code: market_symbol,
            child_order_acceptance_id: order_id,
        })
        .map_err(|e| ConnectorError::parse("bitflyer cancel request", e))?;
        // Success is an empty 200 body.
        self.private_request("/v1/me/cancelchildorder", Some(body))
            .await?;
        Ok(())
    }

    async fn trade_fee_rate(&self) -> Result<FeeRates> {
        let pairs = self.currency_pairs().await?;
        let commissions = try_join_all(
            pairs
                .iter()
                .map(|p| self.commission_for(&p.trading, &p.settlement)),
        )
        .await?;
        let mut fees = FeeRates::new();
        for (pair, rate) in pairs.iter().zip(commissions) {
            let fee = FeeRate {
                maker_fee: rate,
                taker_fee: rate,
            };
            insert_pair(&mut fees, &pair.trading, &pair.settlement, fee);
        }
        Ok(fees)
    }

    async fn purchase_fee_rate(&self) -> Result<f64> {
        self.commission(REFERENCE_PRODUCT).await
    }

    async fn sell_fee_rate(&self) -> Result<f64> {
        self.commission(REFERENCE_PRODUCT).await
    }

    async fn transfer_fee(&self) -> Result<HashMap<String, f64>> {
        Ok(WITHDRAWAL_FEES
            .iter()
            .map(|(currency, fee)| (currency.to_string(), *fee))
            .collect())
    }

    async fn transfer(&self, _currency: &str, _destination: &str, _amount: f64, _fee: f64) -> Result<()> {
        Err(ConnectorError::not_implemented(EXCHANGE, "transfer"))
    }

    async fn address(&self, _currency: &str) -> Result<String> {
        Err(ConnectorError::not_implemented(EXCHANGE, "address"))
    }
}
