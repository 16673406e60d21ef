//! Poloniex adapter. Market ids put the settlement leg first: `BTC_ETH` is
//! ETH priced in BTC. The whole ticker table comes back from one request.

mod auth;
pub mod private;
pub mod rest;
mod wire;

use serde::de::DeserializeOwned;
use std::sync::Arc;

use connectors_common::cache::{CurrencyPairCache, RateCache};
use connectors_common::num::from_slice;
use connectors_common::symbol::{LegOrder, SymbolFormat};
use connectors_common::{
    ApiRequest, ClientConfig, ConnectorError, Credentials, HttpTransport, Result, Transport,
};

use crate::auth::Nonce;
use crate::wire::ErrorBody;

pub const POLONIEX_BASE_URL: &str = "https://poloniex.com";
pub const EXCHANGE: &str = "poloniex";

pub(crate) const SYMBOL: SymbolFormat = SymbolFormat::new('_', LegOrder::SettlementFirst, false);

pub struct PoloniexApi {
    base_url: String,
    board_depth: u32,
    transport: Arc<dyn Transport>,
    credentials: Option<Credentials>,
    nonce: Nonce,
    rates: RateCache,
    pairs: CurrencyPairCache,
}

/// Poloniex reports failures as `{"error": "..."}`, often with status 200.
fn decode<T: DeserializeOwned>(context: &str, body: &[u8]) -> Result<T> {
    if let Ok(err) = serde_json::from_slice::<ErrorBody>(body) {
        return Err(ConnectorError::Api {
            exchange: EXCHANGE.to_string(),
            message: err.error,
        });
    }
    from_slice(context, body)
}

impl PoloniexApi {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.http_timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport), None))
    }

    pub fn with_credentials(config: &ClientConfig, credentials: Credentials) -> Result<Self> {
        let transport = HttpTransport::new(config.http_timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport), Some(credentials)))
    }

    pub fn with_transport(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        credentials: Option<Credentials>,
    ) -> Self {
        PoloniexApi {
            base_url: config.base_url_or(POLONIEX_BASE_URL),
            board_depth: config.board_depth,
            transport,
            credentials,
            nonce: Nonce::default(),
            rates: RateCache::new(EXCHANGE, config.rate_cache_duration()),
            pairs: CurrencyPairCache::new(EXCHANGE, config.currency_pairs_cache_duration()),
        }
    }

    async fn public_get<T: DeserializeOwned>(&self, query: &str, context: &str) -> Result<T> {
        let url = format!("{}/public?{}", self.base_url, query);
        let body = self.transport.execute(ApiRequest::get(url)).await?;
        decode(context, &body)
    }

    /// Sends a signed `tradingApi` command with extra form parameters.
    async fn trading<T: DeserializeOwned>(&self, command: &str, params: &[(&str, String)]) -> Result<T> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            ConnectorError::Credentials("poloniex trading api needs an api key".to_string())
        })?;

        let mut form: Vec<(&str, String)> = vec![
            ("command", command.to_string()),
            ("nonce", self.nonce.next().to_string()),
        ];
        form.extend(params.iter().cloned());
        let body = serde_urlencoded::to_string(&form)
            .map_err(|e| ConnectorError::parse("poloniex form", e))?;
        let signature = auth::sign(&credentials.api_secret, &body)?;

        let request = ApiRequest::post(format!("{}/tradingApi", self.base_url), body)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Key", &credentials.api_key)
            .header("Sign", signature);
        let resp = self.transport.execute(request).await?;
        decode(&format!("poloniex {}", command), &resp)
    }
}
