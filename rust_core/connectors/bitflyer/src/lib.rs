//! bitFlyer adapter. Market ids look like `BTC_JPY`, trading leg first.
//! bitFlyer has no all-tickers endpoint, so a rate refresh fans out one
//! ticker request per listed pair and commits only if every one succeeds.

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
    ApiRequest, ClientConfig, ConnectorError, Credentials, HttpTransport, Method, Result, Transport,
};

pub const BITFLYER_BASE_URL: &str = "https://api.bitflyer.com";
pub const EXCHANGE: &str = "bitflyer";

pub(crate) const SYMBOL: SymbolFormat = SymbolFormat::new('_', LegOrder::TradingFirst, false);

pub struct BitflyerApi {
    base_url: String,
    transport: Arc<dyn Transport>,
    credentials: Option<Credentials>,
    rates: RateCache,
    pairs: CurrencyPairCache,
}

impl BitflyerApi {
    /// Public-only client over HTTP.
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
        BitflyerApi {
            base_url: config.base_url_or(BITFLYER_BASE_URL),
            transport,
            credentials,
            rates: RateCache::new(EXCHANGE, config.rate_cache_duration()),
            pairs: CurrencyPairCache::new(EXCHANGE, config.currency_pairs_cache_duration()),
        }
    }

    async fn public_get<T: DeserializeOwned>(&self, path: &str, context: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let body = self.transport.execute(ApiRequest::get(url)).await?;
        from_slice(context, &body)
    }

    /// Signs and sends a private request. `body` turns it into a JSON POST.
    async fn private_request(&self, path: &str, body: Option<String>) -> Result<Vec<u8>> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            ConnectorError::Credentials("bitflyer private endpoints need an api key".to_string())
        })?;
        let method = if body.is_some() { Method::Post } else { Method::Get };
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = auth::sign(
            &credentials.api_secret,
            &timestamp,
            &method.to_string(),
            path,
            body.as_deref().unwrap_or(""),
        )?;

        let url = format!("{}{}", self.base_url, path);
        let request = match body {
            Some(body) => ApiRequest::post(url, body).header("Content-Type", "application/json"),
            None => ApiRequest::get(url),
        };
        let request = request
            .header("ACCESS-KEY", &credentials.api_key)
            .header("ACCESS-TIMESTAMP", timestamp)
            .header("ACCESS-SIGN", signature);
        self.transport.execute(request).await
    }

    async fn private_get<T: DeserializeOwned>(&self, path: &str, context: &str) -> Result<T> {
        let body = self.private_request(path, None).await?;
        from_slice(context, &body)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use connectors_common::testing::FakeTransport;

    pub fn client(fake: &Arc<FakeTransport>) -> BitflyerApi {
        let config = ClientConfig {
            base_url: Some("http://localhost:4243".to_string()),
            ..ClientConfig::default()
        };
        BitflyerApi::with_transport(
            &config,
            fake.clone(),
            Some(Credentials::new("APIKEY", "SECRETKEY")),
        )
    }
}
