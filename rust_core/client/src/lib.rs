//! Builds an exchange adapter from its name. Callers hold the result as a
//! `PublicClient` or `PrivateClient` and never name a concrete exchange.

use log::info;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use connector_bitflyer::BitflyerApi;
use connector_lbank::LbankApi;
use connector_poloniex::PoloniexApi;

pub use connectors_common::types;
pub use connectors_common::{
    ClientConfig, ConnectorError, Credentials, PrivateClient, PublicClient, Result, Transport,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Exchange {
    Bitflyer,
    Poloniex,
    Lbank,
}

impl Exchange {
    pub const ALL: [Exchange; 3] = [Exchange::Bitflyer, Exchange::Poloniex, Exchange::Lbank];

    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Bitflyer => connector_bitflyer::EXCHANGE,
            Exchange::Poloniex => connector_poloniex::EXCHANGE,
            Exchange::Lbank => connector_lbank::EXCHANGE,
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Exchange {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        Exchange::ALL
            .into_iter()
            .find(|e| e.as_str() == name)
            .ok_or_else(|| ConnectorError::UnknownExchange(s.to_string()))
    }
}

impl TryFrom<String> for Exchange {
    type Error = ConnectorError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

pub fn new_public_client(name: &str) -> Result<Box<dyn PublicClient>> {
    new_public_client_with_config(name, &ClientConfig::default())
}

pub fn new_public_client_with_config(name: &str, config: &ClientConfig) -> Result<Box<dyn PublicClient>> {
    let exchange: Exchange = name.parse()?;
    info!("creating {} public client", exchange);
    Ok(match exchange {
        Exchange::Bitflyer => Box::new(BitflyerApi::new(config)?),
        Exchange::Poloniex => Box::new(PoloniexApi::new(config)?),
        Exchange::Lbank => Box::new(LbankApi::new(config)?),
    })
}

pub fn new_private_client(name: &str, api_key: &str, api_secret: &str) -> Result<Box<dyn PrivateClient>> {
    new_private_client_with_config(name, api_key, api_secret, &ClientConfig::default())
}

pub fn new_private_client_with_config(
    name: &str,
    api_key: &str,
    api_secret: &str,
    config: &ClientConfig,
) -> Result<Box<dyn PrivateClient>> {
    let exchange: Exchange = name.parse()?;
    let credentials = Credentials::new(api_key, api_secret);
    info!("creating {} private client", exchange);
    match exchange {
        Exchange::Bitflyer => Ok(Box::new(BitflyerApi::with_credentials(config, credentials)?)),
        Exchange::Poloniex => Ok(Box::new(PoloniexApi::with_credentials(config, credentials)?)),
        Exchange::Lbank => Err(ConnectorError::not_implemented(
            connector_lbank::EXCHANGE,
            "private client",
        )),
    }
}

/// Like `new_public_client_with_config` but over a caller-supplied transport.
pub fn public_client_with_transport(
    exchange: Exchange,
    config: &ClientConfig,
    transport: Arc<dyn Transport>,
) -> Box<dyn PublicClient> {
    match exchange {
        Exchange::Bitflyer => Box::new(BitflyerApi::with_transport(config, transport, None)),
        Exchange::Poloniex => Box::new(PoloniexApi::with_transport(config, transport, None)),
        Exchange::Lbank => Box::new(LbankApi::with_transport(config, transport)),
    }
}

pub fn private_client_with_transport(
    exchange: Exchange,
    config: &ClientConfig,
    transport: Arc<dyn Transport>,
    credentials: Credentials,
) -> Result<Box<dyn PrivateClient>> {
    match exchange {
        Exchange::Bitflyer => Ok(Box::new(BitflyerApi::with_transport(
            config,
            transport,
            Some(credentials),
        ))),
        Exchange::Poloniex => Ok(Box::new(PoloniexApi::with_transport(
            config,
            transport,
            Some(credentials),
        ))),
        Exchange::Lbank => Err(ConnectorError::not_implemented(
            connector_lbank::EXCHANGE,
            "private client",
        )),
    }
}
