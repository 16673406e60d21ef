//! LBank adapter, market data only. Market ids are lower-case with the
//! trading leg first, e.g. `eth_btc`.

pub mod rest;
mod wire;

pub use rest::LbankApi;

pub const LBANK_BASE_URL: &str = "https://api.lbkex.com";
pub const EXCHANGE: &str = "lbank";
