//! Shared building blocks for the exchange connectors: the canonical data
//! model, the error taxonomy, the client traits every adapter implements,
//! the HTTP fetch collaborator and the two TTL caches.

pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod num;
pub mod symbol;
pub mod transport;
pub mod types;

#[cfg(any(test, feature = "testkit"))]
pub mod testing;

pub use client::{PrivateClient, PublicClient};
pub use config::ClientConfig;
pub use errors::{ConnectorError, Result};
pub use transport::{ApiRequest, Credentials, HttpTransport, Method, Transport};
