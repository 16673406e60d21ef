use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::fmt;
use std::time::Duration;

use crate::errors::{ConnectorError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

/// A fully prepared request. Adapters sign it before handing it over, so
/// the transport never needs to know about credentials.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        ApiRequest {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        ApiRequest {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body.into()),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// The URL without its query string, used to label errors.
    pub fn endpoint(&self) -> &str {
        self.url.split('?').next().unwrap_or(&self.url)
    }
}

/// The HTTP fetch collaborator. Returns the raw body of a 2xx response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<Vec<u8>>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConnectorError::Network {
                endpoint: "client builder".to_string(),
                message: e.to_string(),
            })?;
        Ok(HttpTransport { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<Vec<u8>> {
        let endpoint = request.endpoint().to_string();
        debug!("{} {}", request.method, endpoint);

        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let network = |e: reqwest::Error| ConnectorError::Network {
            endpoint: endpoint.clone(),
            message: e.to_string(),
        };
        let resp = builder.send().await.map_err(network)?;
        let status = resp.status();
        let body = resp.bytes().await.map_err(network)?;
        if !status.is_success() {
            return Err(ConnectorError::Status {
                endpoint,
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok(body.to_vec())
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Credentials {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_requests() {
        let req = ApiRequest::post("https://poloniex.com/tradingApi?x=1", "command=returnBalances")
            .header("Key", "abc");
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.endpoint(), "https://poloniex.com/tradingApi");
        assert_eq!(req.headers, vec![("Key".to_string(), "abc".to_string())]);
        assert_eq!(req.body.as_deref(), Some("command=returnBalances"));
    }

    #[test]
    fn secret_is_not_printed() {
        let creds = Credentials::new("key", "very-secret");
        let printed = format!("{:?}", creds);
        assert!(printed.contains("key"));
        assert!(!printed.contains("very-secret"));
    }

    #[tokio::test]
    async fn connection_failure_is_a_network_error() {
        let transport = HttpTransport::new(Duration::from_millis(200)).unwrap();
        let err = transport
            .execute(ApiRequest::get("http://127.0.0.1:1/v1/ticker"))
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }
}
