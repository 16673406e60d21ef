//! An in-memory `Transport` for adapter tests: canned responses keyed by a
//! substring of the request, plus a log of every request received.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::errors::{ConnectorError, Result};
use crate::transport::{ApiRequest, Transport};

#[derive(Debug, Clone)]
enum Reply {
    Body(String),
    Status(u16, String),
    Network(String),
}

#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<Vec<(String, Reply)>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, pattern: &str, reply: Reply) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .push((pattern.to_string(), reply));
        self
    }

    /// Answers requests whose URL or body contains `pattern` with `body`.
    /// Routes added later take precedence.
    pub fn respond(&self, pattern: &str, body: &str) -> &Self {
        self.push(pattern, Reply::Body(body.to_string()))
    }

    pub fn fail_status(&self, pattern: &str, status: u16, body: &str) -> &Self {
        self.push(pattern, Reply::Status(status, body.to_string()))
    }

    pub fn fail_network(&self, pattern: &str) -> &Self {
        self.push(pattern, Reply::Network("connection refused".to_string()))
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn count_matching(&self, pattern: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| matches(r, pattern))
            .count()
    }

    pub fn last_request(&self) -> Option<ApiRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

fn matches(request: &ApiRequest, pattern: &str) -> bool {
    request.url.contains(pattern)
        || request
            .body
            .as_deref()
            .map_or(false, |body| body.contains(pattern))
}

#[async_trait]
impl Transport for FakeTransport {
    async fn execute(&self, request: ApiRequest) -> Result<Vec<u8>> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .routes
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(pattern, _)| matches(&request, pattern))
            .map(|(_, reply)| reply.clone());

        let endpoint = request.endpoint().to_string();
        match reply {
            Some(Reply::Body(body)) => Ok(body.into_bytes()),
            Some(Reply::Status(status, body)) => Err(ConnectorError::Status {
                endpoint,
                status,
                body,
            }),
            Some(Reply::Network(message)) => Err(ConnectorError::Network { endpoint, message }),
            None => Err(ConnectorError::Network {
                endpoint,
                message: "no fake route".to_string(),
            }),
        }
    }
}
