use hmac::{Hmac, Mac};
use sha2::Sha512;
use std::sync::atomic::{AtomicU64, Ordering};

use connectors_common::{ConnectorError, Result};

/// `Sign` header: hex HMAC-SHA512 of the url-encoded form body.
pub(crate) fn sign(secret: &str, body: &str) -> Result<String> {
    let mut mac = Hmac::<Sha512>::new_from_slice(secret.as_bytes())
        .map_err(|e| ConnectorError::Credentials(e.to_string()))?;
    mac.update(body.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Poloniex rejects a nonce that is not larger than the previous one.
#[derive(Default)]
pub(crate) struct Nonce(AtomicU64);

impl Nonce {
    pub fn next(&self) -> u64 {
        let now = chrono::Utc::now().timestamp_micros().max(0) as u64;
        let step = |prev: u64| now.max(prev + 1);
        match self
            .0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |prev| Some(step(prev)))
        {
            Ok(prev) | Err(prev) => step(prev),
        }
    }
}
