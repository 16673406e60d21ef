use hmac::{Hmac, Mac};
use sha2::Sha256;

use connectors_common::{ConnectorError, Result};

/// `ACCESS-SIGN`: hex HMAC-SHA256 over timestamp, method, path (with query)
/// and body, concatenated without separators.
pub(crate) fn sign(secret: &str, timestamp: &str, method: &str, path: &str, body: &str) -> Result<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|e| ConnectorError::Credentials(e.to_string()))?;
    mac.update(timestamp.as_bytes());
    mac.update(method.as_bytes());
    mac.update(path.as_bytes());
    mac.update(body.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_reference_hmac() {
        let sig = sign("key", "The quick ", "brown fox ", "jumps over ", "the lazy dog").unwrap();
        assert_eq!(
            sig,
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }
}
