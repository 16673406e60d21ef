use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConnectorError>;

#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("network error fetching {endpoint}: {message}")]
    Network { endpoint: String, message: String },

    #[error("{endpoint} returned status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("parse error in {context}: {message}")]
    Parse { context: String, message: String },

    #[error("{exchange} api error: {message}")]
    Api { exchange: String, message: String },

    #[error("currency pair not found: {trading}/{settlement}")]
    PairNotFound { trading: String, settlement: String },

    #[error("currency not found: {currency}")]
    CurrencyNotFound { currency: String },

    #[error("{operation} is not implemented for {exchange}")]
    NotImplemented {
        exchange: &'static str,
        operation: &'static str,
    },

    #[error("unknown exchange: {0}")]
    UnknownExchange(String),

    #[error("invalid credentials: {0}")]
    Credentials(String),
}

impl ConnectorError {
    pub fn parse(context: impl Into<String>, message: impl ToString) -> Self {
        ConnectorError::Parse {
            context: context.into(),
            message: message.to_string(),
        }
    }

    pub fn not_implemented(exchange: &'static str, operation: &'static str) -> Self {
        ConnectorError::NotImplemented { exchange, operation }
    }

    pub fn is_not_implemented(&self) -> bool {
        matches!(self, ConnectorError::NotImplemented { .. })
    }

    /// True when the requested market or currency is absent, as opposed to
    /// the exchange being unreachable.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            ConnectorError::PairNotFound { .. } | ConnectorError::CurrencyNotFound { .. }
        )
    }

    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ConnectorError::Network { .. } | ConnectorError::Status { .. }
        )
    }
}
