//! Error types for the query client.

/// Query client errors.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Request construction or network failure talking to the endpoint.
    #[error("network error: {message}")]
    Network { message: String },

    /// Endpoint answered with a non-success status.
    #[error("upstream returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Malformed result document or corrupted cached payload.
    #[error("decode error: {message}")]
    Decode { message: String },

    /// Cache store failure. A missing entry is never reported this way.
    #[error("cache store error: {message}")]
    Store { message: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl QueryError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 1,

            // Network/transient
            Self::Network { .. } => 5,
            Self::Upstream { .. } => 5,

            // Data
            Self::Decode { .. } => 6,
            Self::Store { .. } => 6,
        }
    }

    /// Whether the error came from talking to the endpoint.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Upstream { .. })
    }

    pub(crate) fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    pub(crate) fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;
