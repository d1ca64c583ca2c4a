//! Transport failure taxonomy.

use thiserror::Error;

/// Errors raised by the transport client.
///
/// The retryable subset (connection, timeout, HTTP 429/5xx) is transient
/// network trouble; everything else is permanent and fails after the first
/// attempt.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Non-success HTTP status from the provider.
    #[error("HTTP {status} from catalog endpoint")]
    Http { status: u16 },

    /// The attempt exceeded its hard timeout.
    #[error("catalog request timed out")]
    Timeout,

    /// Connection-level failure (reset, DNS, TLS).
    #[error("connection error: {0}")]
    Connection(String),

    /// The provider answered with a GraphQL error payload.
    #[error("GraphQL error: {0}")]
    GraphQl(String),

    /// The response body was not the expected JSON shape.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// The HTTP client could not be constructed.
    #[error("client init error: {0}")]
    Init(String),
}

impl TransportError {
    /// Whether this failure class is worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Connection(_) => true,
            Self::Http { status } => *status == 429 || (500..600).contains(status),
            Self::GraphQl(_) | Self::Deserialization(_) | Self::Init(_) => false,
        }
    }
}
