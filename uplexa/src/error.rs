//! Error taxonomy for wallet operations.
//!
//! Every failure a caller can observe falls into one of a few buckets:
//! transport failures reaching the daemon, errors the daemon itself
//! reported, operations the configured backend cannot perform, and
//! inputs rejected locally before any round-trip.

use crate::address::AddressError;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, WalletError>;

#[derive(Debug, Error)]
pub enum WalletError {
    /// Network-level failure reaching the daemon (connection refused,
    /// timeout, non-2xx HTTP status). Never retried.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The daemon processed the request but reported a failure. Code and
    /// message are carried verbatim.
    #[error("wallet rpc error (method {method}) code={code} message={message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },

    /// Operation requires daemon state which this backend does not have.
    #[error("operation {0} is not supported by this backend")]
    Unsupported(&'static str),

    /// Input rejected locally, before any network call was attempted.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Malformed address text.
    #[error("invalid address: {0}")]
    Address(#[from] AddressError),

    /// A response that does not match the daemon's documented schema.
    #[error("unexpected daemon response: {0}")]
    Decode(String),

    /// Endpoint URL could not be constructed from the configuration.
    #[error("url parse: {0}")]
    Url(#[from] url::ParseError),
}
