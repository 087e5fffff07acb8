//! Error types for the order API client and synchronizer.
//!
//! # Design
//! `NotFound` gets a dedicated variant because a missing order means the
//! session has to start over, while other unexpected statuses land in
//! `Server` with the raw status and body for debugging. `Validation` is
//! raised before any request is built.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed: connection refused, timeout, reset.
    #[error("network failure: {0}")]
    Network(String),

    /// The caller asked for something the API cannot express.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The server returned 404, the order or pizza does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned an unexpected status other than 404.
    #[error("HTTP {status}: {body}")]
    Server { status: u16, body: String },

    /// The response body could not be deserialized into an order.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A completion arrived for a ticket that is not outstanding.
    #[error("no outstanding request with ticket {0}")]
    UnknownTicket(u64),
}
