//! Error types shared across the service.

use thiserror::Error;

/// Errors returned by an [`LlmGateway`](crate::LlmGateway).
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway is misconfigured (missing key, bad client setup).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request never reached the model or the connection dropped.
    #[error("network error: {0}")]
    Network(String),

    /// The model API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response arrived but lacked the fields the caller needs.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Errors returned by a [`RetrievalStore`](crate::RetrievalStore).
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The backing store cannot be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected or failed the query.
    #[error("{0}")]
    Query(String),

    /// Stored metadata could not be decoded.
    #[error("corrupt course metadata: {0}")]
    CorruptMetadata(String),
}

/// Failure of the tool execution layer itself for a whole round.
///
/// This is distinct from a tool reporting a problem in its textual result:
/// an `ExecutionError` means the batch could not be dispatched at all, and
/// no partial results are forwarded to the model.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The model signalled tool use but supplied no invocation requests.
    #[error("tool round contained no invocation requests")]
    EmptyBatch,

    /// A request could not be bound to its tool.
    #[error("failed to dispatch '{tool}' (call {call_id}): {reason}")]
    Dispatch {
        tool: String,
        call_id: String,
        reason: String,
    },
}
