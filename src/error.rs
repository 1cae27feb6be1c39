//! Error types for the gotenberg-node library.
//!
//! Two error types reflect the two layers a conversion passes through:
//!
//! * [`GotenbergError`] — returned by [`crate::dispatch::execute`]. The first
//!   failing item aborts the whole batch, so a single value of this type is
//!   all a caller ever sees; no partial results accompany it.
//!
//! * [`TransportError`] — produced by a [`crate::host::HostContext`] when the
//!   outbound request fails. The dispatcher wraps it into
//!   [`GotenbergError::RequestFailed`] together with the operation that was
//!   being executed.
//!
//! [`GotenbergError::kind`] lets callers tell configuration problems (fix the
//! node parameters) from transport problems (the service or network failed)
//! without matching on every variant.

use crate::operation::Operation;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`GotenbergError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Parameters or input items are unusable; no request was sent for the item.
    Configuration,
    /// The outbound request failed or the service rejected it.
    Transport,
    /// Writing converted output to disk failed.
    Output,
    /// Unexpected internal failure.
    Internal,
}

/// All fatal errors returned by the gotenberg-node library.
#[derive(Debug, Error)]
pub enum GotenbergError {
    // ── Configuration errors ─────────────────────────────────────────────
    /// The operation selector is not one of the four supported values.
    #[error("Operation not supported: '{operation}'\nExpected one of: convertUrl, convertHtml, convertMarkdown, convertOffice")]
    UnsupportedOperation { operation: String },

    /// Neither the node parameter nor the input item supplied a required field.
    #[error("Item {item}: {operation} requires '{field}' but neither the parameter nor the item provides it")]
    MissingField {
        operation: Operation,
        field: &'static str,
        item: usize,
    },

    /// The item's binary attachment could not be decoded.
    #[error("Item {item}: binary attachment is not valid base64: {detail}")]
    InvalidBinary { item: usize, detail: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Transport errors ─────────────────────────────────────────────────
    /// The request for one item failed; the batch was aborted.
    #[error("Failed to execute {operation}: {source}")]
    RequestFailed {
        operation: Operation,
        #[source]
        source: TransportError,
    },

    // ── I/O errors ───────────────────────────────────────────────────────
    /// Could not create or write a converted PDF.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GotenbergError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GotenbergError::UnsupportedOperation { .. }
            | GotenbergError::MissingField { .. }
            | GotenbergError::InvalidBinary { .. }
            | GotenbergError::InvalidConfig(_) => ErrorKind::Configuration,
            GotenbergError::RequestFailed { .. } => ErrorKind::Transport,
            GotenbergError::OutputWriteFailed { .. } => ErrorKind::Output,
            GotenbergError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// HTTP status returned by the service, when the failure was a rejected request.
    pub fn status(&self) -> Option<u16> {
        match self {
            GotenbergError::RequestFailed {
                source: TransportError::Api { status, .. },
                ..
            } => Some(*status),
            _ => None,
        }
    }
}

/// Failure reported by a [`crate::host::HostContext`] while performing a request.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection could not be established or was interrupted.
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The HTTP client gave up waiting.
    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// A file referenced by the form payload could not be read.
    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
