//! Error taxonomy shared by the HTTP layer and the orchestrator.
//!
//! [`ApiError`] is produced by the HTTP collaborator and classifies a failed
//! call as transport, server or decode. [`QueryError`] is what a page action
//! surfaces to the operator. Both map onto the closed [`ErrorKind`] set.

use std::fmt;

use ofs_core::error::CoreError;

// ---------------------------------------------------------------------------
// ErrorKind
// ---------------------------------------------------------------------------

/// Closed classification of failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No filters supplied; blocked before any network I/O.
    Validation,
    /// No response received (connect failure, timeout).
    Transport,
    /// Non-2xx response, or a response body that could not be decoded.
    Server,
    /// A count or last-updated request failed while the primary succeeded.
    Secondary,
    /// The spreadsheet could not be encoded or written.
    Export,
}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Errors from the remote API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("API returned HTTP {status}{}", detail_suffix(.detail))]
    Server {
        status: u16,
        /// Server-provided message, when the body carried one.
        detail: Option<String>,
    },

    /// The response body did not have the expected shape.
    #[error("Invalid API response: {0}")]
    Decode(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::Server { .. } | ApiError::Decode(_) => ErrorKind::Server,
        }
    }

    /// Classify a reqwest error: body decode failures are server-side, the
    /// rest never got a usable response.
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err)
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::Decode(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// QueryError
// ---------------------------------------------------------------------------

/// The page action that failed. Selects the generic fallback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Query,
    Export,
}

impl Operation {
    fn fallback_message(self) -> &'static str {
        match self {
            Operation::Query => "Erro ao carregar dados",
            Operation::Export => "Erro ao exportar Excel",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Query => f.write_str("query"),
            Operation::Export => f.write_str("export"),
        }
    }
}

/// Failure of a page action (filter or export).
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// No effective filter was set.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The primary request of the action failed.
    #[error("{operation} failed: {source}")]
    Api {
        operation: Operation,
        #[source]
        source: ApiError,
    },

    /// Spreadsheet encoding or file write failed.
    #[error("Spreadsheet export failed: {0}")]
    Export(String),
}

impl QueryError {
    pub(crate) fn api(operation: Operation, source: ApiError) -> Self {
        QueryError::Api { operation, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::Validation(_) => ErrorKind::Validation,
            QueryError::Api { source, .. } => source.kind(),
            QueryError::Export(_) => ErrorKind::Export,
        }
    }

    /// Message shown to the operator in the page notice.
    pub fn user_message(&self) -> String {
        match self {
            QueryError::Validation(msg) => msg.clone(),
            QueryError::Api { operation, source } => match source {
                ApiError::Transport(err) => format!("Erro de conexão: {err}"),
                ApiError::Server { status, detail } => format!(
                    "Erro {status}: {}",
                    detail.as_deref().unwrap_or(operation.fallback_message())
                ),
                ApiError::Decode(_) => operation.fallback_message().to_string(),
            },
            QueryError::Export(_) => Operation::Export.fallback_message().to_string(),
        }
    }
}

impl From<CoreError> for QueryError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => QueryError::Validation(msg),
            other => QueryError::api(Operation::Query, other.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
