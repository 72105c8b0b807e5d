use thiserror::Error;

/// Canonical error type for metadata retrieval operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Caller supplied a negative paging offset or page size.
    #[error("invalid paging parameter: {message}")]
    InvalidPagingParameter {
        /// Which parameter was rejected and why.
        message: String,
    },

    /// Caller lacks the rights for the attempted operation.
    #[error("principal `{principal}` is not authorized for {operation}")]
    Unauthorized {
        /// The rejected caller.
        principal: String,
        /// Operation that was refused.
        operation: &'static str,
    },

    /// Transport or internal failure in the underlying store.
    #[error("store error: {message}")]
    Server {
        /// Human-readable details from the store-access layer.
        message: String,
    },

    /// The store returned only empty, non-terminal pages for the
    /// configured number of consecutive fetches. The retrieval is
    /// inconclusive: more matching data may exist, but the store never
    /// produced it or a terminal marker.
    #[error("store returned {attempts} consecutive empty pages without a terminal marker")]
    EmptyPageRetriesExhausted {
        /// Number of consecutive empty fetches performed.
        attempts: usize,
    },

    /// Instance was not found in the metadata store.
    #[error("{entity} `{id}` was not found")]
    NotFound {
        /// Instance kind (e.g. `"entity"`).
        entity: &'static str,
        /// Identifier of the missing instance.
        id: String,
    },

    /// Unexpected internal error occurred.
    #[error("internal error: {message}")]
    Internal {
        /// Human-readable details for debugging purposes.
        message: String,
    },
}

impl StoreError {
    /// Creates an `InvalidPagingParameter` variant.
    #[must_use]
    pub fn invalid_paging(message: impl Into<String>) -> Self {
        Self::InvalidPagingParameter {
            message: message.into(),
        }
    }

    /// Creates an `Unauthorized` variant.
    #[must_use]
    pub fn unauthorized(principal: impl Into<String>, operation: &'static str) -> Self {
        Self::Unauthorized {
            principal: principal.into(),
            operation,
        }
    }

    /// Creates a `Server` variant.
    #[must_use]
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    /// Creates a `NotFound` variant.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Creates an `Internal` variant.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Convenient result alias for retrieval operations.
pub type StoreResult<T> = Result<T, StoreError>;
