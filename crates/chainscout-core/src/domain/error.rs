//! Error taxonomy for chainscout.
//!
//! Backend failures never leave the scatter-gather executor; they are folded
//! into per-network outcomes. `DiscoveryError` is reserved for contract
//! violations by the caller and for configuration problems.

/// Errors raised by a backend adapter for a single network query.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackendError {
    #[error("query failed: {0}")]
    Query(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to decode backend response: {0}")]
    Decode(String),

    #[error("operation not supported by backend: {0}")]
    NotSupported(String),
}

/// Result type for backend adapter calls.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Errors surfaced to callers of the discovery engine.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("invalid page size {page_size}: must be between 1 and {max}")]
    InvalidPageSize { page_size: usize, max: usize },

    #[error("invalid minimum average score: {0}")]
    InvalidThreshold(f64),

    #[error("invalid network id: {0}")]
    InvalidNetworkId(String),

    #[error("invalid agent id: {0} (expected <networkId>:<localId>)")]
    InvalidAgentId(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_page_size_displays_bounds() {
        let err = DiscoveryError::InvalidPageSize {
            page_size: 0,
            max: 500,
        };
        let msg = err.to_string();
        assert!(msg.contains("invalid page size 0"));
        assert!(msg.contains("500"));
    }

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::Transport("connection reset".to_string());
        assert!(err.to_string().contains("transport error"));
        assert!(err.to_string().contains("connection reset"));
    }
}
