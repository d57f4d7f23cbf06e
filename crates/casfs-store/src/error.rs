use casfs_types::ContentHash;

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// `open` was called for content absent from every tier.
    ///
    /// Lookups that merely ask whether content exists use
    /// `get` and see `Ok(None)` instead.
    #[error("content not found: {0}")]
    Missing(ContentHash),

    /// Remote-tier failure other than a missing key (auth, network,
    /// throttling). Never reinterpreted as absence.
    #[error("remote tier error on {key}: {reason}")]
    Transport { key: String, reason: String },

    /// Downloaded bytes do not re-hash to the requested id (remote object
    /// corruption).
    #[error("hash mismatch for {id}: downloaded bytes hash to {computed}")]
    HashMismatch {
        id: ContentHash,
        computed: ContentHash,
    },

    /// I/O error from the local tier.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
