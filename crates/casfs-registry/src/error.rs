use casfs_store::StoreError;

/// Errors from envelope decoding, registry dispatch, and format
/// reconstruction.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Bytes did not decode to the `{class, value}` envelope shape.
    #[error("not a serialized object: {reason}")]
    MalformedEnvelope { reason: String },

    /// The envelope names a class this registry does not know.
    ///
    /// Lists the known classes so a misconfigured registry is diagnosable
    /// from the message alone.
    #[error("not a recognized class: {class} (known classes: {})", .known.join(", "))]
    UnrecognizedClass { class: String, known: Vec<String> },

    /// A dried form could not be reconstructed into its hydrated value.
    #[error("failed to unpack {class}: {reason}")]
    Unpack { class: String, reason: String },

    /// Serializing a value or envelope failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O failure outside the store (format payload assembly/extraction).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Underlying store failure, including `Missing` for blobs a dried
    /// form references but the store no longer holds.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
