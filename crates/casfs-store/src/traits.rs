use std::fs::File;
use std::io::Read;

use casfs_types::{Address, ContentHash};

use crate::error::{StoreError, StoreResult};

/// Content-addressed blob store.
///
/// All implementations must satisfy these invariants:
/// - Content addressing is deterministic: identical bytes always map to the
///   same `Address` id, across instances and tiers.
/// - Blobs are immutable once written; a repeated `put` of identical
///   content yields the same address and leaves the stored bytes
///   observably unchanged.
/// - An extension recorded at `put` time is recoverable from `get` for the
///   lifetime of the store, even after the local tier has been cleared.
/// - Absence is a normal outcome for `get` and a typed error for `open`.
pub trait CasStore: Send + Sync {
    /// Store a blob, streaming `source` through the content hasher.
    ///
    /// If `extension` is given, the stored filename carries it.
    fn put(&self, source: &mut dyn Read, extension: Option<&str>) -> StoreResult<Address>;

    /// Look up the address for a content hash.
    ///
    /// Returns `Ok(None)` when the content is not present -- absence is an
    /// expected outcome here, not an error.
    fn get(&self, id: &ContentHash) -> StoreResult<Option<Address>>;

    /// Open the blob for reading.
    ///
    /// The caller asserts the content exists; absence is
    /// [`StoreError::Missing`].
    fn open(&self, id: &ContentHash) -> StoreResult<File>;

    /// Whether the store holds the given hash.
    fn exists(&self, id: &ContentHash) -> StoreResult<bool> {
        Ok(self.get(id)?.is_some())
    }

    /// Store an in-memory byte slice.
    fn put_bytes(&self, bytes: &[u8], extension: Option<&str>) -> StoreResult<Address> {
        let mut source = bytes;
        self.put(&mut source, extension)
    }

    /// Read a whole blob into memory.
    ///
    /// Absence is [`StoreError::Missing`], as with `open`.
    fn read_bytes(&self, id: &ContentHash) -> StoreResult<Vec<u8>> {
        let mut file = self.open(id)?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).map_err(StoreError::Io)?;
        Ok(buf)
    }
}
