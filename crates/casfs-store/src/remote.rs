use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};

/// Durable remote tier, consumed through exactly four operations.
///
/// Anything that can probe a key, list keys by prefix, upload, and download
/// can serve as the durable tier -- an object-store bucket, another
/// filesystem, or the in-memory stub below. Credentials and transport
/// configuration belong to the implementation; the store never sees them.
///
/// "Not found" is expressed in-band (`exists` returns `false`, `list`
/// returns an empty listing). An `Err` from any operation means the tier
/// itself failed and is always propagated, never reinterpreted as absence.
pub trait RemoteTier: Send + Sync {
    /// Metadata probe: does an object exist at exactly `key`?
    fn exists(&self, key: &str) -> StoreResult<bool>;

    /// List every stored key starting with `prefix`.
    fn list(&self, prefix: &str) -> StoreResult<Vec<String>>;

    /// Upload an object at exactly `key`.
    fn upload(&self, key: &str, data: &[u8]) -> StoreResult<()>;

    /// Download the object at exactly `key`.
    ///
    /// Callers resolve keys through `list` first; a missing key here is a
    /// tier inconsistency, reported as [`StoreError::Transport`].
    fn download(&self, key: &str) -> StoreResult<Vec<u8>>;
}

/// In-memory `RemoteTier` for tests and embedding.
///
/// Keys map to byte vectors behind a `RwLock`. Upload calls are counted so
/// tests can assert that repeated puts of identical content skip the
/// network.
pub struct InMemoryRemote {
    objects: RwLock<HashMap<String, Vec<u8>>>,
    upload_calls: AtomicUsize,
}

impl InMemoryRemote {
    /// Create a new empty remote tier.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            upload_calls: AtomicUsize::new(0),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the tier holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Total number of `upload` calls ever issued against this tier.
    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    /// Sorted list of every stored key.
    pub fn keys(&self) -> Vec<String> {
        let map = self.objects.read().expect("lock poisoned");
        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Default for InMemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteTier for InMemoryRemote {
    fn exists(&self, key: &str) -> StoreResult<bool> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.contains_key(key))
    }

    fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let map = self.objects.read().expect("lock poisoned");
        let mut keys: Vec<String> = map
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    fn upload(&self, key: &str, data: &[u8]) -> StoreResult<()> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        let mut map = self.objects.write().expect("lock poisoned");
        map.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    fn download(&self, key: &str) -> StoreResult<Vec<u8>> {
        let map = self.objects.read().expect("lock poisoned");
        map.get(key).cloned().ok_or_else(|| StoreError::Transport {
            key: key.to_string(),
            reason: "no object at listed key".to_string(),
        })
    }
}

impl std::fmt::Debug for InMemoryRemote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRemote")
            .field("object_count", &self.len())
            .field("upload_calls", &self.upload_calls())
            .finish()
    }
}
