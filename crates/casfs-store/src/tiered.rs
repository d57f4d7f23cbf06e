use std::fs::File;
use std::io::Read;
use std::sync::Arc;

use casfs_types::{Address, ContentHash};

use crate::error::{StoreError, StoreResult};
use crate::local::LocalStore;
use crate::remote::RemoteTier;
use crate::traits::CasStore;

/// Two-tier content-addressable store: a fast local-disk cache in front of
/// a durable remote tier.
///
/// Writes go local-first (that is what computes the hash and seats the
/// cache entry), then upload to the remote tier only when the remote key is
/// absent -- repeated puts of identical content cost no network after the
/// first successful upload.
///
/// Reads prefer the local tier. On a local miss the remote tier is listed
/// under the hash's shard-path stem; the caller supplies only the hash and
/// the store discovers the stored extension from the listed key, so lookups
/// are extension-agnostic. The downloaded object is verified against its
/// hash and installed into the local tier before the address is returned.
///
/// Remote keys follow the same shard layout as local paths, under a fixed
/// key prefix. Both tiers must share the shard parameters for promotion to
/// line up.
pub struct TieredStore {
    local: LocalStore,
    remote: Arc<dyn RemoteTier>,
    prefix: String,
}

impl TieredStore {
    /// Combine a local tier with a remote tier under a remote key prefix.
    pub fn new(local: LocalStore, remote: Arc<dyn RemoteTier>, prefix: impl Into<String>) -> Self {
        Self {
            local,
            remote,
            prefix: prefix.into(),
        }
    }

    /// The local tier (for cache inspection and cache drops).
    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    /// Remote key prefix this store writes under.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn remote_key(&self, addr: &Address) -> String {
        self.local.shards().remote_key(&self.prefix, addr)
    }

    fn remote_stem(&self, id: &ContentHash) -> String {
        self.local.shards().remote_stem(&self.prefix, id)
    }
}

impl CasStore for TieredStore {
    fn put(&self, source: &mut dyn Read, extension: Option<&str>) -> StoreResult<Address> {
        let addr = self.local.put(source, extension)?;
        let key = self.remote_key(&addr);
        if self.remote.exists(&key)? {
            tracing::debug!(key = %key, "remote tier already holds object, skipping upload");
            return Ok(addr);
        }
        let data = std::fs::read(self.local.absolute_path(&addr))?;
        self.remote.upload(&key, &data)?;
        tracing::debug!(key = %key, bytes = data.len(), "uploaded blob to remote tier");
        Ok(addr)
    }

    fn get(&self, id: &ContentHash) -> StoreResult<Option<Address>> {
        if let Some(addr) = self.local.get(id)? {
            return Ok(Some(addr));
        }
        let stem = self.remote_stem(id);
        let mut keys = self.remote.list(&stem)?;
        if keys.is_empty() {
            return Ok(None);
        }
        // More than one key under a stem should not happen under content
        // addressing; take the lexicographically first as a best-effort
        // tie-break.
        keys.sort();
        let key = &keys[0];
        let ext = key[stem.len()..].to_string();
        let addr = Address::new(*id, (!ext.is_empty()).then_some(ext));

        let data = self.remote.download(key)?;
        let computed = ContentHash::from_bytes(&data);
        if computed != *id {
            return Err(StoreError::HashMismatch { id: *id, computed });
        }
        self.local.install(&addr, &data)?;
        tracing::debug!(key = %key, id = %id, "promoted remote object into local tier");
        Ok(Some(addr))
    }

    fn open(&self, id: &ContentHash) -> StoreResult<File> {
        // `get` promotes on a local miss, so an address always resolves to
        // a local file here.
        match self.get(id)? {
            Some(addr) => Ok(File::open(self.local.absolute_path(&addr))?),
            None => Err(StoreError::Missing(*id)),
        }
    }

    fn exists(&self, id: &ContentHash) -> StoreResult<bool> {
        // An existence probe must not download or promote anything; check
        // the local tier, then list the remote stem.
        if self.local.exists(id)? {
            return Ok(true);
        }
        Ok(!self.remote.list(&self.remote_stem(id))?.is_empty())
    }
}

impl std::fmt::Debug for TieredStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredStore")
            .field("local", &self.local)
            .field("prefix", &self.prefix)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::remote::InMemoryRemote;

    use super::*;

    fn scratch_tiered(remote: Arc<dyn RemoteTier>) -> (tempfile::TempDir, TieredStore) {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::new(dir.path()).unwrap();
        (dir, TieredStore::new(local, remote, "cas"))
    }

    /// Remote tier whose every operation fails, for propagation tests.
    struct FailingRemote;

    impl RemoteTier for FailingRemote {
        fn exists(&self, key: &str) -> StoreResult<bool> {
            Err(StoreError::Transport {
                key: key.to_string(),
                reason: "connection refused".to_string(),
            })
        }

        fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
            Err(StoreError::Transport {
                key: prefix.to_string(),
                reason: "connection refused".to_string(),
            })
        }

        fn upload(&self, key: &str, _data: &[u8]) -> StoreResult<()> {
            Err(StoreError::Transport {
                key: key.to_string(),
                reason: "connection refused".to_string(),
            })
        }

        fn download(&self, key: &str) -> StoreResult<Vec<u8>> {
            Err(StoreError::Transport {
                key: key.to_string(),
                reason: "connection refused".to_string(),
            })
        }
    }

    #[test]
    fn put_writes_through_both_tiers() {
        let remote = Arc::new(InMemoryRemote::new());
        let (_dir, store) = scratch_tiered(remote.clone());

        let addr = store.put_bytes(b"DFDFDF", None).unwrap();
        assert!(store.local().get(&addr.id()).unwrap().is_some());
        assert_eq!(remote.len(), 1);
        assert_eq!(store.read_bytes(&addr.id()).unwrap(), b"DFDFDF");
    }

    #[test]
    fn second_store_reads_through_the_remote_tier() {
        let remote = Arc::new(InMemoryRemote::new());
        let (_dir1, store1) = scratch_tiered(remote.clone());
        let addr = store1.put_bytes(b"shared content", None).unwrap();

        // A fresh store with an empty local tier sees the same object.
        let (_dir2, store2) = scratch_tiered(remote);
        assert_eq!(store2.read_bytes(&addr.id()).unwrap(), b"shared content");
        // ...and the promotion left a local copy behind.
        assert!(store2.local().get(&addr.id()).unwrap().is_some());
    }

    #[test]
    fn extension_survives_local_cache_drop() {
        let remote = Arc::new(InMemoryRemote::new());
        let (_dir, store) = scratch_tiered(remote);

        let put_addr = store.put_bytes(b"a,b\n1,2\n", Some(".csv")).unwrap();
        store.local().clear().unwrap();

        let get_addr = store.get(&put_addr.id()).unwrap().unwrap();
        assert_eq!(get_addr.extension(), Some(".csv"));
        assert_eq!(get_addr, put_addr);
    }

    #[test]
    fn repeated_put_skips_the_upload() {
        let remote = Arc::new(InMemoryRemote::new());
        let (_dir, store) = scratch_tiered(remote.clone());

        store.put_bytes(b"dedup me", None).unwrap();
        store.put_bytes(b"dedup me", None).unwrap();
        assert_eq!(remote.upload_calls(), 1);
    }

    #[test]
    fn local_hit_never_touches_the_remote() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::new(dir.path()).unwrap();
        // Seed the local tier before wiring in a remote that always fails.
        let addr = local.put_bytes(b"cached", None).unwrap();

        let store = TieredStore::new(local, Arc::new(FailingRemote), "cas");
        assert_eq!(store.get(&addr.id()).unwrap().unwrap(), addr);
        assert_eq!(store.read_bytes(&addr.id()).unwrap(), b"cached");
    }

    #[test]
    fn get_missing_returns_none_but_open_errors() {
        let remote = Arc::new(InMemoryRemote::new());
        let (_dir, store) = scratch_tiered(remote);
        let id = ContentHash::from_bytes(b"nonexistent");

        assert!(store.get(&id).unwrap().is_none());
        let err = store.open(&id).unwrap_err();
        assert!(matches!(err, StoreError::Missing(missing) if missing == id));
    }

    #[test]
    fn transport_errors_propagate_instead_of_reading_as_absence() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::new(dir.path()).unwrap();
        let store = TieredStore::new(local, Arc::new(FailingRemote), "cas");

        let err = store.put_bytes(b"data", None).unwrap_err();
        assert!(matches!(err, StoreError::Transport { .. }));

        let id = ContentHash::from_bytes(b"elsewhere");
        let err = store.get(&id).unwrap_err();
        assert!(matches!(err, StoreError::Transport { .. }));
    }

    #[test]
    fn ambiguous_remote_keys_tie_break_lexicographically() {
        let remote = Arc::new(InMemoryRemote::new());
        let data = b"twice-keyed".to_vec();
        let id = ContentHash::from_bytes(&data);

        let (_dir, store) = scratch_tiered(remote.clone());
        let stem = store.remote_stem(&id);
        remote.upload(&format!("{stem}.b"), &data).unwrap();
        remote.upload(&format!("{stem}.a"), &data).unwrap();

        let addr = store.get(&id).unwrap().unwrap();
        assert_eq!(addr.extension(), Some(".a"));
    }

    /// Remote tier that answers probes and listings but refuses downloads,
    /// for asserting that an operation never fetches object bytes.
    struct ListOnlyRemote {
        inner: InMemoryRemote,
    }

    impl RemoteTier for ListOnlyRemote {
        fn exists(&self, key: &str) -> StoreResult<bool> {
            self.inner.exists(key)
        }

        fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
            self.inner.list(prefix)
        }

        fn upload(&self, key: &str, data: &[u8]) -> StoreResult<()> {
            self.inner.upload(key, data)
        }

        fn download(&self, key: &str) -> StoreResult<Vec<u8>> {
            Err(StoreError::Transport {
                key: key.to_string(),
                reason: "unexpected download".to_string(),
            })
        }
    }

    #[test]
    fn existence_probe_never_downloads_or_promotes() {
        let remote = ListOnlyRemote {
            inner: InMemoryRemote::new(),
        };
        let data = b"remote only".to_vec();
        let id = ContentHash::from_bytes(&data);

        let (_dir, store) = scratch_tiered(Arc::new(remote));
        let stem = store.remote_stem(&id);
        store.remote.upload(&format!("{stem}.csv"), &data).unwrap();

        assert!(store.exists(&id).unwrap());
        // Still only remote; the probe promoted nothing.
        assert!(store.local().get(&id).unwrap().is_none());

        let absent = ContentHash::from_bytes(b"nowhere");
        assert!(!store.exists(&absent).unwrap());
    }

    #[test]
    fn corrupt_remote_object_is_rejected() {
        let remote = Arc::new(InMemoryRemote::new());
        let id = ContentHash::from_bytes(b"the real bytes");

        let (_dir, store) = scratch_tiered(remote.clone());
        let stem = store.remote_stem(&id);
        remote.upload(&stem, b"tampered bytes").unwrap();

        let err = store.get(&id).unwrap_err();
        assert!(matches!(err, StoreError::HashMismatch { .. }));
        // Nothing was installed locally.
        assert!(store.local().get(&id).unwrap().is_none());
    }
}
