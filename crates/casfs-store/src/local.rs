use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use casfs_types::{Address, ContentHash, ContentHasher};

use crate::error::{StoreError, StoreResult};
use crate::shard::ShardConfig;
use crate::traits::CasStore;

/// Local-disk content-addressable blob store.
///
/// Blobs live at `root/<shard-segments>/<hex><extension?>`. Writes stream
/// the source through the content hasher into a temporary file in `root`
/// and persist it to the shard path, so a blob is either fully present or
/// absent. A path, once written, is never mutated for a given hash --
/// concurrent puts of identical content all target the same bytes at the
/// same path.
pub struct LocalStore {
    root: PathBuf,
    shards: ShardConfig,
}

impl LocalStore {
    /// Open (creating if needed) a store rooted at `root` with the default
    /// shard layout.
    pub fn new(root: impl Into<PathBuf>) -> StoreResult<Self> {
        Self::with_shards(root, ShardConfig::DEFAULT)
    }

    /// Open a store with an explicit shard layout.
    pub fn with_shards(root: impl Into<PathBuf>, shards: ShardConfig) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root, shards })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Shard layout of this store.
    pub fn shards(&self) -> ShardConfig {
        self.shards
    }

    /// Absolute path a stored address resolves to.
    pub fn absolute_path(&self, addr: &Address) -> PathBuf {
        self.root.join(self.shards.relative_path(addr))
    }

    /// Install bytes fetched from elsewhere at their addressed path.
    ///
    /// Used by the tiered store when promoting a remote object. The caller
    /// has already verified the bytes hash to `addr.id()`.
    pub(crate) fn install(&self, addr: &Address, data: &[u8]) -> StoreResult<()> {
        let target = self.absolute_path(addr);
        if target.exists() {
            return Ok(());
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(data)?;
        tmp.persist(&target).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }

    /// Remove every blob from the local tier.
    ///
    /// A cache drop, not a delete: copies in the remote tier survive and
    /// can be promoted back.
    pub fn clear(&self) -> StoreResult<()> {
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(entry.path())?;
            } else {
                fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }
}

impl CasStore for LocalStore {
    fn put(&self, source: &mut dyn Read, extension: Option<&str>) -> StoreResult<Address> {
        let mut hasher = ContentHasher::new();
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        let mut buf = [0u8; 8192];
        loop {
            let n = source.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
            tmp.write_all(&buf[..n])?;
        }
        let id = hasher.finalize();
        let addr = Address::new(id, extension.map(str::to_string));
        let target = self.absolute_path(&addr);
        if target.exists() {
            // Identical content is already on disk; content addressing
            // makes the existing file byte-identical, so keep it.
            return Ok(addr);
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        tmp.persist(&target).map_err(|e| StoreError::Io(e.error))?;
        tracing::trace!(id = %id, path = %target.display(), "stored blob in local tier");
        Ok(addr)
    }

    fn get(&self, id: &ContentHash) -> StoreResult<Option<Address>> {
        let dir = self.root.join(self.shards.shard_dir(id));
        if !dir.exists() {
            return Ok(None);
        }
        let hex = id.to_hex();
        let mut matches = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if name.starts_with(&hex) {
                matches.push(name);
            }
        }
        // Multiple files for one hash can only mean identical content
        // stored under different extensions; take the lexicographically
        // first for a deterministic answer.
        matches.sort();
        match matches.into_iter().next() {
            Some(name) => {
                let ext = name[hex.len()..].to_string();
                let extension = (!ext.is_empty()).then_some(ext);
                Ok(Some(Address::new(*id, extension)))
            }
            None => Ok(None),
        }
    }

    fn open(&self, id: &ContentHash) -> StoreResult<File> {
        match self.get(id)? {
            Some(addr) => Ok(File::open(self.absolute_path(&addr))?),
            None => Err(StoreError::Missing(*id)),
        }
    }
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore")
            .field("root", &self.root)
            .field("shards", &self.shards)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn scratch_store() -> (tempfile::TempDir, LocalStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn put_then_read_roundtrip() {
        let (_dir, store) = scratch_store();
        let addr = store.put_bytes(b"DFDFDF", None).unwrap();
        assert_eq!(store.read_bytes(&addr.id()).unwrap(), b"DFDFDF");
    }

    #[test]
    fn put_is_idempotent() {
        let (_dir, store) = scratch_store();
        let a1 = store.put_bytes(b"same bytes", None).unwrap();
        let a2 = store.put_bytes(b"same bytes", None).unwrap();
        assert_eq!(a1, a2);

        // Still exactly one file in the shard directory.
        let shard = store.root().join(store.shards().shard_dir(&a1.id()));
        assert_eq!(fs::read_dir(shard).unwrap().count(), 1);
    }

    #[test]
    fn extension_is_recorded_and_recovered() {
        let (_dir, store) = scratch_store();
        let put_addr = store.put_bytes(b"col1,col2", Some(".csv")).unwrap();
        assert_eq!(put_addr.extension(), Some(".csv"));

        let get_addr = store.get(&put_addr.id()).unwrap().unwrap();
        assert_eq!(get_addr, put_addr);
        assert!(store.absolute_path(&get_addr).exists());
    }

    #[test]
    fn get_missing_returns_none() {
        let (_dir, store) = scratch_store();
        let id = ContentHash::from_bytes(b"never stored");
        assert!(store.get(&id).unwrap().is_none());
        assert!(!store.exists(&id).unwrap());
    }

    #[test]
    fn open_missing_is_an_error() {
        let (_dir, store) = scratch_store();
        let id = ContentHash::from_bytes(b"never stored");
        let err = store.open(&id).unwrap_err();
        assert!(matches!(err, StoreError::Missing(missing) if missing == id));
    }

    #[test]
    fn clear_empties_the_tier() {
        let (_dir, store) = scratch_store();
        let addr = store.put_bytes(b"ephemeral", None).unwrap();
        store.clear().unwrap();
        assert!(store.get(&addr.id()).unwrap().is_none());
    }

    #[test]
    fn ambiguous_extensions_tie_break_lexicographically() {
        let (_dir, store) = scratch_store();
        let a_txt = store.put_bytes(b"same content", Some(".txt")).unwrap();
        let a_csv = store.put_bytes(b"same content", Some(".csv")).unwrap();
        assert_eq!(a_txt.id(), a_csv.id());

        let resolved = store.get(&a_txt.id()).unwrap().unwrap();
        assert_eq!(resolved.extension(), Some(".csv"));
    }

    #[test]
    fn streamed_put_matches_in_memory_hash() {
        let (_dir, store) = scratch_store();
        let data = vec![7u8; 100_000];
        let mut reader: &[u8] = &data;
        let addr = store.put(&mut reader, None).unwrap();
        assert_eq!(addr.id(), ContentHash::from_bytes(&data));
    }

    proptest! {
        #[test]
        fn put_is_deterministic_across_stores(data in proptest::collection::vec(any::<u8>(), 0..1024)) {
            let (_d1, s1) = scratch_store();
            let (_d2, s2) = scratch_store();
            let a1 = s1.put_bytes(&data, None).unwrap();
            let a2 = s2.put_bytes(&data, None).unwrap();
            prop_assert_eq!(a1.id(), a2.id());
            prop_assert_eq!(s1.read_bytes(&a1.id()).unwrap(), data);
        }
    }
}
