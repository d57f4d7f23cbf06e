use std::io::BufReader;
use std::path::PathBuf;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use casfs_registry::{Hydrate, Registerable, RegistryError, RegistryResult, Serializable};
use casfs_store::CasStore;
use casfs_types::ContentHash;

/// Dried form of a directory bundle stored as a gzipped tar archive.
///
/// The hydrated value is the path of a directory extracted from the
/// archive. Extraction allocates a real directory on disk, so this format
/// is the reason `close` exists: the extraction directory lives until the
/// scope that opened it ends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArchiveDir {
    /// Hash of the `.tar.gz` payload blob.
    pub path: ContentHash,
}

impl Registerable for ArchiveDir {
    const CLASS: &'static str = "ArchiveDir";
}

impl Hydrate for ArchiveDir {
    type Hydrated = PathBuf;

    fn unpack(&self, store: &dyn CasStore) -> RegistryResult<PathBuf> {
        let file = store.open(&self.path)?;
        // Extract into a TempDir first: if extraction fails midway, the
        // TempDir drop removes the partial tree and nothing leaks. Only a
        // fully extracted directory is detached and handed to the caller.
        let dir = tempfile::Builder::new()
            .prefix("casfs-archive-")
            .tempdir()?;
        let mut archive = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
        archive
            .unpack(dir.path())
            .map_err(|e| RegistryError::Unpack {
                class: Self::CLASS.to_string(),
                reason: e.to_string(),
            })?;
        Ok(dir.keep())
    }

    fn close(&self, hydrated: PathBuf) {
        if hydrated.exists() {
            if let Err(e) = std::fs::remove_dir_all(&hydrated) {
                tracing::warn!(path = %hydrated.display(), error = %e, "failed to remove extraction directory");
            }
        }
    }
}

impl Serializable for ArchiveDir {
    fn pack(value: &PathBuf, store: &dyn CasStore) -> RegistryResult<Self> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        builder.append_dir_all("", value)?;
        let encoder = builder.into_inner()?;
        let bytes = encoder.finish()?;
        let addr = store.put_bytes(&bytes, Some(".tar.gz"))?;
        Ok(Self { path: addr.id() })
    }
}
