use std::path::PathBuf;

use casfs_types::{Address, ContentHash};

/// Fixed-depth, fixed-width prefix decomposition of a content hash.
///
/// The first `depth * width` hex characters of a hash are split into
/// `depth` path segments of `width` characters each, bounding per-directory
/// fan-out. Shard parameters are fixed per store instance and must match
/// between the local and remote tiers, otherwise promotion cannot line up
/// remote keys with local paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShardConfig {
    depth: usize,
    width: usize,
}

impl ShardConfig {
    /// Default layout: one directory level of two hex characters.
    pub const DEFAULT: Self = Self { depth: 1, width: 2 };

    /// Create a shard layout.
    ///
    /// # Panics
    ///
    /// Panics if `depth * width` exceeds the hex length of a content
    /// hash; such a layout could never slice a hash into segments.
    pub fn new(depth: usize, width: usize) -> Self {
        assert!(
            depth * width <= ContentHash::HEX_LEN,
            "shard layout {depth}x{width} exceeds the {} hex characters of a content hash",
            ContentHash::HEX_LEN
        );
        Self { depth, width }
    }

    /// Prefix segments for a hash, e.g. `["32"]` at depth 1, width 2.
    pub fn segments(&self, id: &ContentHash) -> Vec<String> {
        let hex = id.to_hex();
        (0..self.depth)
            .map(|i| hex[i * self.width..(i + 1) * self.width].to_string())
            .collect()
    }

    /// Directory holding a hash's blob, relative to the store root.
    pub fn shard_dir(&self, id: &ContentHash) -> PathBuf {
        self.segments(id).iter().collect()
    }

    /// On-disk path of an address relative to the store root:
    /// `<segments>/<hex><extension?>`.
    pub fn relative_path(&self, addr: &Address) -> PathBuf {
        let mut path = self.shard_dir(&addr.id());
        path.push(addr.filename());
        path
    }

    /// Remote object key for an address under a key prefix:
    /// `<prefix>/<segments>/<hex><extension?>`.
    pub fn remote_key(&self, prefix: &str, addr: &Address) -> String {
        match addr.extension() {
            Some(ext) => format!("{}{}", self.remote_stem(prefix, &addr.id()), ext),
            None => self.remote_stem(prefix, &addr.id()),
        }
    }

    /// Extension-less remote key stem for a hash:
    /// `<prefix>/<segments>/<hex>`. Every key ever stored for this hash
    /// starts with this stem.
    pub fn remote_stem(&self, prefix: &str, id: &ContentHash) -> String {
        let mut parts = vec![prefix.to_string()];
        parts.extend(self.segments(id));
        parts.push(id.to_hex());
        parts.join("/")
    }
}

impl Default for ShardConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
