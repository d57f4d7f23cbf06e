use serde::{Deserialize, Serialize};

use crate::hash::ContentHash;

/// Identity of a stored blob: its content hash plus the optional filename
/// extension it was stored under.
///
/// Addresses are immutable. They are produced by a store's `put` and
/// consumed by every later `get`/`open`. The extension is presentation
/// metadata only; it never participates in the hash.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    id: ContentHash,
    extension: Option<String>,
}

impl Address {
    /// Create an address. Extensions are normalized to carry a leading dot.
    pub fn new(id: ContentHash, extension: Option<String>) -> Self {
        let extension = extension.map(|ext| {
            if ext.starts_with('.') {
                ext
            } else {
                format!(".{ext}")
            }
        });
        Self { id, extension }
    }

    /// The content hash.
    pub fn id(&self) -> ContentHash {
        self.id
    }

    /// The recorded extension, including its leading dot.
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    /// The filename the blob is stored under: `<hex><extension?>`.
    pub fn filename(&self) -> String {
        match &self.extension {
            Some(ext) => format!("{}{}", self.id.to_hex(), ext),
            None => self.id.to_hex(),
        }
    }
}
