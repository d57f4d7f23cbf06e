use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use casfs_registry::{Hydrate, Registerable, RegistryError, RegistryResult, Serializable};
use casfs_store::CasStore;
use casfs_types::ContentHash;

/// Dried form of an arbitrary serde value stored as a single bincode blob.
///
/// The escape hatch for values with no structural codec of their own: the
/// payload is opaque to the store, and the concrete type is fixed at
/// registry-configuration time through the `V` parameter. Hydration
/// allocates nothing external, so `close` is the default drop.
#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
pub struct OpaqueBlob<V> {
    /// Hash of the bincode payload blob.
    pub path: ContentHash,
    #[serde(skip)]
    _marker: PhantomData<fn() -> V>,
}

impl<V> OpaqueBlob<V> {
    /// Wrap a payload hash.
    pub fn new(path: ContentHash) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }
}

// Manual impls: `V` is phantom, so none of these need bounds on it.
impl<V> Clone for OpaqueBlob<V> {
    fn clone(&self) -> Self {
        Self::new(self.path)
    }
}

impl<V> PartialEq for OpaqueBlob<V> {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl<V> fmt::Debug for OpaqueBlob<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpaqueBlob").field("path", &self.path).finish()
    }
}

impl<V> Registerable for OpaqueBlob<V> {
    const CLASS: &'static str = "OpaqueBlob";
}

impl<V: Serialize + DeserializeOwned> Hydrate for OpaqueBlob<V> {
    type Hydrated = V;

    fn unpack(&self, store: &dyn CasStore) -> RegistryResult<V> {
        let bytes = store.read_bytes(&self.path)?;
        bincode::deserialize(&bytes).map_err(|e| RegistryError::Unpack {
            class: Self::CLASS.to_string(),
            reason: e.to_string(),
        })
    }
}

impl<V: Serialize + DeserializeOwned> Serializable for OpaqueBlob<V> {
    fn pack(value: &V, store: &dyn CasStore) -> RegistryResult<Self> {
        let bytes =
            bincode::serialize(value).map_err(|e| RegistryError::Serialization(e.to_string()))?;
        let addr = store.put_bytes(&bytes, None)?;
        Ok(Self::new(addr.id()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use casfs_registry::SerializableRegistry;
    use casfs_store::LocalStore;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Opaque {
        a: u8,
        tags: Vec<String>,
    }

    #[test]
    fn roundtrip_through_a_registry() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn CasStore> = Arc::new(LocalStore::new(dir.path()).unwrap());

        let value = Opaque {
            a: 42,
            tags: vec!["x".to_string(), "y".to_string()],
        };
        let addr = OpaqueBlob::<Opaque>::dump_value(&value, store.as_ref()).unwrap();

        let mut registry: SerializableRegistry<OpaqueBlob<Opaque>> =
            SerializableRegistry::new(store);
        registry.register::<OpaqueBlob<Opaque>>();

        let loaded = registry.open(&addr.id()).unwrap();
        assert_eq!(*loaded, value);
    }

    #[test]
    fn wrong_payload_shape_is_an_unpack_error() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn CasStore> = Arc::new(LocalStore::new(dir.path()).unwrap());

        // A payload serialized as a different type.
        let addr = store
            .put_bytes(&bincode::serialize(&vec![1u64, 2, 3]).unwrap(), None)
            .unwrap();
        let dried: OpaqueBlob<Opaque> = OpaqueBlob::new(addr.id());
        assert!(dried.unpack(store.as_ref()).is_err());
    }
}
