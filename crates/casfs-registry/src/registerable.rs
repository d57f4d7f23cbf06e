use serde::de::DeserializeOwned;
use serde::Serialize;

use casfs_store::CasStore;
use casfs_types::Address;

use crate::envelope::Envelope;
use crate::error::{RegistryError, RegistryResult};

/// A dried form: a structured value that rides inside an [`Envelope`].
///
/// One implementation exists per supported format, typically a reference
/// to payload blobs plus whatever metadata reverses the encoding (column
/// names, say). A dried form is owned by whichever envelope or address was
/// produced from it and is safe to discard after dumping.
pub trait Registerable: Serialize + DeserializeOwned {
    /// Stable, human-readable type tag recorded in the envelope.
    const CLASS: &'static str;

    /// Field-level JSON encoding of this dried form.
    fn to_value(&self) -> RegistryResult<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| RegistryError::Serialization(e.to_string()))
    }

    /// Reconstruct from an envelope's `value` field.
    fn from_value(value: serde_json::Value) -> RegistryResult<Self> {
        serde_json::from_value(value).map_err(|e| RegistryError::Unpack {
            class: Self::CLASS.to_string(),
            reason: e.to_string(),
        })
    }

    /// Persist this dried form as an envelope blob, returning its address.
    fn dump(&self, store: &dyn CasStore) -> RegistryResult<Address> {
        let bytes = Envelope::new(Self::CLASS, self.to_value()?).encode()?;
        Ok(store.put_bytes(&bytes, None)?)
    }
}

/// Reconstruction half of the per-format contract.
///
/// A dried form that can be rebuilt into a live application value, plus
/// release of whatever that rebuild allocated.
pub trait Hydrate {
    /// The live application value this dried form reconstructs into.
    type Hydrated;

    /// Fetch referenced blobs and rebuild the live value.
    ///
    /// May allocate transient resources (an extracted directory, say) that
    /// belong to the caller until [`Hydrate::close`]. Implementations must
    /// release anything they already allocated before returning an error;
    /// a failed unpack leaves nothing behind.
    fn unpack(&self, store: &dyn CasStore) -> RegistryResult<Self::Hydrated>;

    /// Release transient resources created by `unpack`.
    ///
    /// The default is a plain drop, for formats that allocate nothing
    /// external.
    fn close(&self, hydrated: Self::Hydrated) {
        drop(hydrated);
    }
}

/// Full per-format contract: pack a live value down to a dried form and
/// back again.
pub trait Serializable: Registerable + Hydrate {
    /// Persist the payload blobs for `value` into the store and return the
    /// dried form referencing them.
    ///
    /// Packing already-persisted content is cheap: the store deduplicates
    /// identical bytes and skips redundant uploads.
    fn pack(value: &Self::Hydrated, store: &dyn CasStore) -> RegistryResult<Self>;

    /// `pack`, then persist the dried form's own envelope: the one-call
    /// path from a live value to an address.
    fn dump_value(value: &Self::Hydrated, store: &dyn CasStore) -> RegistryResult<Address> {
        Self::pack(value, store)?.dump(store)
    }
}
