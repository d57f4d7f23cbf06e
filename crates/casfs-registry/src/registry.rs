use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use casfs_store::CasStore;
use casfs_types::ContentHash;

use crate::envelope::Envelope;
use crate::error::{RegistryError, RegistryResult};
use crate::registerable::{Hydrate, Registerable};

/// Constructor that turns an envelope `value` into a typed dried form.
type Constructor<T> = fn(serde_json::Value) -> RegistryResult<T>;

/// Closed mapping from envelope class tags to constructors.
///
/// Built at startup from the set of types a deployment knows about; an
/// unknown tag at load time is a data error, not a type-system hole.
/// Registering the same tag twice keeps the last constructor -- duplicate
/// tags are a caller configuration mistake, not a runtime failure.
pub struct Registry<T> {
    store: Arc<dyn CasStore>,
    constructors: HashMap<&'static str, Constructor<T>>,
}

impl<T> Registry<T> {
    /// Create an empty registry over a store.
    pub fn new(store: Arc<dyn CasStore>) -> Self {
        Self {
            store,
            constructors: HashMap::new(),
        }
    }

    /// Register a dried-form type under its class tag.
    pub fn register<R>(&mut self)
    where
        R: Registerable + Into<T>,
    {
        self.constructors
            .insert(R::CLASS, |value| R::from_value(value).map(Into::into));
    }

    /// Sorted class tags this registry can reconstruct.
    pub fn known_classes(&self) -> Vec<String> {
        let mut known: Vec<String> = self.constructors.keys().map(|k| k.to_string()).collect();
        known.sort();
        known
    }

    /// The store this registry loads from.
    pub fn store(&self) -> &Arc<dyn CasStore> {
        &self.store
    }

    /// Load and reconstruct the dried form stored at `id`.
    ///
    /// Fails with [`RegistryError::MalformedEnvelope`] when the blob is
    /// not an envelope at all, and with
    /// [`RegistryError::UnrecognizedClass`] -- naming the offending tag and
    /// every known tag -- when the envelope decodes but its class is not
    /// registered.
    pub fn load(&self, id: &ContentHash) -> RegistryResult<T> {
        let bytes = self.store.read_bytes(id)?;
        let envelope = Envelope::decode(&bytes)?;
        match self.constructors.get(envelope.class.as_str()) {
            Some(constructor) => constructor(envelope.value),
            None => Err(RegistryError::UnrecognizedClass {
                class: envelope.class,
                known: self.known_classes(),
            }),
        }
    }
}

impl<T> std::fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("known_classes", &self.known_classes())
            .finish()
    }
}

/// Registry over dried forms that hydrate into live values, adding scoped
/// acquisition on top of plain loading.
pub struct SerializableRegistry<T: Hydrate> {
    inner: Registry<T>,
}

impl<T: Hydrate> SerializableRegistry<T> {
    /// Create an empty registry over a store.
    pub fn new(store: Arc<dyn CasStore>) -> Self {
        Self {
            inner: Registry::new(store),
        }
    }

    /// Register a dried-form type under its class tag.
    pub fn register<R>(&mut self)
    where
        R: Registerable + Into<T>,
    {
        self.inner.register::<R>();
    }

    /// Load just the dried form, without hydrating.
    ///
    /// For callers that only need the recorded metadata.
    pub fn load(&self, id: &ContentHash) -> RegistryResult<T> {
        self.inner.load(id)
    }

    /// Load the dried form, hydrate it, and hand back a guard.
    ///
    /// The guard dereferences to the hydrated value; dropping it runs the
    /// format's `close`, so transient resources are released on every exit
    /// path out of the caller's scope -- normal return, early `?`, or
    /// panic.
    pub fn open(&self, id: &ContentHash) -> RegistryResult<Scoped<T>> {
        let dried = self.inner.load(id)?;
        let value = dried.unpack(self.inner.store().as_ref())?;
        Ok(Scoped {
            value: Some(value),
            dried,
        })
    }

    /// The store this registry loads from.
    pub fn store(&self) -> &Arc<dyn CasStore> {
        self.inner.store()
    }
}

impl<T: Hydrate> std::fmt::Debug for SerializableRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerializableRegistry")
            .field("known_classes", &self.inner.known_classes())
            .finish()
    }
}

/// Scope guard for a hydrated value.
///
/// Holds both the dried form and the value hydrated from it. Dereferences
/// to the hydrated value; on drop, the format's `close` runs exactly once.
pub struct Scoped<T: Hydrate> {
    dried: T,
    // Some until drop; taken exactly once by `close`.
    value: Option<T::Hydrated>,
}

impl<T: Hydrate> Scoped<T> {
    /// The dried form this value was hydrated from (metadata access).
    pub fn dried(&self) -> &T {
        &self.dried
    }
}

impl<T: Hydrate> Deref for Scoped<T> {
    type Target = T::Hydrated;

    fn deref(&self) -> &T::Hydrated {
        self.value.as_ref().expect("value present until drop")
    }
}

impl<T: Hydrate> DerefMut for Scoped<T> {
    fn deref_mut(&mut self) -> &mut T::Hydrated {
        self.value.as_mut().expect("value present until drop")
    }
}

impl<T: Hydrate> Drop for Scoped<T> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take() {
            self.dried.close(value);
        }
    }
}
