use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, RegistryResult};

/// Wire wrapper persisted for every registered type.
///
/// Serialized form: `{"class": "<Tag>", "value": {...}}`, UTF-8 JSON.
/// `class` names a registered type; `value` is that type's field-level
/// encoding. Encode and decode are pure; an envelope has no lifecycle
/// beyond a single store round-trip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Stable, human-readable type tag.
    pub class: String,
    /// The tagged type's field-level encoding.
    pub value: serde_json::Value,
}

impl Envelope {
    /// Wrap a value under a class tag.
    pub fn new(class: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            class: class.into(),
            value,
        }
    }

    /// Serialize to the canonical JSON form.
    pub fn encode(&self) -> RegistryResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| RegistryError::Serialization(e.to_string()))
    }

    /// Parse bytes as an envelope.
    ///
    /// Bytes that are not JSON, or JSON without the class/value shape,
    /// fail with [`RegistryError::MalformedEnvelope`]. An unrecognized
    /// class tag is detected one layer up, in the registry.
    pub fn decode(bytes: &[u8]) -> RegistryResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| RegistryError::MalformedEnvelope {
            reason: e.to_string(),
        })
    }
}
