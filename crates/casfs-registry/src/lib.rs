//! Typed serialization registry over the content-addressable store.
//!
//! Application values are persisted as content-addressed blobs through a
//! per-format contract and reconstructed later by type tag:
//!
//! - [`Envelope`] -- the `{"class": tag, "value": fields}` wire wrapper
//!   persisted for every registered type; encode/decode only, no I/O
//! - [`Registerable`] -- a dried form: a structured value that rides
//!   inside an envelope and can dump itself into a store
//! - [`Hydrate`] -- reconstruction half of the contract: unpack a dried
//!   form into a live value, and close whatever unpack allocated
//! - [`Serializable`] -- the full pack/unpack/close contract per format
//! - [`Registry`] -- closed tag-to-constructor table; loads an envelope
//!   and reconstructs the tagged dried form
//! - [`SerializableRegistry`] -- registry plus scoped [`open`]: hands the
//!   caller a hydrated value behind a guard whose drop releases the
//!   value's transient resources on every exit path
//!
//! [`open`]: SerializableRegistry::open
//!
//! Unknown tags and malformed envelopes are data errors with distinct
//! types; nothing decodes partially or silently.

pub mod envelope;
pub mod error;
pub mod registerable;
pub mod registry;

// Re-export primary types at crate root for ergonomic imports.
pub use envelope::Envelope;
pub use error::{RegistryError, RegistryResult};
pub use registerable::{Hydrate, Registerable, Serializable};
pub use registry::{Registry, Scoped, SerializableRegistry};
