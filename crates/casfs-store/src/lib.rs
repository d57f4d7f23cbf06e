//! Tiered content-addressable blob storage.
//!
//! Blobs are identified by the BLAKE3 hash of their bytes and laid out
//! under shard directories derived from hash prefixes, so the same content
//! always lands at the same path no matter who writes it.
//!
//! Two tiers:
//!
//! - [`LocalStore`] -- local-disk tier: hash, shard, write, read,
//!   existence check. Fast, treated as a cache.
//! - [`TieredStore`] -- wraps a `LocalStore` with a durable
//!   [`RemoteTier`]. Writes go local-first and upload only when the remote
//!   key is absent; reads promote remote objects into the local tier on
//!   demand, recovering the stored extension from the remote key listing.
//!
//! Both implement the [`CasStore`] trait, which is the seam the
//! serialization layer programs against.
//!
//! # Design Rules
//!
//! 1. Content addressing is deterministic: identical bytes always map to
//!    the same address, across instances and tiers.
//! 2. Blobs are immutable once written; a repeated `put` of identical
//!    content is a no-op.
//! 3. Absence is a normal outcome for `get` ([`Option`]) and an error for
//!    `open` ([`StoreError::Missing`]).
//! 4. Remote failures other than "not found" are propagated as
//!    [`StoreError::Transport`], never collapsed into absence.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod local;
pub mod remote;
pub mod shard;
pub mod tiered;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use local::LocalStore;
pub use remote::{InMemoryRemote, RemoteTier};
pub use shard::ShardConfig;
pub use tiered::TieredStore;
pub use traits::CasStore;
