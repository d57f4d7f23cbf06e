//! Leaf value types for the casfs content-addressable store.
//!
//! - [`ContentHash`] -- BLAKE3 digest identifying a blob by its bytes
//! - [`ContentHasher`] -- incremental digest for streaming writes
//! - [`Address`] -- a content hash plus the optional filename extension it
//!   was stored under
//!
//! These types carry no I/O; the store crates build on them.

pub mod address;
pub mod error;
pub mod hash;

// Re-export primary types at crate root for ergonomic imports.
pub use address::Address;
pub use error::TypeError;
pub use hash::{ContentHash, ContentHasher};
