//! Format codecs for the casfs registry.
//!
//! Each codec implements the pack/unpack/close contract from
//! `casfs-registry` for one payload shape:
//!
//! - [`CsvTable`] -- tabular data as delimited text (`.csv` payload)
//! - [`BinaryTable`] -- tabular data as a bincode row matrix (`.bin`)
//! - [`TableFormat`] -- closed sum over the tabular codecs
//! - [`ArchiveDir`] -- a directory bundled as a gzipped tar archive,
//!   hydrated to an extraction directory that `close` removes
//! - [`OpaqueBlob`] -- any serde value as a single bincode blob
//!
//! The payload encodings are each codec's own business; the store sees
//! only bytes, and the registry sees only envelopes.

pub mod archive;
pub mod binary;
pub mod csv;
pub mod format;
pub mod opaque;
pub mod table;

// Re-export primary types at crate root for ergonomic imports.
pub use archive::ArchiveDir;
pub use binary::BinaryTable;
pub use csv::CsvTable;
pub use format::TableFormat;
pub use opaque::OpaqueBlob;
pub use table::{Table, TableError};
