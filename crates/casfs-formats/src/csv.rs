use serde::{Deserialize, Serialize};

use casfs_registry::{Hydrate, Registerable, RegistryError, RegistryResult, Serializable};
use casfs_store::CasStore;
use casfs_types::ContentHash;

use crate::table::Table;

/// Dried form of a [`Table`] stored as delimited text.
///
/// The payload blob holds the cell matrix without a header row; the column
/// names live here, in the dried form, so the payload is a plain `.csv`
/// any other tool can read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CsvTable {
    /// Hash of the delimited-text payload blob.
    pub path: ContentHash,
    /// Column names, in order.
    pub column_names: Vec<String>,
}

impl Registerable for CsvTable {
    const CLASS: &'static str = "CsvTable";
}

impl Hydrate for CsvTable {
    type Hydrated = Table;

    fn unpack(&self, store: &dyn CasStore) -> RegistryResult<Table> {
        let bytes = store.read_bytes(&self.path)?;
        Table::from_delimited(&bytes, &self.column_names).map_err(|e| RegistryError::Unpack {
            class: Self::CLASS.to_string(),
            reason: e.to_string(),
        })
    }
}

impl Serializable for CsvTable {
    fn pack(value: &Table, store: &dyn CasStore) -> RegistryResult<Self> {
        let addr = store.put_bytes(&value.to_delimited(), Some(".csv"))?;
        Ok(Self {
            path: addr.id(),
            column_names: value.columns.clone(),
        })
    }
}
