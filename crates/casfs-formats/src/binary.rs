use serde::{Deserialize, Serialize};

use casfs_registry::{Hydrate, Registerable, RegistryError, RegistryResult, Serializable};
use casfs_store::CasStore;
use casfs_types::ContentHash;

use crate::table::Table;

/// Dried form of a [`Table`] stored as a binary row matrix.
///
/// Same metadata shape as the delimited codec, but the payload is the
/// bincode dump of the rows -- denser and faster to decode, at the cost of
/// opacity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BinaryTable {
    /// Hash of the bincode payload blob.
    pub path: ContentHash,
    /// Column names, in order.
    pub column_names: Vec<String>,
}

impl Registerable for BinaryTable {
    const CLASS: &'static str = "BinaryTable";
}

impl Hydrate for BinaryTable {
    type Hydrated = Table;

    fn unpack(&self, store: &dyn CasStore) -> RegistryResult<Table> {
        let bytes = store.read_bytes(&self.path)?;
        let rows: Vec<Vec<f64>> =
            bincode::deserialize(&bytes).map_err(|e| RegistryError::Unpack {
                class: Self::CLASS.to_string(),
                reason: e.to_string(),
            })?;
        if let Some(row) = rows.iter().find(|row| row.len() != self.column_names.len()) {
            return Err(RegistryError::Unpack {
                class: Self::CLASS.to_string(),
                reason: format!(
                    "expected {} columns, got a row of {}",
                    self.column_names.len(),
                    row.len()
                ),
            });
        }
        Ok(Table::new(self.column_names.clone(), rows))
    }
}

impl Serializable for BinaryTable {
    fn pack(value: &Table, store: &dyn CasStore) -> RegistryResult<Self> {
        let bytes = bincode::serialize(&value.rows)
            .map_err(|e| RegistryError::Serialization(e.to_string()))?;
        let addr = store.put_bytes(&bytes, Some(".bin"))?;
        Ok(Self {
            path: addr.id(),
            column_names: value.columns.clone(),
        })
    }
}
