use casfs_registry::{Hydrate, RegistryResult};
use casfs_store::CasStore;

use crate::binary::BinaryTable;
use crate::csv::CsvTable;
use crate::table::Table;

/// Closed sum over the tabular codecs.
///
/// A registry of tabular formats dispatches envelope tags into variants of
/// this type; every variant hydrates to the same [`Table`]. New codecs are
/// new variants, not runtime type discovery.
#[derive(Clone, Debug, PartialEq)]
pub enum TableFormat {
    Csv(CsvTable),
    Binary(BinaryTable),
}

impl TableFormat {
    /// Column names recorded in the dried form, whatever the codec.
    pub fn column_names(&self) -> &[String] {
        match self {
            Self::Csv(t) => &t.column_names,
            Self::Binary(t) => &t.column_names,
        }
    }
}

impl From<CsvTable> for TableFormat {
    fn from(t: CsvTable) -> Self {
        Self::Csv(t)
    }
}

impl From<BinaryTable> for TableFormat {
    fn from(t: BinaryTable) -> Self {
        Self::Binary(t)
    }
}

impl Hydrate for TableFormat {
    type Hydrated = Table;

    fn unpack(&self, store: &dyn CasStore) -> RegistryResult<Table> {
        match self {
            Self::Csv(t) => t.unpack(store),
            Self::Binary(t) => t.unpack(store),
        }
    }

    fn close(&self, hydrated: Table) {
        match self {
            Self::Csv(t) => t.close(hydrated),
            Self::Binary(t) => t.close(hydrated),
        }
    }
}
