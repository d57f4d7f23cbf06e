use serde::{Deserialize, Serialize};

/// Errors from the delimited-text table encoding.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TableError {
    /// Payload bytes were not UTF-8.
    #[error("payload is not UTF-8: {0}")]
    NotUtf8(String),

    /// A cell did not parse as a number.
    #[error("line {line}: not a number: {token:?}")]
    BadNumber { line: usize, token: String },

    /// A row had the wrong number of cells.
    #[error("line {line}: expected {expected} columns, got {actual}")]
    WrongWidth {
        line: usize,
        expected: usize,
        actual: usize,
    },
}

/// In-memory tabular value: named columns over a rectangular matrix of
/// 64-bit floats.
///
/// The hydrated counterpart of the tabular dried forms. Column names never
/// appear in the stored payload; they ride in the dried form's metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl Table {
    /// Create a table from row-major data.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Self {
        Self { columns, rows }
    }

    /// Build a table from column-major data.
    ///
    /// All columns must have the same length.
    pub fn from_columns(columns: &[(&str, Vec<f64>)]) -> Self {
        let names = columns.iter().map(|(name, _)| name.to_string()).collect();
        let height = columns.first().map(|(_, cells)| cells.len()).unwrap_or(0);
        let rows = (0..height)
            .map(|i| columns.iter().map(|(_, cells)| cells[i]).collect())
            .collect();
        Self {
            columns: names,
            rows,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of a named column, if present.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[index]).collect())
    }

    /// Delimited-text encoding: one comma-separated line per row, no
    /// header. Cells use the shortest round-trip float representation, so
    /// decoding recovers the exact values.
    pub fn to_delimited(&self) -> Vec<u8> {
        let mut out = String::new();
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            out.push_str(&cells.join(","));
            out.push('\n');
        }
        out.into_bytes()
    }

    /// Parse the encoding produced by [`Table::to_delimited`], attaching
    /// the given column names.
    pub fn from_delimited(bytes: &[u8], columns: &[String]) -> Result<Self, TableError> {
        let text = std::str::from_utf8(bytes).map_err(|e| TableError::NotUtf8(e.to_string()))?;
        let mut rows = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let cells: Vec<f64> = line
                .split(',')
                .map(|token| {
                    token.parse::<f64>().map_err(|_| TableError::BadNumber {
                        line: i + 1,
                        token: token.to_string(),
                    })
                })
                .collect::<Result<_, _>>()?;
            if cells.len() != columns.len() {
                return Err(TableError::WrongWidth {
                    line: i + 1,
                    expected: columns.len(),
                    actual: cells.len(),
                });
            }
            rows.push(cells);
        }
        Ok(Self {
            columns: columns.to_vec(),
            rows,
        })
    }
}
