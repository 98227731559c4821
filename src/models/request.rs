//! Request payloads

use serde::Deserialize;

use crate::logic::table::{DataTable, TableError};

/// Tabular scoring payload shared by the prediction and explanation routes:
/// row-major values plus the column names they are keyed by. `null` cells are
/// missing values.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreRequest {
    pub data: Vec<Vec<Option<f64>>>,
    pub columns: Vec<String>,
}

impl ScoreRequest {
    /// Decode into a validated table.
    pub fn into_table(self) -> Result<DataTable, TableError> {
        DataTable::from_parts(self.data, self.columns)
    }
}
