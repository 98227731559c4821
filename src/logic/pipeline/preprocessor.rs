//! Fitted column-transformer runtime.
//!
//! The preprocessor emits the feature space the classifier was trained on:
//! scaled columns first (in the scaler's output order), then passthrough
//! columns (input columns the scaler does not consume, in original order).
//! The emitted column order and the feature-name list come from the same
//! configuration, resolved once at load. Attribution values are positionally
//! aligned to feature names, so the two must never drift apart.

use ndarray::Array2;

use crate::logic::pipeline::PipelineError;
use crate::logic::table::DataTable;

/// One column consumed by the scaling sub-transformer.
#[derive(Debug, Clone)]
pub struct ScaledColumn {
    pub name: String,
    pub center: f64,
    pub scale: f64,
}

/// Static configuration of the fitted column transformer.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    /// Scaler columns in the scaler's output order.
    scaled: Vec<ScaledColumn>,
    /// Input columns forwarded unchanged, original order.
    passthrough: Vec<String>,
}

impl Preprocessor {
    /// Resolve the transformer configuration.
    ///
    /// Passthrough columns are the declared inputs minus the scaler's inputs,
    /// preserving original order.
    pub fn new(input_columns: Vec<String>, scaled: Vec<ScaledColumn>) -> Self {
        let passthrough = input_columns
            .into_iter()
            .filter(|name| !scaled.iter().any(|s| s.name == *name))
            .collect();

        Self {
            scaled,
            passthrough,
        }
    }

    /// Number of columns the transformed matrix has.
    pub fn n_output_features(&self) -> usize {
        self.scaled.len() + self.passthrough.len()
    }

    /// Output feature names: scaled names (scaler output order), then
    /// passthrough names (original order). Matches the column order
    /// [`transform`](Self::transform) emits.
    pub fn feature_names(&self) -> Vec<String> {
        self.scaled
            .iter()
            .map(|s| s.name.clone())
            .chain(self.passthrough.iter().cloned())
            .collect()
    }

    /// Transform a decoded table into the classifier's feature matrix.
    ///
    /// Missing cells become NaN; the classifier routes NaN by each node's
    /// default direction. The caller's column order does not matter since
    /// columns are looked up by name. A column the transformer needs but the
    /// caller did not send is an error.
    pub fn transform(&self, table: &DataTable) -> Result<Array2<f64>, PipelineError> {
        let scaled_indices = self
            .scaled
            .iter()
            .map(|s| self.require_column(table, &s.name))
            .collect::<Result<Vec<_>, _>>()?;
        let passthrough_indices = self
            .passthrough
            .iter()
            .map(|name| self.require_column(table, name))
            .collect::<Result<Vec<_>, _>>()?;

        let n_rows = table.n_rows();
        let n_out = self.n_output_features();
        let mut matrix = Array2::zeros((n_rows, n_out));

        for row in 0..n_rows {
            for (j, (s, &col)) in self.scaled.iter().zip(&scaled_indices).enumerate() {
                matrix[[row, j]] = match table.value(row, col) {
                    Some(v) => (v - s.center) / s.scale,
                    None => f64::NAN,
                };
            }
            for (j, &col) in passthrough_indices.iter().enumerate() {
                matrix[[row, self.scaled.len() + j]] =
                    table.value(row, col).unwrap_or(f64::NAN);
            }
        }

        Ok(matrix)
    }

    fn require_column(&self, table: &DataTable, name: &str) -> Result<usize, PipelineError> {
        table
            .column_index(name)
            .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
    }
}
