//! Explainer port: Trait for per-column attribution of a prediction.

use crate::Result;

/// Trait for attribution explainers.
///
/// Explainers operate on the preprocessor's transformed row, not on the
/// raw feature vector, and return one signed value per expanded column.
pub trait Explainer: Send + Sync {
    /// Ordered expanded columns the explainer was built for.
    fn expanded_columns(&self) -> &[String];

    /// Attribution values for a transformed row.
    ///
    /// # Errors
    /// Returns `ModelInputMismatch` if the row length differs from `expanded_columns()`.
    fn attributions(&self, transformed: &[f64]) -> Result<Vec<f64>>;

    /// Expected model output (margin) over the background data.
    fn expected_value(&self) -> f64;
}
