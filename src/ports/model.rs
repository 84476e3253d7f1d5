//! Model ports: Traits for the fitted preprocessing and classification stages.
//!
//! A fitted pipeline is exposed as two explicit stages instead of being
//! introspected: a `Preprocessor` that scales/encodes a row, and a
//! `Classifier` that scores a row against the columns it was fit on.

use crate::domain::FeatureVector;
use crate::Result;

/// Trait for the preprocessing stage of a fitted model pipeline.
pub trait Preprocessor: Send + Sync {
    /// Transform a model-ready row into its expanded representation.
    ///
    /// The output has one value per entry of `expanded_column_names()`.
    ///
    /// # Errors
    /// Returns `ModelInputMismatch` if the row's columns differ from the fitted ones.
    fn transform(&self, row: &FeatureVector) -> Result<Vec<f64>>;

    /// Ordered names of the columns `transform` emits.
    fn expanded_column_names(&self) -> &[String];
}

/// Trait for a fitted binary classifier.
pub trait Classifier: Send + Sync {
    /// Ordered input columns the classifier was fit on.
    fn feature_names(&self) -> &[String];

    /// Class probabilities `[p_negative, p_positive]` for a single row.
    ///
    /// # Errors
    /// Returns `ModelInputMismatch` if the row's columns differ from `feature_names()`.
    fn predict_probability(&self, row: &FeatureVector) -> Result<[f64; 2]>;
}
