//! # Glycoscope
//!
//! Diabetes risk estimation from health-survey inputs.
//!
//! This crate provides:
//! - Feature derivation from raw survey answers into a model's fixed schema
//! - Schema-checked scoring against a pre-trained binary classifier
//! - Per-feature attribution aggregation for explaining a prediction
//! - Terminal UI for collecting inputs and displaying results
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (SurveyInput, FeatureVector, Prediction, attributions)
//! - `ports`: Trait definitions for the model artifacts (Preprocessor, Classifier, Explainer)
//! - `adapters`: Concrete implementations (JSON linear pipeline, log sanitization)
//! - `application`: Use cases orchestrating domain and ports
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{FeatureSchema, FeatureVector, Prediction, RiskLevel, SurveyInput};

/// Result type for Glycoscope operations
pub type Result<T> = std::result::Result<T, GlycoscopeError>;

/// Main error type for Glycoscope
#[derive(Debug, thiserror::Error)]
pub enum GlycoscopeError {
    #[error("Model input mismatch: expected columns {expected:?}, got {actual:?}")]
    ModelInputMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Missing input for schema column: {0}")]
    MissingInput(&'static str),

    #[error("Invalid survey input: {0}")]
    Validation(String),

    #[error("Classifier returned an invalid probability: {0}")]
    InvalidProbability(f64),

    #[error("Model not loaded: {0}")]
    ModelNotLoaded(String),

    #[error("Model artifact error: {0}")]
    Artifact(#[from] adapters::ArtifactError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GlycoscopeError {
    /// Build a column mismatch error from any two name lists.
    pub(crate) fn mismatch<E, A>(expected: &[E], actual: &[A]) -> Self
    where
        E: AsRef<str>,
        A: AsRef<str>,
    {
        Self::ModelInputMismatch {
            expected: expected.iter().map(|s| s.as_ref().to_string()).collect(),
            actual: actual.iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }
}
