//! Adapters layer: Concrete implementations of ports.
//!
//! These modules contain the integration with external artifacts and sinks:
//! - `linear`: JSON-exported column transformer, logistic regression and linear explainer
//! - `sanitize`: Survey-answer filtering for logs

pub mod linear;
pub mod sanitize;

// Re-export artifact error for lib.rs
pub use linear::ArtifactError;
