//! Ports layer: Trait definitions for external artifacts.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and the loaded model artifacts.

mod explainer;
mod model;

pub use explainer::Explainer;
pub use model::{Classifier, Preprocessor};
