//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the core use cases of the application.

mod assessment;
mod scoring;

pub use assessment::AssessmentService;
pub use scoring::RiskScorer;

use crate::adapters::linear::{LinearExplainer, LinearPipeline};

/// Assessment service over the JSON-exported linear pipeline.
pub type LinearAssessmentService =
    AssessmentService<LinearPipeline, LinearPipeline, LinearExplainer>;
