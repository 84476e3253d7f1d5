//! Domain layer: Core types and pure logic.
//!
//! This module contains plain Rust types with no I/O.
//! All types are serializable and validated at the input boundary.

pub mod attribution;
pub mod features;
mod prediction;
mod survey;

pub use attribution::{aggregate, AttributionVector, Contribution, FeatureNameMapping};
pub use features::{
    age_to_group, bmi_status, bp_to_flag, bp_values_to_flag, chol_to_flag, compute_bmi,
    derive_features, BmiStatus, Column, FeatureSchema, FeatureVector,
};
pub use prediction::{Assessment, Prediction, RiskLevel, RiskThresholds, DECISION_THRESHOLD};
pub use survey::{AgeInput, BloodPressure, BodyMeasure, Sex, SurveyInput};
