//! Assessment service: Orchestrates one prediction request.
//!
//! This service coordinates:
//! - Input range validation
//! - Feature derivation for the active schema
//! - Schema-checked scoring
//! - Optional attribution (preprocess, explain, aggregate)

use std::sync::Arc;

use crate::domain::features::input_bmi;
use crate::domain::{
    aggregate, bmi_status, derive_features, Assessment, AttributionVector, FeatureNameMapping,
    FeatureSchema, FeatureVector, RiskThresholds, SurveyInput,
};
use crate::ports::{Classifier, Explainer, Preprocessor};
use crate::{GlycoscopeError, Result};

use super::scoring::RiskScorer;

/// Service for running risk assessments.
///
/// The loaded artifacts are immutable and shared through `Arc`; the service
/// holds no per-request state, so one instance serves every request.
pub struct AssessmentService<P, C, E>
where
    P: Preprocessor,
    C: Classifier,
    E: Explainer,
{
    preprocessor: Arc<P>,
    scorer: RiskScorer<C>,
    explainer: Option<Arc<E>>,
    schema: FeatureSchema,
    mapping: FeatureNameMapping,
    thresholds: RiskThresholds,
}

impl<P, C, E> AssessmentService<P, C, E>
where
    P: Preprocessor,
    C: Classifier,
    E: Explainer,
{
    /// Compose a service from its stages.
    ///
    /// # Errors
    /// Returns `ModelInputMismatch` if the explainer was built for different
    /// expanded columns than the preprocessor emits.
    pub fn new(
        preprocessor: Arc<P>,
        classifier: Arc<C>,
        explainer: Option<Arc<E>>,
        schema: FeatureSchema,
    ) -> Result<Self> {
        if let Some(explainer) = &explainer {
            let expanded = preprocessor.expanded_column_names();
            if explainer.expanded_columns() != expanded {
                return Err(GlycoscopeError::mismatch(
                    expanded,
                    explainer.expanded_columns(),
                ));
            }
        }

        tracing::info!(
            "Assessment service ready (schema={}, explainer={})",
            schema,
            explainer.is_some()
        );

        Ok(Self {
            preprocessor,
            scorer: RiskScorer::new(classifier),
            explainer,
            schema,
            mapping: FeatureNameMapping::from_schema(schema),
            thresholds: RiskThresholds::default(),
        })
    }

    #[must_use]
    pub fn with_thresholds(mut self, thresholds: RiskThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    #[must_use]
    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }

    #[must_use]
    pub fn can_explain(&self) -> bool {
        self.explainer.is_some()
    }

    /// Attribution of a prediction back to the schema's logical features.
    ///
    /// # Errors
    /// Returns `ModelNotLoaded` without an explainer, or a mismatch error
    /// from any stage.
    pub fn explain(&self, features: &FeatureVector) -> Result<AttributionVector> {
        let explainer = self
            .explainer
            .as_ref()
            .ok_or_else(|| GlycoscopeError::ModelNotLoaded("No explainer loaded".to_string()))?;

        tracing::debug!("Transforming features for attribution...");
        let transformed = self.preprocessor.transform(features)?;
        let values = explainer.attributions(&transformed)?;

        aggregate(
            &values,
            self.preprocessor.expanded_column_names(),
            &self.mapping,
            explainer.expected_value(),
        )
    }

    /// Run a full assessment for one survey submission.
    ///
    /// # Errors
    /// Returns `Validation` for out-of-range answers, `MissingInput` if the
    /// schema needs an unanswered question, and scoring/attribution errors.
    pub fn assess(&self, input: &SurveyInput, explain: bool) -> Result<Assessment> {
        input
            .validate()
            .map_err(|errors| GlycoscopeError::Validation(errors.join(", ")))?;

        tracing::debug!("Step 1: Deriving features...");
        let features = derive_features(input, self.schema)?;

        tracing::debug!("Step 2: Scoring...");
        let prediction = self.scorer.score(&features)?;
        let risk_level = self.thresholds.classify(prediction.probability);

        let attribution = if explain && self.can_explain() {
            tracing::debug!("Step 3: Computing attributions...");
            Some(self.explain(&features)?)
        } else {
            None
        };

        let bmi = input_bmi(input);

        tracing::info!(
            "Assessment complete: prediction={}, confidence={:.2}%, risk={}",
            prediction.label,
            prediction.confidence * 100.0,
            risk_level
        );

        Ok(Assessment {
            schema: self.schema,
            features,
            bmi,
            bmi_status: bmi_status(bmi),
            prediction,
            risk_level,
            attribution,
            created_at: chrono::Utc::now(),
        })
    }
}
