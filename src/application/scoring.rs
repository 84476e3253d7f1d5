//! Risk scorer: schema-checked probability output of the classifier.

use std::sync::Arc;

use crate::domain::{FeatureVector, Prediction};
use crate::ports::Classifier;
use crate::{GlycoscopeError, Result};

/// Scores feature vectors against a loaded classifier.
///
/// The vector's columns must equal the classifier's fitted columns, in
/// order. A mismatch is an error, never a silently misaligned score.
pub struct RiskScorer<C>
where
    C: Classifier,
{
    classifier: Arc<C>,
}

impl<C> RiskScorer<C>
where
    C: Classifier,
{
    pub fn new(classifier: Arc<C>) -> Self {
        Self { classifier }
    }

    /// Verify that `row` has exactly the classifier's columns in the same order.
    ///
    /// # Errors
    /// Returns `ModelInputMismatch` listing both column lists.
    pub fn check_columns(&self, row: &FeatureVector) -> Result<()> {
        let expected = self.classifier.feature_names();
        if row.names() != expected {
            tracing::error!(
                "Feature vector has {} columns, classifier expects {}",
                row.len(),
                expected.len()
            );
            return Err(GlycoscopeError::mismatch(expected, row.names()));
        }
        Ok(())
    }

    /// Probability of the positive (at-risk) class for `row`.
    ///
    /// # Errors
    /// Returns `ModelInputMismatch` on a column mismatch and
    /// `InvalidProbability` if the classifier output is not in [0, 1].
    pub fn score(&self, row: &FeatureVector) -> Result<Prediction> {
        self.check_columns(row)?;

        let [_, positive] = self.classifier.predict_probability(row)?;
        if !positive.is_finite() || !(0.0..=1.0).contains(&positive) {
            return Err(GlycoscopeError::InvalidProbability(positive));
        }

        Ok(Prediction::new(positive))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeatureSchema;

    struct FixedClassifier {
        names: Vec<String>,
        output: [f64; 2],
    }

    impl FixedClassifier {
        fn compact(output: [f64; 2]) -> Arc<Self> {
            Arc::new(Self {
                names: FeatureSchema::Compact
                    .names()
                    .into_iter()
                    .map(String::from)
                    .collect(),
                output,
            })
        }
    }

    impl Classifier for FixedClassifier {
        fn feature_names(&self) -> &[String] {
            &self.names
        }

        fn predict_probability(&self, _row: &FeatureVector) -> Result<[f64; 2]> {
            Ok(self.output)
        }
    }

    fn row(names: &[&str]) -> FeatureVector {
        FeatureVector::from_parts(
            names.iter().map(|s| s.to_string()).collect(),
            vec![1.0; names.len()],
        )
        .expect("row")
    }

    #[test]
    fn test_score_selects_positive_class() {
        let scorer = RiskScorer::new(FixedClassifier::compact([0.3, 0.7]));
        let prediction = scorer
            .score(&row(&["BMI", "AgeGroup", "BMI_PhysActivity", "AgeGroup_sq"]))
            .expect("score");
        assert!((prediction.probability - 0.7).abs() < f64::EPSILON);
        assert_eq!(prediction.label, 1);
    }

    #[test]
    fn test_missing_extra_and_reordered_columns_fail() {
        let scorer = RiskScorer::new(FixedClassifier::compact([0.9, 0.1]));
        let cases = [
            row(&["BMI", "AgeGroup", "BMI_PhysActivity"]),
            row(&["BMI", "AgeGroup", "BMI_PhysActivity", "AgeGroup_sq", "Sex"]),
            row(&["AgeGroup", "BMI", "BMI_PhysActivity", "AgeGroup_sq"]),
            row(&["BMI", "AgeGroup", "BMI_PhysAct", "AgeGroup_Sq"]),
        ];
        for case in &cases {
            let err = scorer.score(case).expect_err("must fail");
            match err {
                GlycoscopeError::ModelInputMismatch { expected, actual } => {
                    assert_eq!(expected.len(), 4);
                    assert_eq!(actual, case.names());
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_out_of_range_probability_fails() {
        let names = ["BMI", "AgeGroup", "BMI_PhysActivity", "AgeGroup_sq"];
        for output in [[0.0, 1.5], [1.0, -0.1], [0.0, f64::NAN]] {
            let scorer = RiskScorer::new(FixedClassifier::compact(output));
            assert!(matches!(
                scorer.score(&row(&names)),
                Err(GlycoscopeError::InvalidProbability(_))
            ));
        }
    }
}
