//! Linear attribution explainer loaded from `explainer.json`.
//!
//! For a linear margin `f(x) = b + sum(w_i * x_i)` over the transformed row,
//! the exact Shapley value of column `i` under feature independence is
//! `w_i * (x_i - E[x_i])`, with base value `E[f(x)] = b + sum(w_i * E[x_i])`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{
    read_json, resolve_artifact, ArtifactError, LinearPipeline, EXPLAINER_FILE, SUPPORTED_VERSION,
};
use crate::ports::{Explainer, Preprocessor};
use crate::{GlycoscopeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplainerKind {
    Linear,
}

/// Explainer parameters as exported by the training side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedExplainer {
    pub version: u32,
    pub kind: ExplainerKind,
    pub expanded_columns: Vec<String>,
    pub coefficients: Vec<f64>,
    pub background_mean: Vec<f64>,
    pub expected_value: f64,
}

#[derive(Debug, Clone)]
pub struct LinearExplainer {
    expanded_columns: Vec<String>,
    coefficients: Vec<f64>,
    background_mean: Vec<f64>,
    expected_value: f64,
}

impl LinearExplainer {
    /// Load `explainer.json` from a model directory.
    ///
    /// # Errors
    /// Returns error if the file is missing, unreadable, or inconsistent.
    pub fn load(model_path: &Path) -> std::result::Result<Self, ArtifactError> {
        let path = resolve_artifact(model_path, EXPLAINER_FILE)?;
        let explainer = Self::from_exported(read_json(&path)?)?;
        tracing::info!(
            "Loaded explainer from {:?} (n_expanded={}, expected_value={:.4})",
            path,
            explainer.expanded_columns.len(),
            explainer.expected_value
        );
        Ok(explainer)
    }

    /// Load the explainer if the model directory ships one.
    ///
    /// # Errors
    /// Returns error only if the file exists but cannot be loaded.
    pub fn load_optional(model_path: &Path) -> std::result::Result<Option<Self>, ArtifactError> {
        match Self::load(model_path) {
            Ok(explainer) => Ok(Some(explainer)),
            Err(ArtifactError::NotFound { .. }) => {
                tracing::info!("No explainer artifact, attributions disabled");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// # Errors
    /// Returns `ArtifactError` on version or length problems.
    pub fn from_exported(exported: ExportedExplainer) -> std::result::Result<Self, ArtifactError> {
        if exported.version != SUPPORTED_VERSION {
            return Err(ArtifactError::UnsupportedVersion(exported.version));
        }
        let n = exported.expanded_columns.len();
        if n == 0 || exported.coefficients.len() != n || exported.background_mean.len() != n {
            return Err(ArtifactError::Inconsistent(format!(
                "Explainer lengths disagree: {} columns, {} coefficients, {} background means",
                n,
                exported.coefficients.len(),
                exported.background_mean.len()
            )));
        }
        if !exported.expected_value.is_finite() {
            return Err(ArtifactError::Inconsistent(
                "Explainer expected_value is not finite".into(),
            ));
        }

        Ok(Self {
            expanded_columns: exported.expanded_columns,
            coefficients: exported.coefficients,
            background_mean: exported.background_mean,
            expected_value: exported.expected_value,
        })
    }

    /// Build an explainer for a pipeline from the background mean of its transformed rows.
    ///
    /// # Errors
    /// Returns `ArtifactError` if `background_mean` does not match the expanded columns.
    pub fn from_pipeline(
        pipeline: &LinearPipeline,
        background_mean: Vec<f64>,
    ) -> std::result::Result<Self, ArtifactError> {
        let expected_value = pipeline.intercept()
            + pipeline
                .coefficients()
                .iter()
                .zip(&background_mean)
                .map(|(w, m)| w * m)
                .sum::<f64>();

        Self::from_exported(ExportedExplainer {
            version: SUPPORTED_VERSION,
            kind: ExplainerKind::Linear,
            expanded_columns: pipeline.expanded_column_names().to_vec(),
            coefficients: pipeline.coefficients().to_vec(),
            background_mean,
            expected_value,
        })
    }

    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }
}

impl Explainer for LinearExplainer {
    fn expanded_columns(&self) -> &[String] {
        &self.expanded_columns
    }

    fn attributions(&self, transformed: &[f64]) -> Result<Vec<f64>> {
        if transformed.len() != self.expanded_columns.len() {
            let actual: Vec<String> = (0..transformed.len()).map(|i| format!("x[{i}]")).collect();
            return Err(GlycoscopeError::mismatch(&self.expanded_columns, &actual));
        }
        Ok(transformed
            .iter()
            .zip(&self.coefficients)
            .zip(&self.background_mean)
            .map(|((x, w), m)| w * (x - m))
            .collect())
    }

    fn expected_value(&self) -> f64 {
        self.expected_value
    }
}
