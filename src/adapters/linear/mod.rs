//! Linear pipeline adapter: JSON-exported preprocessing + logistic regression.
//!
//! The training side exports a fitted pipeline as `pipeline.json`:
//!
//! ```json
//! {
//!   "version": 1,
//!   "schema": "clinical",
//!   "feature_names": ["HighBP", "HighChol", "..."],
//!   "preprocessor": { "steps": [
//!     { "kind": "passthrough", "column": "HighBP" },
//!     { "kind": "one_hot", "column": "GenHlth", "categories": [1, 2, 3, 4, 5] },
//!     { "kind": "standard_scale", "column": "BMI", "mean": 28.4, "std": 6.6 }
//!   ] },
//!   "classifier": { "coefficients": [0.71, "..."], "intercept": -1.9 }
//! }
//! ```
//!
//! Steps emit expanded columns in order: `<col>` for passthrough,
//! `<col>_scaled` for scaling, `<col>_<category>` for one-hot. Classifier
//! coefficients are indexed by expanded column.
//!
//! # Thread Safety
//!
//! `LinearPipeline` is immutable after loading and may be shared via `Arc`.

mod explainer;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::{FeatureSchema, FeatureVector};
use crate::ports::{Classifier, Preprocessor};
use crate::{GlycoscopeError, Result};

pub use explainer::{ExplainerKind, ExportedExplainer, LinearExplainer};

/// File name of the exported pipeline inside a model directory.
pub const PIPELINE_FILE: &str = "pipeline.json";

/// File name of the exported explainer inside a model directory.
pub const EXPLAINER_FILE: &str = "explainer.json";

/// Artifact format version this adapter reads.
const SUPPORTED_VERSION: u32 = 1;

/// One-hot category matching tolerance.
const CATEGORY_EPSILON: f64 = 1e-9;

/// Errors raised while loading model artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("No {file} found in {dir:?}")]
    NotFound { file: &'static str, dir: PathBuf },

    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported artifact version: {0}")]
    UnsupportedVersion(u32),

    #[error("Inconsistent artifact: {0}")]
    Inconsistent(String),
}

/// A fitted per-column transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnStep {
    Passthrough { column: String },
    StandardScale { column: String, mean: f64, std: f64 },
    OneHot { column: String, categories: Vec<f64> },
}

impl ColumnStep {
    #[must_use]
    pub fn column(&self) -> &str {
        match self {
            Self::Passthrough { column }
            | Self::StandardScale { column, .. }
            | Self::OneHot { column, .. } => column,
        }
    }

    /// Names of the columns this step emits.
    #[must_use]
    pub fn expanded_names(&self) -> Vec<String> {
        match self {
            Self::Passthrough { column } => vec![column.clone()],
            Self::StandardScale { column, .. } => vec![format!("{column}_scaled")],
            Self::OneHot { column, categories } => categories
                .iter()
                .map(|c| format!("{column}_{}", format_category(*c)))
                .collect(),
        }
    }

    fn apply(&self, value: f64, out: &mut Vec<f64>) {
        match self {
            Self::Passthrough { .. } => out.push(value),
            Self::StandardScale { mean, std, .. } => out.push((value - mean) / std),
            // Unknown categories encode as all zeros.
            Self::OneHot { categories, .. } => out.extend(
                categories
                    .iter()
                    .map(|c| if (value - c).abs() < CATEGORY_EPSILON { 1.0 } else { 0.0 }),
            ),
        }
    }

    fn check(&self) -> std::result::Result<(), ArtifactError> {
        match self {
            Self::Passthrough { .. } => Ok(()),
            Self::StandardScale { column, mean, std } => {
                if !mean.is_finite() || !std.is_finite() || *std <= 0.0 {
                    return Err(ArtifactError::Inconsistent(format!(
                        "Scaler for {column} needs finite mean and positive std"
                    )));
                }
                Ok(())
            }
            Self::OneHot { column, categories } => {
                if categories.is_empty() {
                    return Err(ArtifactError::Inconsistent(format!(
                        "One-hot encoder for {column} has no categories"
                    )));
                }
                Ok(())
            }
        }
    }
}

fn format_category(c: f64) -> String {
    if c.fract() == 0.0 && c.abs() < 1e15 {
        format!("{}", c as i64)
    } else {
        format!("{c}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedPreprocessor {
    pub steps: Vec<ColumnStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedClassifier {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// Pipeline parameters as exported by the training side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedPipeline {
    pub version: u32,
    pub schema: FeatureSchema,
    pub feature_names: Vec<String>,
    pub preprocessor: ExportedPreprocessor,
    pub classifier: ExportedClassifier,
}

/// Resolve an artifact path from either a model directory or a file inside it.
pub(crate) fn resolve_artifact(
    model_path: &Path,
    file: &'static str,
) -> std::result::Result<PathBuf, ArtifactError> {
    let base_dir = if model_path.is_file() {
        model_path.parent().unwrap_or(model_path)
    } else {
        model_path
    };
    let candidate = base_dir.join(file);
    if candidate.is_file() {
        Ok(candidate)
    } else {
        Err(ArtifactError::NotFound {
            file,
            dir: base_dir.to_path_buf(),
        })
    }
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> std::result::Result<T, ArtifactError> {
    let content = std::fs::read_to_string(path).map_err(|source| ArtifactError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Numerically stable logistic function.
#[must_use]
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Fitted column transformer + logistic regression, loaded from JSON.
#[derive(Debug, Clone)]
pub struct LinearPipeline {
    schema: FeatureSchema,
    feature_names: Vec<String>,
    /// Each step with the index of the input column it reads.
    steps: Vec<(usize, ColumnStep)>,
    expanded: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearPipeline {
    /// Load `pipeline.json` from a model directory (or a path to the file itself).
    ///
    /// # Errors
    /// Returns error if the file is missing, unreadable, or internally inconsistent.
    pub fn load(model_path: &Path) -> std::result::Result<Self, ArtifactError> {
        let path = resolve_artifact(model_path, PIPELINE_FILE)?;
        let exported: ExportedPipeline = read_json(&path)?;
        let pipeline = Self::from_exported(exported)?;

        tracing::info!(
            "Loaded pipeline from {:?} (schema={}, n_features={}, n_expanded={})",
            path,
            pipeline.schema,
            pipeline.feature_names.len(),
            pipeline.expanded.len()
        );
        Ok(pipeline)
    }

    /// Build a pipeline from exported parameters, checking their consistency.
    ///
    /// # Errors
    /// Returns `ArtifactError` on version, coverage or length problems.
    pub fn from_exported(exported: ExportedPipeline) -> std::result::Result<Self, ArtifactError> {
        if exported.version != SUPPORTED_VERSION {
            return Err(ArtifactError::UnsupportedVersion(exported.version));
        }

        let n = exported.feature_names.len();
        if n == 0 {
            return Err(ArtifactError::Inconsistent("feature_names is empty".into()));
        }
        let unique: HashSet<&str> = exported.feature_names.iter().map(String::as_str).collect();
        if unique.len() != n {
            return Err(ArtifactError::Inconsistent(
                "feature_names contains duplicates".into(),
            ));
        }

        let schema_names = exported.schema.names();
        if exported.feature_names != schema_names {
            tracing::warn!(
                "Pipeline feature_names differ from the declared {} schema; scoring will reject derived rows",
                exported.schema
            );
        }

        let mut covered = vec![false; n];
        let mut steps = Vec::with_capacity(exported.preprocessor.steps.len());
        let mut expanded = Vec::new();
        for step in exported.preprocessor.steps {
            step.check()?;
            let idx = exported
                .feature_names
                .iter()
                .position(|name| name == step.column())
                .ok_or_else(|| {
                    ArtifactError::Inconsistent(format!(
                        "Preprocessor step references unknown column {}",
                        step.column()
                    ))
                })?;
            if covered[idx] {
                return Err(ArtifactError::Inconsistent(format!(
                    "Column {} is transformed more than once",
                    step.column()
                )));
            }
            covered[idx] = true;
            expanded.extend(step.expanded_names());
            steps.push((idx, step));
        }

        if let Some(missing) = covered.iter().position(|c| !c) {
            return Err(ArtifactError::Inconsistent(format!(
                "Column {} has no preprocessor step",
                exported.feature_names[missing]
            )));
        }

        if exported.classifier.coefficients.len() != expanded.len() {
            return Err(ArtifactError::Inconsistent(format!(
                "Classifier has {} coefficients for {} expanded columns",
                exported.classifier.coefficients.len(),
                expanded.len()
            )));
        }

        Ok(Self {
            schema: exported.schema,
            feature_names: exported.feature_names,
            steps,
            expanded,
            coefficients: exported.classifier.coefficients,
            intercept: exported.classifier.intercept,
        })
    }

    /// Schema the artifact declares it was fit on.
    #[must_use]
    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }

    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    #[must_use]
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    fn check_columns(&self, row: &FeatureVector) -> Result<()> {
        if row.names() != self.feature_names.as_slice() {
            return Err(GlycoscopeError::mismatch(&self.feature_names, row.names()));
        }
        Ok(())
    }

    /// Decision function (log-odds) for a single row.
    ///
    /// # Errors
    /// Returns `ModelInputMismatch` if the row's columns differ from the fitted ones.
    pub fn margin(&self, row: &FeatureVector) -> Result<f64> {
        let transformed = self.transform(row)?;
        Ok(self.margin_transformed(&transformed))
    }

    fn margin_transformed(&self, transformed: &[f64]) -> f64 {
        self.intercept
            + transformed
                .iter()
                .zip(&self.coefficients)
                .map(|(x, w)| x * w)
                .sum::<f64>()
    }
}

impl Preprocessor for LinearPipeline {
    fn transform(&self, row: &FeatureVector) -> Result<Vec<f64>> {
        self.check_columns(row)?;
        let values = row.values();
        let mut out = Vec::with_capacity(self.expanded.len());
        for (idx, step) in &self.steps {
            step.apply(values[*idx], &mut out);
        }
        Ok(out)
    }

    fn expanded_column_names(&self) -> &[String] {
        &self.expanded
    }
}

impl Classifier for LinearPipeline {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_probability(&self, row: &FeatureVector) -> Result<[f64; 2]> {
        let margin = self.margin(row)?;
        let p = sigmoid(margin);
        tracing::debug!("Linear margin={:.4}, probability={:.4}", margin, p);
        Ok([1.0 - p, p])
    }
}

/// Largest coefficient difference tolerated between pipeline and explainer.
const COEFFICIENT_TOLERANCE: f64 = 1e-12;

/// Artifacts loaded from one model directory.
#[derive(Debug, Clone)]
pub struct LinearModel {
    pub pipeline: Arc<LinearPipeline>,
    pub explainer: Option<Arc<LinearExplainer>>,
}

impl LinearModel {
    /// Load the pipeline and, if present, the explainer from `model_path`.
    ///
    /// # Errors
    /// Returns error if the pipeline is missing, either artifact is invalid,
    /// or the explainer carries different coefficients than the classifier.
    pub fn load(model_path: &Path) -> std::result::Result<Self, ArtifactError> {
        let pipeline = LinearPipeline::load(model_path)?;
        let explainer = LinearExplainer::load_optional(model_path)?;
        if let Some(explainer) = &explainer {
            check_coefficients(&pipeline, explainer)?;
        }
        Ok(Self {
            pipeline: Arc::new(pipeline),
            explainer: explainer.map(Arc::new),
        })
    }
}

/// Attributions only sum to the margin if both artifacts share one weight vector.
fn check_coefficients(
    pipeline: &LinearPipeline,
    explainer: &LinearExplainer,
) -> std::result::Result<(), ArtifactError> {
    let ours = pipeline.coefficients();
    let theirs = explainer.coefficients();
    if ours.len() != theirs.len() {
        return Err(ArtifactError::Inconsistent(format!(
            "Explainer has {} coefficients, classifier has {}",
            theirs.len(),
            ours.len()
        )));
    }
    if let Some((i, (a, b))) = ours
        .iter()
        .zip(theirs)
        .enumerate()
        .find(|(_, (a, b))| !((*a - *b).abs() <= COEFFICIENT_TOLERANCE))
    {
        return Err(ArtifactError::Inconsistent(format!(
            "Explainer coefficient for {} is {} but classifier uses {}",
            pipeline.expanded_column_names()[i],
            b,
            a
        )));
    }
    Ok(())
}
