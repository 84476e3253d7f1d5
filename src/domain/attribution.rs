//! Attribution aggregation: expanded-column attributions back to logical features.
//!
//! A preprocessing transform renames and expands columns (`BMI` becomes
//! `BMI_scaled`, `GenHlth` becomes `GenHlth_1` .. `GenHlth_5`). Explainers
//! report one value per expanded column; this module sums them back per
//! logical feature by substring match.
//!
//! Logical names can be substrings of each other (`AgeGroup` and
//! `AgeGroup_Sq`, `BMI` and `BMI_PhysAct`). Each expanded column is credited
//! to exactly one feature: the one with the longest matching substring.

use serde::{Deserialize, Serialize};

use super::features::FeatureSchema;
use crate::GlycoscopeError;

/// Logical feature name to the expanded-column substrings it produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureNameMapping {
    entries: Vec<(String, Vec<String>)>,
}

impl FeatureNameMapping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapping where each schema column matches expanded columns containing its own name.
    #[must_use]
    pub fn from_schema(schema: FeatureSchema) -> Self {
        let mut mapping = Self::new();
        for name in schema.names() {
            mapping.insert(name, [name]);
        }
        mapping
    }

    /// Add or replace a logical feature's substrings.
    pub fn insert<I, S>(&mut self, feature: impl Into<String>, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let feature = feature.into();
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        match self.entries.iter_mut().find(|(name, _)| *name == feature) {
            Some(entry) => entry.1 = patterns,
            None => self.entries.push((feature, patterns)),
        }
    }

    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Index of the feature owning `expanded`, by longest matching substring.
    ///
    /// Ties keep the feature inserted first.
    fn resolve_index(&self, expanded: &str) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for (idx, (_, patterns)) in self.entries.iter().enumerate() {
            for pattern in patterns {
                if pattern.is_empty() || !expanded.contains(pattern.as_str()) {
                    continue;
                }
                if best.map_or(true, |(_, len)| pattern.len() > len) {
                    best = Some((idx, pattern.len()));
                }
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Logical feature owning an expanded column, if any.
    #[must_use]
    pub fn resolve(&self, expanded: &str) -> Option<&str> {
        self.resolve_index(expanded)
            .map(|idx| self.entries[idx].0.as_str())
    }
}

/// A single logical feature's signed contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub feature: String,
    pub value: f64,
}

/// Per-feature contributions for one prediction, ascending by magnitude.
///
/// Ascending order suits bottom-to-top bar rendering: the largest
/// contributor is last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionVector {
    contributions: Vec<Contribution>,
    base_value: f64,
    unmapped: f64,
}

impl AttributionVector {
    #[must_use]
    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    #[must_use]
    pub fn get(&self, feature: &str) -> Option<f64> {
        self.contributions
            .iter()
            .find(|c| c.feature == feature)
            .map(|c| c.value)
    }

    /// The explainer's expected model output over its background data.
    #[must_use]
    pub fn base_value(&self) -> f64 {
        self.base_value
    }

    /// Sum of expanded columns no logical feature claimed.
    #[must_use]
    pub fn unmapped(&self) -> f64 {
        self.unmapped
    }

    /// Base value plus every attribution; approximates the model margin.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.base_value + self.unmapped + self.contributions.iter().map(|c| c.value).sum::<f64>()
    }

    /// The contribution with the largest magnitude.
    #[must_use]
    pub fn top(&self) -> Option<&Contribution> {
        self.contributions.last()
    }
}

/// Sum expanded-column attributions into logical features.
///
/// # Errors
/// Returns `ModelInputMismatch` if `values` and `expanded_columns` differ in length.
pub fn aggregate(
    values: &[f64],
    expanded_columns: &[String],
    mapping: &FeatureNameMapping,
    base_value: f64,
) -> Result<AttributionVector, GlycoscopeError> {
    if values.len() != expanded_columns.len() {
        let actual: Vec<String> = (0..values.len()).map(|i| format!("value[{i}]")).collect();
        return Err(GlycoscopeError::mismatch(expanded_columns, &actual));
    }

    let mut sums = vec![0.0; mapping.entries.len()];
    let mut unmapped = 0.0;

    for (column, value) in expanded_columns.iter().zip(values) {
        match mapping.resolve_index(column) {
            Some(idx) => sums[idx] += value,
            None => {
                tracing::warn!("Expanded column {column} matches no logical feature");
                unmapped += value;
            }
        }
    }

    let mut contributions: Vec<Contribution> = mapping
        .features()
        .zip(sums)
        .map(|(feature, value)| Contribution {
            feature: feature.to_string(),
            value,
        })
        .collect();
    contributions.sort_by(|a, b| a.value.abs().total_cmp(&b.value.abs()));

    Ok(AttributionVector {
        contributions,
        base_value,
        unmapped,
    })
}
