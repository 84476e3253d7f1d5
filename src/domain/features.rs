//! Feature derivation: raw survey answers to the model's fixed column schema.
//!
//! Every function here is pure. The only fallible step is `derive_features`,
//! which fails when a schema needs an answer the input does not carry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::survey::{AgeInput, BloodPressure, BodyMeasure, SurveyInput};
use crate::GlycoscopeError;

/// Inclusive upper bounds (years) of age groups 1-12; older ages fall in group 13.
pub const AGE_GROUP_UPPER_BOUNDS: [u32; 12] = [24, 29, 34, 39, 44, 49, 54, 59, 64, 69, 74, 79];

/// Number of age groups.
pub const AGE_GROUP_COUNT: u8 = 13;

pub const HIGH_SYSTOLIC_MMHG: i64 = 140;
pub const HIGH_DIASTOLIC_MMHG: i64 = 90;
pub const HIGH_CHOLESTEROL_MMOL: f64 = 6.2;

/// Healthy BMI band, inclusive on both ends.
pub const HEALTHY_BMI: std::ops::RangeInclusive<f64> = 18.5..=24.9;

/// Map an age in years to its 1-based age group.
#[must_use]
pub fn age_to_group(age: u32) -> u8 {
    AGE_GROUP_UPPER_BOUNDS
        .iter()
        .position(|&upper| age <= upper)
        .map_or(AGE_GROUP_COUNT, |i| i as u8 + 1)
}

/// Parse a "SYS/DIA" reading into its two integers.
#[must_use]
pub fn parse_blood_pressure(text: &str) -> Option<(i64, i64)> {
    let (sys, dia) = text.split_once('/')?;
    let systolic = sys.trim().parse().ok()?;
    let diastolic = dia.trim().parse().ok()?;
    Some((systolic, diastolic))
}

/// High blood pressure flag from separate readings.
#[must_use]
pub fn bp_values_to_flag(systolic: i64, diastolic: i64) -> u8 {
    u8::from(systolic >= HIGH_SYSTOLIC_MMHG || diastolic >= HIGH_DIASTOLIC_MMHG)
}

/// High blood pressure flag from a "SYS/DIA" string.
///
/// An unparseable reading yields 0: the form has no error path for it.
#[must_use]
pub fn bp_to_flag(text: &str) -> u8 {
    match parse_blood_pressure(text) {
        Some((systolic, diastolic)) => bp_values_to_flag(systolic, diastolic),
        None => {
            tracing::warn!("Unparseable blood pressure reading, treating as not high");
            0
        }
    }
}

#[must_use]
pub fn chol_to_flag(mmol: f64) -> u8 {
    u8::from(mmol >= HIGH_CHOLESTEROL_MMOL)
}

/// Body mass index from height (cm) and weight (kg).
///
/// Height is range-checked at the input boundary; zero is not guarded here.
#[must_use]
pub fn compute_bmi(height_cm: f64, weight_kg: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiStatus {
    Healthy,
    Outside,
}

#[must_use]
pub fn bmi_status(bmi: f64) -> BmiStatus {
    if HEALTHY_BMI.contains(&bmi) {
        BmiStatus::Healthy
    } else {
        BmiStatus::Outside
    }
}

/// A logical model column, independent of how a schema spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    HighBp,
    HighChol,
    GenHlth,
    Bmi,
    PhysActivity,
    PhysHlth,
    Sex,
    AgeGroup,
    MentHlth,
    Income,
    Education,
    BmiPhysActivity,
    AgeGroupSq,
}

const COMPACT_COLUMNS: &[(&str, Column)] = &[
    ("BMI", Column::Bmi),
    ("AgeGroup", Column::AgeGroup),
    ("BMI_PhysActivity", Column::BmiPhysActivity),
    ("AgeGroup_sq", Column::AgeGroupSq),
];

const CLINICAL_COLUMNS: &[(&str, Column)] = &[
    ("HighBP", Column::HighBp),
    ("HighChol", Column::HighChol),
    ("GenHlth", Column::GenHlth),
    ("BMI", Column::Bmi),
    ("PhysActivity", Column::PhysActivity),
    ("Sex", Column::Sex),
    ("AgeGroup", Column::AgeGroup),
    ("MentHlth", Column::MentHlth),
    ("BMI_PhysAct", Column::BmiPhysActivity),
    ("AgeGroup_Sq", Column::AgeGroupSq),
];

const SOCIOECONOMIC_COLUMNS: &[(&str, Column)] = &[
    ("HighBP", Column::HighBp),
    ("HighChol", Column::HighChol),
    ("GenHlth", Column::GenHlth),
    ("BMI", Column::Bmi),
    ("PhysActivity", Column::PhysActivity),
    ("PhysHlth", Column::PhysHlth),
    ("Sex", Column::Sex),
    ("AgeGroup", Column::AgeGroup),
    ("MentHlth", Column::MentHlth),
    ("Income", Column::Income),
    ("Education", Column::Education),
    ("BMI_PhysAct", Column::BmiPhysActivity),
    ("AgeGroup_Sq", Column::AgeGroupSq),
];

/// The column layout a model artifact was fit on.
///
/// Deployed models are not interchangeable: each artifact declares exactly
/// one schema, and vectors are built in that schema's order and spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSchema {
    /// BMI and age group with their derived terms (4 columns)
    Compact,
    /// Clinical survey answers plus derived terms (10 columns)
    Clinical,
    /// Clinical columns plus physical health days, income and education (13 columns)
    Socioeconomic,
}

impl FeatureSchema {
    pub const ALL: [FeatureSchema; 3] = [Self::Compact, Self::Clinical, Self::Socioeconomic];

    #[must_use]
    pub fn columns(self) -> &'static [(&'static str, Column)] {
        match self {
            Self::Compact => COMPACT_COLUMNS,
            Self::Clinical => CLINICAL_COLUMNS,
            Self::Socioeconomic => SOCIOECONOMIC_COLUMNS,
        }
    }

    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        self.columns().iter().map(|(name, _)| *name).collect()
    }

    /// Whether the schema consumes the given logical column.
    #[must_use]
    pub fn uses(self, column: Column) -> bool {
        self.columns().iter().any(|(_, c)| *c == column)
    }
}

impl fmt::Display for FeatureSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compact => write!(f, "compact"),
            Self::Clinical => write!(f, "clinical"),
            Self::Socioeconomic => write!(f, "socioeconomic"),
        }
    }
}

impl FromStr for FeatureSchema {
    type Err = GlycoscopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "clinical" => Ok(Self::Clinical),
            "socioeconomic" => Ok(Self::Socioeconomic),
            other => Err(GlycoscopeError::Validation(format!(
                "Unknown feature schema '{other}' (expected compact, clinical or socioeconomic)"
            ))),
        }
    }
}

/// Model-ready row: ordered feature names with their values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    names: Vec<String>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Build a vector from parallel name and value lists.
    ///
    /// # Errors
    /// Returns `Validation` if the lists differ in length.
    pub fn from_parts(names: Vec<String>, values: Vec<f64>) -> Result<Self, GlycoscopeError> {
        if names.len() != values.len() {
            return Err(GlycoscopeError::Validation(format!(
                "{} feature names for {} values",
                names.len(),
                values.len()
            )));
        }
        Ok(Self { names, values })
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Resolve the BMI for an input, computing it from height and weight if needed.
#[must_use]
pub fn input_bmi(input: &SurveyInput) -> f64 {
    match input.body {
        BodyMeasure::HeightWeight {
            height_cm,
            weight_kg,
        } => compute_bmi(height_cm, weight_kg),
        BodyMeasure::Bmi(bmi) => bmi,
    }
}

#[must_use]
pub fn input_age_group(input: &SurveyInput) -> u8 {
    match input.age {
        AgeInput::Years(years) => age_to_group(years),
        AgeInput::Group(group) => group,
    }
}

fn bp_flag(bp: &BloodPressure) -> u8 {
    match bp {
        BloodPressure::Reading(text) => bp_to_flag(text),
        BloodPressure::Split {
            systolic,
            diastolic,
        } => bp_values_to_flag(*systolic, *diastolic),
    }
}

fn required<T: Copy>(value: Option<T>, column: &'static str) -> Result<T, GlycoscopeError> {
    value.ok_or(GlycoscopeError::MissingInput(column))
}

/// Assemble the feature vector for `schema` from raw survey answers.
///
/// Base columns come first in schema order, followed by the derived
/// `BMI x PhysActivity` product and the `AgeGroup^2` term.
///
/// # Errors
/// Returns `MissingInput` if the schema needs an answer the input lacks.
pub fn derive_features(
    input: &SurveyInput,
    schema: FeatureSchema,
) -> Result<FeatureVector, GlycoscopeError> {
    let bmi = input_bmi(input);
    let age_group = f64::from(input_age_group(input));
    let activity = if input.phys_active { 1.0 } else { 0.0 };

    let columns = schema.columns();
    let mut names = Vec::with_capacity(columns.len());
    let mut values = Vec::with_capacity(columns.len());

    for &(name, column) in columns {
        let value = match column {
            Column::HighBp => {
                let bp = input
                    .blood_pressure
                    .as_ref()
                    .ok_or(GlycoscopeError::MissingInput(name))?;
                f64::from(bp_flag(bp))
            }
            Column::HighChol => f64::from(chol_to_flag(required(input.cholesterol_mmol, name)?)),
            Column::GenHlth => f64::from(required(input.gen_health, name)?),
            Column::Bmi => bmi,
            Column::PhysActivity => activity,
            Column::PhysHlth => f64::from(required(input.phys_health_days, name)?),
            Column::Sex => required(input.sex, name)?.code(),
            Column::AgeGroup => age_group,
            Column::MentHlth => f64::from(required(input.ment_health_days, name)?),
            Column::Income => f64::from(required(input.income, name)?),
            Column::Education => f64::from(required(input.education, name)?),
            Column::BmiPhysActivity => bmi * activity,
            Column::AgeGroupSq => age_group * age_group,
        };
        names.push(name.to_string());
        values.push(value);
    }

    tracing::debug!("Derived {} features for {} schema", values.len(), schema);
    Ok(FeatureVector { names, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::survey::Sex;

    #[test]
    fn test_age_to_group_boundaries() {
        assert_eq!(age_to_group(0), 1);
        assert_eq!(age_to_group(18), 1);
        assert_eq!(age_to_group(24), 1);
        assert_eq!(age_to_group(25), 2);
        assert_eq!(age_to_group(44), 5);
        assert_eq!(age_to_group(45), 6);
        assert_eq!(age_to_group(75), 12);
        assert_eq!(age_to_group(79), 12);
        assert_eq!(age_to_group(80), 13);
        assert_eq!(age_to_group(150), 13);
    }

    #[test]
    fn test_age_to_group_is_monotonic_and_bounded() {
        let mut previous = age_to_group(0);
        for age in 1..=130 {
            let group = age_to_group(age);
            assert!(group >= previous, "group decreased at age {age}");
            assert!((1..=AGE_GROUP_COUNT).contains(&group));
            previous = group;
        }
    }

    #[test]
    fn test_bp_to_flag() {
        assert_eq!(bp_to_flag("140/90"), 1);
        assert_eq!(bp_to_flag("140/60"), 1);
        assert_eq!(bp_to_flag("120/90"), 1);
        assert_eq!(bp_to_flag("119/79"), 0);
        assert_eq!(bp_to_flag(" 139 / 89 "), 0);
    }

    #[test]
    fn test_bp_to_flag_lenient_on_garbage() {
        assert_eq!(bp_to_flag("not-a-number"), 0);
        assert_eq!(bp_to_flag(""), 0);
        assert_eq!(bp_to_flag("150"), 0);
        assert_eq!(bp_to_flag("150/"), 0);
        assert_eq!(bp_to_flag("150/95/80"), 0);
        assert_eq!(bp_to_flag("150.5/95"), 0);
    }

    #[test]
    fn test_chol_to_flag() {
        assert_eq!(chol_to_flag(6.2), 1);
        assert_eq!(chol_to_flag(7.5), 1);
        assert_eq!(chol_to_flag(6.1999), 0);
    }

    #[test]
    fn test_compute_bmi_and_status() {
        let bmi = compute_bmi(170.0, 65.0);
        assert!((bmi - 22.49).abs() < 0.01);
        assert_eq!(bmi_status(bmi), BmiStatus::Healthy);

        let bmi = compute_bmi(150.0, 100.0);
        assert!((bmi - 44.44).abs() < 0.01);
        assert_eq!(bmi_status(bmi), BmiStatus::Outside);

        assert_eq!(bmi_status(18.5), BmiStatus::Healthy);
        assert_eq!(bmi_status(24.9), BmiStatus::Healthy);
        assert_eq!(bmi_status(18.4), BmiStatus::Outside);
        assert_eq!(bmi_status(25.0), BmiStatus::Outside);
    }

    #[test]
    fn test_derived_terms_compact_schema() {
        let input = SurveyInput::new(AgeInput::Group(5), BodyMeasure::Bmi(25.0), true);
        let v = derive_features(&input, FeatureSchema::Compact).expect("Should derive");

        assert_eq!(
            v.names(),
            ["BMI", "AgeGroup", "BMI_PhysActivity", "AgeGroup_sq"]
        );
        assert_eq!(v.get("BMI_PhysActivity"), Some(25.0));
        assert_eq!(v.get("AgeGroup_sq"), Some(25.0));
    }

    #[test]
    fn test_derived_product_is_zero_when_inactive() {
        let input = SurveyInput::new(AgeInput::Group(3), BodyMeasure::Bmi(31.0), false);
        let v = derive_features(&input, FeatureSchema::Compact).expect("Should derive");
        assert_eq!(v.get("BMI_PhysActivity"), Some(0.0));
        assert_eq!(v.get("AgeGroup_sq"), Some(9.0));
    }

    #[test]
    fn test_clinical_schema_order_and_values() {
        let input = SurveyInput {
            blood_pressure: Some(BloodPressure::Reading("135/85".into())),
            cholesterol_mmol: Some(5.0),
            gen_health: Some(2),
            ment_health_days: Some(1),
            phys_health_days: Some(2),
            sex: Some(Sex::Male),
            ..SurveyInput::new(
                AgeInput::Years(45),
                BodyMeasure::HeightWeight {
                    height_cm: 175.0,
                    weight_kg: 70.0,
                },
                true,
            )
        };
        let v = derive_features(&input, FeatureSchema::Clinical).expect("Should derive");

        assert_eq!(v.names(), FeatureSchema::Clinical.names().as_slice());
        assert_eq!(v.get("HighBP"), Some(0.0));
        assert_eq!(v.get("HighChol"), Some(0.0));
        assert_eq!(v.get("GenHlth"), Some(2.0));
        assert_eq!(v.get("AgeGroup"), Some(6.0));
        assert_eq!(v.get("AgeGroup_Sq"), Some(36.0));
        assert_eq!(v.get("Sex"), Some(1.0));
        let bmi = v.get("BMI").expect("BMI present");
        assert!((bmi - 22.86).abs() < 0.01);
        assert_eq!(v.get("BMI_PhysAct"), Some(bmi));
        assert!(v.get("PhysHlth").is_none());
    }

    #[test]
    fn test_split_blood_pressure_reading() {
        let input = SurveyInput {
            blood_pressure: Some(BloodPressure::Split {
                systolic: 150,
                diastolic: 80,
            }),
            cholesterol_mmol: Some(6.5),
            gen_health: Some(4),
            ment_health_days: Some(0),
            sex: Some(Sex::Female),
            ..SurveyInput::new(AgeInput::Years(62), BodyMeasure::Bmi(30.0), false)
        };
        let v = derive_features(&input, FeatureSchema::Clinical).expect("Should derive");
        assert_eq!(v.get("HighBP"), Some(1.0));
        assert_eq!(v.get("HighChol"), Some(1.0));
        assert_eq!(v.get("BMI_PhysAct"), Some(0.0));
    }

    #[test]
    fn test_missing_answer_is_reported() {
        let input = SurveyInput::new(AgeInput::Years(45), BodyMeasure::Bmi(25.0), true);
        let err = derive_features(&input, FeatureSchema::Clinical).expect_err("must fail");
        assert!(matches!(err, GlycoscopeError::MissingInput("HighBP")));
    }

    #[test]
    fn test_socioeconomic_schema_requires_income() {
        let mut input = SurveyInput {
            blood_pressure: Some(BloodPressure::Reading("120/80".into())),
            cholesterol_mmol: Some(4.0),
            gen_health: Some(3),
            phys_health_days: Some(5),
            ment_health_days: Some(2),
            sex: Some(Sex::Female),
            education: Some(4),
            ..SurveyInput::new(AgeInput::Years(33), BodyMeasure::Bmi(27.0), true)
        };
        let err =
            derive_features(&input, FeatureSchema::Socioeconomic).expect_err("must fail");
        assert!(matches!(err, GlycoscopeError::MissingInput("Income")));

        input.income = Some(6);
        let v = derive_features(&input, FeatureSchema::Socioeconomic).expect("Should derive");
        assert_eq!(v.len(), 13);
        assert_eq!(v.get("PhysHlth"), Some(5.0));
        assert_eq!(v.get("Income"), Some(6.0));
        assert_eq!(v.names()[12], "AgeGroup_Sq");
    }

    #[test]
    fn test_schema_parse_and_display() {
        for schema in FeatureSchema::ALL {
            let parsed: FeatureSchema = schema.to_string().parse().expect("Should parse");
            assert_eq!(parsed, schema);
        }
        assert!("wide".parse::<FeatureSchema>().is_err());
        assert!(FeatureSchema::Compact.uses(Column::Bmi));
        assert!(!FeatureSchema::Compact.uses(Column::HighBp));
    }

    #[test]
    fn test_feature_vector_from_parts_checks_lengths() {
        assert!(FeatureVector::from_parts(vec!["a".into()], vec![1.0, 2.0]).is_err());
        let v = FeatureVector::from_parts(vec!["a".into()], vec![1.0]).expect("Should build");
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![("a", 1.0)]);
    }
}
