//! Survey input types for diabetes risk prediction.
//!
//! Based on the BRFSS (CDC Behavioral Risk Factor Surveillance System)
//! health indicator questions.

use serde::{Deserialize, Serialize};

/// Age as collected by the form: raw years or an already-bucketed group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeInput {
    /// Age in whole years
    Years(u32),
    /// BRFSS age bucket (1-13)
    Group(u8),
}

/// Body measurements: height and weight, or a directly supplied BMI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyMeasure {
    HeightWeight { height_cm: f64, weight_kg: f64 },
    Bmi(f64),
}

/// Blood pressure as free text ("SYS/DIA") or as separate readings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BloodPressure {
    Reading(String),
    Split { systolic: i64, diastolic: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    /// BRFSS coding: 0 = female, 1 = male.
    #[must_use]
    pub fn code(self) -> f64 {
        match self {
            Self::Female => 0.0,
            Self::Male => 1.0,
        }
    }
}

/// Raw survey answers for a single prediction request.
///
/// Only `age`, `body` and `phys_active` are needed by every schema; the
/// remaining answers are collected by the clinical variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyInput {
    pub age: AgeInput,

    pub body: BodyMeasure,

    /// Physical activity in the past 30 days outside of work
    pub phys_active: bool,

    #[serde(default)]
    pub blood_pressure: Option<BloodPressure>,

    /// Total cholesterol in mmol/L (2.0-10.0)
    #[serde(default)]
    pub cholesterol_mmol: Option<f64>,

    /// Self-rated general health, 1 = excellent .. 5 = poor
    #[serde(default)]
    pub gen_health: Option<u8>,

    /// Days of poor physical health in the past 30 days
    #[serde(default)]
    pub phys_health_days: Option<u8>,

    /// Days of poor mental health in the past 30 days
    #[serde(default)]
    pub ment_health_days: Option<u8>,

    #[serde(default)]
    pub sex: Option<Sex>,

    /// Income ordinal (1-8)
    #[serde(default)]
    pub income: Option<u8>,

    /// Education ordinal (1-6)
    #[serde(default)]
    pub education: Option<u8>,
}

impl SurveyInput {
    /// Create an input carrying only the answers every schema needs.
    #[must_use]
    pub fn new(age: AgeInput, body: BodyMeasure, phys_active: bool) -> Self {
        Self {
            age,
            body,
            phys_active,
            blood_pressure: None,
            cholesterol_mmol: None,
            gen_health: None,
            phys_health_days: None,
            ment_health_days: None,
            sex: None,
            income: None,
            education: None,
        }
    }

    /// Validate that all present answers are within the form's allowed ranges.
    ///
    /// # Errors
    /// Returns validation errors as a vector of strings.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        match self.age {
            AgeInput::Years(years) => {
                if !(18..=100).contains(&years) {
                    errors.push(format!("Age {years} out of range [18, 100]"));
                }
            }
            AgeInput::Group(group) => {
                if !(1..=13).contains(&group) {
                    errors.push(format!("Age group {group} out of range [1, 13]"));
                }
            }
        }

        match self.body {
            BodyMeasure::HeightWeight {
                height_cm,
                weight_kg,
            } => {
                if !(100.0..=220.0).contains(&height_cm) {
                    errors.push(format!("Height {height_cm} out of range [100, 220]"));
                }
                if !(30.0..=200.0).contains(&weight_kg) {
                    errors.push(format!("Weight {weight_kg} out of range [30, 200]"));
                }
            }
            BodyMeasure::Bmi(bmi) => {
                if !(10.0..=60.0).contains(&bmi) {
                    errors.push(format!("BMI {bmi} out of range [10, 60]"));
                }
            }
        }

        if let Some(chol) = self.cholesterol_mmol {
            if !(2.0..=10.0).contains(&chol) {
                errors.push(format!("Cholesterol {chol} out of range [2.0, 10.0]"));
            }
        }
        check_ordinal(&mut errors, "General health", self.gen_health, 1, 5);
        check_ordinal(&mut errors, "Poor physical health days", self.phys_health_days, 0, 30);
        check_ordinal(&mut errors, "Poor mental health days", self.ment_health_days, 0, 30);
        check_ordinal(&mut errors, "Income", self.income, 1, 8);
        check_ordinal(&mut errors, "Education", self.education, 1, 6);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn check_ordinal(errors: &mut Vec<String>, label: &str, value: Option<u8>, min: u8, max: u8) {
    if let Some(v) = value {
        if !(min..=max).contains(&v) {
            errors.push(format!("{label} {v} out of range [{min}, {max}]"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clinical_input() -> SurveyInput {
        SurveyInput {
            blood_pressure: Some(BloodPressure::Reading("135/85".into())),
            cholesterol_mmol: Some(5.0),
            gen_health: Some(2),
            phys_health_days: Some(2),
            ment_health_days: Some(1),
            sex: Some(Sex::Male),
            ..SurveyInput::new(
                AgeInput::Years(45),
                BodyMeasure::HeightWeight {
                    height_cm: 175.0,
                    weight_kg: 70.0,
                },
                true,
            )
        }
    }

    #[test]
    fn test_validation_accepts_in_range_input() {
        assert!(clinical_input().validate().is_ok());
    }

    #[test]
    fn test_validation_collects_every_error() {
        let invalid = SurveyInput {
            gen_health: Some(6),
            ment_health_days: Some(31),
            ..SurveyInput::new(
                AgeInput::Years(12),
                BodyMeasure::HeightWeight {
                    height_cm: 90.0,
                    weight_kg: 70.0,
                },
                false,
            )
        };
        let errors = invalid.validate().expect_err("must fail");
        assert_eq!(errors.len(), 4);
        assert!(errors[0].starts_with("Age 12"));
    }

    #[test]
    fn test_validation_of_direct_bmi_and_group() {
        let ok = SurveyInput::new(AgeInput::Group(13), BodyMeasure::Bmi(25.0), true);
        assert!(ok.validate().is_ok());

        let bad = SurveyInput::new(AgeInput::Group(0), BodyMeasure::Bmi(61.0), true);
        assert_eq!(bad.validate().expect_err("must fail").len(), 2);
    }

    #[test]
    fn test_sex_coding() {
        assert_eq!(Sex::Female.code(), 0.0);
        assert_eq!(Sex::Male.code(), 1.0);
    }

    #[test]
    fn test_deserialize_minimal_json() {
        let json = r#"{"age":{"years":45},"body":{"bmi":22.5},"phys_active":true}"#;
        let input: SurveyInput = serde_json::from_str(json).expect("Should parse");
        assert_eq!(input.age, AgeInput::Years(45));
        assert!(input.blood_pressure.is_none());
    }
}
