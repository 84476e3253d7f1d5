//! Health survey input form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::{AgeInput, BloodPressure, BodyMeasure, FeatureSchema, Sex, SurveyInput};
use crate::tui::locale::{Locale, Text};
use crate::tui::styles::MedicalTheme;

/// A survey question shown on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Age,
    AgeGroup,
    Sex,
    HeightCm,
    WeightKg,
    Bmi,
    BloodPressure,
    Cholesterol,
    GenHealth,
    PhysActivity,
    PhysHealthDays,
    MentHealthDays,
    Income,
    Education,
}

impl FieldKind {
    /// Questions asked for a schema, in display order.
    #[must_use]
    pub fn for_schema(schema: FeatureSchema) -> &'static [FieldKind] {
        match schema {
            FeatureSchema::Compact => &[Self::Bmi, Self::AgeGroup, Self::PhysActivity],
            FeatureSchema::Clinical => &[
                Self::Age,
                Self::Sex,
                Self::HeightCm,
                Self::WeightKg,
                Self::BloodPressure,
                Self::Cholesterol,
                Self::GenHealth,
                Self::MentHealthDays,
                Self::PhysActivity,
            ],
            FeatureSchema::Socioeconomic => &[
                Self::Age,
                Self::Sex,
                Self::HeightCm,
                Self::WeightKg,
                Self::BloodPressure,
                Self::Cholesterol,
                Self::GenHealth,
                Self::PhysHealthDays,
                Self::MentHealthDays,
                Self::PhysActivity,
                Self::Income,
                Self::Education,
            ],
        }
    }

    /// Allowed numeric range; `None` for free-text answers.
    #[must_use]
    pub fn range(self) -> Option<(f64, f64)> {
        match self {
            Self::Age => Some((18.0, 100.0)),
            Self::AgeGroup => Some((1.0, 13.0)),
            Self::Sex | Self::PhysActivity => Some((0.0, 1.0)),
            Self::HeightCm => Some((100.0, 220.0)),
            Self::WeightKg => Some((30.0, 200.0)),
            Self::Bmi => Some((10.0, 60.0)),
            Self::BloodPressure => None,
            Self::Cholesterol => Some((2.0, 10.0)),
            Self::GenHealth => Some((1.0, 5.0)),
            Self::PhysHealthDays | Self::MentHealthDays => Some((0.0, 30.0)),
            Self::Income => Some((1.0, 8.0)),
            Self::Education => Some((1.0, 6.0)),
        }
    }

    fn integral(self) -> bool {
        !matches!(
            self,
            Self::HeightCm | Self::WeightKg | Self::Bmi | Self::Cholesterol
        )
    }

    fn accepts(self, c: char) -> bool {
        match self {
            Self::BloodPressure => c.is_ascii_digit() || c == '/' || c == ' ',
            _ if self.integral() => c.is_ascii_digit(),
            _ => c.is_ascii_digit() || c == '.',
        }
    }

    #[must_use]
    pub fn label(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::Age, Locale::En) => "Age",
            (Self::Age, Locale::Es) => "Edad",
            (Self::AgeGroup, Locale::En) => "Age group",
            (Self::AgeGroup, Locale::Es) => "Grupo de edad",
            (Self::Sex, Locale::En) => "Sex",
            (Self::Sex, Locale::Es) => "Sexo",
            (Self::HeightCm, Locale::En) => "Height",
            (Self::HeightCm, Locale::Es) => "Altura",
            (Self::WeightKg, Locale::En) => "Weight",
            (Self::WeightKg, Locale::Es) => "Peso",
            (Self::Bmi, _) => Locale::text(locale, Text::Bmi),
            (Self::BloodPressure, Locale::En) => "Blood pressure",
            (Self::BloodPressure, Locale::Es) => "Presión arterial",
            (Self::Cholesterol, Locale::En) => "Total cholesterol",
            (Self::Cholesterol, Locale::Es) => "Colesterol total",
            (Self::GenHealth, Locale::En) => "General health",
            (Self::GenHealth, Locale::Es) => "Salud general",
            (Self::PhysActivity, Locale::En) => "Physically active",
            (Self::PhysActivity, Locale::Es) => "Actividad física",
            (Self::PhysHealthDays, Locale::En) => "Poor physical health days",
            (Self::PhysHealthDays, Locale::Es) => "Días de mala salud física",
            (Self::MentHealthDays, Locale::En) => "Poor mental health days",
            (Self::MentHealthDays, Locale::Es) => "Días de mala salud mental",
            (Self::Income, Locale::En) => "Income level",
            (Self::Income, Locale::Es) => "Nivel de ingresos",
            (Self::Education, Locale::En) => "Education level",
            (Self::Education, Locale::Es) => "Nivel educativo",
        }
    }

    #[must_use]
    pub fn hint(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::Age, Locale::En) => "years (18-100)",
            (Self::Age, Locale::Es) => "años (18-100)",
            (Self::AgeGroup, Locale::En) => "1=18-24 .. 13=80+",
            (Self::AgeGroup, Locale::Es) => "1=18-24 .. 13=80+",
            (Self::Sex, Locale::En) => "0=female, 1=male",
            (Self::Sex, Locale::Es) => "0=mujer, 1=hombre",
            (Self::HeightCm, _) => "cm (100-220)",
            (Self::WeightKg, _) => "kg (30-200)",
            (Self::Bmi, _) => "kg/m² (10-60)",
            (Self::BloodPressure, Locale::En) => "systolic/diastolic, e.g. 120/80",
            (Self::BloodPressure, Locale::Es) => "sistólica/diastólica, p. ej. 120/80",
            (Self::Cholesterol, _) => "mmol/L (2.0-10.0)",
            (Self::GenHealth, Locale::En) => "1=excellent .. 5=poor",
            (Self::GenHealth, Locale::Es) => "1=excelente .. 5=mala",
            (Self::PhysActivity, Locale::En) => "0=no, 1=yes (past 30 days)",
            (Self::PhysActivity, Locale::Es) => "0=no, 1=sí (últimos 30 días)",
            (Self::PhysHealthDays | Self::MentHealthDays, Locale::En) => "past 30 days (0-30)",
            (Self::PhysHealthDays | Self::MentHealthDays, Locale::Es) => {
                "últimos 30 días (0-30)"
            }
            (Self::Income, Locale::En) => "1=lowest .. 8=highest",
            (Self::Income, Locale::Es) => "1=más bajo .. 8=más alto",
            (Self::Education, Locale::En) => "1=none .. 6=college graduate",
            (Self::Education, Locale::Es) => "1=ninguna .. 6=universitaria",
        }
    }

    fn sample(self) -> &'static str {
        match self {
            Self::Age => "45",
            Self::AgeGroup => "5",
            Self::Sex => "1",
            Self::HeightCm => "175",
            Self::WeightKg => "70",
            Self::Bmi => "25",
            Self::BloodPressure => "135/85",
            Self::Cholesterol => "5.0",
            Self::GenHealth => "2",
            Self::PhysActivity => "1",
            Self::PhysHealthDays => "2",
            Self::MentHealthDays => "1",
            Self::Income => "6",
            Self::Education => "5",
        }
    }
}

/// Form field with its typed buffer
#[derive(Debug, Clone)]
pub struct FormField {
    pub kind: FieldKind,
    pub value: String,
}

/// Survey form state
pub struct SurveyFormState {
    pub schema: FeatureSchema,
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

impl SurveyFormState {
    #[must_use]
    pub fn new(schema: FeatureSchema) -> Self {
        Self {
            schema,
            fields: FieldKind::for_schema(schema)
                .iter()
                .map(|&kind| FormField {
                    kind,
                    value: String::new(),
                })
                .collect(),
            selected_field: 0,
            error_message: None,
        }
    }

    /// Move to the next field
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Add a character to the current field if the question accepts it
    pub fn input_char(&mut self, c: char) {
        let field = &mut self.fields[self.selected_field];
        if field.kind.accepts(c) {
            field.value.push(c);
            self.error_message = None;
        }
    }

    pub fn delete_char(&mut self) {
        self.fields[self.selected_field].value.pop();
    }

    pub fn clear_field(&mut self) {
        self.fields[self.selected_field].value.zeroize();
    }

    /// Wipe all field buffers once the answers have been submitted.
    pub fn clear_sensitive(&mut self) {
        for field in self.fields.iter_mut() {
            field.value.zeroize();
        }
        self.error_message = None;
        self.selected_field = 0;
    }

    pub fn load_sample_data(&mut self) {
        for field in self.fields.iter_mut() {
            field.value = field.kind.sample().to_string();
        }
        self.error_message = None;
    }

    fn value_of(&self, kind: FieldKind) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.kind == kind)
            .map(|f| f.value.trim())
    }

    fn number(&self, kind: FieldKind, locale: Locale) -> Result<Option<f64>, String> {
        let Some(raw) = self.value_of(kind) else {
            return Ok(None);
        };
        let label = kind.label(locale);
        if raw.is_empty() {
            return Err(format!("{label}: {}", locale.text(Text::Required)));
        }
        let value: f64 = raw
            .parse()
            .map_err(|_| format!("{label}: {}", locale.text(Text::InvalidNumber)))?;
        if let Some((min, max)) = kind.range() {
            if value < min || value > max {
                return Err(format!(
                    "{label}: {} {min} - {max}",
                    locale.text(Text::OutOfRange)
                ));
            }
        }
        Ok(Some(value))
    }

    // Integral fields only accept digits, so the range check bounds the cast.
    fn ordinal(&self, kind: FieldKind, locale: Locale) -> Result<Option<u8>, String> {
        Ok(self.number(kind, locale)?.map(|v| v as u8))
    }

    /// Parse the buffers into survey answers for the form's schema.
    ///
    /// # Errors
    /// Returns a localized message naming the first empty, malformed or
    /// out-of-range field.
    pub fn to_survey_input(&self, locale: Locale) -> Result<SurveyInput, String> {
        let age = match self.number(FieldKind::Age, locale)? {
            Some(years) => AgeInput::Years(years as u32),
            None => AgeInput::Group(self.ordinal(FieldKind::AgeGroup, locale)?.unwrap_or(0)),
        };

        let body = match self.number(FieldKind::Bmi, locale)? {
            Some(bmi) => BodyMeasure::Bmi(bmi),
            None => BodyMeasure::HeightWeight {
                height_cm: self.number(FieldKind::HeightCm, locale)?.unwrap_or(0.0),
                weight_kg: self.number(FieldKind::WeightKg, locale)?.unwrap_or(0.0),
            },
        };

        let phys_active = self.number(FieldKind::PhysActivity, locale)? == Some(1.0);

        let blood_pressure = match self.value_of(FieldKind::BloodPressure) {
            Some("") => {
                return Err(format!(
                    "{}: {}",
                    FieldKind::BloodPressure.label(locale),
                    locale.text(Text::Required)
                ))
            }
            Some(text) => Some(BloodPressure::Reading(text.to_string())),
            None => None,
        };

        let sex = self.number(FieldKind::Sex, locale)?.map(|code| {
            if code >= 1.0 {
                Sex::Male
            } else {
                Sex::Female
            }
        });

        Ok(SurveyInput {
            blood_pressure,
            cholesterol_mmol: self.number(FieldKind::Cholesterol, locale)?,
            gen_health: self.ordinal(FieldKind::GenHealth, locale)?,
            phys_health_days: self.ordinal(FieldKind::PhysHealthDays, locale)?,
            ment_health_days: self.ordinal(FieldKind::MentHealthDays, locale)?,
            sex,
            income: self.ordinal(FieldKind::Income, locale)?,
            education: self.ordinal(FieldKind::Education, locale)?,
            ..SurveyInput::new(age, body, phys_active)
        })
    }
}

/// Render the survey form
pub fn render_survey_form(f: &mut Frame, area: Rect, state: &SurveyFormState, locale: Locale) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0], state.schema, locale);
    render_form_fields(f, chunks[1], state, locale);
    render_form_footer(f, chunks[2], state, locale);
}

fn render_form_header(f: &mut Frame, area: Rect, schema: FeatureSchema, locale: Locale) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled(locale.text(Text::AppTitle), MedicalTheme::title()),
        Span::styled(
            format!(" │ {} ({schema})", locale.text(Text::FormSubtitle)),
            MedicalTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &SurveyFormState, locale: Locale) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = state.fields.len().div_ceil(2);

    render_field_column(
        f,
        columns[0],
        &state.fields[..mid],
        0,
        state.selected_field,
        locale,
    );
    render_field_column(
        f,
        columns[1],
        &state.fields[mid..],
        mid,
        state.selected_field,
        locale,
    );
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    fields: &[FormField],
    offset: usize,
    selected: usize,
    locale: Locale,
) {
    let field_height = 3;
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(field_height))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = offset + i == selected;
        let (border_style, title_style) = if is_selected {
            (MedicalTheme::border_focused(), MedicalTheme::focused())
        } else {
            (MedicalTheme::border(), MedicalTheme::text_secondary())
        };

        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", field.kind.label(locale)),
                title_style,
            ))
            .borders(Borders::ALL)
            .border_style(border_style);

        let value_display = if field.value.is_empty() {
            Span::styled(field.kind.hint(locale), MedicalTheme::text_muted())
        } else {
            Span::styled(field.value.as_str(), MedicalTheme::text())
        };

        let content = Paragraph::new(Line::from(vec![
            Span::raw(" "),
            value_display,
            if is_selected {
                Span::styled("▌", MedicalTheme::cursor())
            } else {
                Span::raw("")
            },
        ]))
        .block(block);

        f.render_widget(content, chunks[i]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &SurveyFormState, locale: Locale) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", MedicalTheme::danger()),
            Span::styled(err.as_str(), MedicalTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", MedicalTheme::key_hint()),
            Span::styled(
                format!("{} ", locale.text(Text::KeyNavigate)),
                MedicalTheme::key_desc(),
            ),
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled(
                format!("{} ", locale.text(Text::KeySubmit)),
                MedicalTheme::key_desc(),
            ),
            Span::styled("[S] ", MedicalTheme::key_hint()),
            Span::styled(
                format!("{} ", locale.text(Text::KeySample)),
                MedicalTheme::key_desc(),
            ),
            Span::styled("[F2] ", MedicalTheme::key_hint()),
            Span::styled(
                format!("{} ", locale.text(Text::KeyLanguage)),
                MedicalTheme::key_desc(),
            ),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled(locale.text(Text::KeyQuit), MedicalTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(schema: FeatureSchema) -> SurveyFormState {
        let mut state = SurveyFormState::new(schema);
        state.load_sample_data();
        state
    }

    fn set(state: &mut SurveyFormState, kind: FieldKind, value: &str) {
        let field = state
            .fields
            .iter_mut()
            .find(|f| f.kind == kind)
            .expect("field on form");
        field.value = value.to_string();
    }

    #[test]
    fn test_fields_follow_schema() {
        assert_eq!(SurveyFormState::new(FeatureSchema::Compact).fields.len(), 3);
        assert_eq!(SurveyFormState::new(FeatureSchema::Clinical).fields.len(), 9);
        let socio = SurveyFormState::new(FeatureSchema::Socioeconomic);
        assert!(socio.fields.iter().any(|f| f.kind == FieldKind::Income));
    }

    #[test]
    fn test_clinical_sample_converts() {
        let input = filled(FeatureSchema::Clinical)
            .to_survey_input(Locale::En)
            .expect("sample is valid");
        assert_eq!(input.age, AgeInput::Years(45));
        assert_eq!(
            input.body,
            BodyMeasure::HeightWeight {
                height_cm: 175.0,
                weight_kg: 70.0
            }
        );
        assert_eq!(
            input.blood_pressure,
            Some(BloodPressure::Reading("135/85".into()))
        );
        assert_eq!(input.sex, Some(Sex::Male));
        assert!(input.phys_active);
        assert_eq!(input.income, None);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_compact_sample_converts() {
        let input = filled(FeatureSchema::Compact)
            .to_survey_input(Locale::En)
            .expect("sample is valid");
        assert_eq!(input.age, AgeInput::Group(5));
        assert_eq!(input.body, BodyMeasure::Bmi(25.0));
        assert_eq!(input.blood_pressure, None);
    }

    #[test]
    fn test_range_errors_are_reported() {
        let mut state = filled(FeatureSchema::Clinical);
        set(&mut state, FieldKind::Cholesterol, "12");
        let err = state.to_survey_input(Locale::En).expect_err("out of range");
        assert!(err.starts_with("Total cholesterol"));
        assert!(err.contains("2 - 10"));

        let err = state.to_survey_input(Locale::Es).expect_err("out of range");
        assert!(err.starts_with("Colesterol total"));
    }

    #[test]
    fn test_empty_and_malformed_fields() {
        let mut state = filled(FeatureSchema::Socioeconomic);
        set(&mut state, FieldKind::Income, "");
        let err = state.to_survey_input(Locale::En).expect_err("required");
        assert!(err.contains("required"));

        set(&mut state, FieldKind::Income, "4");
        set(&mut state, FieldKind::HeightCm, "1.7.5");
        let err = state.to_survey_input(Locale::En).expect_err("malformed");
        assert!(err.contains("invalid number"));
    }

    #[test]
    fn test_unparseable_blood_pressure_is_passed_through() {
        let mut state = filled(FeatureSchema::Clinical);
        set(&mut state, FieldKind::BloodPressure, "135");
        let input = state.to_survey_input(Locale::En).expect("lenient");
        assert_eq!(
            input.blood_pressure,
            Some(BloodPressure::Reading("135".into()))
        );
    }

    #[test]
    fn test_input_filter_per_field() {
        let mut state = SurveyFormState::new(FeatureSchema::Clinical);
        for c in "4a5.".chars() {
            state.input_char(c);
        }
        assert_eq!(state.fields[0].value, "45");

        state.selected_field = 4;
        assert_eq!(state.fields[4].kind, FieldKind::BloodPressure);
        for c in "120/80x".chars() {
            state.input_char(c);
        }
        assert_eq!(state.fields[4].value, "120/80");
    }

    #[test]
    fn test_clear_sensitive_wipes_buffers() {
        let mut state = filled(FeatureSchema::Clinical);
        state.selected_field = 3;
        state.clear_sensitive();
        assert!(state.fields.iter().all(|f| f.value.is_empty()));
        assert_eq!(state.selected_field, 0);
    }

    #[test]
    fn test_navigation_wraps() {
        let mut state = SurveyFormState::new(FeatureSchema::Compact);
        state.prev_field();
        assert_eq!(state.selected_field, 2);
        state.next_field();
        assert_eq!(state.selected_field, 0);
    }
}
