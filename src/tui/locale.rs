//! Display language for the interface.
//!
//! The active `Locale` is a plain value owned by the `App` and passed to
//! every render function.

use crate::domain::{BmiStatus, RiskLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Es,
}

/// Fixed interface strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Text {
    AppTitle,
    FormSubtitle,
    ResultTitle,
    Probability,
    Confidence,
    Bmi,
    Contributions,
    ContributionsLegend,
    NoAttribution,
    Idle,
    ErrorTitle,
    Required,
    InvalidNumber,
    OutOfRange,
    KeyNavigate,
    KeySubmit,
    KeySample,
    KeyLanguage,
    KeyQuit,
    KeyNew,
    Disclaimer,
    DisclaimerNote,
}

impl Locale {
    /// Parse an ISO 639-1 code ("en", "es"), ignoring case and region suffixes.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let lang = code.trim().to_ascii_lowercase();
        match lang.split(['-', '_']).next() {
            Some("en") => Some(Self::En),
            Some("es") => Some(Self::Es),
            _ => None,
        }
    }

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
        }
    }

    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            Self::En => Self::Es,
            Self::Es => Self::En,
        }
    }

    #[must_use]
    pub fn text(self, key: Text) -> &'static str {
        match self {
            Self::En => english(key),
            Self::Es => spanish(key),
        }
    }

    #[must_use]
    pub fn risk_banner(self, level: RiskLevel) -> &'static str {
        match (self, level) {
            (Self::En, RiskLevel::Low) => "LOW RISK",
            (Self::En, RiskLevel::Moderate) => "MODERATE RISK",
            (Self::En, RiskLevel::High) => "HIGH RISK",
            (Self::Es, RiskLevel::Low) => "RIESGO BAJO",
            (Self::Es, RiskLevel::Moderate) => "RIESGO MODERADO",
            (Self::Es, RiskLevel::High) => "RIESGO ALTO",
        }
    }

    #[must_use]
    pub fn risk_description(self, level: RiskLevel) -> &'static str {
        match (self, level) {
            (Self::En, _) => level.description(),
            (Self::Es, RiskLevel::Low) => "Riesgo bajo - Mantenga sus hábitos saludables",
            (Self::Es, RiskLevel::Moderate) => {
                "Riesgo moderado - Considere un análisis de glucosa en sangre"
            }
            (Self::Es, RiskLevel::High) => "Riesgo alto - Consulte a un profesional de la salud",
        }
    }

    #[must_use]
    pub fn bmi_status(self, status: BmiStatus) -> &'static str {
        match (self, status) {
            (Self::En, BmiStatus::Healthy) => "within the healthy range (18.5-24.9)",
            (Self::En, BmiStatus::Outside) => "outside the healthy range (18.5-24.9)",
            (Self::Es, BmiStatus::Healthy) => "dentro del rango saludable (18.5-24.9)",
            (Self::Es, BmiStatus::Outside) => "fuera del rango saludable (18.5-24.9)",
        }
    }
}

fn english(key: Text) -> &'static str {
    match key {
        Text::AppTitle => "Diabetes Risk Estimate",
        Text::FormSubtitle => "Health Survey",
        Text::ResultTitle => "Risk Result",
        Text::Probability => "Estimated diabetes risk",
        Text::Confidence => "Confidence",
        Text::Bmi => "BMI",
        Text::Contributions => "Feature contributions (log-odds)",
        Text::ContributionsLegend => "Red raises the estimate, green lowers it",
        Text::NoAttribution => "Feature contributions are not available for this model",
        Text::Idle => "Fill in the survey and press Enter",
        Text::ErrorTitle => "Error",
        Text::Required => "required",
        Text::InvalidNumber => "invalid number",
        Text::OutOfRange => "must be between",
        Text::KeyNavigate => "Navigate",
        Text::KeySubmit => "Submit",
        Text::KeySample => "Sample data",
        Text::KeyLanguage => "Español",
        Text::KeyQuit => "Quit",
        Text::KeyNew => "New assessment",
        Text::Disclaimer => {
            "DISCLAIMER: This tool provides indicative estimates and does not replace professional medical evaluation."
        }
        Text::DisclaimerNote => "Estimates come from population survey data and may not reflect your situation.",
    }
}

fn spanish(key: Text) -> &'static str {
    match key {
        Text::AppTitle => "Estimación de Riesgo de Diabetes",
        Text::FormSubtitle => "Encuesta de Salud",
        Text::ResultTitle => "Resultado",
        Text::Probability => "Riesgo estimado de diabetes",
        Text::Confidence => "Confianza",
        Text::Bmi => "IMC",
        Text::Contributions => "Contribución de cada variable (log-odds)",
        Text::ContributionsLegend => "Rojo aumenta la estimación, verde la reduce",
        Text::NoAttribution => "Las contribuciones no están disponibles para este modelo",
        Text::Idle => "Complete la encuesta y pulse Enter",
        Text::ErrorTitle => "Error",
        Text::Required => "obligatorio",
        Text::InvalidNumber => "número no válido",
        Text::OutOfRange => "debe estar entre",
        Text::KeyNavigate => "Navegar",
        Text::KeySubmit => "Enviar",
        Text::KeySample => "Datos de ejemplo",
        Text::KeyLanguage => "English",
        Text::KeyQuit => "Salir",
        Text::KeyNew => "Nueva evaluación",
        Text::Disclaimer => {
            "AVISO: Esta herramienta ofrece estimaciones orientativas y no sustituye una evaluación médica profesional."
        }
        Text::DisclaimerNote => {
            "Las estimaciones provienen de datos de encuestas poblacionales y pueden no reflejar su situación."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(Locale::from_code("en"), Some(Locale::En));
        assert_eq!(Locale::from_code(" ES "), Some(Locale::Es));
        assert_eq!(Locale::from_code("es_MX"), Some(Locale::Es));
        assert_eq!(Locale::from_code("en-GB"), Some(Locale::En));
        assert_eq!(Locale::from_code("fr"), None);
    }

    #[test]
    fn test_toggle_round_trips() {
        assert_eq!(Locale::En.toggle(), Locale::Es);
        assert_eq!(Locale::En.toggle().toggle(), Locale::En);
    }

    #[test]
    fn test_strings_differ_by_locale() {
        assert_ne!(
            Locale::En.text(Text::Disclaimer),
            Locale::Es.text(Text::Disclaimer)
        );
        assert_eq!(
            Locale::En.risk_description(RiskLevel::High),
            RiskLevel::High.description()
        );
        assert!(Locale::Es.risk_banner(RiskLevel::Low).contains("BAJO"));
    }
}
