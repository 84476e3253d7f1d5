//! Startup configuration read from `GLYCOSCOPE_*` environment variables.

use std::path::PathBuf;

use crate::domain::FeatureSchema;
use crate::tui::Locale;
use crate::Result;

pub const MODEL_PATH_ENV: &str = "GLYCOSCOPE_MODEL_PATH";
pub const SCHEMA_ENV: &str = "GLYCOSCOPE_SCHEMA";
pub const LANG_ENV: &str = "GLYCOSCOPE_LANG";
pub const EXPLAIN_ENV: &str = "GLYCOSCOPE_EXPLAIN";
pub const LOG_MODE_ENV: &str = "GLYCOSCOPE_LOG_MODE";
pub const LOG_FILE_ENV: &str = "GLYCOSCOPE_LOG_FILE";

const DEFAULT_MODEL_PATH: &str = "models/clinical";
const DEFAULT_LOG_FILE: &str = "glycoscope.log";

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    /// File when stdout is a terminal (the TUI owns it), stdout otherwise.
    #[default]
    Auto,
    File,
    Stdout,
}

impl LogMode {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Self::File,
            "stdout" => Self::Stdout,
            _ => Self::Auto,
        }
    }

    /// Resolve `Auto` against whether stdout is interactive.
    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            Self::Auto => interactive,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding `pipeline.json` and optionally `explainer.json`.
    pub model_path: PathBuf,
    /// Overrides the schema the artifact declares.
    pub schema: Option<FeatureSchema>,
    pub locale: Locale,
    /// Compute attributions when an explainer is available.
    pub explain: bool,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            schema: None,
            locale: Locale::default(),
            explain: true,
            log_mode: LogMode::Auto,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl AppConfig {
    /// Read the configuration from the process environment.
    ///
    /// # Errors
    /// Returns `Validation` if `GLYCOSCOPE_SCHEMA` names no known schema.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from any variable lookup.
    ///
    /// # Errors
    /// Returns `Validation` if the schema override names no known schema.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let schema = value(SCHEMA_ENV)
            .map(|v| v.trim().parse::<FeatureSchema>())
            .transpose()?;

        let locale = match value(LANG_ENV) {
            Some(v) => Locale::from_code(&v).unwrap_or_else(|| {
                tracing::warn!("Unknown {}={:?}, using {}", LANG_ENV, v, defaults.locale.code());
                defaults.locale
            }),
            None => defaults.locale,
        };

        Ok(Self {
            model_path: value(MODEL_PATH_ENV).map_or(defaults.model_path, PathBuf::from),
            schema,
            locale,
            explain: value(EXPLAIN_ENV).map_or(defaults.explain, |v| parse_bool(&v)),
            log_mode: value(LOG_MODE_ENV).map_or(defaults.log_mode, |v| LogMode::parse(&v)),
            log_file: value(LOG_FILE_ENV).map_or(defaults.log_file, PathBuf::from),
        })
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
