//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides:
//! - Health survey form for the active schema
//! - Result view with risk banner, probability and feature contributions
//! - English/Spanish language toggle

mod app;
mod locale;
mod styles;
mod ui;

pub use app::App;
pub use locale::{Locale, Text};
pub use styles::MedicalTheme;
