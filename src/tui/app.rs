//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Synchronous assessment on submit

use std::io;
use std::time::Duration;

use anyhow::{anyhow, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::linear::LinearModel;
use crate::application::{AssessmentService, LinearAssessmentService};
use crate::config::AppConfig;

use super::locale::Locale;
use super::ui::{
    render_disclaimer,
    result::{render_result, ResultState},
    survey::{render_survey_form, SurveyFormState},
};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Survey,
    Result,
}

/// Main application state
pub struct App {
    screen: Screen,
    should_quit: bool,
    service: LinearAssessmentService,
    /// Compute attributions on submit
    explain: bool,
    locale: Locale,
    form_state: SurveyFormState,
    result_state: ResultState,
}

impl App {
    /// Load the model named by `config` and build the application around it.
    ///
    /// # Errors
    /// Returns error if the model directory is missing or its artifacts
    /// cannot be loaded.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let model_dir = config.model_path.as_path();
        if !model_dir.exists() {
            return Err(anyhow!(
                "Model path not found at {:?}. Set GLYCOSCOPE_MODEL_PATH to a directory containing pipeline.json.",
                model_dir
            ));
        }

        let model = LinearModel::load(model_dir)
            .map_err(|e| anyhow!("Failed to load model from {:?}: {}", model_dir, e))?;

        let declared = model.pipeline.schema();
        let schema = config.schema.unwrap_or(declared);
        if schema != declared {
            tracing::warn!(
                "Schema override {} differs from the artifact's {}; scoring will be rejected",
                schema,
                declared
            );
        }

        let service = AssessmentService::new(
            model.pipeline.clone(),
            model.pipeline,
            model.explainer,
            schema,
        )?;

        Ok(Self::with_service(service, config))
    }

    /// Create application with an already composed service.
    #[must_use]
    pub fn with_service(service: LinearAssessmentService, config: &AppConfig) -> Self {
        let form_state = SurveyFormState::new(service.schema());
        Self {
            screen: Screen::Survey,
            should_quit: false,
            service,
            explain: config.explain,
            locale: config.locale,
            form_state,
            result_state: ResultState::default(),
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(f.area());

                match self.screen {
                    Screen::Survey => {
                        render_survey_form(f, chunks[0], &self.form_state, self.locale)
                    }
                    Screen::Result => render_result(f, chunks[0], &self.result_state, self.locale),
                }

                render_disclaimer(f, chunks[1], self.locale);
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        if key == KeyCode::F(2) {
            self.toggle_locale();
            return;
        }

        match self.screen {
            Screen::Survey => self.handle_survey_key(key),
            Screen::Result => self.handle_result_key(key),
        }
    }

    fn handle_survey_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Up | KeyCode::BackTab => {
                self.form_state.prev_field();
            }
            KeyCode::Down | KeyCode::Tab => {
                self.form_state.next_field();
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.form_state.load_sample_data();
            }
            KeyCode::Char(c) => {
                self.form_state.input_char(c);
            }
            KeyCode::Backspace => {
                self.form_state.delete_char();
            }
            KeyCode::Delete => {
                self.form_state.clear_field();
            }
            KeyCode::Enter => {
                self.submit_survey();
            }
            _ => {}
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.form_state.clear_sensitive();
                self.result_state = ResultState::Idle;
                self.screen = Screen::Survey;
            }
            KeyCode::Char('l') | KeyCode::Char('L') => {
                self.toggle_locale();
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn toggle_locale(&mut self) {
        self.locale = self.locale.toggle();
        tracing::debug!("Language switched to {}", self.locale.code());
    }

    fn submit_survey(&mut self) {
        let input = match self.form_state.to_survey_input(self.locale) {
            Ok(input) => input,
            Err(message) => {
                self.form_state.error_message = Some(message);
                return;
            }
        };

        self.result_state = match self.service.assess(&input, self.explain) {
            Ok(assessment) => ResultState::Complete {
                assessment: Box::new(assessment),
            },
            Err(e) => {
                tracing::error!("Assessment failed: {}", e);
                ResultState::Error {
                    message: e.to_string(),
                }
            }
        };
        self.screen = Screen::Result;

        // Clear plaintext answers from the UI once they have been scored.
        self.form_state.clear_sensitive();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeatureSchema;
    use std::path::PathBuf;

    fn config(dir: &str) -> AppConfig {
        AppConfig {
            model_path: PathBuf::from(dir),
            ..AppConfig::default()
        }
    }

    fn press(app: &mut App, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    #[test]
    fn test_sample_submission_shows_result() {
        let mut app = App::new(&config("models/clinical")).expect("app");
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::Result);
        match &app.result_state {
            ResultState::Complete { assessment } => {
                assert_eq!(assessment.schema, FeatureSchema::Clinical);
                assert!(assessment.attribution.is_some());
            }
            other => panic!("unexpected state: {other:?}"),
        }
        assert!(app.form_state.fields.iter().all(|f| f.value.is_empty()));

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::Survey);
    }

    #[test]
    fn test_incomplete_form_stays_on_survey() {
        let mut app = App::new(&config("models/compact")).expect("app");
        press(&mut app, KeyCode::Char('3'));
        press(&mut app, KeyCode::Char('0'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::Survey);
        assert!(app.form_state.error_message.is_some());
        assert_eq!(app.form_state.fields[0].value, "30");
    }

    #[test]
    fn test_explain_disabled_by_config() {
        let config = AppConfig {
            explain: false,
            ..config("models/compact")
        };
        let mut app = App::new(&config).expect("app");
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);
        match &app.result_state {
            ResultState::Complete { assessment } => assert!(assessment.attribution.is_none()),
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn test_schema_override_reports_error() {
        let config = AppConfig {
            schema: Some(FeatureSchema::Compact),
            ..config("models/clinical")
        };
        let mut app = App::new(&config).expect("app");
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.result_state, ResultState::Error { .. }));
    }

    #[test]
    fn test_language_toggle_and_quit() {
        let mut app = App::new(&config("models/compact")).expect("app");
        assert_eq!(app.locale, Locale::En);
        press(&mut app, KeyCode::F(2));
        assert_eq!(app.locale, Locale::Es);

        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }

    #[test]
    fn test_missing_model_directory() {
        assert!(App::new(&config("models/does-not-exist")).is_err());
    }
}
