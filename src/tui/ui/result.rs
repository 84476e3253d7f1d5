//! Assessment result view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::domain::{Assessment, AttributionVector};
use crate::tui::locale::{Locale, Text};
use crate::tui::styles::MedicalTheme;

/// Bar lengths are integers; contributions are scaled by this factor.
const BAR_SCALE: f64 = 1000.0;

/// Result screen state
#[derive(Debug, Clone, Default)]
pub enum ResultState {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// Completed with result
    Complete { assessment: Box<Assessment> },
    /// Error occurred
    Error { message: String },
}

/// Render the result screen
pub fn render_result(f: &mut Frame, area: Rect, state: &ResultState, locale: Locale) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_result_header(f, chunks[0], locale);
    match state {
        ResultState::Idle => render_idle(f, chunks[1], locale),
        ResultState::Complete { assessment } => {
            render_assessment(f, chunks[1], assessment, locale)
        }
        ResultState::Error { message } => render_error(f, chunks[1], message, locale),
    }
    render_result_footer(f, chunks[2], locale);
}

fn render_result_header(f: &mut Frame, area: Rect, locale: Locale) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled(locale.text(Text::AppTitle), MedicalTheme::title()),
        Span::styled(
            format!(" │ {}", locale.text(Text::ResultTitle)),
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

fn render_idle(f: &mut Frame, area: Rect, locale: Locale) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            locale.text(Text::Idle),
            MedicalTheme::text_secondary(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(content, area);
}

fn render_assessment(f: &mut Frame, area: Rect, assessment: &Assessment, locale: Locale) {
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", locale.text(Text::ResultTitle)),
            MedicalTheme::subtitle(),
        ))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border_focused());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Banner
            Constraint::Length(3), // Probability
            Constraint::Length(2), // Confidence + BMI
            Constraint::Min(0),    // Contributions
        ])
        .margin(1)
        .split(inner);

    let risk_style = MedicalTheme::risk_level(assessment.risk_level);
    let banner = Paragraph::new(vec![
        Line::from(Span::styled(
            locale.risk_banner(assessment.risk_level),
            risk_style.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            locale.risk_description(assessment.risk_level),
            MedicalTheme::text_secondary(),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(banner, chunks[0]);

    let prediction = &assessment.prediction;
    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(
                    format!(" {} ", locale.text(Text::Probability)),
                    MedicalTheme::text_secondary(),
                ))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .gauge_style(risk_style)
        .ratio(prediction.probability.clamp(0.0, 1.0))
        .label(prediction.percent());
    f.render_widget(gauge, chunks[1]);

    let details = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(
                format!("{}: ", locale.text(Text::Confidence)),
                MedicalTheme::text_secondary(),
            ),
            Span::styled(
                format!("{:.1}%", prediction.confidence * 100.0),
                MedicalTheme::text(),
            ),
        ]),
        Line::from(vec![
            Span::styled(
                format!("{}: ", locale.text(Text::Bmi)),
                MedicalTheme::text_secondary(),
            ),
            Span::styled(format!("{:.1} ", assessment.bmi), MedicalTheme::text()),
            Span::styled(
                locale.bmi_status(assessment.bmi_status),
                MedicalTheme::text_muted(),
            ),
        ]),
    ])
    .alignment(Alignment::Center);
    f.render_widget(details, chunks[2]);

    match &assessment.attribution {
        Some(attribution) => render_contributions(f, chunks[3], attribution, locale),
        None => {
            let note = Paragraph::new(Line::from(Span::styled(
                locale.text(Text::NoAttribution),
                MedicalTheme::text_muted(),
            )))
            .alignment(Alignment::Center);
            f.render_widget(note, chunks[3]);
        }
    }
}

/// Bars for a horizontal chart, largest contribution first.
fn contribution_bars(attribution: &AttributionVector) -> Vec<Bar<'static>> {
    attribution
        .contributions()
        .iter()
        .rev()
        .map(|c| {
            let style = MedicalTheme::contribution(c.value);
            Bar::default()
                .label(Line::from(c.feature.clone()))
                .value((c.value.abs() * BAR_SCALE).round() as u64)
                .text_value(format!("{:+.4}", c.value))
                .style(style)
                .value_style(style.add_modifier(Modifier::BOLD))
        })
        .collect()
}

fn render_contributions(
    f: &mut Frame,
    area: Rect,
    attribution: &AttributionVector,
    locale: Locale,
) {
    let bars = contribution_bars(attribution);
    let chart = BarChart::default()
        .block(
            Block::default()
                .title(Span::styled(
                    format!(" {} ", locale.text(Text::Contributions)),
                    MedicalTheme::text_secondary(),
                ))
                .title_bottom(Span::styled(
                    format!(" {} ", locale.text(Text::ContributionsLegend)),
                    MedicalTheme::text_muted(),
                ))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .data(BarGroup::default().bars(&bars));

    f.render_widget(chart, area);
}

fn render_error(f: &mut Frame, area: Rect, message: &str, locale: Locale) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("! {}", locale.text(Text::ErrorTitle)),
            MedicalTheme::danger(),
        )),
        Line::from(""),
        Line::from(Span::styled(message, MedicalTheme::text())),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::danger()),
    );

    f.render_widget(content, area);
}

fn render_result_footer(f: &mut Frame, area: Rect, locale: Locale) {
    let content = Line::from(vec![
        Span::styled("[Enter] ", MedicalTheme::key_hint()),
        Span::styled(
            format!("{} ", locale.text(Text::KeyNew)),
            MedicalTheme::key_desc(),
        ),
        Span::styled("[L] ", MedicalTheme::key_hint()),
        Span::styled(
            format!("{} ", locale.text(Text::KeyLanguage)),
            MedicalTheme::key_desc(),
        ),
        Span::styled("[Q] ", MedicalTheme::key_hint()),
        Span::styled(locale.text(Text::KeyQuit), MedicalTheme::key_desc()),
    ]);

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
    use crate::domain::{aggregate, FeatureNameMapping, FeatureSchema};

    #[test]
    fn test_bars_put_largest_contribution_first() {
        let columns: Vec<String> = [
            "BMI_scaled",
            "AgeGroup_scaled",
            "BMI_PhysActivity_scaled",
            "AgeGroup_sq_scaled",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let attribution = aggregate(
            &[0.05, -0.4, 0.2, 0.01],
            &columns,
            &FeatureNameMapping::from_schema(FeatureSchema::Compact),
            -1.0,
        )
        .expect("aggregate");

        let bars = contribution_bars(&attribution);
        assert_eq!(bars.len(), 4);
        let first = format!("{:?}", bars[0]);
        assert!(first.contains("AgeGroup"));
        assert!(first.contains("400"));
    }
}
