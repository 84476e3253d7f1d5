//! UI module: View components for the TUI.

pub mod result;
pub mod survey;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::tui::locale::{Locale, Text};
use crate::tui::styles::MedicalTheme;

pub fn render_disclaimer(f: &mut Frame, area: Rect, locale: Locale) {
    let text = vec![
        Line::from(vec![Span::styled(
            locale.text(Text::Disclaimer),
            MedicalTheme::text_muted(),
        )]),
        Line::from(vec![Span::styled(
            locale.text(Text::DisclaimerNote),
            MedicalTheme::text_muted(),
        )]),
    ];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(MedicalTheme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}
