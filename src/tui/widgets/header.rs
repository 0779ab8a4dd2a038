use chrono::NaiveDate;
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::tui::theme;

/// Mosque name, Gregorian date, and both Hijri dates: the one the mosque
/// publishes and the one computed locally.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    mosque: &str,
    today: NaiveDate,
    provider_hijri: Option<&str>,
    local_hijri: Option<&str>,
) {
    let title_line = Line::from(vec![
        Span::styled("  مئذنة  ", theme::gold().add_modifier(Modifier::BOLD)),
        Span::styled(mosque, theme::gold()),
    ]);

    let gregorian = today.format("%A, %-d %B %Y").to_string();
    let mut date_spans = vec![Span::styled(gregorian, theme::dim())];
    if let Some(hijri) = provider_hijri {
        date_spans.push(Span::styled("  ·  ", theme::dim()));
        date_spans.push(Span::styled(hijri.to_string(), theme::amber()));
    }
    if let Some(hijri) = local_hijri {
        if provider_hijri != Some(hijri) {
            date_spans.push(Span::styled("  ·  ", theme::dim()));
            date_spans.push(Span::styled(format!("{} (calc.)", hijri), theme::dim()));
        }
    }

    let text = vec![title_line, Line::from(date_spans)];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold().add_modifier(Modifier::BOLD))
        .style(theme::base());

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
