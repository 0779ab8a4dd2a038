use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, last_updated: Option<&str>, fetching: bool) {
    let hints = [
        ("[r]", " refresh  "),
        ("[t]", " test adhan  "),
        ("[x]", " stop  "),
        ("[↑↓]", " select  "),
        ("[space]", " adhan on/off  "),
        ("[?]", " help  "),
        ("[Esc]", " quit"),
    ];

    let mut spans = Vec::new();
    for (key, label) in &hints {
        spans.push(Span::styled(*key, theme::gold()));
        spans.push(Span::styled(*label, theme::dim()));
    }

    let status = if fetching {
        Span::styled(" updating…", theme::amber())
    } else {
        Span::styled(format!(" {}", last_updated.unwrap_or("Not updated yet")), theme::dim())
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(0)])
        .split(area);

    frame.render_widget(Paragraph::new(Line::from(status)), columns[0]);
    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Right),
        columns[1],
    );
}

/// Full-width strip shown while prayer times could not be refreshed.
pub fn render_banner(frame: &mut Frame, area: Rect, message: &str) {
    let line = Line::from(Span::styled(format!(" ⚠ {} ", message), theme::banner()));
    frame.render_widget(
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .style(theme::banner()),
        area,
    );
}
