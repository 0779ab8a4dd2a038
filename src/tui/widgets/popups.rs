use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::tui::theme;

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Transient message in the bottom-right corner.
pub fn render_toast(frame: &mut Frame, area: Rect, title: &str, message: &str, error: bool) {
    let width = 44.min(area.width);
    let height = 4.min(area.height);
    let popup = Rect {
        x: area.x + area.width.saturating_sub(width + 1),
        y: area.y + area.height.saturating_sub(height + 1),
        width,
        height,
    };
    frame.render_widget(Clear, popup);

    let accent = if error { theme::red() } else { theme::gold() };
    let block = Block::default()
        .title(Span::styled(format!(" {} ", title), accent.add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(accent)
        .style(theme::surface());

    let paragraph = Paragraph::new(Line::from(Span::styled(message, theme::bold())))
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup);
}

/// One-time question before the adhan is allowed to play by itself.
pub fn render_permission_prompt(frame: &mut Frame, area: Rect) {
    let popup = centered(area, 56, 9);
    frame.render_widget(Clear, popup);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Play the adhan automatically at each prayer time?",
            theme::bold(),
        )),
        Line::from(Span::styled(
            "  You can switch single prayers off later with [space].",
            theme::dim(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  [y]", theme::gold()),
            Span::styled(" allow    ", theme::dim()),
            Span::styled("[n]", theme::gold()),
            Span::styled(" not now", theme::dim()),
        ]),
    ];

    let block = Block::default()
        .title(Span::styled(" Adhan ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold())
        .style(theme::surface());

    frame.render_widget(Paragraph::new(text).block(block), popup);
}

pub fn render_help(frame: &mut Frame, area: Rect) {
    let popup = centered(area, 50, 14);
    frame.render_widget(Clear, popup);

    let bindings = [
        ("[r]", "Refresh prayer times and weather"),
        ("[t]", "Test the adhan"),
        ("[x]", "Stop the adhan"),
        ("[↑ ↓]", "Select a prayer"),
        ("[space]", "Automatic adhan on/off for selection"),
        ("[?]", "Toggle help"),
        ("[Esc]", "Quit"),
    ];

    let mut help_text = vec![
        Line::from(Span::styled(
            "  Keybindings",
            theme::gold().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for (key, label) in bindings {
        help_text.push(Line::from(vec![
            Span::styled(format!("  {:<10}", key), theme::gold()),
            Span::styled(label, theme::dim()),
        ]));
    }

    let block = Block::default()
        .title(Span::styled(" Help ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold())
        .style(theme::surface());

    frame.render_widget(Paragraph::new(help_text).block(block), popup);
}
