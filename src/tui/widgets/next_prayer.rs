use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::{CurrentNext, Prayer};
use crate::prayer_times::Countdown;
use crate::tui::theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    current_next: Option<&CurrentNext>,
    countdown: Option<&Countdown>,
    playing: Option<Prayer>,
    twelve_hour: bool,
) {
    let block = Block::default()
        .title(Span::styled(" Next Prayer ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let mut content: Vec<Line> = match current_next {
        None => vec![
            Line::from(""),
            Line::from(Span::styled("No prayer times yet", theme::dim())),
        ],
        Some(cn) => {
            let at = if twelve_hour {
                cn.next.time.format_12h()
            } else {
                cn.next.time.to_string()
            };
            let remaining = countdown
                .map(|c| c.to_string())
                .unwrap_or_else(|| "--".to_string());
            vec![
                Line::from(Span::styled(
                    cn.next.label().to_uppercase(),
                    theme::gold().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(at, theme::bold())),
                Line::from(vec![
                    Span::styled("in ", theme::dim()),
                    Span::styled(remaining, theme::amber().add_modifier(Modifier::BOLD)),
                ]),
                Line::from(""),
                Line::from(vec![
                    Span::styled("now  ", theme::dim()),
                    Span::styled(cn.current.label(), theme::green()),
                ]),
            ]
        }
    };

    if let Some(prayer) = playing {
        content.push(Line::from(""));
        content.push(Line::from(vec![
            Span::styled(
                format!("♪ Adhan for {} ", prayer),
                theme::gold().add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK),
            ),
            Span::styled("[x] stop", theme::dim()),
        ]));
    }

    let paragraph = Paragraph::new(content)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
