use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::WeatherReport;
use crate::tui::theme;
use crate::utils::format::{progress_bar, truncate};

pub fn render(frame: &mut Frame, area: Rect, weather: Option<&WeatherReport>) {
    let title = match weather {
        Some(w) if !w.location.is_empty() => {
            format!(" {} ", truncate(&w.location, area.width.saturating_sub(4) as usize))
        }
        _ => " Weather ".to_string(),
    };
    let block = Block::default()
        .title(Span::styled(title, theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let lines = match weather {
        None => vec![
            Line::from(""),
            Line::from(Span::styled("  Weather unavailable", theme::dim())),
        ],
        Some(w) => {
            let rain_style = if w.rain_chance >= 50 {
                theme::amber()
            } else {
                theme::green()
            };
            vec![
                Line::from(vec![
                    Span::styled(format!("  {} ", w.glyph()), theme::gold()),
                    Span::styled(
                        format!("{}°C", w.temperature),
                        theme::bold().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!("  {}", w.condition), theme::dim()),
                ]),
                Line::from(Span::styled(
                    format!("  feels like {}°C", w.feels_like),
                    theme::dim(),
                )),
                Line::from(vec![
                    Span::styled("  rain ", theme::dim()),
                    Span::styled(progress_bar(w.rain_chance as u32, 100, 10), rain_style),
                    Span::styled(format!(" {}%", w.rain_chance), rain_style),
                ]),
                Line::from(Span::styled(
                    format!("  humidity {}%  ·  wind {} m/s", w.humidity, w.wind),
                    theme::dim(),
                )),
            ]
        }
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
