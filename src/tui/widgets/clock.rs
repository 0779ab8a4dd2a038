use chrono::{NaiveTime, Timelike};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use tui_big_text::{BigText, PixelSize};

use crate::tui::theme;

/// Quadrant pixels draw each 8x8 glyph in 4x4 cells.
const CELL_WIDTH: u16 = 4;
const CELL_HEIGHT: u16 = 4;

/// "3:05" plus "07 PM" in 12-hour mode, "15:05" plus "07" otherwise.
fn clock_text(now: NaiveTime, twelve_hour: bool) -> (String, String) {
    if twelve_hour {
        let (pm, hour) = now.hour12();
        (
            format!("{}:{:02}", hour, now.minute()),
            format!("{:02} {}", now.second(), if pm { "PM" } else { "AM" }),
        )
    } else {
        (
            format!("{:02}:{:02}", now.hour(), now.minute()),
            format!("{:02}", now.second()),
        )
    }
}

pub fn render(frame: &mut Frame, area: Rect, now: NaiveTime, twelve_hour: bool) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let (digits, suffix) = clock_text(now, twelve_hour);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(CELL_HEIGHT), Constraint::Length(1)])
        .split(inner);

    // BigText draws from the left edge, so center it by hand
    let width = (digits.chars().count() as u16 * CELL_WIDTH).min(rows[0].width);
    let digits_area = Rect {
        x: rows[0].x + (rows[0].width - width) / 2,
        width,
        ..rows[0]
    };
    let big = BigText::builder()
        .pixel_size(PixelSize::Quadrant)
        .style(theme::gold())
        .lines(vec![Line::from(digits)])
        .build();
    frame.render_widget(big, digits_area);

    frame.render_widget(
        Paragraph::new(Span::styled(suffix, theme::dim())).alignment(Alignment::Center),
        rows[1],
    );
}
