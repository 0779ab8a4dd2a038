use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

use crate::models::{CurrentNext, Prayer, PrayerSchedule};
use crate::tui::theme;
use crate::utils::format::format_entry_time;

pub struct PrayerRows<'a> {
    pub schedule: Option<&'a PrayerSchedule>,
    pub current_next: Option<&'a CurrentNext>,
    /// Automatic adhan flag per prayer, in canonical order.
    pub bells: [bool; 6],
    pub selected: usize,
    pub twelve_hour: bool,
}

pub fn render(frame: &mut Frame, area: Rect, rows: &PrayerRows<'_>) {
    let block = Block::default()
        .title(Span::styled(" Prayer Times ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let current = rows.current_next.map(|cn| cn.current.prayer);
    let next = rows.current_next.map(|cn| cn.next.prayer);

    let items: Vec<ListItem> = Prayer::ALL
        .iter()
        .map(|prayer| {
            let i = prayer.index();
            let time_str = rows
                .schedule
                .and_then(|s| s.entry(*prayer))
                .map(|e| format_entry_time(e, rows.twelve_hour))
                .unwrap_or_else(|| "--:--".to_string());

            let marker = if current == Some(*prayer) {
                Span::styled("▶ ", theme::gold())
            } else if next == Some(*prayer) {
                Span::styled("› ", theme::amber())
            } else {
                Span::raw("  ")
            };

            let bell = if rows.bells[i] {
                Span::styled("♪ adhan", theme::green())
            } else {
                Span::styled("· off", theme::dim())
            };

            let name_style = if i == rows.selected {
                theme::gold().add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                theme::bold()
            };
            let time_style = if time_str == "N/A" {
                theme::red()
            } else {
                theme::bold()
            };

            let line = Line::from(vec![
                marker,
                Span::styled(format!("{:<9}", prayer.display_name()), name_style),
                Span::styled(format!("{:>9}", time_str), time_style),
                Span::raw("   "),
                bell,
            ]);

            let item = ListItem::new(line);
            if current == Some(*prayer) {
                item.style(theme::current_row())
            } else {
                item
            }
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}
