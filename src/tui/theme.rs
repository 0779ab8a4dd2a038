use ratatui::style::{Color, Modifier, Style};

pub const BG: Color = Color::Rgb(12, 20, 18);
pub const SURFACE: Color = Color::Rgb(20, 32, 29);
pub const BORDER: Color = Color::Rgb(44, 70, 62);
pub const TEXT: Color = Color::Rgb(226, 222, 204);
pub const TEXT_DIM: Color = Color::Rgb(122, 138, 128);
pub const GOLD: Color = Color::Rgb(204, 168, 76);
pub const GREEN: Color = Color::Rgb(96, 168, 120);
pub const AMBER: Color = Color::Rgb(214, 142, 64);
pub const RED: Color = Color::Rgb(190, 84, 66);
pub const HIGHLIGHT: Color = Color::Rgb(34, 56, 48);

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn surface() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub fn border() -> Style {
    Style::default().fg(BORDER)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn gold() -> Style {
    Style::default().fg(GOLD)
}

pub fn green() -> Style {
    Style::default().fg(GREEN)
}

pub fn amber() -> Style {
    Style::default().fg(AMBER)
}

pub fn red() -> Style {
    Style::default().fg(RED)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

/// Row of the prayer we are currently in.
pub fn current_row() -> Style {
    Style::default()
        .fg(GOLD)
        .bg(HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn banner() -> Style {
    Style::default()
        .fg(TEXT)
        .bg(RED)
        .add_modifier(Modifier::BOLD)
}
