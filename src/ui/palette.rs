use ratatui::style::{Color, Modifier, Style};

use crate::settings::{TextSize, Theme};

/// Styles for one theme and text size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub text: Style,
    pub dim: Style,
    pub accent: Style,
    pub selected: Style,
    pub locked: Style,
    pub status: Style,
    pub gauge: Style,
    /// blank lines between blocks of content
    pub spacing: u16,
}

impl Palette {
    pub fn new(theme: Theme, size: TextSize) -> Self {
        let (fg, bg, accent, dim) = match theme {
            Theme::Dark => (Color::White, Color::Reset, Color::Cyan, Color::DarkGray),
            Theme::Light => (Color::Black, Color::White, Color::Blue, Color::Gray),
            Theme::HighContrast => (Color::White, Color::Black, Color::Yellow, Color::White),
        };

        let emphasis = match size {
            TextSize::Normal => Modifier::empty(),
            TextSize::Large | TextSize::ExtraLarge => Modifier::BOLD,
        };
        let spacing = match size {
            TextSize::Normal => 0,
            TextSize::Large => 1,
            TextSize::ExtraLarge => 2,
        };

        let text = Style::default().fg(fg).bg(bg).add_modifier(emphasis);
        Self {
            text,
            dim: text.fg(dim),
            accent: text.fg(accent).add_modifier(Modifier::BOLD),
            selected: Style::default()
                .fg(bg_or_black(bg))
                .bg(accent)
                .add_modifier(Modifier::BOLD),
            locked: text.fg(dim).add_modifier(Modifier::CROSSED_OUT),
            status: text.fg(Color::Yellow).add_modifier(Modifier::ITALIC),
            gauge: Style::default().fg(accent).bg(bg),
            spacing,
        }
    }
}

fn bg_or_black(bg: Color) -> Color {
    match bg {
        Color::Reset => Color::Black,
        other => other,
    }
}
