use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::{
    app::{App, SettingItem, SETTING_ITEMS},
    settings::Settings,
    ui::palette::Palette,
};

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

pub fn setting_label(item: SettingItem, settings: &Settings) -> String {
    match item {
        SettingItem::VoiceNarration => format!(
            "Voice narration: {}",
            on_off(settings.voice_narration_enabled)
        ),
        SettingItem::VoiceDictation => format!(
            "Voice dictation: {}",
            on_off(settings.voice_dictation_enabled)
        ),
        SettingItem::TextSize => format!("Text size: {}", settings.text_size),
        SettingItem::Theme => format!("Theme: {}", settings.theme),
    }
}

pub fn render_settings(app: &App, palette: &Palette, f: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(2)])
        .split(area);

    let items: Vec<ListItem> = SETTING_ITEMS
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let style = if i == app.settings_cursor {
                palette.selected
            } else {
                palette.text
            };
            let mut lines = vec![Line::from(Span::styled(
                setting_label(*item, &app.settings),
                style,
            ))];
            lines.extend((0..palette.spacing).map(|_| Line::from("")));
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Accessibility"))
        .style(palette.text);
    f.render_widget(list, chunks[0]);

    let legend = Paragraph::new(Span::styled(
        "(↑/↓) choose / (enter) change / (esc) back",
        palette.dim,
    ));
    f.render_widget(legend, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{TextSize, Theme};

    #[test]
    fn labels_reflect_current_values() {
        let settings = Settings {
            voice_dictation_enabled: false,
            text_size: TextSize::ExtraLarge,
            theme: Theme::HighContrast,
            ..Settings::default()
        };
        assert_eq!(
            setting_label(SettingItem::VoiceNarration, &settings),
            "Voice narration: on"
        );
        assert_eq!(
            setting_label(SettingItem::VoiceDictation, &settings),
            "Voice dictation: off"
        );
        assert_eq!(
            setting_label(SettingItem::TextSize, &settings),
            "Text size: extra-large"
        );
        assert_eq!(
            setting_label(SettingItem::Theme, &settings),
            "Theme: high-contrast"
        );
    }
}
