pub mod home;
pub mod lesson;
pub mod onboarding;
pub mod palette;
pub mod screen;
pub mod settings;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::{app::App, celebration::Celebration, ui::palette::Palette};

const MARGIN: u16 = 1;

pub fn draw(app: &App, f: &mut Frame) {
    let palette = Palette::new(app.settings.theme, app.settings.text_size);
    let area = f.area();
    f.render_widget(Block::default().style(palette.text), area);

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(MARGIN)
        .constraints([Constraint::Min(0)])
        .split(area)[0];

    screen::current_screen(&app.state).render(app, &palette, f, inner);

    if let Some(notice) = &app.notice {
        render_notice(notice, &palette, f, area);
    }

    if app.celebration.is_active() {
        render_celebration(&app.celebration, area, f.buffer_mut());
    }
}

/// Rect of `percent_x` by `height` centred in `area`
fn centered(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = (u32::from(area.width) * u32::from(percent_x.min(100)) / 100) as u16;
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height: height.min(area.height),
    }
}

fn render_notice(notice: &str, palette: &Palette, f: &mut Frame, area: Rect) {
    let popup = centered(70, 5 + palette.spacing, area);
    f.render_widget(Clear, popup);
    let body = Paragraph::new(vec![
        Line::from(Span::styled(notice.to_string(), palette.accent)),
        Line::from(Span::styled("press any key", palette.dim)),
    ])
    .block(Block::default().borders(Borders::ALL))
    .style(palette.text)
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    f.render_widget(body, popup);
}

/// Draw confetti straight into the buffer on top of everything else
fn render_celebration(celebration: &Celebration, area: Rect, buf: &mut Buffer) {
    let colors = [
        Color::Yellow,
        Color::Magenta,
        Color::Cyan,
        Color::Green,
        Color::Red,
        Color::Blue,
        Color::LightYellow,
    ];

    for confetti in &celebration.confetti {
        if confetti.x < 0.0 || confetti.y < 0.0 {
            continue;
        }
        let (x, y) = (confetti.x as u16, confetti.y as u16);
        if x >= area.width || y >= area.height {
            continue;
        }
        let mut style = Style::default().fg(colors[confetti.color_index % colors.len()]);
        if confetti.is_letter() {
            style = style.add_modifier(Modifier::BOLD);
        }
        if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
            cell.set_symbol(&confetti.symbol.to_string());
            cell.set_style(style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        app::AppState,
        catalog::TrackCatalog,
        settings::{MemorySettingsStore, Settings, TextSize, Theme},
        speech::SilentSpeech,
    };
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn app() -> App {
        App::new(
            Arc::new(TrackCatalog::builtin().unwrap()),
            Box::new(SilentSpeech),
            Settings::default(),
            Box::new(MemorySettingsStore::default()),
        )
    }

    fn rendered(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(app, f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn home_lists_tracks() {
        let content = rendered(&app(), 100, 30);
        assert!(content.contains("Meu nome"));
        assert!(content.contains("Palavras simples"));
        assert!(content.contains("Tracks"));
    }

    #[test]
    fn lesson_shows_step_and_progress() {
        let mut app = app();
        app.open_track("meu-nome");
        assert_eq!(app.state, AppState::Lesson);
        let content = rendered(&app, 100, 30);
        assert!(content.contains("Step 1 of 3"));
        assert!(content.contains("33%"));
    }

    #[test]
    fn choice_step_shows_numbered_options() {
        let mut app = app();
        app.open_track("mundo-digital");
        let content = rendered(&app, 100, 30);
        assert!(content.contains("1 Acender a televis"));
        assert!(content.contains("Step 1 of 1"));
    }

    #[test]
    fn notice_is_drawn_over_home() {
        let mut app = app();
        app.open_track("meu-curriculo");
        let content = rendered(&app, 100, 30);
        assert!(content.contains("press any key"));
    }

    #[test]
    fn settings_and_onboarding_render() {
        let mut app = app();
        app.state = AppState::Settings;
        assert!(rendered(&app, 80, 24).contains("Voice narration: on"));

        app.state = AppState::Onboarding;
        assert!(rendered(&app, 80, 24).contains("Question 1 of 3"));
    }

    #[test]
    fn every_theme_and_size_renders_on_small_terminals() {
        let mut app = app();
        app.open_track("meu-nome");
        for theme in [Theme::Dark, Theme::Light, Theme::HighContrast] {
            for size in [TextSize::Normal, TextSize::Large, TextSize::ExtraLarge] {
                app.settings.theme = theme;
                app.settings.text_size = size;
                rendered(&app, 30, 12);
            }
        }
    }

    #[test]
    fn celebration_draws_confetti() {
        let mut app = app();
        app.celebration.start(80, 24);
        let content = rendered(&app, 80, 24);
        assert!(app
            .celebration
            .confetti
            .iter()
            .filter(|c| c.is_letter())
            .any(|c| content.contains(c.symbol)));
    }

    #[test]
    fn notice_fits_very_wide_terminals() {
        let mut app = app();
        app.notice = Some("Olá".into());
        assert!(rendered(&app, 1000, 20).contains("press any key"));
    }

    #[test]
    fn extra_large_home_scrolls_to_the_cursor() {
        let mut app = app();
        app.settings.text_size = TextSize::ExtraLarge;
        app.home_cursor = 4;
        assert!(rendered(&app, 80, 24).contains("Cursos"));
    }

    #[test]
    fn centered_stays_inside_area() {
        let area = Rect::new(0, 0, 40, 10);
        let popup = centered(70, 20, area);
        assert!(popup.width <= area.width);
        assert!(popup.height <= area.height);
    }
}
