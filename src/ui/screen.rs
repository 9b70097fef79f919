use ratatui::{layout::Rect, Frame};

use crate::{
    app::{App, AppState},
    ui::{home::render_home, lesson::render_lesson, onboarding::render_onboarding,
        palette::Palette, settings::render_settings},
};

/// A UI Screen boundary: responsible for rendering one app state
pub trait Screen {
    fn render(&self, app: &App, palette: &Palette, f: &mut Frame, area: Rect);
}

/// Track list with the continue, settings and onboarding shortcuts
pub struct HomeScreen;

impl Screen for HomeScreen {
    fn render(&self, app: &App, palette: &Palette, f: &mut Frame, area: Rect) {
        render_home(app, palette, f, area);
    }
}

pub struct LessonScreen;

impl Screen for LessonScreen {
    fn render(&self, app: &App, palette: &Palette, f: &mut Frame, area: Rect) {
        render_lesson(app, palette, f, area);
    }
}

pub struct SettingsScreen;

impl Screen for SettingsScreen {
    fn render(&self, app: &App, palette: &Palette, f: &mut Frame, area: Rect) {
        render_settings(app, palette, f, area);
    }
}

pub struct OnboardingScreen;

impl Screen for OnboardingScreen {
    fn render(&self, app: &App, palette: &Palette, f: &mut Frame, area: Rect) {
        render_onboarding(app, palette, f, area);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Home => Box::new(HomeScreen),
        AppState::Lesson => Box::new(LessonScreen),
        AppState::Settings => Box::new(SettingsScreen),
        AppState::Onboarding => Box::new(OnboardingScreen),
    }
}
