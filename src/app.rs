use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tracing::{info, warn};
use webbrowser::Browser;

use crate::{
    catalog::{StepKind, TrackCatalog, DEFAULT_TRACK_ID},
    celebration::Celebration,
    lesson::{
        Affordance, CurrentStep, DictationDelivery, LessonError, LessonRunner, Presentation,
        StepView,
    },
    onboarding::Onboarding,
    runtime::AppEvent,
    settings::{Settings, SettingsStore},
    speech::SpeechCollaborator,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Home,
    Lesson,
    Settings,
    Onboarding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingItem {
    VoiceNarration,
    VoiceDictation,
    TextSize,
    Theme,
}

pub const SETTING_ITEMS: [SettingItem; 4] = [
    SettingItem::VoiceNarration,
    SettingItem::VoiceDictation,
    SettingItem::TextSize,
    SettingItem::Theme,
];

const CONGRATULATIONS: &str = "Congratulations! You finished this track 🎉";

/// The terminal side of the lesson runner: keeps the latest view for drawing.
#[derive(Debug, Default)]
pub struct ScreenSurface {
    pub view: Option<StepView>,
    pub status: Option<String>,
    completed: Option<bool>,
}

impl ScreenSurface {
    fn take_completion(&mut self) -> Option<bool> {
        self.completed.take()
    }
}

impl Presentation for ScreenSurface {
    fn render(&mut self, view: &StepView) {
        self.view = Some(view.clone());
    }

    fn session_completed(&mut self, with_celebration: bool) {
        self.completed = Some(with_celebration);
    }

    fn status(&mut self, message: &str) {
        self.status = Some(message.to_string());
    }
}

pub type AppRunner = LessonRunner<Box<dyn SpeechCollaborator>, ScreenSurface>;

pub struct App {
    pub state: AppState,
    pub runner: AppRunner,
    pub settings: Settings,
    store: Box<dyn SettingsStore>,
    pub home_cursor: usize,
    pub settings_cursor: usize,
    pub onboarding: Onboarding,
    /// Blocking message; the next key press dismisses it
    pub notice: Option<String>,
    pub celebration: Celebration,
    pub should_quit: bool,
    area: (u16, u16),
}

impl App {
    pub fn new(
        catalog: Arc<TrackCatalog>,
        speech: Box<dyn SpeechCollaborator>,
        settings: Settings,
        store: Box<dyn SettingsStore>,
    ) -> Self {
        let runner = LessonRunner::new(catalog, speech, ScreenSurface::default(), settings.voice());
        Self {
            state: AppState::Home,
            runner,
            settings,
            store,
            home_cursor: 0,
            settings_cursor: 0,
            onboarding: Onboarding::new(),
            notice: None,
            celebration: Celebration::new(),
            should_quit: false,
            area: (80, 24),
        }
    }

    pub fn catalog(&self) -> &Arc<TrackCatalog> {
        self.runner.catalog()
    }

    pub fn view(&self) -> Option<&StepView> {
        self.runner.presentation().view.as_ref()
    }

    pub fn status(&self) -> Option<&str> {
        self.runner.presentation().status.as_deref()
    }

    pub fn set_area(&mut self, width: u16, height: u16) {
        self.area = (width, height);
    }

    /// Track the "continue" action opens
    pub fn continue_track_id(&self) -> String {
        let catalog = self.catalog();
        let opens = |id: &str| catalog.get(id).is_some_and(|t| !t.locked);
        self.settings
            .recommended_track
            .as_deref()
            .filter(|id| opens(id))
            .or_else(|| opens(DEFAULT_TRACK_ID).then_some(DEFAULT_TRACK_ID))
            .or_else(|| catalog.first_unlocked().map(|t| t.id.as_str()))
            .unwrap_or(DEFAULT_TRACK_ID)
            .to_string()
    }

    pub fn open_track(&mut self, track_id: &str) {
        self.runner.presentation_mut().status = None;
        match self.runner.open(track_id) {
            Ok(_) => {
                self.celebration.stop();
                self.state = AppState::Lesson;
                self.after_lesson_change();
            }
            Err(err) => self.report(err),
        }
    }

    pub fn go_home(&mut self) {
        self.runner.close();
        let surface = self.runner.presentation_mut();
        surface.view = None;
        surface.status = None;
        self.state = AppState::Home;
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.on_key(key),
            AppEvent::Resize => {}
            AppEvent::Tick => self.celebration.on_tick(),
            AppEvent::Dictation { ticket, outcome } => {
                match self.runner.deliver_dictation(ticket, outcome) {
                    Ok(DictationDelivery::Applied) => {
                        self.runner.presentation_mut().status = None;
                    }
                    Ok(DictationDelivery::Discarded) => {}
                    Err(err) => self.report(err),
                }
            }
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.notice.take().is_some() {
            return;
        }

        match self.state {
            AppState::Home => self.on_home_key(key),
            AppState::Lesson => self.on_lesson_key(key),
            AppState::Settings => self.on_settings_key(key),
            AppState::Onboarding => self.on_onboarding_key(key),
        }
    }

    fn on_home_key(&mut self, key: KeyEvent) {
        let count = self.catalog().len();
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => {
                self.home_cursor = self.home_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.home_cursor + 1 < count {
                    self.home_cursor += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(track) = self.catalog().tracks().get(self.home_cursor) {
                    let id = track.id.clone();
                    self.open_track(&id);
                }
            }
            KeyCode::Char('c') => {
                let id = self.continue_track_id();
                self.open_track(&id);
            }
            KeyCode::Char('s') => self.state = AppState::Settings,
            KeyCode::Char('o') => {
                self.onboarding.reset();
                self.state = AppState::Onboarding;
            }
            _ => {}
        }
    }

    fn on_lesson_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let result = match key.code {
            KeyCode::Esc => {
                self.go_home();
                return;
            }
            KeyCode::Enter | KeyCode::Tab => {
                self.runner.presentation_mut().status = None;
                if key.code == KeyCode::Enter {
                    self.runner.advance().map(|_| ())
                } else {
                    self.runner.skip().map(|_| ())
                }
            }
            KeyCode::Char('r') if ctrl => self.runner.narrate().map(|_| ()),
            KeyCode::Char('d') if ctrl => self.runner.toggle_dictation().map(|_| ()),
            KeyCode::Char('o') if ctrl => {
                self.open_link();
                Ok(())
            }
            _ => self.on_answer_key(key),
        };

        match result {
            Ok(()) => self.after_lesson_change(),
            Err(err) => self.report(err),
        }
    }

    /// Keys that edit the answer of the current step
    fn on_answer_key(&mut self, key: KeyEvent) -> Result<(), LessonError> {
        let (is_text, option_count) = match self.runner.current_step() {
            Some(CurrentStep::Step(step)) => match &step.kind {
                StepKind::TextEntry { .. } => (true, 0),
                StepKind::ChoiceSelect { options, .. } => (false, options.len()),
            },
            _ => return Ok(()),
        };

        if is_text {
            let mut answer = self.runner.answer().unwrap_or_default().to_string();
            match key.code {
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    answer.push(c)
                }
                KeyCode::Backspace => {
                    answer.pop();
                }
                _ => return Ok(()),
            }
            return self.runner.commit_text(&answer);
        }

        let selected = self.runner.selected_option();
        let index = match key.code {
            KeyCode::Up | KeyCode::Left | KeyCode::Char('k') => {
                selected.map_or(0, |i| i.saturating_sub(1))
            }
            KeyCode::Down | KeyCode::Right | KeyCode::Char('j') => {
                selected.map_or(0, |i| (i + 1).min(option_count.saturating_sub(1)))
            }
            KeyCode::Char(c) => match c.to_digit(10) {
                Some(d) if d >= 1 => d as usize - 1,
                _ => return Ok(()),
            },
            _ => return Ok(()),
        };
        self.runner.select_option(index)
    }

    fn open_link(&mut self) {
        let Some(link) = self.runner.active_track().and_then(|t| t.link.clone()) else {
            return;
        };
        if Browser::is_available() {
            if let Err(err) = webbrowser::open(&link) {
                warn!(%link, %err, "could not open browser");
                self.runner.presentation_mut().status = Some(format!("Could not open {link}"));
            }
        } else {
            self.runner.presentation_mut().status = Some(format!("Visit {link}"));
        }
    }

    /// Leave the lesson once the runner reports completion.
    fn after_lesson_change(&mut self) {
        let Some(celebrate) = self.runner.presentation_mut().take_completion() else {
            return;
        };
        let status = self.runner.presentation().status.clone();
        self.go_home();

        if celebrate {
            self.celebration.start(self.area.0, self.area.1);
            self.notice = Some(CONGRATULATIONS.to_string());
        } else if let Some(status) = status {
            // e.g. a track without exercises
            self.notice = Some(status);
        }
    }

    fn report(&mut self, err: LessonError) {
        info!(%err, "lesson request refused");
        match err {
            LessonError::BlockedTrack(_) | LessonError::UnknownTrack(_) => {
                self.notice = Some(err.to_string());
            }
            _ => self.runner.presentation_mut().status = Some(err.to_string()),
        }
    }

    fn on_settings_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.state = AppState::Home,
            KeyCode::Up | KeyCode::Char('k') => {
                self.settings_cursor = self.settings_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.settings_cursor + 1 < SETTING_ITEMS.len() {
                    self.settings_cursor += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.toggle_setting(SETTING_ITEMS[self.settings_cursor]);
            }
            _ => {}
        }
    }

    pub fn toggle_setting(&mut self, item: SettingItem) {
        match item {
            SettingItem::VoiceNarration => {
                self.settings.voice_narration_enabled = !self.settings.voice_narration_enabled
            }
            SettingItem::VoiceDictation => {
                self.settings.voice_dictation_enabled = !self.settings.voice_dictation_enabled
            }
            SettingItem::TextSize => self.settings.text_size = self.settings.text_size.next(),
            SettingItem::Theme => self.settings.theme = self.settings.theme.next(),
        }
        self.runner.set_voice_settings(self.settings.voice());
        self.persist_settings();
    }

    fn persist_settings(&mut self) {
        if let Err(err) = self.store.save(&self.settings) {
            warn!(%err, "could not save settings");
            self.notice = Some(format!("Settings could not be saved: {err}"));
        }
    }

    fn on_onboarding_key(&mut self, key: KeyEvent) {
        if let Some(id) = self.onboarding.recommended_in(self.runner.catalog()) {
            let id = id.to_string();
            match key.code {
                KeyCode::Enter => self.open_track(&id),
                KeyCode::Esc => self.state = AppState::Home,
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => self.state = AppState::Home,
            KeyCode::Char('y') | KeyCode::Char('s') => self.onboarding.answer(true),
            KeyCode::Char('n') => self.onboarding.answer(false),
            _ => {}
        }

        if let Some(id) = self.onboarding.recommended_in(self.runner.catalog()) {
            info!(track = %id, "onboarding recommendation");
            self.settings.recommended_track = Some(id.to_string());
            self.persist_settings();
        }
    }

    /// Current answer affordance, for screens that need it
    pub fn affordance(&self) -> Option<&Affordance> {
        self.view().map(|v| &v.affordance)
    }
}
