use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use trilha::app::{App, AppState};
use trilha::catalog::TrackCatalog;
use trilha::lesson::{Affordance, LessonState};
use trilha::runtime::{AppEvent, FixedTicker, Runner, TestEventSource};
use trilha::settings::{FileSettingsStore, MemorySettingsStore, Settings, SettingsStore};
use trilha::speech::{DictationTicket, SpeechCollaborator, SpeechError};

#[derive(Default)]
struct Calls {
    spoken: Vec<String>,
    listening: Vec<DictationTicket>,
    stopped: Vec<DictationTicket>,
}

/// Speech double whose recognizer never answers on its own; the test plays
/// the part of the background worker by sending `AppEvent::Dictation`.
#[derive(Clone, Default)]
struct ScriptedSpeech {
    calls: Arc<Mutex<Calls>>,
}

impl SpeechCollaborator for ScriptedSpeech {
    fn speak(&mut self, text: &str) {
        self.calls.lock().unwrap().spoken.push(text.to_string());
    }

    fn dictation_available(&self) -> bool {
        true
    }

    fn listen(&mut self, ticket: DictationTicket) -> Result<(), SpeechError> {
        self.calls.lock().unwrap().listening.push(ticket);
        Ok(())
    }

    fn stop_listening(&mut self, ticket: DictationTicket) {
        self.calls.lock().unwrap().stopped.push(ticket);
    }
}

fn key(code: KeyCode) -> AppEvent {
    AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn ctrl(c: char) -> AppEvent {
    AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
}

fn text(s: &str) -> Vec<AppEvent> {
    s.chars().map(|c| key(KeyCode::Char(c))).collect()
}

struct Harness {
    app: App,
    tx: mpsc::Sender<AppEvent>,
    runner: Runner<TestEventSource, FixedTicker>,
    speech: ScriptedSpeech,
}

impl Harness {
    fn new() -> Self {
        Self::with_store(Box::new(MemorySettingsStore::default()))
    }

    fn with_store(store: Box<dyn SettingsStore>) -> Self {
        let (tx, rx) = mpsc::channel();
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(5)),
        );
        let speech = ScriptedSpeech::default();
        let app = App::new(
            Arc::new(TrackCatalog::builtin().unwrap()),
            Box::new(speech.clone()),
            Settings::default(),
            store,
        );
        Self {
            app,
            tx,
            runner,
            speech,
        }
    }

    /// Queue `events` and pump exactly that many through the runner
    fn feed(&mut self, events: Vec<AppEvent>) {
        let count = events.len();
        for event in events {
            self.tx.send(event).unwrap();
        }
        for _ in 0..count {
            let event = self.runner.step();
            self.app.handle_event(event);
        }
    }

    fn answer(&self) -> Option<String> {
        match self.app.affordance() {
            Some(Affordance::TextField { value, .. }) => Some(value.clone()),
            _ => None,
        }
    }
}

#[test]
fn headless_meu_nome_flow_completes_with_celebration() {
    let mut h = Harness::new();

    h.feed(vec![key(KeyCode::Enter)]);
    assert_eq!(h.app.state, AppState::Lesson);
    assert_eq!(h.app.view().unwrap().subtitle, "Step 1 of 3");
    assert_eq!(h.app.view().unwrap().progress_percent, 33);

    h.feed(text("Ana"));
    assert_eq!(h.answer().as_deref(), Some("Ana"));

    h.feed(vec![key(KeyCode::Enter), key(KeyCode::Char('3'))]);
    let view = h.app.view().unwrap();
    assert_eq!(view.subtitle, "Step 2 of 3");
    assert_eq!(view.progress_percent, 67);
    assert!(matches!(
        view.affordance,
        Affordance::Options {
            selected: Some(2),
            ..
        }
    ));

    h.feed(vec![key(KeyCode::Enter)]);
    assert_eq!(h.app.view().unwrap().progress_percent, 100);
    // a fresh step starts with an empty field
    assert_eq!(h.answer().as_deref(), Some(""));

    h.feed(vec![key(KeyCode::Enter)]);
    assert_eq!(h.app.state, AppState::Home);
    assert_eq!(h.app.runner.state(), LessonState::Idle);
    assert!(h.app.celebration.is_active());
    assert!(h.app.notice.is_some());

    // any key dismisses the congratulations, ticks wind the confetti down
    h.feed(vec![key(KeyCode::Char('x'))]);
    assert!(h.app.notice.is_none());
    h.feed(vec![AppEvent::Tick; 40]);
    assert!(!h.app.celebration.is_active());
}

#[test]
fn headless_skip_to_the_end_is_quiet() {
    let mut h = Harness::new();
    h.feed(vec![key(KeyCode::Char('j')), key(KeyCode::Enter)]);
    assert_eq!(
        h.app.runner.active_track().map(|t| t.id.as_str()),
        Some("palavras-simples")
    );

    h.feed(vec![key(KeyCode::Tab), key(KeyCode::Tab)]);
    assert_eq!(h.app.state, AppState::Home);
    assert!(!h.app.celebration.is_active());
    assert!(h.app.notice.is_none());
}

#[test]
fn headless_locked_track_is_refused() {
    let mut h = Harness::new();
    h.feed(vec![
        key(KeyCode::Down),
        key(KeyCode::Down),
        key(KeyCode::Down),
        key(KeyCode::Enter),
    ]);

    assert_eq!(h.app.home_cursor, 3);
    assert_eq!(h.app.state, AppState::Home);
    assert_eq!(h.app.runner.state(), LessonState::Idle);
    assert!(h.app.notice.is_some());

    h.feed(vec![key(KeyCode::Char(' '))]);
    assert!(h.app.notice.is_none());
    assert_eq!(h.app.state, AppState::Home);
}

#[test]
fn headless_dictation_result_fills_the_field() {
    let mut h = Harness::new();
    h.feed(vec![key(KeyCode::Enter), ctrl('d')]);

    let ticket = h.app.runner.pending_dictation().expect("dictation started");
    assert_eq!(h.speech.calls.lock().unwrap().listening, vec![ticket]);
    assert_eq!(h.app.status(), Some("Listening..."));

    h.feed(vec![AppEvent::Dictation {
        ticket,
        outcome: Ok(" João ".to_string()),
    }]);
    assert_eq!(h.answer().as_deref(), Some("João"));
    assert!(h.app.runner.pending_dictation().is_none());
    assert_eq!(h.app.status(), None);
}

#[test]
fn headless_late_dictation_after_close_is_ignored() {
    let mut h = Harness::new();
    h.feed(vec![key(KeyCode::Enter), ctrl('d')]);
    let ticket = h.app.runner.pending_dictation().unwrap();

    h.feed(vec![key(KeyCode::Esc)]);
    assert_eq!(h.app.state, AppState::Home);
    assert_eq!(h.speech.calls.lock().unwrap().stopped, vec![ticket]);

    // reopen the same track before the stale result lands
    h.feed(vec![key(KeyCode::Enter)]);
    h.feed(vec![AppEvent::Dictation {
        ticket,
        outcome: Ok("Maria".to_string()),
    }]);

    assert_eq!(h.app.state, AppState::Lesson);
    assert_eq!(h.answer().as_deref(), Some(""));
    assert!(h.app.notice.is_none());
}

#[test]
fn headless_dictation_failure_is_reported_as_status() {
    let mut h = Harness::new();
    h.feed(vec![key(KeyCode::Enter), ctrl('d')]);
    let ticket = h.app.runner.pending_dictation().unwrap();

    h.feed(vec![AppEvent::Dictation {
        ticket,
        outcome: Err(SpeechError::NoResult),
    }]);

    assert_eq!(h.app.state, AppState::Lesson);
    assert!(h.app.status().unwrap().contains("nothing was heard"));
}

#[test]
fn headless_narration_reads_question_and_instruction() {
    let mut h = Harness::new();
    h.feed(vec![key(KeyCode::Enter), ctrl('r')]);

    let spoken = h.speech.calls.lock().unwrap().spoken.clone();
    assert_eq!(spoken.len(), 1);
    assert!(spoken[0].starts_with("Vamos começar pelo seu nome."));
}

#[test]
fn headless_onboarding_recommends_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let mut h = Harness::with_store(Box::new(FileSettingsStore::with_path(&path)));

    h.feed(vec![
        key(KeyCode::Char('o')),
        key(KeyCode::Char('y')),
        key(KeyCode::Char('n')),
    ]);
    assert_eq!(h.app.state, AppState::Onboarding);
    assert_eq!(
        h.app.settings.recommended_track.as_deref(),
        Some("palavras-simples")
    );

    let saved = FileSettingsStore::with_path(&path).load();
    assert_eq!(saved.recommended_track.as_deref(), Some("palavras-simples"));

    h.feed(vec![key(KeyCode::Enter)]);
    assert_eq!(h.app.state, AppState::Lesson);
    assert_eq!(
        h.app.runner.active_track().map(|t| t.id.as_str()),
        Some("palavras-simples")
    );

    // home's continue action follows the recommendation
    h.feed(vec![key(KeyCode::Esc), key(KeyCode::Char('c'))]);
    assert_eq!(
        h.app.runner.active_track().map(|t| t.id.as_str()),
        Some("palavras-simples")
    );
}

#[test]
fn headless_turning_dictation_off_cancels_listening() {
    let mut h = Harness::new();
    h.feed(vec![key(KeyCode::Enter), ctrl('d')]);
    let ticket = h.app.runner.pending_dictation().unwrap();

    h.app.toggle_setting(trilha::app::SettingItem::VoiceDictation);
    assert!(h.app.runner.pending_dictation().is_none());
    assert_eq!(h.speech.calls.lock().unwrap().stopped, vec![ticket]);

    h.feed(vec![AppEvent::Dictation {
        ticket,
        outcome: Ok("tarde".to_string()),
    }]);
    assert_eq!(h.answer().as_deref(), Some(""));
}

#[test]
fn headless_idle_runner_ticks() {
    let h = Harness::new();
    assert!(matches!(h.runner.step(), AppEvent::Tick));
}
