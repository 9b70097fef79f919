//! The lesson runner: walks the steps of one track at a time.
//!
//! ```text
//! Idle --open--> InProgress(0) --advance/skip--> ... --> InProgress(n-1) --advance/skip--> Completed
//!   ^                  |                                                                      |
//!   +------close-------+----------------------------------close-------------------------------+
//! ```
//!
//! The runner never draws anything itself. It describes the current step as a
//! [`StepView`] and hands it to a [`Presentation`]; navigation after completion is
//! left to whoever owns the presentation.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::{StepDefinition, StepKind, Track, TrackCatalog};
use crate::settings::VoiceSettings;
use crate::speech::{DictationOutcome, DictationTicket, SpeechCollaborator, SpeechError};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LessonError {
    #[error("This track unlocks once you finish the previous ones.")]
    BlockedTrack(String),
    #[error("There is no track called `{0}`.")]
    UnknownTrack(String),
    #[error("The track `{0}` has no exercises yet.")]
    EmptyTrack(String),
    #[error("No lesson is open.")]
    NoActiveSession,
    #[error("This lesson is already finished.")]
    SessionFinished,
    #[error("This step does not take {0}.")]
    WrongStepKind(&'static str),
    #[error("Option {} does not exist; this step has {len} options.", .index + 1)]
    OptionOutOfRange { index: usize, len: usize },
    #[error("Dictation is unavailable: {0}. You can still type your answer.")]
    DictationUnavailable(String),
    #[error("Dictation did not work ({0}). Try again.")]
    DictationRecognition(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonState {
    Idle,
    InProgress(usize),
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentStep<'a> {
    Step(&'a StepDefinition),
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictationState {
    Unavailable,
    Ready,
    Listening,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Affordance {
    TextField {
        placeholder: String,
        value: String,
        dictation: DictationState,
    },
    Options {
        labels: Vec<String>,
        selected: Option<usize>,
    },
}

/// Everything a surface needs to draw the current step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView {
    pub track_id: String,
    pub title: String,
    pub subtitle: String,
    pub step_number: usize,
    pub total_steps: usize,
    pub progress_percent: u8,
    pub question: String,
    pub instruction: String,
    pub affordance: Affordance,
    pub has_link: bool,
}

pub trait Presentation {
    fn render(&mut self, view: &StepView);
    fn session_completed(&mut self, with_celebration: bool);
    fn status(&mut self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictationToggle {
    Started(DictationTicket),
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictationDelivery {
    Applied,
    Discarded,
}

/// `round(step_number / total * 100)`, zero for an empty track
pub fn progress_percent(step_number: usize, total_steps: usize) -> u8 {
    if total_steps == 0 {
        return 0;
    }
    let ratio = step_number.min(total_steps) as f64 / total_steps as f64;
    (ratio * 100.0).round() as u8
}

#[derive(Debug)]
struct LessonSession {
    track: Arc<Track>,
    current_index: usize,
    selected_option: Option<usize>,
    answer: String,
    serial: u64,
}

impl LessonSession {
    fn total(&self) -> usize {
        self.track.steps.len()
    }

    fn is_completed(&self) -> bool {
        self.current_index >= self.total()
    }

    fn step(&self) -> Option<&StepDefinition> {
        self.track.steps.get(self.current_index)
    }
}

pub struct LessonRunner<S, P> {
    catalog: Arc<TrackCatalog>,
    speech: S,
    presentation: P,
    voice: VoiceSettings,
    session: Option<LessonSession>,
    pending_dictation: Option<DictationTicket>,
    next_serial: u64,
    next_request: u64,
}

impl<S: SpeechCollaborator, P: Presentation> LessonRunner<S, P> {
    pub fn new(
        catalog: Arc<TrackCatalog>,
        speech: S,
        presentation: P,
        voice: VoiceSettings,
    ) -> Self {
        Self {
            catalog,
            speech,
            presentation,
            voice,
            session: None,
            pending_dictation: None,
            next_serial: 1,
            next_request: 1,
        }
    }

    pub fn catalog(&self) -> &Arc<TrackCatalog> {
        &self.catalog
    }

    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    pub fn presentation_mut(&mut self) -> &mut P {
        &mut self.presentation
    }

    pub fn speech(&self) -> &S {
        &self.speech
    }

    pub fn voice(&self) -> VoiceSettings {
        self.voice
    }

    pub fn state(&self) -> LessonState {
        match &self.session {
            None => LessonState::Idle,
            Some(s) if s.is_completed() => LessonState::Completed,
            Some(s) => LessonState::InProgress(s.current_index),
        }
    }

    pub fn active_track(&self) -> Option<&Arc<Track>> {
        self.session.as_ref().map(|s| &s.track)
    }

    pub fn current_step(&self) -> Option<CurrentStep<'_>> {
        let session = self.session.as_ref()?;
        Some(match session.step() {
            Some(step) => CurrentStep::Step(step),
            None => CurrentStep::Completed,
        })
    }

    pub fn selected_option(&self) -> Option<usize> {
        self.session.as_ref().and_then(|s| s.selected_option)
    }

    pub fn answer(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.answer.as_str())
    }

    pub fn pending_dictation(&self) -> Option<DictationTicket> {
        self.pending_dictation
    }

    /// Start a fresh session on `track_id` at its first step.
    pub fn open(&mut self, track_id: &str) -> Result<LessonState, LessonError> {
        let track = self
            .catalog
            .get(track_id)
            .cloned()
            .ok_or_else(|| LessonError::UnknownTrack(track_id.to_string()))?;

        if track.locked {
            info!(track = %track.id, "refused to open locked track");
            return Err(LessonError::BlockedTrack(track.id.clone()));
        }

        self.close();

        let serial = self.next_serial;
        self.next_serial += 1;
        let empty = track.steps.is_empty();
        info!(track = %track.id, steps = track.steps.len(), serial, "lesson opened");
        self.session = Some(LessonSession {
            track,
            current_index: 0,
            selected_option: None,
            answer: String::new(),
            serial,
        });

        if empty {
            let err = LessonError::EmptyTrack(track_id.to_string());
            warn!(track = %track_id, "opened a track without steps");
            self.presentation.status(&err.to_string());
            self.presentation.session_completed(false);
        } else {
            self.render();
        }

        Ok(self.state())
    }

    pub fn select_option(&mut self, index: usize) -> Result<(), LessonError> {
        let session = self.session.as_mut().ok_or(LessonError::NoActiveSession)?;
        let step = session.step().ok_or(LessonError::SessionFinished)?;
        let len = match &step.kind {
            StepKind::ChoiceSelect { options, .. } => options.len(),
            StepKind::TextEntry { .. } => return Err(LessonError::WrongStepKind("options")),
        };
        if index >= len {
            return Err(LessonError::OptionOutOfRange { index, len });
        }
        if session.selected_option != Some(index) {
            session.selected_option = Some(index);
            debug!(index, "option selected");
            self.refresh();
        }
        Ok(())
    }

    pub fn commit_text(&mut self, value: &str) -> Result<(), LessonError> {
        let session = self.session.as_mut().ok_or(LessonError::NoActiveSession)?;
        let step = session.step().ok_or(LessonError::SessionFinished)?;
        if !step.is_text_entry() {
            return Err(LessonError::WrongStepKind("text"));
        }
        if session.answer != value {
            session.answer = value.to_string();
            self.refresh();
        }
        Ok(())
    }

    /// Move on. Finishing the last step completes the lesson with a celebration.
    pub fn advance(&mut self) -> Result<LessonState, LessonError> {
        self.step_forward(true)
    }

    /// Like [`advance`](Self::advance) but completion is announced quietly.
    pub fn skip(&mut self) -> Result<LessonState, LessonError> {
        self.step_forward(false)
    }

    fn step_forward(&mut self, celebrate: bool) -> Result<LessonState, LessonError> {
        match self.state() {
            LessonState::Idle => return Err(LessonError::NoActiveSession),
            LessonState::Completed => return Err(LessonError::SessionFinished),
            LessonState::InProgress(_) => {}
        }
        self.cancel_dictation();

        let Some(session) = self.session.as_mut() else {
            return Err(LessonError::NoActiveSession);
        };
        session.current_index += 1;

        if session.is_completed() {
            info!(track = %session.track.id, celebrate, "lesson completed");
            self.presentation.session_completed(celebrate);
        } else {
            self.render();
        }
        Ok(self.state())
    }

    /// Discard the session. Any dictation still in flight is forgotten.
    pub fn close(&mut self) {
        self.cancel_dictation();
        if let Some(session) = self.session.take() {
            debug!(track = %session.track.id, serial = session.serial, "lesson closed");
        }
    }

    /// Read the current prompt aloud. Returns whether anything was spoken.
    pub fn narrate(&mut self) -> Result<bool, LessonError> {
        let session = self.session.as_ref().ok_or(LessonError::NoActiveSession)?;
        let step = session.step().ok_or(LessonError::SessionFinished)?;
        if !self.voice.narration {
            debug!("narration disabled in settings");
            return Ok(false);
        }
        let text = format!("{} {}", step.question, step.instruction);
        self.speech.speak(&text);
        Ok(true)
    }

    /// Start dictation into the current text field, or stop the one running.
    pub fn toggle_dictation(&mut self) -> Result<DictationToggle, LessonError> {
        let session = self.session.as_ref().ok_or(LessonError::NoActiveSession)?;
        let step = session.step().ok_or(LessonError::SessionFinished)?;
        if !step.is_text_entry() {
            return Err(LessonError::WrongStepKind("dictation"));
        }

        if self.pending_dictation.is_some() {
            self.cancel_dictation();
            self.presentation.status("Dictation stopped.");
            self.refresh();
            return Ok(DictationToggle::Stopped);
        }

        if !self.voice.dictation {
            return Err(LessonError::DictationUnavailable(
                "voice dictation is turned off in settings".to_string(),
            ));
        }
        if !self.speech.dictation_available() {
            return Err(LessonError::DictationUnavailable(
                "no speech recognizer is configured".to_string(),
            ));
        }

        let ticket = DictationTicket {
            session: session.serial,
            step: session.current_index,
            request: self.next_request,
        };
        self.next_request += 1;

        self.speech.listen(ticket).map_err(|err| match err {
            SpeechError::NotConfigured | SpeechError::Spawn { .. } => {
                LessonError::DictationUnavailable(err.to_string())
            }
            _ => LessonError::DictationRecognition(err.to_string()),
        })?;
        self.pending_dictation = Some(ticket);
        self.presentation.status("Listening...");
        self.refresh();
        Ok(DictationToggle::Started(ticket))
    }

    /// Apply a dictation result if it still belongs to the outstanding request.
    pub fn deliver_dictation(
        &mut self,
        ticket: DictationTicket,
        outcome: DictationOutcome,
    ) -> Result<DictationDelivery, LessonError> {
        if self.pending_dictation != Some(ticket) {
            debug!(?ticket, "discarding stale dictation result");
            return Ok(DictationDelivery::Discarded);
        }
        self.pending_dictation = None;

        let Some(session) = self.session.as_mut() else {
            return Ok(DictationDelivery::Discarded);
        };

        let result = match outcome {
            Ok(text) if !text.trim().is_empty() => {
                session.answer = text.trim().to_string();
                Ok(DictationDelivery::Applied)
            }
            Ok(_) => Err(LessonError::DictationRecognition(
                "nothing was heard".to_string(),
            )),
            Err(err) => Err(LessonError::DictationRecognition(err.to_string())),
        };
        self.refresh();
        result
    }

    pub fn set_voice_settings(&mut self, voice: VoiceSettings) {
        if voice == self.voice {
            return;
        }
        self.voice = voice;
        if !voice.dictation {
            self.cancel_dictation();
        }
        self.refresh();
    }

    fn cancel_dictation(&mut self) {
        if let Some(ticket) = self.pending_dictation.take() {
            self.speech.stop_listening(ticket);
        }
    }

    /// Emit the view for a freshly entered step.
    fn render(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.selected_option = None;
            session.answer.clear();
        }
        self.refresh();
    }

    /// Emit the view of the current step without resetting its input.
    fn refresh(&mut self) {
        if let Some(view) = self.build_view() {
            self.presentation.render(&view);
        }
    }

    fn build_view(&self) -> Option<StepView> {
        let session = self.session.as_ref()?;
        let step = session.step()?;
        let step_number = session.current_index + 1;
        let total_steps = session.total();

        let affordance = match &step.kind {
            StepKind::TextEntry { placeholder } => Affordance::TextField {
                placeholder: placeholder.clone().unwrap_or_default(),
                value: session.answer.clone(),
                dictation: self.dictation_state(),
            },
            StepKind::ChoiceSelect { options, .. } => Affordance::Options {
                labels: options.clone(),
                selected: session.selected_option,
            },
        };

        Some(StepView {
            track_id: session.track.id.clone(),
            title: session.track.title.clone(),
            subtitle: format!("Step {step_number} of {total_steps}"),
            step_number,
            total_steps,
            progress_percent: progress_percent(step_number, total_steps),
            question: step.question.clone(),
            instruction: step.instruction.clone(),
            affordance,
            has_link: session.track.link.is_some(),
        })
    }

    fn dictation_state(&self) -> DictationState {
        if !self.voice.dictation || !self.speech.dictation_available() {
            DictationState::Unavailable
        } else if self.pending_dictation.is_some() {
            DictationState::Listening
        } else {
            DictationState::Ready
        }
    }
}
