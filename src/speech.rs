//! Narration and dictation backends.
//!
//! The lesson runner only talks to [`SpeechCollaborator`]. The terminal build uses
//! [`CommandSpeech`], which shells out to whatever text-to-speech and
//! speech-to-text programs the user configured in their settings.

use std::{
    io::Read,
    process::{Child, Command, Stdio},
    sync::{mpsc::Sender, Arc, Mutex},
    thread,
    time::Duration,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::runtime::AppEvent;

const EXIT_POLL: Duration = Duration::from_millis(20);

/// Identifies one dictation request. A result is only applied while its ticket
/// is still the runner's outstanding one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DictationTicket {
    pub session: u64,
    pub step: usize,
    pub request: u64,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SpeechError {
    #[error("no speech program configured")]
    NotConfigured,
    #[error("could not start `{program}`: {reason}")]
    Spawn { program: String, reason: String },
    #[error("nothing was heard")]
    NoResult,
    #[error("{0}")]
    Failed(String),
}

pub type DictationOutcome = Result<String, SpeechError>;

pub trait SpeechCollaborator {
    /// Fire-and-forget read-aloud.
    fn speak(&mut self, text: &str);

    fn dictation_available(&self) -> bool;

    /// Start a one-shot recognition. The result arrives later, out of band.
    fn listen(&mut self, ticket: DictationTicket) -> Result<(), SpeechError>;

    fn stop_listening(&mut self, ticket: DictationTicket);
}

impl<S: SpeechCollaborator + ?Sized> SpeechCollaborator for Box<S> {
    fn speak(&mut self, text: &str) {
        (**self).speak(text)
    }

    fn dictation_available(&self) -> bool {
        (**self).dictation_available()
    }

    fn listen(&mut self, ticket: DictationTicket) -> Result<(), SpeechError> {
        (**self).listen(ticket)
    }

    fn stop_listening(&mut self, ticket: DictationTicket) {
        (**self).stop_listening(ticket)
    }
}

/// No narration, no dictation
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSpeech;

impl SpeechCollaborator for SilentSpeech {
    fn speak(&mut self, _text: &str) {}

    fn dictation_available(&self) -> bool {
        false
    }

    fn listen(&mut self, _ticket: DictationTicket) -> Result<(), SpeechError> {
        Err(SpeechError::NotConfigured)
    }

    fn stop_listening(&mut self, _ticket: DictationTicket) {}
}

/// A program plus its leading arguments, parsed from a settings string.
/// Arguments are split on whitespace; quoting is not understood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

struct ActiveDictation {
    ticket: DictationTicket,
    child: Arc<Mutex<Child>>,
}

/// Speech backed by external programs
pub struct CommandSpeech {
    narrator: Option<CommandLine>,
    recognizer: Option<CommandLine>,
    events: Sender<AppEvent>,
    active: Option<ActiveDictation>,
}

impl CommandSpeech {
    pub fn new(
        narrator: Option<CommandLine>,
        recognizer: Option<CommandLine>,
        events: Sender<AppEvent>,
    ) -> Self {
        Self {
            narrator,
            recognizer,
            events,
            active: None,
        }
    }
}

impl SpeechCollaborator for CommandSpeech {
    fn speak(&mut self, text: &str) {
        let Some(narrator) = &self.narrator else {
            debug!("narration requested but no narrator configured");
            return;
        };

        let spawned = narrator
            .command()
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(mut child) => {
                // reap in the background so narration never blocks the UI
                thread::spawn(move || {
                    let _ = child.wait();
                });
            }
            Err(err) => warn!(program = %narrator.program, %err, "narrator failed to start"),
        }
    }

    fn dictation_available(&self) -> bool {
        self.recognizer.is_some()
    }

    fn listen(&mut self, ticket: DictationTicket) -> Result<(), SpeechError> {
        let recognizer = self.recognizer.as_ref().ok_or(SpeechError::NotConfigured)?;

        let mut child = recognizer
            .command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| SpeechError::Spawn {
                program: recognizer.program.clone(),
                reason: err.to_string(),
            })?;

        let mut stdout = child.stdout.take().ok_or_else(|| SpeechError::Spawn {
            program: recognizer.program.clone(),
            reason: "no stdout".to_string(),
        })?;
        let child = Arc::new(Mutex::new(child));
        let waiter = Arc::clone(&child);
        let events = self.events.clone();

        info!(?ticket, program = %recognizer.program, "dictation started");
        thread::spawn(move || {
            let mut heard = String::new();
            let read = stdout.read_to_string(&mut heard);
            // poll so the lock is free for stop_listening while the child lingers
            let status = loop {
                let polled = match waiter.lock() {
                    Ok(mut c) => c.try_wait(),
                    Err(_) => break None,
                };
                match polled {
                    Ok(Some(status)) => break Some(status),
                    Ok(None) => thread::sleep(EXIT_POLL),
                    Err(_) => break None,
                }
            };

            let outcome = match (read, status) {
                (Err(err), _) => Err(SpeechError::Failed(err.to_string())),
                (Ok(_), Some(status)) if status.success() => {
                    let heard = heard.trim();
                    if heard.is_empty() {
                        Err(SpeechError::NoResult)
                    } else {
                        Ok(heard.to_string())
                    }
                }
                (Ok(_), Some(status)) => Err(SpeechError::Failed(format!(
                    "recognizer exited with {status}"
                ))),
                (Ok(_), None) => Err(SpeechError::Failed("recognizer vanished".to_string())),
            };

            // the receiver is gone once the app has quit
            let _ = events.send(AppEvent::Dictation { ticket, outcome });
        });

        self.active = Some(ActiveDictation { ticket, child });
        Ok(())
    }

    fn stop_listening(&mut self, ticket: DictationTicket) {
        match self.active.take() {
            Some(active) if active.ticket == ticket => {
                if let Ok(mut child) = active.child.lock() {
                    let _ = child.kill();
                }
                info!(?ticket, "dictation stopped");
            }
            other => self.active = other,
        }
    }
}
