//! Listener - one recognition session per activation
//!
//! A [`Recognizer`] reports each session as `Recognized` or `Failed`, always
//! followed by `Ended`, over a channel the event loop drains into
//! [`Listener::handle`].

use crate::config::RecognitionConfig;
use crate::host::{expand_args, locate_program};
use crate::render::Ui;
use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

pub const UNAVAILABLE_NOTICE: &str = "Speech recognition is not available. Voice commands are disabled.";

/// Reason reported when a session captured nothing
pub const NO_SPEECH: &str = "no-speech";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListeningState {
    Idle,
    Listening,
    Error(String),
}

impl fmt::Display for ListeningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListeningState::Idle => write!(f, "Status: Not Listening"),
            ListeningState::Listening => write!(f, "Listening..."),
            ListeningState::Error(reason) => write!(f, "Error: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    Recognized(String),
    Failed(String),
    Ended,
}

pub trait Recognizer: Send {
    /// Begin one session; results arrive later on `events`
    fn start(
        &mut self,
        events: flume::Sender<RecognitionEvent>,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// Lowercase, then trim
pub fn normalize(transcript: &str) -> String {
    transcript.to_lowercase().trim().to_string()
}

// ============================================================================
// Typed recognizer - the next terminal line is the transcript
// ============================================================================

type PendingSession = Arc<Mutex<Option<flume::Sender<RecognitionEvent>>>>;

pub struct TypedRecognizer {
    pending: PendingSession,
}

/// Input-side half of [`TypedRecognizer`], held by the stdin reader
#[derive(Clone)]
pub struct TypedMic {
    pending: PendingSession,
}

impl TypedRecognizer {
    pub fn new() -> (Self, TypedMic) {
        let pending: PendingSession = Arc::new(Mutex::new(None));
        (
            Self {
                pending: Arc::clone(&pending),
            },
            TypedMic { pending },
        )
    }
}

impl Recognizer for TypedRecognizer {
    fn start(
        &mut self,
        events: flume::Sender<RecognitionEvent>,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut pending = self.pending.lock().map_err(|_| "typed recognizer lock poisoned")?;
        if pending.is_some() {
            tracing::debug!("Typed recognition already armed, ignoring activation");
            return Ok(());
        }
        *pending = Some(events);
        Ok(())
    }
}

impl TypedMic {
    /// Deliver `line` to an armed session. Returns false when nothing is
    /// listening so the caller can treat the line as ordinary input.
    pub fn deliver(&self, line: &str) -> bool {
        let Some(events) = self.pending.lock().ok().and_then(|mut p| p.take()) else {
            return false;
        };
        let result = if line.trim().is_empty() {
            RecognitionEvent::Failed(NO_SPEECH.into())
        } else {
            RecognitionEvent::Recognized(line.to_string())
        };
        let _ = events.send(result);
        let _ = events.send(RecognitionEvent::Ended);
        true
    }

    pub fn is_armed(&self) -> bool {
        self.pending.lock().map(|p| p.is_some()).unwrap_or(false)
    }
}

// ============================================================================
// Command recognizer - external speech-to-text program
// ============================================================================

/// Runs `program args...` once per session on a worker thread and takes its
/// trimmed stdout as the transcript
pub struct CommandRecognizer {
    program: PathBuf,
    args: Vec<String>,
    busy: Arc<AtomicBool>,
}

impl CommandRecognizer {
    pub fn new(program: PathBuf, args: Vec<String>, locale: &str) -> Self {
        Self {
            program,
            args: expand_args(&args, locale),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Recognizer for CommandRecognizer {
    fn start(
        &mut self,
        events: flume::Sender<RecognitionEvent>,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        if self.busy.swap(true, Ordering::SeqCst) {
            tracing::debug!("Recognition program still running, ignoring activation");
            return Ok(());
        }

        let mut command = Command::new(&self.program);
        command.args(&self.args).stdin(Stdio::null());
        let busy = Arc::clone(&self.busy);

        let spawned = thread::Builder::new()
            .name("recognizer".into())
            .spawn(move || {
                let result = run_recognition(command);
                busy.store(false, Ordering::SeqCst);
                let _ = events.send(result);
                let _ = events.send(RecognitionEvent::Ended);
            });

        if let Err(e) = spawned {
            self.busy.store(false, Ordering::SeqCst);
            return Err(e.into());
        }
        Ok(())
    }
}

fn run_recognition(mut command: Command) -> RecognitionEvent {
    let output = match command.output() {
        Ok(output) => output,
        Err(e) => return RecognitionEvent::Failed(e.to_string()),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let reason = if stderr.is_empty() {
            output.status.to_string()
        } else {
            stderr
        };
        return RecognitionEvent::Failed(reason);
    }

    let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if transcript.is_empty() {
        RecognitionEvent::Failed(NO_SPEECH.into())
    } else {
        RecognitionEvent::Recognized(transcript)
    }
}

/// Build the configured recognizer. The [`TypedMic`] is returned when the
/// stdin reader has to feed transcripts.
pub fn recognizer_from_config(
    config: &RecognitionConfig,
    locale: &str,
) -> (Option<Box<dyn Recognizer>>, Option<TypedMic>) {
    match config {
        RecognitionConfig::Typed => {
            let (recognizer, mic) = TypedRecognizer::new();
            (Some(Box::new(recognizer)), Some(mic))
        }
        RecognitionConfig::Command { program, args } => match locate_program(program) {
            Some(path) => {
                tracing::info!(program = %path.display(), "Recognition: external command");
                (
                    Some(Box::new(CommandRecognizer::new(path, args.clone(), locale))),
                    None,
                )
            }
            None => {
                tracing::warn!(program = %program, "Recognition program not found");
                (None, None)
            }
        },
        RecognitionConfig::Disabled => (None, None),
    }
}

// ============================================================================
// Listener
// ============================================================================

pub struct Listener {
    recognizer: Option<Box<dyn Recognizer>>,
    state: ListeningState,
    ui: Ui,
    events_tx: flume::Sender<RecognitionEvent>,
    events_rx: flume::Receiver<RecognitionEvent>,
}

impl Listener {
    /// Without a recognizer the listener stays idle for good and says so once, here
    pub fn new(recognizer: Option<Box<dyn Recognizer>>, ui: Ui) -> Self {
        let (events_tx, events_rx) = flume::unbounded();
        let state = ListeningState::Idle;
        if recognizer.is_some() {
            ui.set_status(state.to_string());
        } else {
            tracing::warn!("No speech recognition available");
            ui.set_status(UNAVAILABLE_NOTICE);
        }
        Self {
            recognizer,
            state,
            ui,
            events_tx,
            events_rx,
        }
    }

    pub fn is_available(&self) -> bool {
        self.recognizer.is_some()
    }

    pub fn state(&self) -> &ListeningState {
        &self.state
    }

    /// Recognition results to feed back into [`Listener::handle`]
    pub fn events(&self) -> flume::Receiver<RecognitionEvent> {
        self.events_rx.clone()
    }

    pub fn activate(&mut self) {
        let Some(recognizer) = self.recognizer.as_mut() else {
            tracing::debug!("Activation ignored, no recognizer");
            return;
        };

        self.state = ListeningState::Listening;
        self.ui.set_status(self.state.to_string());

        if let Err(e) = recognizer.start(self.events_tx.clone()) {
            tracing::warn!("Recognizer refused to start: {}", e);
            let _ = self.events_tx.send(RecognitionEvent::Failed(e.to_string()));
            let _ = self.events_tx.send(RecognitionEvent::Ended);
        }
    }

    /// Apply one recognition event; returns the normalized transcript to interpret
    pub fn handle(&mut self, event: RecognitionEvent) -> Option<String> {
        match event {
            RecognitionEvent::Recognized(transcript) => {
                let text = normalize(&transcript);
                tracing::info!(text = %text, "Heard");
                self.ui.set_status(format!("Heard: {}", text));
                Some(text)
            }
            RecognitionEvent::Failed(reason) => {
                tracing::warn!(reason = %reason, "Recognition failed");
                self.state = ListeningState::Error(reason);
                self.ui.set_status(self.state.to_string());
                None
            }
            RecognitionEvent::Ended => {
                self.state = ListeningState::Idle;
                self.ui.set_status(self.state.to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::UiEvent;

    /// Replays a fixed outcome per activation
    struct Scripted {
        outcome: Vec<RecognitionEvent>,
        starts: Arc<Mutex<usize>>,
    }

    impl Recognizer for Scripted {
        fn start(
            &mut self,
            events: flume::Sender<RecognitionEvent>,
        ) -> Result<(), Box<dyn Error + Send + Sync>> {
            *self.starts.lock().unwrap() += 1;
            for event in &self.outcome {
                let _ = events.send(event.clone());
            }
            Ok(())
        }
    }

    struct Refusing;

    impl Recognizer for Refusing {
        fn start(
            &mut self,
            _events: flume::Sender<RecognitionEvent>,
        ) -> Result<(), Box<dyn Error + Send + Sync>> {
            Err("not-allowed".into())
        }
    }

    fn statuses(rx: &flume::Receiver<UiEvent>) -> Vec<String> {
        rx.try_iter()
            .filter_map(|e| match e {
                UiEvent::Status(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    /// Activate once and drain every resulting event through the listener
    fn run_session(listener: &mut Listener) -> Vec<String> {
        listener.activate();
        let events = listener.events();
        let mut heard = Vec::new();
        while let Ok(event) = events.try_recv() {
            heard.extend(listener.handle(event));
        }
        heard
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Next Step "), "next step");
        assert_eq!(normalize("SET TIMER FOR 5 MINUTES\n"), "set timer for 5 minutes");
    }

    #[test]
    fn test_recognized_session() {
        let (ui, rx) = Ui::new();
        let starts = Arc::new(Mutex::new(0));
        let recognizer = Scripted {
            outcome: vec![
                RecognitionEvent::Recognized(" Next Step ".into()),
                RecognitionEvent::Ended,
            ],
            starts: Arc::clone(&starts),
        };
        let mut listener = Listener::new(Some(Box::new(recognizer)), ui);

        assert_eq!(run_session(&mut listener), vec!["next step"]);
        assert_eq!(*listener.state(), ListeningState::Idle);
        assert_eq!(*starts.lock().unwrap(), 1);
        assert_eq!(
            statuses(&rx),
            vec![
                "Status: Not Listening",
                "Listening...",
                "Heard: next step",
                "Status: Not Listening",
            ]
        );
    }

    #[test]
    fn test_failed_session_returns_to_idle() {
        let (ui, rx) = Ui::new();
        let recognizer = Scripted {
            outcome: vec![
                RecognitionEvent::Failed("network".into()),
                RecognitionEvent::Ended,
            ],
            starts: Arc::new(Mutex::new(0)),
        };
        let mut listener = Listener::new(Some(Box::new(recognizer)), ui);

        listener.activate();
        let events = listener.events();
        assert_eq!(listener.handle(events.try_recv().unwrap()), None);
        assert_eq!(*listener.state(), ListeningState::Error("network".into()));
        assert_eq!(listener.handle(events.try_recv().unwrap()), None);
        assert_eq!(*listener.state(), ListeningState::Idle);

        assert!(statuses(&rx).contains(&"Error: network".to_string()));
    }

    #[test]
    fn test_refused_start_reports_failure() {
        let (ui, _rx) = Ui::new();
        let mut listener = Listener::new(Some(Box::new(Refusing)), ui);
        assert!(run_session(&mut listener).is_empty());
        assert_eq!(*listener.state(), ListeningState::Idle);
    }

    #[test]
    fn test_unavailable_notice_once() {
        let (ui, rx) = Ui::new();
        let mut listener = Listener::new(None, ui);
        assert!(!listener.is_available());

        for _ in 0..3 {
            listener.activate();
            assert_eq!(*listener.state(), ListeningState::Idle);
        }
        assert_eq!(statuses(&rx), vec![UNAVAILABLE_NOTICE]);
        assert!(listener.events().try_recv().is_err());
    }

    #[test]
    fn test_typed_recognizer() {
        let (ui, _rx) = Ui::new();
        let (recognizer, mic) = TypedRecognizer::new();
        let mut listener = Listener::new(Some(Box::new(recognizer)), ui);
        let events = listener.events();

        // Nothing armed yet
        assert!(!mic.deliver("next"));

        listener.activate();
        assert!(mic.is_armed());
        // A second activation while armed is ignored
        listener.activate();
        assert!(mic.deliver("Show Ingredients"));
        assert!(!mic.is_armed());
        assert!(!mic.deliver("ignored"));

        let received: Vec<_> = events.try_iter().collect();
        assert_eq!(
            received,
            vec![
                RecognitionEvent::Recognized("Show Ingredients".into()),
                RecognitionEvent::Ended,
            ]
        );
    }

    #[test]
    fn test_typed_blank_line_is_no_speech() {
        let (recognizer, mic) = TypedRecognizer::new();
        let mut recognizer: Box<dyn Recognizer> = Box::new(recognizer);
        let (tx, rx) = flume::unbounded();
        recognizer.start(tx).unwrap();

        assert!(mic.deliver("   "));
        let received: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            received,
            vec![
                RecognitionEvent::Failed(NO_SPEECH.into()),
                RecognitionEvent::Ended,
            ]
        );
    }

    #[test]
    fn test_config_without_program() {
        let config = RecognitionConfig::Command {
            program: "cookalong-no-such-stt".into(),
            args: vec![],
        };
        let (recognizer, mic) = recognizer_from_config(&config, "en-US");
        assert!(recognizer.is_none() && mic.is_none());

        let (recognizer, mic) = recognizer_from_config(&RecognitionConfig::Typed, "en-US");
        assert!(recognizer.is_some() && mic.is_some());

        let (recognizer, _) = recognizer_from_config(&RecognitionConfig::Disabled, "en-US");
        assert!(recognizer.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_recognizer_outcomes() {
        fn session(script: &str) -> Vec<RecognitionEvent> {
            let mut recognizer = CommandRecognizer::new(
                PathBuf::from("/bin/sh"),
                vec!["-c".into(), script.into()],
                "en-US",
            );
            let (tx, rx) = flume::unbounded();
            recognizer.start(tx).unwrap();
            rx.iter().collect()
        }

        assert_eq!(
            session("echo '  Next Step  '"),
            vec![RecognitionEvent::Recognized("Next Step".into()), RecognitionEvent::Ended]
        );
        assert_eq!(
            session("true"),
            vec![RecognitionEvent::Failed(NO_SPEECH.into()), RecognitionEvent::Ended]
        );
        assert_eq!(
            session("echo 'microphone busy' >&2; exit 3"),
            vec![RecognitionEvent::Failed("microphone busy".into()), RecognitionEvent::Ended]
        );
    }
}
