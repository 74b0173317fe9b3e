//! Narrator - speaks text through whatever speech engine the host offers
//!
//! Every call cancels the utterance in progress before starting the new one,
//! so narration never queues or interleaves. Without an engine every call is
//! a silent no-op.

use crate::config::SpeechConfig;
use crate::host::{expand_args, locate_program};
use crate::render::Ui;
use std::error::Error;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;

pub trait SpeechEngine: Send {
    fn speak(&self, text: &str, locale: &str) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Stop anything currently being spoken
    fn cancel(&self);
}

// ============================================================================
// Console engine - captions on the display instead of audio
// ============================================================================

pub struct ConsoleVoice {
    ui: Ui,
}

impl ConsoleVoice {
    pub fn new(ui: Ui) -> Self {
        Self { ui }
    }
}

impl SpeechEngine for ConsoleVoice {
    fn speak(&self, text: &str, _locale: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.ui.caption(text);
        Ok(())
    }

    fn cancel(&self) {}
}

// ============================================================================
// Command engine - external TTS program (espeak-ng, say, ...)
// ============================================================================

/// Runs `program args... <text>` per utterance; cancel kills the child
pub struct CommandVoice {
    program: PathBuf,
    args: Vec<String>,
    child: Mutex<Option<Child>>,
}

impl CommandVoice {
    pub fn new(program: PathBuf, args: Vec<String>) -> Self {
        Self {
            program,
            args,
            child: Mutex::new(None),
        }
    }

    fn command(&self, text: &str, locale: &str) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(expand_args(&self.args, locale))
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command
    }
}

impl SpeechEngine for CommandVoice {
    fn speak(&self, text: &str, locale: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let child = self.command(text, locale).spawn()?;
        let mut slot = self.child.lock().map_err(|_| "speech process lock poisoned")?;
        *slot = Some(child);
        Ok(())
    }

    fn cancel(&self) {
        let Ok(mut slot) = self.child.lock() else {
            return;
        };
        if let Some(mut child) = slot.take() {
            // Already exited is fine; kill only fails then
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Drop for CommandVoice {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ============================================================================
// Narrator
// ============================================================================

pub struct Narrator {
    engine: Option<Box<dyn SpeechEngine>>,
    locale: String,
}

impl Narrator {
    pub fn new(engine: Box<dyn SpeechEngine>, locale: &str) -> Self {
        Self {
            engine: Some(engine),
            locale: locale.to_string(),
        }
    }

    /// Narrator for a host without speech synthesis
    pub fn unavailable() -> Self {
        Self {
            engine: None,
            locale: String::new(),
        }
    }

    /// Pick the engine named in config, degrading to no engine when the
    /// configured program is missing
    pub fn from_config(config: &SpeechConfig, locale: &str, ui: &Ui) -> Self {
        match config {
            SpeechConfig::Console => {
                tracing::debug!("Speech: console captions");
                Self::new(Box::new(ConsoleVoice::new(ui.clone())), locale)
            }
            SpeechConfig::Command { program, args } => match locate_program(program) {
                Some(path) => {
                    tracing::info!(program = %path.display(), "Speech: external command");
                    Self::new(Box::new(CommandVoice::new(path, args.clone())), locale)
                }
                None => {
                    tracing::warn!(program = %program, "Speech program not found, narration disabled");
                    Self::unavailable()
                }
            },
            SpeechConfig::Disabled => {
                tracing::info!("Speech disabled");
                Self::unavailable()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.engine.is_some()
    }

    pub fn speak(&self, text: &str) {
        let Some(engine) = &self.engine else {
            return;
        };
        engine.cancel();
        tracing::debug!(text, "Speaking");
        if let Err(e) = engine.speak(text, &self.locale) {
            tracing::warn!("Speech failed: {}", e);
        }
    }

    /// Cut off the current utterance without starting another
    pub fn silence(&self) {
        if let Some(engine) = &self.engine {
            engine.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::UiEvent;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Recorder {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl SpeechEngine for Recorder {
        fn speak(&self, text: &str, locale: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
            self.calls.lock().unwrap().push(format!("speak[{}] {}", locale, text));
            Ok(())
        }

        fn cancel(&self) {
            self.calls.lock().unwrap().push("cancel".into());
        }
    }

    struct Broken;

    impl SpeechEngine for Broken {
        fn speak(&self, _text: &str, _locale: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
            Err("no audio device".into())
        }

        fn cancel(&self) {}
    }

    #[test]
    fn test_cancels_before_every_utterance() {
        let recorder = Recorder::default();
        let narrator = Narrator::new(Box::new(recorder.clone()), "en-US");

        narrator.speak("Boil water.");
        narrator.speak("Drain the water.");

        assert_eq!(
            *recorder.calls.lock().unwrap(),
            vec![
                "cancel",
                "speak[en-US] Boil water.",
                "cancel",
                "speak[en-US] Drain the water.",
            ]
        );
    }

    #[test]
    fn test_silence_only_cancels() {
        let recorder = Recorder::default();
        let narrator = Narrator::new(Box::new(recorder.clone()), "en-US");
        narrator.silence();
        assert_eq!(*recorder.calls.lock().unwrap(), vec!["cancel"]);
    }

    #[test]
    fn test_unavailable_is_silent() {
        let narrator = Narrator::unavailable();
        assert!(!narrator.is_available());
        narrator.speak("nobody hears this");
        narrator.silence();
    }

    #[test]
    fn test_engine_errors_are_swallowed() {
        let narrator = Narrator::new(Box::new(Broken), "en-US");
        narrator.speak("Timer finished.");
    }

    #[test]
    fn test_console_voice_captions() {
        let (ui, rx) = Ui::new();
        let narrator = Narrator::from_config(&SpeechConfig::Console, "en-US", &ui);
        narrator.speak("Timer finished.");
        assert_eq!(rx.try_recv().unwrap(), UiEvent::Spoken("Timer finished.".into()));
    }

    #[test]
    fn test_missing_program_degrades() {
        let (ui, _rx) = Ui::new();
        let config = SpeechConfig::Command {
            program: "cookalong-no-such-tts".into(),
            args: vec![],
        };
        assert!(!Narrator::from_config(&config, "en-US", &ui).is_available());
        assert!(!Narrator::from_config(&SpeechConfig::Disabled, "en-US", &ui).is_available());
    }

    #[test]
    fn test_command_voice_arguments() {
        let voice = CommandVoice::new(
            PathBuf::from("espeak-ng"),
            vec!["-v".into(), "{locale}".into()],
        );
        let command = voice.command("Drain the water.", "en-US");
        let args: Vec<_> = command.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, vec!["-v", "en-US", "Drain the water."]);
        assert_eq!(command.get_program(), "espeak-ng");
    }
}
