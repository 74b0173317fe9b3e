use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Locale handed to speech engines
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Recipe book to load instead of the built-in one
    #[serde(default)]
    pub recipes_file: Option<PathBuf>,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub recognition: RecognitionConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            recipes_file: None,
            speech: SpeechConfig::default(),
            recognition: RecognitionConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

fn default_locale() -> String {
    "en-US".into()
}

// ============================================================================
// UI Config
// ============================================================================

#[derive(Debug, Deserialize, PartialEq)]
pub struct UiConfig {
    /// Colored terminal output
    #[serde(default = "default_color")]
    pub color: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            color: default_color(),
        }
    }
}

fn default_color() -> bool {
    true
}

// ============================================================================
// Speech Config
// ============================================================================

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(tag = "engine")]
pub enum SpeechConfig {
    /// Print what would be spoken
    #[default]
    #[serde(rename = "console")]
    Console,
    /// External TTS program; the text is passed as the last argument
    #[serde(rename = "command")]
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
    #[serde(rename = "none")]
    Disabled,
}

// ============================================================================
// Recognition Config
// ============================================================================

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(tag = "engine")]
pub enum RecognitionConfig {
    /// Next typed line after activation is the transcript
    #[default]
    #[serde(rename = "typed")]
    Typed,
    /// External speech-to-text program printing one transcript on stdout
    #[serde(rename = "command")]
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
    #[serde(rename = "none")]
    Disabled,
}

impl Config {
    /// Load from an explicit path (which must exist), or from `config.toml`
    /// in the working directory when present, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p, true),
            None => (Path::new(DEFAULT_CONFIG_PATH), false),
        };

        if !required && !path.exists() {
            tracing::debug!("No config.toml found, using defaults");
            return Ok(Config::default());
        }

        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_toml_str(&source)
            .with_context(|| format!("invalid config {}", path.display()))?;
        tracing::info!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// No audio: narration falls back to on-screen captions
    pub fn mute(&mut self) {
        self.speech = SpeechConfig::Console;
    }
}
