//! Voice-driven recipe walkthrough
//!
//! Steps are read aloud, spoken commands move through the recipe, and a
//! single kitchen timer counts down. Speech synthesis and recognition are
//! host capabilities plugged in through [`narrator::SpeechEngine`] and
//! [`listener::Recognizer`].

pub mod assistant;
pub mod config;
pub mod host;
pub mod input;
pub mod interpreter;
pub mod listener;
pub mod logging;
pub mod narrator;
pub mod recipe;
pub mod render;
pub mod session;
pub mod timer;
