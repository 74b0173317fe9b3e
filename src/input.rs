//! Keyboard input - one line per action on stdin

use crate::listener::TypedMic;
use std::io::{self, BufRead};
use std::thread;

pub const KEY_HELP: &str = "\
Keys (type and press Enter):
  l, listen or just Enter - listen for a voice command
  n, next                 - next step
  p, previous, back       - previous step
  r, repeat               - repeat current step
  h, ?                    - show these keys
  q, quit                 - exit (works while listening too)

Voice commands: next, previous, repeat, start, show ingredients,
how much <ingredient>, set timer for <n> minutes";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Listen,
    Next,
    Previous,
    Repeat,
    Help,
    Quit,
}

impl UserAction {
    pub fn parse(line: &str) -> Option<Self> {
        let action = match line.trim().to_lowercase().as_str() {
            "" | "l" | "listen" => UserAction::Listen,
            "n" | "next" => UserAction::Next,
            "p" | "prev" | "previous" | "b" | "back" => UserAction::Previous,
            "r" | "repeat" => UserAction::Repeat,
            "h" | "?" | "help" => UserAction::Help,
            "q" | "quit" | "exit" => UserAction::Quit,
            _ => return None,
        };
        Some(action)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Action(UserAction),
    Unknown(String),
}

/// Decide what one typed line is. Quit always wins; otherwise an armed typed
/// recognition session takes the line and `None` is returned.
pub fn route_line(line: String, mic: Option<&TypedMic>) -> Option<InputEvent> {
    let action = UserAction::parse(&line);
    if action == Some(UserAction::Quit) {
        return Some(InputEvent::Action(UserAction::Quit));
    }
    if mic.is_some_and(|m| m.deliver(&line)) {
        return None;
    }
    Some(match action {
        Some(action) => InputEvent::Action(action),
        None => InputEvent::Unknown(line),
    })
}

/// Read stdin on a dedicated thread, routing each line through
/// [`route_line`]. End of input becomes `Quit`.
pub fn spawn_reader(
    tx: flume::Sender<InputEvent>,
    mic: Option<TypedMic>,
) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new().name("stdin".into()).spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!("stdin read failed: {}", e);
                    break;
                }
            };

            let Some(event) = route_line(line, mic.as_ref()) else {
                continue;
            };
            if tx.send(event).is_err() {
                return;
            }
        }
        let _ = tx.send(InputEvent::Action(UserAction::Quit));
    })
}
