use crate::input::KEY_HELP;
use crate::recipe::Recipe;
use crossterm::style::{StyledContent, Stylize};
use std::io::{self, Stdout, Write};
use unicode_width::UnicodeWidthStr;

/// Values pushed to the display surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Recipe {
        title: String,
        ingredients: Vec<String>,
    },
    Step {
        number: usize,
        total: usize,
        text: String,
    },
    Timer(String),
    Status(String),
    /// Caption for something the narrator said
    Spoken(String),
    Keys,
}

#[derive(Clone)]
pub struct Ui {
    tx: flume::Sender<UiEvent>,
}

impl Ui {
    pub fn new() -> (Self, flume::Receiver<UiEvent>) {
        let (tx, rx) = flume::unbounded();
        (Self { tx }, rx)
    }

    pub fn show_recipe(&self, recipe: &Recipe) {
        let _ = self.tx.send(UiEvent::Recipe {
            title: recipe.title.clone(),
            ingredients: recipe.ingredients.clone(),
        });
    }

    pub fn show_step(&self, number: usize, total: usize, text: &str) {
        let _ = self.tx.send(UiEvent::Step {
            number,
            total,
            text: text.to_string(),
        });
    }

    pub fn set_timer(&self, display: String) {
        let _ = self.tx.send(UiEvent::Timer(display));
    }

    pub fn set_status(&self, status: impl Into<String>) {
        let _ = self.tx.send(UiEvent::Status(status.into()));
    }

    pub fn caption(&self, text: &str) {
        let _ = self.tx.send(UiEvent::Spoken(text.to_string()));
    }

    pub fn show_keys(&self) {
        let _ = self.tx.send(UiEvent::Keys);
    }
}

/// Line-oriented terminal renderer
pub struct Renderer<W: Write = Stdout> {
    out: W,
    color: bool,
}

impl Renderer<Stdout> {
    pub fn new(color: bool) -> Self {
        Self::with_writer(io::stdout(), color)
    }
}

impl<W: Write> Renderer<W> {
    pub fn with_writer(out: W, color: bool) -> Self {
        Self { out, color }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    pub fn handle(&mut self, event: UiEvent) -> io::Result<()> {
        match event {
            UiEvent::Recipe { title, ingredients } => {
                let rule = "═".repeat(title.width());
                let heading = self.paint(&title, |s| s.bold().yellow());
                let rule = self.paint(&rule, |s| s.yellow());
                let label = self.paint("Ingredients", |s| s.bold());
                writeln!(self.out)?;
                writeln!(self.out, "{}\n{}\n{}", heading, rule, label)?;
                for item in &ingredients {
                    writeln!(self.out, "  • {}", item)?;
                }
                writeln!(self.out)?;
            }
            UiEvent::Step {
                number,
                total,
                text,
            } => {
                let header = format!("Step {} of {}", number, total);
                let header = self.paint(&header, |s| s.bold().green());
                writeln!(self.out, "{}  {}", header, text)?;
            }
            UiEvent::Timer(display) => {
                let line = format!("⏱  {}", display);
                let line = self.paint(&line, |s| s.magenta());
                writeln!(self.out, "{}", line)?;
            }
            UiEvent::Status(status) => {
                let line = format!("[{}]", status);
                let line = self.paint(&line, |s| s.dark_grey());
                writeln!(self.out, "{}", line)?;
            }
            UiEvent::Spoken(text) => {
                let line = format!("🔊 {}", text);
                let line = self.paint(&line, |s| s.cyan());
                writeln!(self.out, "{}", line)?;
            }
            UiEvent::Keys => {
                let help = self.paint(KEY_HELP, |s| s.dark_grey());
                writeln!(self.out, "{}", help)?;
            }
        }
        self.out.flush()
    }

    fn paint<'a>(
        &self,
        text: &'a str,
        style: impl FnOnce(&'a str) -> StyledContent<&'a str>,
    ) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }
}
