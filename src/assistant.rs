//! Assistant - owns the walkthrough session, the timer and the narrator
//!
//! Key actions and recognized commands both land here, so a step change
//! behaves the same whichever way it was asked for. Every outcome ends in
//! something spoken; nothing here fails.

use crate::interpreter::{
    self, ASK_MINUTES, HELP_MESSAGE, INGREDIENT_NOT_FOUND, Intent, find_ingredient,
    ingredients_sentence,
};
use crate::narrator::Narrator;
use crate::recipe::Recipe;
use crate::render::Ui;
use crate::session::Session;
use crate::timer::{FINISHED_DISPLAY, Tick, Timer, format_remaining};
use anyhow::Result;
use std::sync::Arc;

pub const TIMER_FINISHED: &str = "Timer finished.";

pub struct Assistant {
    session: Session,
    timer: Timer,
    narrator: Narrator,
    ui: Ui,
}

impl Assistant {
    /// Fails when the recipe has no steps to walk through
    pub fn new(recipe: Arc<Recipe>, narrator: Narrator, ui: Ui) -> Result<Self> {
        Ok(Self {
            session: Session::new(recipe)?,
            timer: Timer::new(),
            narrator,
            ui,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Title, ingredient list, then the current step
    pub fn show_recipe(&self) {
        self.ui.show_recipe(self.session.recipe());
        self.render_step();
    }

    fn render_step(&self) {
        let step = self.session.current_step();
        self.ui
            .show_step(self.session.step_number(), self.session.step_count(), step);
        self.narrator.speak(step);
    }

    pub fn start_over(&mut self) {
        self.session.restart();
        self.render_step();
    }

    pub fn next_step(&mut self) {
        match self.session.advance() {
            Ok(()) => self.render_step(),
            Err(boundary) => self.narrator.speak(boundary.notice()),
        }
    }

    pub fn prev_step(&mut self) {
        match self.session.retreat() {
            Ok(()) => self.render_step(),
            Err(boundary) => self.narrator.speak(boundary.notice()),
        }
    }

    pub fn repeat_step(&self) {
        self.narrator.speak(self.session.current_step());
    }

    pub fn read_ingredients(&self) {
        self.narrator
            .speak(&ingredients_sentence(&self.session.recipe().ingredients));
    }

    pub fn answer_quantity(&self, command: &str) {
        match find_ingredient(&self.session.recipe().ingredients, command) {
            Some(ingredient) => self.narrator.speak(ingredient),
            None => self.narrator.speak(INGREDIENT_NOT_FOUND),
        }
    }

    pub fn start_timer(&mut self, minutes: f64) {
        match self.timer.start(minutes) {
            Ok(countdown) => {
                tracing::info!(minutes, secs = countdown.remaining_secs(), "Timer started");
                self.ui.set_timer(countdown.display());
                self.narrator
                    .speak(&format!("Timer set for {} minutes.", minutes));
            }
            Err(e) => {
                tracing::debug!(minutes, "Timer rejected");
                self.narrator.speak(&e.to_string());
            }
        }
    }

    /// Next tick of the running timer; pending forever while none runs
    pub async fn timer_tick(&mut self) -> Tick {
        self.timer.tick().await
    }

    pub fn on_timer_tick(&mut self, tick: Tick) {
        match tick {
            Tick::Running(remaining) => self.ui.set_timer(format_remaining(remaining)),
            Tick::Finished => {
                tracing::info!("Timer finished");
                self.narrator.speak(TIMER_FINISHED);
                self.ui.set_timer(FINISHED_DISPLAY.to_string());
            }
        }
    }

    /// Classify a normalized command and carry it out
    pub fn interpret(&mut self, text: &str) -> Intent {
        let intent = interpreter::classify(text);
        tracing::info!(text, intent = ?intent, "Command");

        match &intent {
            Intent::Start => self.start_over(),
            Intent::Next => self.next_step(),
            Intent::Previous => self.prev_step(),
            Intent::Repeat => self.repeat_step(),
            Intent::Ingredients => self.read_ingredients(),
            Intent::Quantity => self.answer_quantity(text),
            Intent::Timer { minutes: Some(m) } => self.start_timer(*m),
            Intent::Timer { minutes: None } => self.narrator.speak(ASK_MINUTES),
            Intent::Help => self.narrator.speak(HELP_MESSAGE),
        }
        intent
    }

    /// Stop talking before exit
    pub fn shutdown(&self) {
        self.narrator.silence();
    }
}
