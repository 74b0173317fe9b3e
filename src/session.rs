//! Walkthrough session - the active recipe and the step being cooked
//!
//! The step index always points at an existing step. Moves past either end
//! are refused with a [`Boundary`] instead of wrapping around.

use crate::recipe::Recipe;
use anyhow::{Result, bail};
use std::fmt;
use std::sync::Arc;

/// Which end of the recipe a refused move ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    First,
    Last,
}

impl Boundary {
    /// Spoken notice for a refused move
    pub fn notice(&self) -> &'static str {
        match self {
            Boundary::First => "This is the first step.",
            Boundary::Last => "This is the last step.",
        }
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.notice())
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    recipe: Arc<Recipe>,
    step_index: usize,
}

impl Session {
    /// Start on the first step. A recipe without steps is rejected.
    pub fn new(recipe: Arc<Recipe>) -> Result<Self> {
        if recipe.steps.is_empty() {
            bail!("recipe \"{}\" has no steps", recipe.id);
        }
        Ok(Self {
            recipe,
            step_index: 0,
        })
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    /// 1-based step number for display
    pub fn step_number(&self) -> usize {
        self.step_index + 1
    }

    pub fn step_count(&self) -> usize {
        self.recipe.steps.len()
    }

    pub fn current_step(&self) -> &str {
        &self.recipe.steps[self.step_index]
    }

    pub fn is_first(&self) -> bool {
        self.step_index == 0
    }

    pub fn is_last(&self) -> bool {
        self.step_index + 1 >= self.step_count()
    }

    /// Jump back to step 1
    pub fn restart(&mut self) {
        self.step_index = 0;
    }

    pub fn advance(&mut self) -> Result<(), Boundary> {
        if self.is_last() {
            return Err(Boundary::Last);
        }
        self.step_index += 1;
        Ok(())
    }

    pub fn retreat(&mut self) -> Result<(), Boundary> {
        if self.is_first() {
            return Err(Boundary::First);
        }
        self.step_index -= 1;
        Ok(())
    }
}
