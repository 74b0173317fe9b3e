//! Recipe store - the immutable recipe book loaded once at startup
//!
//! The book is either the built-in default or a TOML file with one
//! `[[recipe]]` table per recipe. The first recipe is always the active one.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Recipe {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RecipeFile {
    #[serde(default, rename = "recipe")]
    recipes: Vec<Recipe>,
}

/// Ordered, validated list of recipes
#[derive(Debug, Clone)]
pub struct RecipeBook {
    recipes: Vec<Arc<Recipe>>,
}

impl RecipeBook {
    /// Build a book, rejecting anything a walkthrough session could not run on
    pub fn new(recipes: Vec<Recipe>) -> Result<Self> {
        if recipes.is_empty() {
            bail!("recipe book is empty");
        }

        let mut seen = HashSet::new();
        for recipe in &recipes {
            if recipe.id.trim().is_empty() {
                bail!("recipe \"{}\" has an empty id", recipe.title);
            }
            if !seen.insert(recipe.id.as_str()) {
                bail!("duplicate recipe id \"{}\"", recipe.id);
            }
            if recipe.steps.is_empty() {
                bail!("recipe \"{}\" has no steps", recipe.id);
            }
        }

        Ok(Self {
            recipes: recipes.into_iter().map(Arc::new).collect(),
        })
    }

    /// The default book shipped with the binary
    pub fn builtin() -> Self {
        let pasta = Recipe {
            id: "pasta".into(),
            title: "Simple Pasta".into(),
            ingredients: vec![
                "200g pasta".into(),
                "2 tsp salt".into(),
                "1 tbsp oil".into(),
                "1 cup pasta sauce".into(),
            ],
            steps: vec![
                "Boil water in a large pot.".into(),
                "Add pasta, salt, and oil to the water.".into(),
                "Cook for 10 minutes until soft.".into(),
                "Drain the water.".into(),
                "Add pasta sauce and mix well.".into(),
                "Serve warm and enjoy!".into(),
            ],
        };
        Self {
            recipes: vec![Arc::new(pasta)],
        }
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let file: RecipeFile = toml::from_str(source).context("invalid recipe file")?;
        Self::new(file.recipes)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read recipe file {}", path.display()))?;
        let book = Self::from_toml_str(&source)
            .with_context(|| format!("failed to load recipes from {}", path.display()))?;
        tracing::info!(path = %path.display(), recipes = book.recipes.len(), "Recipe book loaded");
        Ok(book)
    }

    /// Recipe the walkthrough starts on
    pub fn active(&self) -> Arc<Recipe> {
        Arc::clone(&self.recipes[0])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter().map(|r| r.as_ref())
    }
}
