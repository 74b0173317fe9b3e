//! Command interpreter - classifies a normalized transcript into an intent
//!
//! Intents are checked in a fixed order and the first match wins:
//! 1. Start over
//! 2. Next step
//! 3. Previous step
//! 4. Repeat step
//! 5. List ingredients
//! 6. Ingredient quantity
//! 7. Timer
//! 8. Anything else gets the help message
//!
//! Matching is plain substring containment on the lowercased text.

use regex::Regex;
use std::sync::LazyLock;

const START_WORDS: &[&str] = &["start", "begin"];
const NEXT_WORDS: &[&str] = &["next", "forward", "skip"];
const PREVIOUS_WORDS: &[&str] = &["previous", "back"];
const REPEAT_WORDS: &[&str] = &["repeat", "again"];
const INGREDIENT_WORDS: &[&str] = &["ingredient", "ingredients", "what do i need"];
const QUANTITY_WORDS: &[&str] = &["how much", "quantity"];
const TIMER_WORDS: &[&str] = &["timer"];

pub const HELP_MESSAGE: &str =
    "Sorry, I didn't understand. Try: next, previous, repeat, show ingredients, set timer for 2 minutes.";
pub const ASK_MINUTES: &str = "For how many minutes?";
pub const INGREDIENT_NOT_FOUND: &str =
    "I could not find that ingredient exactly. Try asking 'show ingredients'.";

/// ASCII digits only; `\d` would also match other scripts' digits
static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid regex"));

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Start,
    Next,
    Previous,
    Repeat,
    Ingredients,
    Quantity,
    /// Minutes from the first number in the command, if there was one
    Timer { minutes: Option<f64> },
    Help,
}

pub fn classify(text: &str) -> Intent {
    if contains_any(text, START_WORDS) {
        return Intent::Start;
    }
    if contains_any(text, NEXT_WORDS) {
        return Intent::Next;
    }
    if contains_any(text, PREVIOUS_WORDS) {
        return Intent::Previous;
    }
    if contains_any(text, REPEAT_WORDS) {
        return Intent::Repeat;
    }
    if contains_any(text, INGREDIENT_WORDS) {
        return Intent::Ingredients;
    }
    if contains_any(text, QUANTITY_WORDS) {
        return Intent::Quantity;
    }
    if contains_any(text, TIMER_WORDS) {
        return Intent::Timer {
            minutes: first_number(text),
        };
    }
    Intent::Help
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// First run of digits, ignoring any unit that follows it
pub fn first_number(text: &str) -> Option<f64> {
    NUMBER
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Loose ingredient lookup: the first ingredient any of whose words appears
/// anywhere in the command. "how much salt" finds "2 tsp salt", and so does
/// "quantity for 2 people" through the bare "2". Kept loose on purpose.
pub fn find_ingredient<'a>(ingredients: &'a [String], command: &str) -> Option<&'a str> {
    ingredients
        .iter()
        .find(|ingredient| {
            ingredient
                .to_lowercase()
                .split_whitespace()
                .any(|word| command.contains(word))
        })
        .map(String::as_str)
}

pub fn ingredients_sentence(ingredients: &[String]) -> String {
    format!("Ingredients are: {}", ingredients.join(", "))
}
