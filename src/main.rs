use cookalong::assistant::Assistant;
use cookalong::config::Config;
use cookalong::input::{self, InputEvent, UserAction};
use cookalong::listener::{self, Listener};
use cookalong::logging;
use cookalong::narrator::Narrator;
use cookalong::recipe::RecipeBook;
use cookalong::render::{Renderer, Ui};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "cookalong", version, about)]
struct Cli {
    /// Config file (default: ./config.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Recipe file, overrides `recipes_file` from the config
    #[arg(long)]
    recipes: Option<PathBuf>,

    /// Do not speak, captions only
    #[arg(long)]
    mute: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Validate the recipe book and print a summary
    Check,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: logging disabled: {:#}", e);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if cli.mute {
        config.mute();
    }

    let recipes_file = cli.recipes.or_else(|| config.recipes_file.clone());
    let book = match &recipes_file {
        Some(path) => RecipeBook::load(path)?,
        None => RecipeBook::builtin(),
    };

    if matches!(cli.command, Some(Command::Check)) {
        print_summary(&book);
        return Ok(());
    }

    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("failed to start event loop")?
        .block_on(walkthrough(config, book))
}

fn print_summary(book: &RecipeBook) {
    println!(
        "{} recipe(s), walkthrough starts on the first",
        book.iter().count()
    );
    for recipe in book.iter() {
        println!(
            "  {} - {} ({} ingredients, {} steps)",
            recipe.id,
            recipe.title,
            recipe.ingredients.len(),
            recipe.steps.len()
        );
    }
}

/// Single-threaded event loop: every event is handled to completion before
/// the next one is looked at
async fn walkthrough(config: Config, book: RecipeBook) -> Result<()> {
    let (ui, ui_rx) = Ui::new();
    let mut renderer = Renderer::new(config.ui.color);

    let narrator = Narrator::from_config(&config.speech, &config.locale, &ui);
    let narrator_available = narrator.is_available();
    let (recognizer, mic) = listener::recognizer_from_config(&config.recognition, &config.locale);
    let mut listener = Listener::new(recognizer, ui.clone());
    let recognition_rx = listener.events();

    let mut assistant = Assistant::new(book.active(), narrator, ui.clone())?;
    ui.show_keys();
    assistant.show_recipe();

    let (input_tx, input_rx) = flume::unbounded::<InputEvent>();
    let ctrlc_tx = input_tx.clone();
    ctrlc::set_handler(move || {
        let _ = ctrlc_tx.send(InputEvent::Action(UserAction::Quit));
    })
    .context("failed to install Ctrl-C handler")?;
    input::spawn_reader(input_tx, mic).context("failed to start input reader")?;

    tracing::info!(
        recipe = %assistant.session().recipe().id,
        speech = narrator_available,
        recognition = listener.is_available(),
        "Walkthrough started"
    );

    loop {
        tokio::select! {
            biased;

            Ok(event) = ui_rx.recv_async() => {
                if let Err(e) = renderer.handle(event) {
                    tracing::warn!("Render failed: {}", e);
                }
            }

            Ok(event) = recognition_rx.recv_async() => {
                if let Some(text) = listener.handle(event) {
                    assistant.interpret(&text);
                }
            }

            Ok(event) = input_rx.recv_async() => {
                match event {
                    InputEvent::Action(UserAction::Listen) => listener.activate(),
                    InputEvent::Action(UserAction::Next) => assistant.next_step(),
                    InputEvent::Action(UserAction::Previous) => assistant.prev_step(),
                    InputEvent::Action(UserAction::Repeat) => assistant.repeat_step(),
                    InputEvent::Action(UserAction::Help) => ui.show_keys(),
                    InputEvent::Action(UserAction::Quit) => break,
                    InputEvent::Unknown(line) => {
                        tracing::debug!(line = %line, "Unknown key");
                        ui.show_keys();
                    }
                }
            }

            tick = assistant.timer_tick(), if assistant.timer().is_active() => {
                assistant.on_timer_tick(tick);
            }
        }
    }

    assistant.shutdown();
    for event in ui_rx.try_iter() {
        let _ = renderer.handle(event);
    }
    tracing::info!("Walkthrough ended");
    Ok(())
}
