//! # scripture-quiz
//!
//! A terminal quiz and lesson app. Questions come from a content provider
//! (Gemini, or a local JSON content pack); a background worker keeps an
//! offline copy of the app's shell assets.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use scripture_quiz::{QuizError, config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), QuizError> {
//!     let config = config::load_config()?;
//!     scripture_quiz::run(config).await
//! }
//! ```

pub mod app;
pub mod cache;
pub mod config;
pub mod models;
pub mod provider;
pub mod runner;
pub mod scoring;
pub mod state;
pub mod terminal;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEventKind};
use thiserror::Error;
use tracing::{info, warn};

pub use app::App;
use cache::{
    AssetCache, AssetCacheHandle, CacheError, CacheStorage, DiskStorage, HttpNetwork, Network,
};
use config::{Config, ConfigError};
use provider::{ContentProvider, FileProvider, GeminiProvider};
use state::{Event, Screen};

#[derive(Debug, Error)]
pub enum QuizError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("no content source: set GEMINI_API_KEY or pass --content <file>")]
    NoProvider,

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Gemini when an API key is configured, otherwise the local content pack.
pub fn select_provider(config: &Config) -> Result<Arc<dyn ContentProvider>, QuizError> {
    if let Some(gemini) = GeminiProvider::from_config(config) {
        return Ok(Arc::new(gemini?));
    }
    match &config.content_file {
        Some(path) => Ok(Arc::new(FileProvider::new(path))),
        None => Err(QuizError::NoProvider),
    }
}

/// Open the on-disk asset cache and move it onto its worker task.
pub async fn open_asset_cache(config: &Config) -> Result<AssetCacheHandle, QuizError> {
    let storage: Arc<dyn CacheStorage> = Arc::new(DiskStorage::new(&config.cache_dir));
    let network: Arc<dyn Network> = Arc::new(HttpNetwork::new(config.request_timeout)?);
    let cache = AssetCache::open(storage, network, config.manifest.clone()).await?;
    Ok(AssetCacheHandle::spawn(cache))
}

/// Run the interactive app until the user quits.
pub async fn run(config: Config) -> Result<(), QuizError> {
    let provider = select_provider(&config)?;
    let provider_name = provider.name().to_string();

    // The cache warms up on its own; the first screen never waits for it.
    let cache_config = config.clone();
    tokio::spawn(async move {
        match open_asset_cache(&cache_config).await {
            Ok(handle) => {
                if let Err(e) = handle.start().await {
                    warn!(error = %e, "Asset cache worker unavailable");
                }
            }
            Err(QuizError::Cache(e)) => {
                warn!(code = e.code(), error = %e, "Failed to open asset cache")
            }
            Err(e) => warn!(error = %e, "Failed to open asset cache"),
        }
    });

    let mut app = App::new(provider);
    let mut terminal = terminal::init()?;
    info!(
        provider = %provider_name,
        config_file = ?config.config_file_path,
        "Started interactive session"
    );

    let result = run_event_loop(&mut terminal, &mut app);
    terminal::restore()?;
    result
}

fn run_event_loop(terminal: &mut terminal::AppTerminal, app: &mut App) -> Result<(), QuizError> {
    loop {
        app.poll_generation();
        app.on_tick();
        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(Duration::from_millis(50))? {
            if let TermEvent::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                if handle_input(app, key.code) {
                    break;
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Returns true if the app should exit.
fn handle_input(app: &mut App, key: KeyCode) -> bool {
    match app.screen() {
        Screen::Menu => handle_menu_input(app, key),
        Screen::QuizSetup { .. } => handle_quiz_setup_input(app, key),
        Screen::LessonSetup { .. } => handle_lesson_setup_input(app, key),
        Screen::Generating { .. } => is_quit(key),
        Screen::InLesson { .. } => handle_lesson_input(app, key),
        Screen::InQuiz { .. } => handle_quiz_input(app, key),
        Screen::Results { .. } => handle_results_input(app, key),
    }
}

fn is_quit(key: KeyCode) -> bool {
    matches!(key, KeyCode::Char('q') | KeyCode::Char('Q'))
}

fn handle_menu_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Up | KeyCode::Down | KeyCode::Char('k') | KeyCode::Char('j') => {
            app.toggle_menu_choice();
            false
        }
        KeyCode::Enter => {
            app.select_menu();
            false
        }
        _ => is_quit(key),
    }
}

fn handle_quiz_setup_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Down | KeyCode::Tab | KeyCode::Char('j') => app.quiz_form.next_field(),
        KeyCode::Up | KeyCode::BackTab | KeyCode::Char('k') => app.quiz_form.previous_field(),
        KeyCode::Right | KeyCode::Char('l') => app.quiz_form.change(true),
        KeyCode::Left | KeyCode::Char('h') => app.quiz_form.change(false),
        KeyCode::Enter => app.submit_quiz(),
        KeyCode::Esc | KeyCode::Backspace => app.dispatch(Event::Back),
        _ => return is_quit(key),
    }
    false
}

fn handle_lesson_setup_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Down | KeyCode::Char('j') => app.change_lesson_topic(true),
        KeyCode::Up | KeyCode::Char('k') => app.change_lesson_topic(false),
        KeyCode::Enter => app.submit_lesson(),
        KeyCode::Esc | KeyCode::Backspace => app.dispatch(Event::Back),
        _ => return is_quit(key),
    }
    false
}

fn handle_lesson_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Down | KeyCode::Char('j') => app.scroll_down(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_up(),
        KeyCode::Enter => app.dispatch(Event::StartExam),
        KeyCode::Esc | KeyCode::Backspace => app.dispatch(Event::Back),
        _ => return is_quit(key),
    }
    false
}

fn handle_quiz_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Down | KeyCode::Char('j') => app.highlight_next(),
        KeyCode::Up | KeyCode::Char('k') => app.highlight_previous(),
        KeyCode::Enter | KeyCode::Char(' ') => app.confirm(),
        KeyCode::Char(c @ '1'..='4') => app.select_option(c as usize - '1' as usize),
        KeyCode::Char('s') | KeyCode::Char('S') => app.skip_question(),
        KeyCode::Char('n') | KeyCode::Char('N') => app.advance_question(),
        _ => return is_quit(key),
    }
    false
}

fn handle_results_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Down | KeyCode::Char('j') => app.scroll_down(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_up(),
        KeyCode::Char('r') | KeyCode::Char('R') => app.dispatch(Event::Retry),
        KeyCode::Char('n') | KeyCode::Char('N') => app.dispatch(Event::StartFresh),
        _ => return is_quit(key),
    }
    false
}
