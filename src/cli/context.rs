use std::io;

use dialoguer::theme::ColorfulTheme;
use rustyline::error::ReadlineError;
use thiserror::Error;

use crate::aggregate::{self, RollupReport};
use crate::cli::commands;
use crate::cli::output;
use crate::cli::registry::CommandRegistry;
use crate::config::ImportConfig;
use crate::errors::BudgetError;
use crate::model::BudgetBook;
use crate::storage::BookStore;

/// Fatal shell errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] BudgetError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Readline error: {0}")]
    Readline(#[from] ReadlineError),
}

/// Per-command errors, reported and recovered from.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Core(#[from] BudgetError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Prompt error: {0}")]
    Dialog(#[from] dialoguer::Error),
}

impl CommandError {
    pub fn input(message: impl Into<String>) -> Self {
        CommandError::Input(message.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

pub type CommandOutcome = Result<LoopControl, CommandError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

/// Lowest jaro-winkler similarity accepted for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.84;

/// Everything a command handler can touch: the loaded book, its freshest
/// rollup, storage, and the importer config.
pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub store: BookStore,
    pub book: BudgetBook,
    pub report: RollupReport,
    pub import_config: ImportConfig,
    pub theme: ColorfulTheme,
    pub dirty: bool,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let store = BookStore::new_default()?;
        let book = match store.load()? {
            Some(book) => {
                output::info(format!("Loaded budget from {}.", store.book_path().display()));
                book
            }
            None => BudgetBook::new(),
        };
        let import_config = store.load_import_config()?;

        let mut context = Self {
            mode,
            registry,
            store,
            book,
            report: RollupReport::default(),
            import_config,
            theme: ColorfulTheme::default(),
            dirty: false,
            running: true,
        };
        context.recompute();
        Ok(context)
    }

    /// Re-runs the aggregation pass so cached figures stay fresh. Called
    /// once at startup and after every mutating command.
    pub fn recompute(&mut self) {
        self.report = aggregate::refresh(&mut self.book);
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.recompute();
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub fn dispatch(&mut self, command: &str, args: &[&str]) -> CommandOutcome {
        let Some(handler) = self.registry.get(command).map(|entry| entry.handler) else {
            return Err(self.unknown_command(command));
        };
        handler(self, args)
    }

    fn unknown_command(&self, command: &str) -> CommandError {
        let mut best: Option<(&'static str, f64)> = None;
        for name in self.registry.names() {
            let score = strsim::jaro_winkler(command, name);
            if score >= SUGGESTION_THRESHOLD
                && best.map(|(_, existing)| score > existing).unwrap_or(true)
            {
                best = Some((name, score));
            }
        }
        match best {
            Some((name, _)) => CommandError::Input(format!(
                "Unknown command `{}`. Did you mean `{}`?",
                command, name
            )),
            None => CommandError::Input(format!(
                "Unknown command `{}`. Type `help` for the command list.",
                command
            )),
        }
    }

    pub fn report_error(&self, err: CommandError) {
        output::error(err.to_string());
    }
}
