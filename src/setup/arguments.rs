use crate::Result;
use crate::app::NoteService;
use crate::backends::SqliteBackend;
use crate::bridge::{DisplayConfig, Theme};

use clap::Parser;
use log::debug;

#[derive(Parser, Debug)]
#[command(version, about, long_about)]
pub struct Args {
    /// SQLite file holding the notes
    #[arg(short, long, default_value = "app.db")]
    pub database: String,
    /// Start with the dark theme
    #[arg(long)]
    pub dark: bool,
    /// Reject note text longer than this many bytes
    #[arg(long)]
    pub max_text_size: Option<usize>,
}

/// Parses command-line arguments and builds the note service and display settings from them.
///
/// # Errors
///
/// Forwards any error from opening or migrating the database.
pub fn handle_args() -> Result<(NoteService, DisplayConfig)> {
    build(&Args::parse())
}

/// Opens the backend named by `args` and builds the note service and display settings.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or has an unsupported schema version.
pub fn build(args: &Args) -> Result<(NoteService, DisplayConfig)> {
    debug!("Parsed arguments: {args:?}");

    // Open now so a bad path or newer schema stops startup instead of failing the first call
    let repo = SqliteBackend::open(&args.database)?;

    let config = DisplayConfig {
        theme: Theme::from_dark(args.dark),
    };
    Ok((NoteService::new(Box::new(repo), args.max_text_size), config))
}
