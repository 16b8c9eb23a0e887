#![deny(clippy::cargo)]
#![deny(clippy::complexity)]
#![deny(clippy::correctness)]
#![deny(clippy::nursery)]
#![deny(clippy::perf)]
#![deny(clippy::style)]
#![deny(clippy::suspicious)]
#![deny(clippy::pedantic)]

use serde::{Deserialize, Serialize};
use std::io;
use tabled::Tabled;
use thiserror::Error;

pub mod app;
pub mod backends;
pub mod bridge;
pub mod setup;
pub mod ui;

// More convenient Result type
pub type Result<T> = std::result::Result<T, NoteError>;

/// A single stored note. Serialized as `{"id", "text", "date"}` for the display layer.
#[derive(Tabled, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: i64,
    pub text: String,
    pub date: String,
}

/// Trait to be implemented by all backends that store and query notes
pub trait NoteBackend {
    /// Stores a new note and returns the ID assigned by the store
    ///
    /// # Errors
    ///
    /// Returns an error if the note could not be inserted
    fn insert(&self, text: &str) -> Result<i64>;

    /// Replaces the text of the note with the given ID and returns the number of affected rows.
    /// A missing ID is not an error and affects zero rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the update statement fails
    fn update(&self, id: i64, text: &str) -> Result<usize>;

    /// Deletes the note with the given ID and returns the number of affected rows.
    /// A missing ID is not an error and affects zero rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete statement fails
    fn delete(&self, id: i64) -> Result<usize>;

    /// Returns every note, newest ID first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    fn list_all(&self) -> Result<Vec<Note>>;

    /// Returns every note whose text contains `substring`, newest ID first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    fn search(&self, substring: &str) -> Result<Vec<Note>>;

    /// Returns the total number of notes
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    fn count(&self) -> Result<i64>;

    /// Returns the number of notes created on the store's current day
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    fn count_created_today(&self) -> Result<i64>;
}

// Enum for all possible validation, backend or input errors
#[derive(Debug, Error)]
pub enum NoteError {
    #[error(transparent)]
    Validation(#[from] NoteValidationError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Failed serializing bridge payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Errors from the line-based bridge transport
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read from stdin: {0}")]
    StdinReadError(io::Error),

    #[error("Failed writing to stdout: {0}")]
    StdoutWriteError(io::Error),

    #[error("Couldn't decode bridge call '{line}': {source}")]
    MalformedCall {
        line: String,
        source: serde_json::Error,
    },
}

// Enum for all possible note validation errors
#[derive(Debug, Error)]
pub enum NoteValidationError {
    #[error("Text is too large. Max: {max}, Got: {got}")]
    TextTooLarge { max: usize, got: usize },
}

// Enum for all possible storage errors
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Failed opening database at '{path}'")]
    DatabaseOpenError {
        path: String,
        source: rusqlite::Error,
    },

    #[error("Failed creating `data` table in database")]
    TableCreationError(rusqlite::Error),

    #[error("Database schema version {found} is newer than supported version {supported}")]
    SchemaDowngrade { found: i64, supported: i64 },

    #[error("Database is locked or busy")]
    DatabaseBusy,

    #[error("Database corruption or file I/O error")]
    DatabaseCorruptOrIo,

    #[error("Database or disk is full")]
    DiskFull,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Database file is not a valid SQLite database")]
    NotADatabase,

    #[error("Database schema has changed unexpectedly")]
    SchemaChanged,

    #[error("Insufficient permissions")]
    PermissionDenied,

    #[error(transparent)]
    Other(#[from] anyhow::Error), // Used as fallback
}
