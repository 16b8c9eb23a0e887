pub mod sqlite;

pub use sqlite::SqliteBackend;

pub use crate::{BackendError, Note, NoteBackend, NoteError, Result};
