pub mod cli;
pub mod io;

pub use crate::{InputError, Note, NoteError, Result};
