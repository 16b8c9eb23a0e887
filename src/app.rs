use crate::{Note, NoteBackend, NoteValidationError, Result};
use log::trace;

pub struct NoteService {
    pub repo: Box<dyn NoteBackend>,
    pub max_text_size: Option<usize>,
}

impl NoteService {
    #[must_use]
    pub fn new(repo: Box<dyn NoteBackend>, max_text_size: Option<usize>) -> Self {
        Self {
            repo,
            max_text_size,
        }
    }

    /// Retrieve every note, newest first
    ///
    /// # Errors
    ///
    /// Forwards backend errors
    pub fn list_notes(&self) -> Result<Vec<Note>> {
        self.repo.list_all()
    }

    /// Notes containing `query`, newest first
    ///
    /// # Errors
    ///
    /// Forwards backend errors
    pub fn search_notes(&self, query: &str) -> Result<Vec<Note>> {
        self.repo.search(query)
    }

    /// Create a new note after validation
    ///
    /// # Errors
    ///
    /// Returns `NoteValidationError::TextTooLarge` over the size limit, or a backend error
    pub fn create_note(&self, text: &str) -> Result<i64> {
        Self::validate_text(text, self.max_text_size)?;
        let id = self.repo.insert(text)?;
        trace!("Inserted note with ID: {id}");
        Ok(id)
    }

    /// Replace the text of a note. Returns the number of notes changed (0 or 1)
    ///
    /// # Errors
    ///
    /// Returns `NoteValidationError::TextTooLarge` over the size limit, or a backend error
    pub fn update_note(&self, id: i64, text: &str) -> Result<usize> {
        Self::validate_text(text, self.max_text_size)?;
        self.repo.update(id, text)
    }

    /// Delete note by ID. Returns the number of notes removed (0 or 1)
    ///
    /// # Errors
    ///
    /// Forwards backend errors
    pub fn delete_note(&self, id: i64) -> Result<usize> {
        self.repo.delete(id)
    }

    /// Total and created-today counts
    ///
    /// # Errors
    ///
    /// Forwards backend errors
    pub fn stats(&self) -> Result<(i64, i64)> {
        Ok((self.repo.count()?, self.repo.count_created_today()?))
    }

    // --- small helpers ---

    /// Validate note text. Empty text is allowed
    ///
    /// # Errors
    ///
    /// Returns `NoteValidationError::TextTooLarge` if `text` is longer than `max`
    pub fn validate_text(text: &str, max: Option<usize>) -> Result<()> {
        match max {
            Some(max) if text.len() > max => Err(NoteValidationError::TextTooLarge {
                max,
                got: text.len(),
            }
            .into()),
            _ => Ok(()),
        }
    }
}
