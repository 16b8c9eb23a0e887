//! String-in/string-out adapter between the display layer and the note store.
//!
//! Every call converts storage failures into a plain result value (`false`, `[]` or zeroed
//! stats) and logs the detail. Successful mutations push the whole note list back to the
//! display layer, which replaces whatever it was showing.

use crate::app::NoteService;
use crate::{Note, Result};
use log::{debug, error, info, warn};
use serde::Deserialize;
use std::fmt;

/// Payload returned by list queries that failed
pub const EMPTY_LIST: &str = "[]";

/// Light or dark display mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub const fn from_dark(is_dark: bool) -> Self {
        if is_dark { Self::Dark } else { Self::Light }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

/// Display settings handed to the bridge at startup. Lives only as long as the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayConfig {
    pub theme: Theme,
}

/// The display layer the bridge talks back to
pub trait DisplayLayer {
    /// Replace the shown list with the serialized notes in `payload`
    fn render_notes(&self, payload: &str);
    /// Switch the display to `theme`
    fn apply_theme(&self, theme: Theme);
}

/// A decoded bridge call, one per line on the wire, e.g. `{"call":"deleteData","id":3}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "call", rename_all = "camelCase")]
pub enum BridgeCall {
    AddData {
        text: String,
    },
    UpdateData {
        id: i64,
        text: String,
    },
    DeleteData {
        id: i64,
    },
    GetAllData,
    SearchData {
        query: String,
    },
    GetStats,
    ToggleTheme {
        #[serde(rename = "isDark")]
        is_dark: bool,
    },
}

/// What a bridge call hands back to the display layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Flag(bool),
    Payload(String),
    Unit,
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(ok) => write!(f, "{ok}"),
            Self::Payload(payload) => write!(f, "{payload}"),
            Self::Unit => write!(f, "null"),
        }
    }
}

pub struct Bridge<D: DisplayLayer> {
    service: NoteService,
    display: D,
    config: DisplayConfig,
}

impl<D: DisplayLayer> Bridge<D> {
    #[must_use]
    pub fn new(service: NoteService, display: D, config: DisplayConfig) -> Self {
        Self {
            service,
            display,
            config,
        }
    }

    #[must_use]
    pub const fn display(&self) -> &D {
        &self.display
    }

    #[must_use]
    pub const fn config(&self) -> DisplayConfig {
        self.config
    }

    /// Apply the startup theme and push the initial note list
    pub fn load(&self) {
        self.display.apply_theme(self.config.theme);
        self.render();
    }

    /// Route a decoded call to its handler
    pub fn dispatch(&mut self, call: BridgeCall) -> Reply {
        match call {
            BridgeCall::AddData { text } => Reply::Flag(self.add_data(&text)),
            BridgeCall::UpdateData { id, text } => Reply::Flag(self.update_data(id, &text)),
            BridgeCall::DeleteData { id } => Reply::Flag(self.delete_data(id)),
            BridgeCall::GetAllData => Reply::Payload(self.get_all_data()),
            BridgeCall::SearchData { query } => Reply::Payload(self.search_data(&query)),
            BridgeCall::GetStats => Reply::Payload(self.get_stats()),
            BridgeCall::ToggleTheme { is_dark } => {
                self.toggle_theme(is_dark);
                Reply::Unit
            }
        }
    }

    #[must_use]
    pub fn add_data(&self, text: &str) -> bool {
        debug!("addData: {} bytes", text.len());
        match self.service.create_note(text) {
            Ok(id) => {
                info!("Note saved with ID: {id}");
                self.render();
                true
            }
            Err(e) => {
                error!("Failed adding note: {e}");
                false
            }
        }
    }

    #[must_use]
    pub fn update_data(&self, id: i64, text: &str) -> bool {
        debug!("updateData: ID {id}, {} bytes", text.len());
        match self.service.update_note(id, text) {
            Ok(changed) => {
                if changed == 0 {
                    warn!("No note with ID: {id}. Nothing updated");
                } else {
                    info!("Successfully updated note with ID: {id}");
                }
                self.render();
                true
            }
            Err(e) => {
                error!("Failed updating note with ID {id}: {e}");
                false
            }
        }
    }

    #[must_use]
    pub fn delete_data(&self, id: i64) -> bool {
        debug!("deleteData: ID {id}");
        match self.service.delete_note(id) {
            Ok(removed) => {
                if removed == 0 {
                    warn!("No note with ID: {id}. Nothing deleted");
                } else {
                    info!("Successfully deleted note with ID: {id}");
                }
                self.render();
                true
            }
            Err(e) => {
                error!("Failed deleting note with ID {id}: {e}");
                false
            }
        }
    }

    #[must_use]
    pub fn get_all_data(&self) -> String {
        debug!("getAllData");
        notes_payload(self.service.list_notes()).unwrap_or_else(|e| {
            error!("Failed listing notes: {e}");
            EMPTY_LIST.to_string()
        })
    }

    #[must_use]
    pub fn search_data(&self, query: &str) -> String {
        debug!("searchData: {query:?}");
        notes_payload(self.service.search_notes(query)).unwrap_or_else(|e| {
            error!("Failed searching notes for {query:?}: {e}");
            EMPTY_LIST.to_string()
        })
    }

    #[must_use]
    pub fn get_stats(&self) -> String {
        debug!("getStats");
        let (total, today) = self.service.stats().unwrap_or_else(|e| {
            error!("Failed counting notes: {e}");
            (0, 0)
        });
        serde_json::json!({ "total": total, "today": today }).to_string()
    }

    pub fn toggle_theme(&mut self, is_dark: bool) {
        let theme = Theme::from_dark(is_dark);
        debug!("toggleTheme: {theme}");
        self.config.theme = theme;
        self.display.apply_theme(theme);
    }

    // Push the full list to the display layer
    fn render(&self) {
        match notes_payload(self.service.list_notes()) {
            Ok(payload) => self.display.render_notes(&payload),
            Err(e) => error!("Failed refreshing note list: {e}"),
        }
    }
}

fn notes_payload(notes: Result<Vec<Note>>) -> Result<String> {
    Ok(serde_json::to_string(&notes?)?)
}
