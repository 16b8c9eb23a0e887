use super::Note;

use crate::bridge::{DisplayLayer, Theme};
use colored::Colorize;
use log::{error, trace};
use std::cell::Cell;
use tabled::{Table, settings::Style};

/// Terminal display layer. Draws every pushed note list as a table on stderr,
/// leaving stdout to the bridge replies.
#[derive(Debug, Default)]
pub struct Cli {
    theme: Cell<Theme>,
}

impl Cli {
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme.get()
    }

    /// Builds the table for a serialized note list, styled for the current theme.
    ///
    /// # Errors
    ///
    /// Returns an error if `payload` is not a JSON list of notes.
    pub fn render_table(&self, payload: &str) -> serde_json::Result<String> {
        let notes: Vec<Note> = serde_json::from_str(payload)?;
        let count = notes.len();
        let mut table = Table::new(notes);
        match self.theme() {
            Theme::Light => table.with(Style::psql()),
            Theme::Dark => table.with(Style::modern()),
        };
        Ok(format!("{}\n{table}", self.title(&format!("Notes ({count})"))))
    }

    fn title(&self, title: &str) -> String {
        match self.theme() {
            Theme::Light => title.bold().to_string(),
            Theme::Dark => title.bold().bright_white().on_black().to_string(),
        }
    }
}

impl DisplayLayer for Cli {
    /// Replaces the shown list by printing the whole table again.
    fn render_notes(&self, payload: &str) {
        match self.render_table(payload) {
            Ok(table) => eprintln!("\n{table}\n"),
            Err(e) => error!("Couldn't render note list: {e}"),
        }
    }

    fn apply_theme(&self, theme: Theme) {
        trace!("Switching display to {theme} theme");
        self.theme.set(theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"[{"id":2,"text":"call mom","date":"2024-05-01 10:00:00"},{"id":1,"text":"buy milk","date":"2024-05-01 09:00:00"}]"#;

    #[test]
    fn table_lists_every_note() {
        let cli = Cli::default();
        let table = cli.render_table(PAYLOAD).unwrap();
        assert!(table.contains("Notes (2)"));
        assert!(table.contains("call mom"));
        assert!(table.contains("buy milk"));
        assert!(table.find("call mom") < table.find("buy milk"));
    }

    #[test]
    fn theme_is_tracked() {
        let cli = Cli::default();
        assert_eq!(cli.theme(), Theme::Light);
        cli.apply_theme(Theme::Dark);
        assert_eq!(cli.theme(), Theme::Dark);
        assert!(cli.render_table("[]").unwrap().contains("Notes (0)"));
    }

    #[test]
    fn bad_payload_is_an_error() {
        assert!(Cli::default().render_table("{not json").is_err());
    }
}
