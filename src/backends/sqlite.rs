use super::{BackendError, Note, NoteBackend, NoteError, Result};
use log::{info, trace};
use rusqlite::{Connection, Error as SqliteError, ErrorCode, Row, params};
use std::cell::OnceCell;
use std::cmp::Ordering;

/// Schema version stored in `PRAGMA user_version`. Files at an older nonzero version are
/// wiped and reseeded.
pub const SCHEMA_VERSION: i64 = 1;

/// Notes written into a freshly created table
pub const SAMPLE_NOTES: [&str; 5] = [
    "Web view notes project",
    "Learning the bridge API",
    "SQLite database",
    "Interactive charts",
    "Export to PDF",
];

const SELECT_COLUMNS: &str = "SELECT id, text, date FROM data";

#[derive(Debug)]
pub struct SqliteBackend {
    path: String,
    connection: OnceCell<Connection>,
}

impl SqliteBackend {
    /// Creates a `SqliteBackend` for the database at `path` without touching the file.
    /// The connection is opened, and the schema created or upgraded, on first use.
    #[must_use]
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            connection: OnceCell::new(),
        }
    }

    /// Creates a `SqliteBackend` and opens the database right away, so startup fails fast
    /// on a bad path or an unsupported schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or migrated.
    pub fn open(path: &str) -> Result<Self> {
        let backend = Self::new(path);
        backend.connection()?;
        Ok(backend)
    }

    // Shared connection, opened once and reused for every later call
    fn connection(&self) -> Result<&Connection> {
        if let Some(connection) = self.connection.get() {
            return Ok(connection);
        }
        let connection = open_and_migrate(&self.path, SCHEMA_VERSION)?;
        Ok(self.connection.get_or_init(|| connection))
    }

    fn query_notes(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Note>> {
        let connection = self.connection()?;
        let mut stmt = connection.prepare(sql).map_err(map_sqlite_error)?;

        let notes_iter = stmt
            .query_map(params, note_from_row)
            .map_err(map_sqlite_error)?;

        notes_iter
            .collect::<std::result::Result<_, _>>()
            .map_err(map_sqlite_error)
    }

    fn query_count(&self, sql: &str) -> Result<i64> {
        self.connection()?
            .query_row(sql, [], |row| row.get(0))
            .map_err(map_sqlite_error)
    }
}

/// Opens the file and brings its schema to version `target`.
///
/// Version 0 means the file was never versioned: the table is created and seeded only if it
/// does not exist yet, so rows already in it are kept. Any other older version is dropped and
/// recreated, losing all notes. A newer version is refused. Each change runs in a single
/// transaction together with the version bump.
fn open_and_migrate(path: &str, target: i64) -> Result<Connection> {
    let mut connection =
        Connection::open(path).map_err(|source| BackendError::DatabaseOpenError {
            path: path.to_string(),
            source,
        })?;
    trace!("Opened database at '{path}'");

    let version: i64 = connection
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(map_sqlite_error)?;

    match version.cmp(&target) {
        Ordering::Equal => trace!("Schema at version {version}"),
        Ordering::Less => {
            let tx = connection.transaction().map_err(map_sqlite_error)?;
            if version == 0 && table_exists(&tx)? {
                info!("Adopting existing `data` table in '{path}' at schema version {target}");
            } else {
                if version == 0 {
                    info!("Creating `data` table in '{path}'");
                } else {
                    info!(
                        "Upgrading '{path}' from schema version {version} to {target}; existing notes are dropped"
                    );
                    tx.execute("DROP TABLE IF EXISTS data", [])
                        .map_err(map_sqlite_error)?;
                }
                create_schema(&tx)?;
            }
            tx.execute_batch(&format!("PRAGMA user_version = {target}"))
                .map_err(map_sqlite_error)?;
            tx.commit().map_err(map_sqlite_error)?;
        }
        Ordering::Greater => {
            return Err(BackendError::SchemaDowngrade {
                found: version,
                supported: target,
            }
            .into());
        }
    }

    Ok(connection)
}

fn table_exists(connection: &Connection) -> Result<bool> {
    connection
        .query_row(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'data')",
            [],
            |row| row.get(0),
        )
        .map_err(map_sqlite_error)
}

// Create the `data` table and fill it with the sample notes
fn create_schema(connection: &Connection) -> Result<()> {
    connection
        .execute(
            "
            CREATE TABLE data (
                id   INTEGER PRIMARY KEY AUTOINCREMENT,
                text TEXT NOT NULL,
                date TEXT NOT NULL
            )
            ",
            [],
        )
        .map_err(BackendError::TableCreationError)?;

    let mut stmt = connection
        .prepare("INSERT INTO data (text, date) VALUES (?1, datetime('now'))")
        .map_err(map_sqlite_error)?;
    for text in SAMPLE_NOTES {
        stmt.execute([text]).map_err(map_sqlite_error)?;
    }
    trace!("Seeded {} sample notes", SAMPLE_NOTES.len());
    Ok(())
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get(0)?,
        text: row.get(1)?,
        date: row.get(2)?,
    })
}

/// Maps a `rusqlite::Error` into a `NoteError`, wrapping known SQLite-specific codes into domain-specific variants.
///
/// # Errors
///
/// Always returns a `NoteError::Backend` variant. Specific known `SQLite` error codes
/// are converted to more descriptive errors; all others are wrapped in `BackendError::Other`.
fn map_sqlite_error(e: SqliteError) -> NoteError {
    match e {
        SqliteError::SqliteFailure(code, message) => match code.code {
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => {
                NoteError::Backend(BackendError::DatabaseBusy)
            }
            ErrorCode::PermissionDenied | ErrorCode::ReadOnly => {
                NoteError::Backend(BackendError::PermissionDenied)
            }
            ErrorCode::NotADatabase => NoteError::Backend(BackendError::NotADatabase),
            ErrorCode::SchemaChanged => NoteError::Backend(BackendError::SchemaChanged),
            ErrorCode::DiskFull => NoteError::Backend(BackendError::DiskFull),
            ErrorCode::DatabaseCorrupt | ErrorCode::SystemIoFailure => {
                NoteError::Backend(BackendError::DatabaseCorruptOrIo)
            }
            ErrorCode::ConstraintViolation => NoteError::Backend(
                BackendError::ConstraintViolation(message.unwrap_or_default()),
            ),
            _ => NoteError::Backend(BackendError::Other(anyhow::anyhow!(
                "SQLite error: {:?}",
                code
            ))),
        },
        other => NoteError::Backend(BackendError::Other(anyhow::Error::new(other))),
    }
}

impl NoteBackend for SqliteBackend {
    /// Inserts a note stamped with the store's current time.
    ///
    /// # Errors
    ///
    /// Returns mapped `SQLite` errors if the insert fails.
    fn insert(&self, text: &str) -> Result<i64> {
        let connection = self.connection()?;
        connection
            .execute(
                "INSERT INTO data (text, date) VALUES (?1, datetime('now'))",
                params![text],
            )
            .map_err(map_sqlite_error)?;
        Ok(connection.last_insert_rowid())
    }

    /// Replaces a note's text. `id` and `date` are left untouched.
    ///
    /// # Errors
    ///
    /// Returns mapped `SQLite` errors if the update fails.
    fn update(&self, id: i64, text: &str) -> Result<usize> {
        self.connection()?
            .execute(
                "UPDATE data SET text = ?1 WHERE id = ?2",
                params![text, id],
            )
            .map_err(map_sqlite_error)
    }

    /// Deletes a note by ID.
    ///
    /// # Errors
    ///
    /// Returns mapped `SQLite` errors if the delete fails.
    fn delete(&self, id: i64) -> Result<usize> {
        self.connection()?
            .execute("DELETE FROM data WHERE id = ?1", [id])
            .map_err(map_sqlite_error)
    }

    fn list_all(&self) -> Result<Vec<Note>> {
        self.query_notes(&format!("{SELECT_COLUMNS} ORDER BY id DESC"), [])
    }

    // `instr` keeps `%` and `_` in the query literal, unlike LIKE
    fn search(&self, substring: &str) -> Result<Vec<Note>> {
        self.query_notes(
            &format!("{SELECT_COLUMNS} WHERE ?1 = '' OR instr(text, ?1) > 0 ORDER BY id DESC"),
            [substring],
        )
    }

    fn count(&self) -> Result<i64> {
        self.query_count("SELECT COUNT(*) FROM data")
    }

    fn count_created_today(&self) -> Result<i64> {
        self.query_count("SELECT COUNT(*) FROM data WHERE date(date) = date('now')")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> SqliteBackend {
        SqliteBackend::new(":memory:")
    }

    fn texts(notes: &[Note]) -> Vec<&str> {
        notes.iter().map(|n| n.text.as_str()).collect()
    }

    #[test]
    fn fresh_database_is_seeded() {
        let db = backend();
        let notes = db.list_all().unwrap();
        assert_eq!(notes.len(), SAMPLE_NOTES.len());

        // Newest first, so the seed order comes back reversed
        let mut expected: Vec<&str> = SAMPLE_NOTES.to_vec();
        expected.reverse();
        assert_eq!(texts(&notes), expected);
        assert!(notes.iter().all(|n| !n.date.is_empty()));
    }

    #[test]
    fn insert_assigns_fresh_id_and_date() {
        let db = backend();
        let before: Vec<i64> = db.list_all().unwrap().iter().map(|n| n.id).collect();

        let id = db.insert("buy milk").unwrap();
        assert!(!before.contains(&id));

        let note = db.list_all().unwrap().into_iter().next().unwrap();
        assert_eq!(note.id, id);
        assert_eq!(note.text, "buy milk");
        // `YYYY-MM-DD HH:MM:SS`
        assert_eq!(note.date.len(), 19);
        assert_eq!(&note.date[4..5], "-");
        assert_eq!(&note.date[10..11], " ");
    }

    #[test]
    fn empty_text_is_accepted() {
        let db = backend();
        let id = db.insert("").unwrap();
        assert!(db.list_all().unwrap().iter().any(|n| n.id == id && n.text.is_empty()));
    }

    #[test]
    fn ids_are_never_reused_after_delete() {
        let db = backend();
        let a = db.insert("a").unwrap();
        let b = db.insert("b").unwrap();
        assert!(b > a);

        db.delete(b).unwrap();
        let c = db.insert("c").unwrap();
        assert!(c > b);
    }

    #[test]
    fn update_replaces_text_and_keeps_date() {
        let db = backend();
        let id = db.insert("draft").unwrap();
        let before = db.list_all().unwrap().into_iter().find(|n| n.id == id).unwrap();

        assert_eq!(db.update(id, "final").unwrap(), 1);

        let after = db.list_all().unwrap().into_iter().find(|n| n.id == id).unwrap();
        assert_eq!(after.text, "final");
        assert_eq!(after.date, before.date);
    }

    #[test]
    fn update_and_delete_of_missing_id_are_noops() {
        let db = backend();
        let before = db.list_all().unwrap();

        assert_eq!(db.update(9999, "ghost").unwrap(), 0);
        assert_eq!(db.delete(9999).unwrap(), 0);
        assert_eq!(db.list_all().unwrap(), before);
    }

    #[test]
    fn empty_search_matches_everything() {
        let db = backend();
        db.insert("extra").unwrap();
        assert_eq!(db.search("").unwrap(), db.list_all().unwrap());
    }

    #[test]
    fn search_is_literal_substring_match() {
        let db = backend();
        let hit = db.insert("buy milk").unwrap();
        db.insert("call mom").unwrap();
        let percent = db.insert("100% done").unwrap();

        let found: Vec<i64> = db.search("milk").unwrap().iter().map(|n| n.id).collect();
        assert_eq!(found, vec![hit]);

        let found: Vec<i64> = db.search("%").unwrap().iter().map(|n| n.id).collect();
        assert_eq!(found, vec![percent]);

        assert!(db.search("Milk").unwrap().is_empty());
        assert!(db.search("nothing like this").unwrap().is_empty());
    }

    #[test]
    fn count_matches_list_length() {
        let db = backend();
        db.insert("one").unwrap();
        db.insert("two").unwrap();
        let id = db.insert("three").unwrap();
        db.delete(id).unwrap();

        let count = db.count().unwrap();
        assert_eq!(usize::try_from(count).unwrap(), db.list_all().unwrap().len());
    }

    #[test]
    fn notes_inserted_now_count_as_today() {
        let db = backend();
        db.insert("today").unwrap();
        assert_eq!(db.count_created_today().unwrap(), db.count().unwrap());

        db.connection()
            .unwrap()
            .execute(
                "INSERT INTO data (text, date) VALUES ('old', '2001-01-01 10:00:00')",
                [],
            )
            .unwrap();
        assert_eq!(db.count_created_today().unwrap(), db.count().unwrap() - 1);
    }

    #[test]
    fn scenario_insert_delete_search() {
        let db = backend();
        let n = db.insert("buy milk").unwrap();
        let m = db.insert("call mom").unwrap();
        assert_eq!(m, n + 1);

        let notes = db.list_all().unwrap();
        assert_eq!(texts(&notes[..2]), vec!["call mom", "buy milk"]);

        db.delete(n).unwrap();
        let notes = db.list_all().unwrap();
        assert_eq!(notes[0].text, "call mom");
        assert!(notes.iter().all(|note| note.id != n));
        assert!(db.search("milk").unwrap().is_empty());
    }

    #[test]
    fn version_bump_drops_and_reseeds() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("app.db").to_string_lossy().into_owned();
        {
            let connection = open_and_migrate(&path, SCHEMA_VERSION).unwrap();
            connection
                .execute(
                    "INSERT INTO data (text, date) VALUES ('old note', datetime('now'))",
                    [],
                )
                .unwrap();
        }

        let connection = open_and_migrate(&path, SCHEMA_VERSION + 1).unwrap();
        let version: i64 = connection
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION + 1);

        let texts: Vec<String> = connection
            .prepare("SELECT text FROM data ORDER BY id")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        assert_eq!(texts, SAMPLE_NOTES.to_vec());
    }

    #[test]
    fn sqlite_codes_map_to_named_errors() {
        let busy = SqliteError::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        assert!(matches!(
            map_sqlite_error(busy),
            NoteError::Backend(BackendError::DatabaseBusy)
        ));

        let full = SqliteError::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_FULL),
            None,
        );
        assert!(matches!(
            map_sqlite_error(full),
            NoteError::Backend(BackendError::DiskFull)
        ));
    }
}
