// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use lazytime_app::{
    ListEntry, Note, NoteDraft, NoteId, NoteRef, NoteStore, Section, StoreError, StoreResult,
};
use log::{debug, error, info};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, ffi, params};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "lazytime";
pub const DB_FILE_NAME: &str = "lists.db";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[("notes", &["id", "title", "body", "section"])];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RequiredIndex {
    name: &'static str,
    create_sql: &'static str,
}

const REQUIRED_INDEXES: &[RequiredIndex] = &[RequiredIndex {
    name: "idx_notes_section",
    create_sql: "CREATE INDEX IF NOT EXISTS idx_notes_section ON notes (section);",
}];

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        info!(
            "event=store_open module=db status=ok path={}",
            path.display()
        );
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    /// Creates the schema on an empty database, or checks an existing one.
    pub fn bootstrap(&self) -> Result<()> {
        let fresh = !has_user_tables(&self.conn)?;
        if fresh {
            self.conn
                .execute_batch(include_str!("sql/schema.sql"))
                .context("create schema")?;
        } else {
            validate_schema(&self.conn)?;
        }

        ensure_required_indexes(&self.conn)?;
        info!("event=store_bootstrap module=db status=ok fresh={fresh}");
        Ok(())
    }

    pub fn list_notes(&self, section: Section) -> Result<Vec<Note>> {
        let mut stmt = self
            .conn
            .prepare(
                "
                SELECT id, title, body, section
                FROM notes
                WHERE section = ?
                ORDER BY id ASC
                ",
            )
            .context("prepare notes query")?;
        let rows = stmt
            .query_map(params![section.as_str()], note_from_row)
            .with_context(|| format!("query notes for section {}", section.as_str()))?;

        let mut notes = Vec::new();
        for row in rows {
            let (note, raw_section) = row.context("decode note row")?;
            notes.push(Note {
                section: parse_section(&raw_section)?,
                ..note
            });
        }
        Ok(notes)
    }

    pub fn get_note(&self, note_id: NoteId) -> Result<Option<Note>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, title, body, section FROM notes WHERE id = ?",
                params![note_id.get()],
                note_from_row,
            )
            .optional()
            .with_context(|| format!("load note {note_id}"))?;

        match row {
            Some((note, raw_section)) => Ok(Some(Note {
                section: parse_section(&raw_section)?,
                ..note
            })),
            None => Ok(None),
        }
    }

    pub fn count_notes(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))
            .context("count notes")
    }

    pub fn create_note(&self, draft: &NoteDraft) -> StoreResult<NoteId> {
        self.conn
            .execute(
                "INSERT INTO notes (title, body, section) VALUES (?, ?, ?)",
                params![draft.title, draft.body, draft.section.as_str()],
            )
            .map_err(|error| write_error(error, &draft.title))?;

        Ok(NoteId::new(self.conn.last_insert_rowid()))
    }

    pub fn update_note(&self, note_id: NoteId, draft: &NoteDraft) -> StoreResult<()> {
        let rows_affected = self
            .conn
            .execute(
                "
                UPDATE notes
                SET title = ?, body = ?, section = ?
                WHERE id = ?
                ",
                params![
                    draft.title,
                    draft.body,
                    draft.section.as_str(),
                    note_id.get()
                ],
            )
            .map_err(|error| write_error(error, &draft.title))?;
        if rows_affected == 0 {
            return Err(StoreError::NotFound(NoteRef::Id(note_id)));
        }
        Ok(())
    }

    /// Title-keyed update. Matches on `old_title` alone, so the note may change section.
    pub fn update_note_by_title(&self, old_title: &str, draft: &NoteDraft) -> StoreResult<()> {
        let rows_affected = self
            .conn
            .execute(
                "
                UPDATE notes
                SET title = ?, body = ?, section = ?
                WHERE title = ?
                ",
                params![draft.title, draft.body, draft.section.as_str(), old_title],
            )
            .map_err(|error| write_error(error, &draft.title))?;
        if rows_affected == 0 {
            return Err(StoreError::NotFound(NoteRef::Title(old_title.to_owned())));
        }
        Ok(())
    }

    pub fn delete_note(&self, note_id: NoteId) -> StoreResult<()> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?", params![note_id.get()])
            .map_err(storage_error)?;
        debug!("event=note_delete module=db status=ok id={note_id} rows={rows_affected}");
        Ok(())
    }

    pub fn delete_note_by_title(&self, title: &str, section: Section) -> StoreResult<()> {
        let rows_affected = self
            .conn
            .execute(
                "DELETE FROM notes WHERE title = ? AND section = ?",
                params![title, section.as_str()],
            )
            .map_err(storage_error)?;
        debug!(
            "event=note_delete module=db status=ok title={title:?} section={} rows={rows_affected}",
            section.as_str()
        );
        Ok(())
    }
}

impl NoteStore for Store {
    fn fetch_by_section(&mut self, section: Section) -> Vec<ListEntry> {
        match self.list_notes(section) {
            Ok(notes) => notes.iter().map(Note::to_entry).collect(),
            Err(err) => {
                error!(
                    "event=notes_fetch module=db status=failed section={} error={err:#}",
                    section.as_str()
                );
                Vec::new()
            }
        }
    }

    fn create(&mut self, draft: &NoteDraft) -> StoreResult<NoteId> {
        self.create_note(draft)
    }

    fn update(&mut self, id: NoteId, draft: &NoteDraft) -> StoreResult<()> {
        self.update_note(id, draft)
    }

    fn delete(&mut self, id: NoteId) -> StoreResult<()> {
        self.delete_note(id)
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("LAZYTIME_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set LAZYTIME_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join(DB_FILE_NAME))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<(Note, String)> {
    let note = Note {
        id: NoteId::new(row.get(0)?),
        title: row.get(1)?,
        body: row.get(2)?,
        section: Section::DoNow,
    };
    Ok((note, row.get(3)?))
}

fn parse_section(raw: &str) -> Result<Section> {
    Section::parse(raw).ok_or_else(|| {
        anyhow!("note has unknown section {raw:?}; expected A, B, or C in the section column")
    })
}

fn write_error(error: rusqlite::Error, title: &str) -> StoreError {
    match &error {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                || (failure.code == ErrorCode::ConstraintViolation
                    && message.as_deref().is_some_and(|text| text.contains("UNIQUE"))) =>
        {
            StoreError::DuplicateTitle(title.to_owned())
        }
        _ => storage_error(error),
    }
}

fn storage_error(error: rusqlite::Error) -> StoreError {
    StoreError::Storage(error.to_string())
}

fn has_user_tables(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "
            SELECT COUNT(*)
            FROM sqlite_master
            WHERE type = 'table'
              AND name NOT LIKE 'sqlite_%'
            ",
            [],
            |row| row.get(0),
        )
        .context("count user tables")?;
    Ok(count > 0)
}

fn validate_schema(conn: &Connection) -> Result<()> {
    for (table, required_columns) in REQUIRED_SCHEMA {
        if !table_exists(conn, table)? {
            bail!(
                "database is missing required table `{table}`; point [storage].db_path at a lazytime database"
            );
        }

        let columns = table_columns(conn, table)?;
        let missing: Vec<&str> = required_columns
            .iter()
            .copied()
            .filter(|column| !columns.contains(*column))
            .collect();

        if !missing.is_empty() {
            bail!(
                "table `{table}` is missing required columns: {}; move the file aside to start fresh",
                missing.join(", ")
            );
        }
    }

    Ok(())
}

fn ensure_required_indexes(conn: &Connection) -> Result<()> {
    for index in REQUIRED_INDEXES {
        conn.execute_batch(index.create_sql)
            .with_context(|| format!("ensure required index `{}`", index.name))?;
    }

    let existing_indexes = index_names(conn)?;
    let missing = REQUIRED_INDEXES
        .iter()
        .filter(|index| !existing_indexes.contains(index.name))
        .map(|index| index.name)
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        bail!(
            "database is missing required indexes: {}",
            missing.join(", ")
        );
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let exists = conn
        .query_row(
            "
            SELECT EXISTS(
              SELECT 1
              FROM sqlite_master
              WHERE type = 'table' AND name = ?
            )
            ",
            params![table],
            |row| row.get::<_, i64>(0),
        )
        .with_context(|| format!("check table existence for {table}"))?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("inspect columns for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("query column info for {table}"))?;

    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for {table}"))
}

fn index_names(conn: &Connection) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(
            "
            SELECT name
            FROM sqlite_master
            WHERE type = 'index'
              AND name NOT LIKE 'sqlite_%'
            ORDER BY name ASC
            ",
        )
        .context("prepare index names query")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("query index names")?;
    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .context("collect index names")
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}
