//! Embedded file-backed store. Array-valued fields are stored as JSON
//! text columns and rehydrated on read; the UNIQUE constraint on the
//! lowercased text column backstops the check-then-insert race.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use echolingo_types::{
    IdiomLookup, ImportReport, LexMode, PosEntry, SaveOutcome, SavedIdiom, SavedWord, WordLookup,
};
use rusqlite::{Connection, Row, params};

use crate::{LexiconStore, StorageError, new_id, normalize_key};

const WORD_COLUMNS: &str =
    "id, word_display, pronunciation, entries, definitions, examples, translations, pos, created_at";
const IDIOM_COLUMNS: &str = "id, idiom_display, meaning, examples, translations, created_at";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Lock)
    }
}

#[async_trait]
impl LexiconStore for SqliteStore {
    async fn migrate(&self) -> Result<(), StorageError> {
        let conn = self.conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS words (
                id TEXT PRIMARY KEY,
                word TEXT NOT NULL UNIQUE,
                word_display TEXT NOT NULL,
                pronunciation TEXT NOT NULL,
                entries TEXT NOT NULL,
                definitions TEXT NOT NULL,
                examples TEXT NOT NULL,
                translations TEXT NOT NULL,
                mode TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS idioms (
                id TEXT PRIMARY KEY,
                idiom TEXT NOT NULL UNIQUE,
                idiom_display TEXT NOT NULL,
                meaning TEXT NOT NULL,
                examples TEXT NOT NULL,
                translations TEXT NOT NULL,
                mode TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        // Schema evolution: older databases predate the pos column.
        if let Err(err) = conn.execute("ALTER TABLE words ADD COLUMN pos TEXT", []) {
            if !err.to_string().contains("duplicate column") {
                return Err(err.into());
            }
        }

        Ok(())
    }

    async fn save_word(
        &self,
        lookup: WordLookup,
    ) -> Result<SaveOutcome<SavedWord>, StorageError> {
        let key = normalize_key(&lookup.word);
        let conn = self.conn()?;

        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM words WHERE word = ?1)",
            params![key],
            |row| row.get(0),
        )?;
        if exists {
            return Ok(SaveOutcome::AlreadySaved);
        }

        let saved = SavedWord::from_lookup(lookup, new_id(), Utc::now());
        conn.execute(
            "INSERT INTO words (id, word, word_display, pronunciation, entries,
                definitions, examples, translations, pos, mode, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                saved.id,
                key,
                saved.word,
                saved.pronunciation,
                serde_json::to_string(&saved.entries)?,
                serde_json::to_string(&saved.definitions)?,
                serde_json::to_string(&saved.examples)?,
                serde_json::to_string(&saved.translations)?,
                saved.part_of_speech,
                saved.mode.as_str(),
                format_ts(saved.created_at),
            ],
        )?;

        Ok(SaveOutcome::Created(saved))
    }

    async fn save_idiom(
        &self,
        lookup: IdiomLookup,
    ) -> Result<SaveOutcome<SavedIdiom>, StorageError> {
        let key = normalize_key(&lookup.idiom);
        let conn = self.conn()?;

        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM idioms WHERE idiom = ?1)",
            params![key],
            |row| row.get(0),
        )?;
        if exists {
            return Ok(SaveOutcome::AlreadySaved);
        }

        let saved = SavedIdiom::from_lookup(lookup, new_id(), Utc::now());
        conn.execute(
            "INSERT INTO idioms (id, idiom, idiom_display, meaning, examples,
                translations, mode, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                saved.id,
                key,
                saved.idiom,
                serde_json::to_string(&saved.meaning)?,
                serde_json::to_string(&saved.examples)?,
                serde_json::to_string(&saved.translations)?,
                saved.mode.as_str(),
                format_ts(saved.created_at),
            ],
        )?;

        Ok(SaveOutcome::Created(saved))
    }

    async fn word_exists(&self, text: &str) -> Result<bool, StorageError> {
        let exists: bool = self.conn()?.query_row(
            "SELECT EXISTS(SELECT 1 FROM words WHERE word = ?1)",
            params![normalize_key(text)],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    async fn idiom_exists(&self, text: &str) -> Result<bool, StorageError> {
        let exists: bool = self.conn()?.query_row(
            "SELECT EXISTS(SELECT 1 FROM idioms WHERE idiom = ?1)",
            params![normalize_key(text)],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    async fn list_words(&self) -> Result<Vec<SavedWord>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {WORD_COLUMNS} FROM words ORDER BY created_at DESC, rowid DESC"
        ))?;

        let rows = stmt.query_map([], word_from_row)?;
        let mut words = Vec::new();
        for row in rows {
            words.push(decode_word(row?)?);
        }
        Ok(words)
    }

    async fn list_idioms(&self) -> Result<Vec<SavedIdiom>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {IDIOM_COLUMNS} FROM idioms ORDER BY created_at DESC, rowid DESC"
        ))?;

        let rows = stmt.query_map([], idiom_from_row)?;
        let mut idioms = Vec::new();
        for row in rows {
            idioms.push(decode_idiom(row?)?);
        }
        Ok(idioms)
    }

    async fn delete_word(&self, text: &str) -> Result<bool, StorageError> {
        let removed = self.conn()?.execute(
            "DELETE FROM words WHERE word = ?1",
            params![normalize_key(text)],
        )?;
        Ok(removed > 0)
    }

    async fn delete_idiom(&self, text: &str) -> Result<bool, StorageError> {
        let removed = self.conn()?.execute(
            "DELETE FROM idioms WHERE idiom = ?1",
            params![normalize_key(text)],
        )?;
        Ok(removed > 0)
    }

    async fn import_words(
        &self,
        lookups: Vec<WordLookup>,
    ) -> Result<ImportReport, StorageError> {
        let conn = self.conn()?;
        let mut report = ImportReport::default();

        for lookup in lookups {
            let key = normalize_key(&lookup.word);

            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM words WHERE word = ?1)",
                params![key],
                |row| row.get(0),
            )?;

            let saved = SavedWord::from_lookup(lookup, new_id(), Utc::now());
            conn.execute(
                "INSERT INTO words (id, word, word_display, pronunciation, entries,
                    definitions, examples, translations, pos, mode, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                 ON CONFLICT(word) DO UPDATE SET
                    word_display = excluded.word_display,
                    pronunciation = excluded.pronunciation,
                    entries = excluded.entries,
                    definitions = excluded.definitions,
                    examples = excluded.examples,
                    translations = excluded.translations,
                    pos = excluded.pos",
                params![
                    saved.id,
                    key,
                    saved.word,
                    saved.pronunciation,
                    serde_json::to_string(&saved.entries)?,
                    serde_json::to_string(&saved.definitions)?,
                    serde_json::to_string(&saved.examples)?,
                    serde_json::to_string(&saved.translations)?,
                    saved.part_of_speech,
                    saved.mode.as_str(),
                    format_ts(saved.created_at),
                ],
            )?;

            if exists {
                report.updated += 1;
            } else {
                report.imported += 1;
            }
        }

        Ok(report)
    }
}

// Fixed-width nanoseconds: lexicographic order on the column matches
// chronological order, and the stamp round-trips without truncation.
fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_ts(raw: &str) -> Result<DateTime<Utc>, StorageError> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

/// Raw row before JSON rehydration
struct WordRow {
    id: String,
    word: String,
    pronunciation: String,
    entries: String,
    definitions: String,
    examples: String,
    translations: String,
    pos: Option<String>,
    created_at: String,
}

fn word_from_row(row: &Row) -> rusqlite::Result<WordRow> {
    Ok(WordRow {
        id: row.get(0)?,
        word: row.get(1)?,
        pronunciation: row.get(2)?,
        entries: row.get(3)?,
        definitions: row.get(4)?,
        examples: row.get(5)?,
        translations: row.get(6)?,
        pos: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn decode_word(row: WordRow) -> Result<SavedWord, StorageError> {
    let entries: Vec<PosEntry> = serde_json::from_str(&row.entries)?;
    Ok(SavedWord {
        id: row.id,
        word: row.word,
        pronunciation: row.pronunciation,
        entries,
        definitions: serde_json::from_str(&row.definitions)?,
        examples: serde_json::from_str(&row.examples)?,
        translations: serde_json::from_str(&row.translations)?,
        part_of_speech: row.pos,
        mode: LexMode::Vocabulary,
        created_at: parse_ts(&row.created_at)?,
    })
}

struct IdiomRow {
    id: String,
    idiom: String,
    meaning: String,
    examples: String,
    translations: String,
    created_at: String,
}

fn idiom_from_row(row: &Row) -> rusqlite::Result<IdiomRow> {
    Ok(IdiomRow {
        id: row.get(0)?,
        idiom: row.get(1)?,
        meaning: row.get(2)?,
        examples: row.get(3)?,
        translations: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn decode_idiom(row: IdiomRow) -> Result<SavedIdiom, StorageError> {
    Ok(SavedIdiom {
        id: row.id,
        idiom: row.idiom,
        meaning: serde_json::from_str(&row.meaning)?,
        examples: serde_json::from_str(&row.examples)?,
        translations: serde_json::from_str(&row.translations)?,
        mode: LexMode::Idiom,
        created_at: parse_ts(&row.created_at)?,
    })
}
