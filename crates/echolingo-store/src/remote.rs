//! Remote SQL-over-HTTP backend. One endpoint accepts a statement plus
//! positional arguments and answers with a rows/error envelope; the
//! same schema and statements as the embedded backend apply.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use echolingo_types::{
    IdiomLookup, ImportReport, LexMode, PosEntry, SaveOutcome, SavedIdiom, SavedWord, WordLookup,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{LexiconStore, StorageError, new_id, normalize_key};

#[derive(Clone)]
pub struct RemoteStore {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl RemoteStore {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            base_url,
            token,
            client: reqwest::Client::new(),
        }
    }

    async fn invoke(&self, stmt: &str, args: Vec<Value>) -> Result<SqlResponse, StorageError> {
        let request = SqlRequest { stmt, args };

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StorageError::Remote(format!(
                "HTTP {}",
                response.status()
            )));
        }

        Ok(response.json::<SqlResponse>().await?)
    }

    async fn execute(&self, stmt: &str, args: Vec<Value>) -> Result<u64, StorageError> {
        let response = self.invoke(stmt, args).await?;
        let (_, affected) = response.into_result()?;
        Ok(affected)
    }

    async fn query(&self, stmt: &str, args: Vec<Value>) -> Result<Vec<Vec<Value>>, StorageError> {
        let response = self.invoke(stmt, args).await?;
        let (rows, _) = response.into_result()?;
        Ok(rows)
    }

    async fn exists(&self, stmt: &str, key: String) -> Result<bool, StorageError> {
        let rows = self.query(stmt, vec![json!(key)]).await?;
        Ok(!rows.is_empty())
    }
}

#[derive(Serialize)]
struct SqlRequest<'a> {
    stmt: &'a str,
    args: Vec<Value>,
}

#[derive(Deserialize)]
struct SqlResponse {
    #[serde(default)]
    rows: Vec<Vec<Value>>,
    #[serde(default)]
    rows_affected: u64,
    error: Option<String>,
}

impl SqlResponse {
    fn into_result(self) -> Result<(Vec<Vec<Value>>, u64), StorageError> {
        if let Some(error) = self.error {
            return Err(StorageError::Remote(error));
        }
        Ok((self.rows, self.rows_affected))
    }
}

#[async_trait]
impl LexiconStore for RemoteStore {
    async fn migrate(&self) -> Result<(), StorageError> {
        self.execute(
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
            vec![],
        )
        .await?;

        self.execute(
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
            vec![],
        )
        .await?;

        // The pos column arrived after the first deployments; re-adding
        // it on an up-to-date schema is reported and ignored.
        if let Err(err) = self
            .execute("ALTER TABLE words ADD COLUMN pos TEXT", vec![])
            .await
        {
            match err {
                StorageError::Remote(msg) if msg.contains("duplicate column") => {
                    tracing::debug!("pos column already present");
                }
                other => return Err(other),
            }
        }

        Ok(())
    }

    async fn save_word(
        &self,
        lookup: WordLookup,
    ) -> Result<SaveOutcome<SavedWord>, StorageError> {
        let key = normalize_key(&lookup.word);

        if self
            .exists("SELECT 1 FROM words WHERE word = ?1 LIMIT 1", key.clone())
            .await?
        {
            return Ok(SaveOutcome::AlreadySaved);
        }

        let saved = SavedWord::from_lookup(lookup, new_id(), Utc::now());
        self.execute(
            "INSERT INTO words (id, word, word_display, pronunciation, entries,
                definitions, examples, translations, pos, mode, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            word_args(&saved, &key)?,
        )
        .await?;

        Ok(SaveOutcome::Created(saved))
    }

    async fn save_idiom(
        &self,
        lookup: IdiomLookup,
    ) -> Result<SaveOutcome<SavedIdiom>, StorageError> {
        let key = normalize_key(&lookup.idiom);

        if self
            .exists("SELECT 1 FROM idioms WHERE idiom = ?1 LIMIT 1", key.clone())
            .await?
        {
            return Ok(SaveOutcome::AlreadySaved);
        }

        let saved = SavedIdiom::from_lookup(lookup, new_id(), Utc::now());
        self.execute(
            "INSERT INTO idioms (id, idiom, idiom_display, meaning, examples,
                translations, mode, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            vec![
                json!(saved.id),
                json!(key),
                json!(saved.idiom),
                json!(serde_json::to_string(&saved.meaning)?),
                json!(serde_json::to_string(&saved.examples)?),
                json!(serde_json::to_string(&saved.translations)?),
                json!(saved.mode.as_str()),
                json!(format_ts(saved.created_at)),
            ],
        )
        .await?;

        Ok(SaveOutcome::Created(saved))
    }

    async fn word_exists(&self, text: &str) -> Result<bool, StorageError> {
        self.exists(
            "SELECT 1 FROM words WHERE word = ?1 LIMIT 1",
            normalize_key(text),
        )
        .await
    }

    async fn idiom_exists(&self, text: &str) -> Result<bool, StorageError> {
        self.exists(
            "SELECT 1 FROM idioms WHERE idiom = ?1 LIMIT 1",
            normalize_key(text),
        )
        .await
    }

    async fn list_words(&self) -> Result<Vec<SavedWord>, StorageError> {
        let rows = self
            .query(
                "SELECT id, word_display, pronunciation, entries, definitions,
                    examples, translations, pos, created_at
                 FROM words ORDER BY created_at DESC",
                vec![],
            )
            .await?;

        rows.iter().map(|row| decode_word(row)).collect()
    }

    async fn list_idioms(&self) -> Result<Vec<SavedIdiom>, StorageError> {
        let rows = self
            .query(
                "SELECT id, idiom_display, meaning, examples, translations, created_at
                 FROM idioms ORDER BY created_at DESC",
                vec![],
            )
            .await?;

        rows.iter().map(|row| decode_idiom(row)).collect()
    }

    async fn delete_word(&self, text: &str) -> Result<bool, StorageError> {
        let affected = self
            .execute(
                "DELETE FROM words WHERE word = ?1",
                vec![json!(normalize_key(text))],
            )
            .await?;
        Ok(affected > 0)
    }

    async fn delete_idiom(&self, text: &str) -> Result<bool, StorageError> {
        let affected = self
            .execute(
                "DELETE FROM idioms WHERE idiom = ?1",
                vec![json!(normalize_key(text))],
            )
            .await?;
        Ok(affected > 0)
    }

    async fn import_words(
        &self,
        lookups: Vec<WordLookup>,
    ) -> Result<ImportReport, StorageError> {
        let mut report = ImportReport::default();

        for lookup in lookups {
            let key = normalize_key(&lookup.word);
            let existed = self
                .exists("SELECT 1 FROM words WHERE word = ?1 LIMIT 1", key.clone())
                .await?;

            let saved = SavedWord::from_lookup(lookup, new_id(), Utc::now());
            self.execute(
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
                word_args(&saved, &key)?,
            )
            .await?;

            if existed {
                report.updated += 1;
            } else {
                report.imported += 1;
            }
        }

        Ok(report)
    }
}

fn word_args(saved: &SavedWord, key: &str) -> Result<Vec<Value>, StorageError> {
    Ok(vec![
        json!(saved.id),
        json!(key),
        json!(saved.word),
        json!(saved.pronunciation),
        json!(serde_json::to_string(&saved.entries)?),
        json!(serde_json::to_string(&saved.definitions)?),
        json!(serde_json::to_string(&saved.examples)?),
        json!(serde_json::to_string(&saved.translations)?),
        json!(saved.part_of_speech),
        json!(saved.mode.as_str()),
        json!(format_ts(saved.created_at)),
    ])
}

// Fixed-width nanoseconds, identical to the embedded backend: sortable
// as text and lossless on the way back out.
fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn col_str(row: &[Value], index: usize) -> Result<String, StorageError> {
    row.get(index)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| StorageError::Remote(format!("missing column {index}")))
}

fn col_opt_str(row: &[Value], index: usize) -> Option<String> {
    row.get(index).and_then(Value::as_str).map(str::to_string)
}

fn decode_word(row: &[Value]) -> Result<SavedWord, StorageError> {
    let entries: Vec<PosEntry> = serde_json::from_str(&col_str(row, 3)?)?;
    let created_at = DateTime::parse_from_rfc3339(&col_str(row, 8)?)?.with_timezone(&Utc);

    Ok(SavedWord {
        id: col_str(row, 0)?,
        word: col_str(row, 1)?,
        pronunciation: col_str(row, 2)?,
        entries,
        definitions: serde_json::from_str(&col_str(row, 4)?)?,
        examples: serde_json::from_str(&col_str(row, 5)?)?,
        translations: serde_json::from_str(&col_str(row, 6)?)?,
        part_of_speech: col_opt_str(row, 7),
        mode: LexMode::Vocabulary,
        created_at,
    })
}

fn decode_idiom(row: &[Value]) -> Result<SavedIdiom, StorageError> {
    let created_at = DateTime::parse_from_rfc3339(&col_str(row, 5)?)?.with_timezone(&Utc);

    Ok(SavedIdiom {
        id: col_str(row, 0)?,
        idiom: col_str(row, 1)?,
        meaning: serde_json::from_str(&col_str(row, 2)?)?,
        examples: serde_json::from_str(&col_str(row, 3)?)?,
        translations: serde_json::from_str(&col_str(row, 4)?)?,
        mode: LexMode::Idiom,
        created_at,
    })
}
