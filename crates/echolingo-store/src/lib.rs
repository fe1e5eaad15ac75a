pub mod memory;
pub mod remote;
pub mod sqlite;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use echolingo_types::{IdiomLookup, ImportReport, SaveOutcome, SavedIdiom, SavedWord, WordLookup};

pub use memory::MemoryStore;
pub use remote::RemoteStore;
pub use sqlite::SqliteStore;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid stored timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("remote store error: {0}")]
    Remote(String),

    #[error("store lock poisoned")]
    Lock,
}

/// CRUD over the word and idiom collections, keyed by case-insensitive
/// text. One contract, three interchangeable backends; the choice is
/// made once at startup from configuration.
#[async_trait]
pub trait LexiconStore: Send + Sync {
    /// Idempotent schema setup, run once before serving requests
    async fn migrate(&self) -> Result<(), StorageError>;

    /// Insert-only: a duplicate (case-insensitive) is reported as
    /// `AlreadySaved`, never overwritten
    async fn save_word(&self, lookup: WordLookup)
    -> Result<SaveOutcome<SavedWord>, StorageError>;

    async fn save_idiom(
        &self,
        lookup: IdiomLookup,
    ) -> Result<SaveOutcome<SavedIdiom>, StorageError>;

    async fn word_exists(&self, text: &str) -> Result<bool, StorageError>;

    async fn idiom_exists(&self, text: &str) -> Result<bool, StorageError>;

    /// All words, most recently created first
    async fn list_words(&self) -> Result<Vec<SavedWord>, StorageError>;

    async fn list_idioms(&self) -> Result<Vec<SavedIdiom>, StorageError>;

    /// Hard delete by case-insensitive text; false when nothing matched
    async fn delete_word(&self, text: &str) -> Result<bool, StorageError>;

    async fn delete_idiom(&self, text: &str) -> Result<bool, StorageError>;

    /// Batch import, the sole upsert path: overwrites fields on
    /// conflict, keeping the original id and creation time
    async fn import_words(&self, lookups: Vec<WordLookup>)
    -> Result<ImportReport, StorageError>;
}

/// Case-insensitive storage key for word/idiom text
pub fn normalize_key(text: &str) -> String {
    text.trim().to_lowercase()
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
