//! In-process fallback with the same contract but no cross-restart
//! durability. Listing walks insertion order backwards, so the newest
//! entry always comes first.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use echolingo_types::{
    IdiomLookup, ImportReport, SaveOutcome, SavedIdiom, SavedWord, WordLookup,
};

use crate::{LexiconStore, StorageError, new_id, normalize_key};

#[derive(Default)]
pub struct MemoryStore {
    words: Mutex<Vec<SavedWord>>,
    idioms: Mutex<Vec<SavedIdiom>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn words(&self) -> Result<MutexGuard<'_, Vec<SavedWord>>, StorageError> {
        self.words.lock().map_err(|_| StorageError::Lock)
    }

    fn idioms(&self) -> Result<MutexGuard<'_, Vec<SavedIdiom>>, StorageError> {
        self.idioms.lock().map_err(|_| StorageError::Lock)
    }
}

#[async_trait]
impl LexiconStore for MemoryStore {
    async fn migrate(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn save_word(
        &self,
        lookup: WordLookup,
    ) -> Result<SaveOutcome<SavedWord>, StorageError> {
        let key = normalize_key(&lookup.word);
        let mut words = self.words()?;

        if words.iter().any(|w| w.key() == key) {
            return Ok(SaveOutcome::AlreadySaved);
        }

        let saved = SavedWord::from_lookup(lookup, new_id(), Utc::now());
        words.push(saved.clone());
        Ok(SaveOutcome::Created(saved))
    }

    async fn save_idiom(
        &self,
        lookup: IdiomLookup,
    ) -> Result<SaveOutcome<SavedIdiom>, StorageError> {
        let key = normalize_key(&lookup.idiom);
        let mut idioms = self.idioms()?;

        if idioms.iter().any(|i| i.key() == key) {
            return Ok(SaveOutcome::AlreadySaved);
        }

        let saved = SavedIdiom::from_lookup(lookup, new_id(), Utc::now());
        idioms.push(saved.clone());
        Ok(SaveOutcome::Created(saved))
    }

    async fn word_exists(&self, text: &str) -> Result<bool, StorageError> {
        let key = normalize_key(text);
        Ok(self.words()?.iter().any(|w| w.key() == key))
    }

    async fn idiom_exists(&self, text: &str) -> Result<bool, StorageError> {
        let key = normalize_key(text);
        Ok(self.idioms()?.iter().any(|i| i.key() == key))
    }

    async fn list_words(&self) -> Result<Vec<SavedWord>, StorageError> {
        Ok(self.words()?.iter().rev().cloned().collect())
    }

    async fn list_idioms(&self) -> Result<Vec<SavedIdiom>, StorageError> {
        Ok(self.idioms()?.iter().rev().cloned().collect())
    }

    async fn delete_word(&self, text: &str) -> Result<bool, StorageError> {
        let key = normalize_key(text);
        let mut words = self.words()?;
        let before = words.len();
        words.retain(|w| w.key() != key);
        Ok(words.len() < before)
    }

    async fn delete_idiom(&self, text: &str) -> Result<bool, StorageError> {
        let key = normalize_key(text);
        let mut idioms = self.idioms()?;
        let before = idioms.len();
        idioms.retain(|i| i.key() != key);
        Ok(idioms.len() < before)
    }

    async fn import_words(
        &self,
        lookups: Vec<WordLookup>,
    ) -> Result<ImportReport, StorageError> {
        let mut words = self.words()?;
        let mut report = ImportReport::default();

        for lookup in lookups {
            let key = normalize_key(&lookup.word);

            match words.iter_mut().find(|w| w.key() == key) {
                Some(existing) => {
                    // Overwrite fields, keep the original id and creation time
                    let updated = SavedWord::from_lookup(
                        lookup,
                        existing.id.clone(),
                        existing.created_at,
                    );
                    *existing = updated;
                    report.updated += 1;
                }
                None => {
                    words.push(SavedWord::from_lookup(lookup, new_id(), Utc::now()));
                    report.imported += 1;
                }
            }
        }

        Ok(report)
    }
}
