use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which kind of lexical entry a request is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LexMode {
    Vocabulary,
    Idiom,
}

impl LexMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LexMode::Vocabulary => "vocabulary",
            LexMode::Idiom => "idiom",
        }
    }
}

impl std::str::FromStr for LexMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vocabulary" => Ok(LexMode::Vocabulary),
            "idiom" => Ok(LexMode::Idiom),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// One part-of-speech grouping inside a vocabulary lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosEntry {
    #[serde(default)]
    pub part_of_speech: String,
    #[serde(default)]
    pub definitions: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub persian_translations: Vec<String>,
}

/// Normalized vocabulary lookup result, as returned to the client
/// and accepted back on save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordLookup {
    pub word: String,
    #[serde(default)]
    pub pronunciation: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<PosEntry>,
    #[serde(default)]
    pub definitions: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub persian_translations: Vec<String>,
    /// Multi-value tag, e.g. "noun | verb"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
}

/// Normalized idiom lookup result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdiomLookup {
    pub idiom: String,
    #[serde(default)]
    pub meaning: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub persian_translations: Vec<String>,
}

/// A vocabulary entry as persisted and listed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedWord {
    pub id: String,
    pub word: String,
    pub pronunciation: String,
    #[serde(default)]
    pub entries: Vec<PosEntry>,
    pub definitions: Vec<String>,
    pub examples: Vec<String>,
    pub translations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
    pub mode: LexMode,
    pub created_at: DateTime<Utc>,
}

impl SavedWord {
    pub fn from_lookup(lookup: WordLookup, id: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            word: lookup.word,
            pronunciation: lookup.pronunciation,
            entries: lookup.entries,
            definitions: lookup.definitions,
            examples: lookup.examples,
            translations: lookup.persian_translations,
            part_of_speech: lookup.part_of_speech,
            mode: LexMode::Vocabulary,
            created_at,
        }
    }

    /// Case-insensitive storage key
    pub fn key(&self) -> String {
        self.word.trim().to_lowercase()
    }
}

/// An idiom entry as persisted and listed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedIdiom {
    pub id: String,
    pub idiom: String,
    pub meaning: Vec<String>,
    pub examples: Vec<String>,
    pub translations: Vec<String>,
    pub mode: LexMode,
    pub created_at: DateTime<Utc>,
}

impl SavedIdiom {
    pub fn from_lookup(lookup: IdiomLookup, id: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            idiom: lookup.idiom,
            meaning: lookup.meaning,
            examples: lookup.examples,
            translations: lookup.persian_translations,
            mode: LexMode::Idiom,
            created_at,
        }
    }

    pub fn key(&self) -> String {
        self.idiom.trim().to_lowercase()
    }
}

/// Result of a save attempt; a duplicate is a distinguished success,
/// never an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome<T> {
    Created(T),
    AlreadySaved,
}

impl<T> SaveOutcome<T> {
    pub fn is_already_saved(&self) -> bool {
        matches!(self, SaveOutcome::AlreadySaved)
    }
}

/// Summary of a batch import (the only upsert path)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub imported: usize,
    pub updated: usize,
}
