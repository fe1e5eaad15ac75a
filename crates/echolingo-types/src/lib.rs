pub mod types;

pub use types::{
    IdiomLookup, ImportReport, LexMode, PosEntry, SaveOutcome, SavedIdiom, SavedWord, WordLookup,
};
