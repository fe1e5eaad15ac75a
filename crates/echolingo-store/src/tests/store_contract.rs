//! Contract tests exercised against both embedded backends; the remote
//! backend shares the SQL and decoding paths of the embedded one and
//! needs a live endpoint, so it is not covered here.

use echolingo_types::{IdiomLookup, PosEntry, SaveOutcome, WordLookup};

use crate::{LexiconStore, MemoryStore, SqliteStore};

fn word(text: &str) -> WordLookup {
    WordLookup {
        word: text.to_string(),
        pronunciation: format!("/{text}/"),
        entries: vec![PosEntry {
            part_of_speech: "noun".to_string(),
            definitions: vec![format!("meaning of {text}")],
            examples: vec![format!("A sentence with {text}.")],
            persian_translations: vec!["ترجمه".to_string()],
        }],
        definitions: vec!["a".to_string(), "b".to_string()],
        examples: vec![format!("Example for {text}.")],
        persian_translations: vec!["ترجمه".to_string()],
        part_of_speech: Some("noun".to_string()),
    }
}

fn idiom(text: &str) -> IdiomLookup {
    IdiomLookup {
        idiom: text.to_string(),
        meaning: vec![format!("what {text} means")],
        examples: vec![format!("Someone said: {text}.")],
        persian_translations: vec!["اصطلاح".to_string()],
    }
}

async fn backends() -> Vec<Box<dyn LexiconStore>> {
    let sqlite = SqliteStore::open_in_memory().unwrap();
    sqlite.migrate().await.unwrap();
    vec![Box::new(MemoryStore::new()), Box::new(sqlite)]
}

#[tokio::test]
async fn duplicate_save_is_reported_not_repeated() {
    for store in backends().await {
        let first = store.save_word(word("Serendipity")).await.unwrap();
        let SaveOutcome::Created(created) = first else {
            panic!("first save should create");
        };

        // Different casing must still be a duplicate
        let mut second = word("SERENDIPITY");
        second.pronunciation = "/changed/".to_string();
        assert!(store.save_word(second).await.unwrap().is_already_saved());

        let listed = store.list_words().await.unwrap();
        assert_eq!(listed.len(), 1);
        // First row's stored fields are untouched
        assert_eq!(listed[0], created);
    }
}

#[tokio::test]
async fn delete_is_idempotent_and_clears_existence() {
    for store in backends().await {
        assert!(!store.delete_word("never saved").await.unwrap());
        assert!(store.list_words().await.unwrap().is_empty());

        store.save_word(word("ephemeral")).await.unwrap();
        assert!(store.word_exists("Ephemeral").await.unwrap());
        assert!(store.delete_word("EPHEMERAL").await.unwrap());
        assert!(!store.word_exists("ephemeral").await.unwrap());
        assert!(!store.delete_word("ephemeral").await.unwrap());
    }
}

#[tokio::test]
async fn array_fields_round_trip_in_order() {
    for store in backends().await {
        store.save_word(word("ordered")).await.unwrap();

        let listed = store.list_words().await.unwrap();
        assert_eq!(listed[0].definitions, vec!["a", "b"]);
        assert_eq!(listed[0].entries.len(), 1);
        assert_eq!(listed[0].entries[0].part_of_speech, "noun");
    }
}

#[tokio::test]
async fn listing_returns_newest_first() {
    for store in backends().await {
        for text in ["first", "second", "third"] {
            store.save_word(word(text)).await.unwrap();
        }

        let listed: Vec<String> = store
            .list_words()
            .await
            .unwrap()
            .into_iter()
            .map(|w| w.word)
            .collect();
        assert_eq!(listed, vec!["third", "second", "first"]);
    }
}

#[tokio::test]
async fn idioms_follow_the_same_contract() {
    for store in backends().await {
        let outcome = store.save_idiom(idiom("break the ice")).await.unwrap();
        assert!(matches!(outcome, SaveOutcome::Created(_)));
        assert!(
            store
                .save_idiom(idiom("Break The Ice"))
                .await
                .unwrap()
                .is_already_saved()
        );

        let listed = store.list_idioms().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].idiom, "break the ice");

        assert!(store.delete_idiom("BREAK THE ICE").await.unwrap());
        assert!(!store.idiom_exists("break the ice").await.unwrap());
    }
}

#[tokio::test]
async fn import_upserts_on_conflict() {
    for store in backends().await {
        store.save_word(word("borrow")).await.unwrap();
        let original = store.list_words().await.unwrap().remove(0);

        let mut replacement = word("Borrow");
        replacement.pronunciation = "/ˈbɒr.əʊ/".to_string();

        let report = store
            .import_words(vec![replacement, word("lend")])
            .await
            .unwrap();
        assert_eq!(report.updated, 1);
        assert_eq!(report.imported, 1);

        let listed = store.list_words().await.unwrap();
        assert_eq!(listed.len(), 2);

        let borrowed = listed
            .iter()
            .find(|w| w.word.to_lowercase() == "borrow")
            .unwrap();
        assert_eq!(borrowed.pronunciation, "/ˈbɒr.əʊ/");
        // Upsert keeps the original identity and creation time
        assert_eq!(borrowed.id, original.id);
        assert_eq!(borrowed.created_at, original.created_at);
    }
}

#[tokio::test]
async fn creation_timestamps_survive_storage_exactly() {
    for store in backends().await {
        let SaveOutcome::Created(created_word) = store.save_word(word("precise")).await.unwrap()
        else {
            panic!("save should create");
        };
        let SaveOutcome::Created(created_idiom) =
            store.save_idiom(idiom("on the dot")).await.unwrap()
        else {
            panic!("save should create");
        };

        let listed_word = store.list_words().await.unwrap().remove(0);
        assert_eq!(listed_word.created_at, created_word.created_at);
        assert_eq!(listed_word, created_word);

        let listed_idiom = store.list_idioms().await.unwrap().remove(0);
        assert_eq!(listed_idiom.created_at, created_idiom.created_at);
        assert_eq!(listed_idiom, created_idiom);
    }
}

#[tokio::test]
async fn migrate_is_idempotent() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.migrate().await.unwrap();
    store.migrate().await.unwrap();
    store.save_word(word("twice")).await.unwrap();
    assert_eq!(store.list_words().await.unwrap().len(), 1);
}
