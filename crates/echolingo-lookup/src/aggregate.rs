//! Flatten per-part-of-speech entries into the aggregate arrays the UI
//! consumes. Items are rendered as `[pos] text`; set semantics drop
//! exact duplicates, so each distinct (pos, text) pair appears once.

use std::collections::HashSet;

use echolingo_types::WordLookup;

pub fn aggregate_entries(word: &mut WordLookup) {
    if word.entries.is_empty() {
        return;
    }

    let mut definitions = Tagged::default();
    let mut examples = Tagged::default();
    let mut translations = Tagged::default();
    let mut pos_tags: Vec<String> = Vec::new();

    for entry in &word.entries {
        let pos = entry.part_of_speech.trim().to_lowercase();

        if !pos.is_empty() && !pos_tags.contains(&pos) {
            pos_tags.push(pos.clone());
        }

        for text in &entry.definitions {
            definitions.push(&pos, text);
        }
        for text in &entry.examples {
            examples.push(&pos, text);
        }
        for text in &entry.persian_translations {
            translations.push(&pos, text);
        }
    }

    // Only fill aggregates the payload did not already carry; explicit
    // top-level arrays are never overwritten.
    if word.definitions.is_empty() {
        word.definitions = definitions.items;
    }
    if word.examples.is_empty() {
        word.examples = examples.items;
    }
    if word.persian_translations.is_empty() {
        word.persian_translations = translations.items;
    }
    if word.part_of_speech.is_none() && !pos_tags.is_empty() {
        word.part_of_speech = Some(pos_tags.join(" | "));
    }
}

#[derive(Default)]
struct Tagged {
    items: Vec<String>,
    seen: HashSet<String>,
}

impl Tagged {
    fn push(&mut self, pos: &str, text: &str) {
        let rendered = if pos.is_empty() {
            text.to_string()
        } else {
            format!("[{pos}] {text}")
        };

        if self.seen.insert(rendered.clone()) {
            self.items.push(rendered);
        }
    }
}

#[cfg(test)]
mod tests {
    use echolingo_types::PosEntry;

    use super::*;

    fn entry(pos: &str, definitions: &[&str]) -> PosEntry {
        PosEntry {
            part_of_speech: pos.to_string(),
            definitions: definitions.iter().map(|s| s.to_string()).collect(),
            examples: vec![],
            persian_translations: vec![],
        }
    }

    fn word_with(entries: Vec<PosEntry>) -> WordLookup {
        WordLookup {
            word: "run".to_string(),
            pronunciation: "/rʌn/".to_string(),
            entries,
            definitions: vec![],
            examples: vec![],
            persian_translations: vec![],
            part_of_speech: None,
        }
    }

    #[test]
    fn tags_items_with_lowercased_pos() {
        let mut word = word_with(vec![entry("Verb", &["to move fast"])]);
        aggregate_entries(&mut word);
        assert_eq!(word.definitions, vec!["[verb] to move fast"]);
        assert_eq!(word.part_of_speech.as_deref(), Some("verb"));
    }

    #[test]
    fn identical_pos_text_pairs_collapse_to_one() {
        let mut word = word_with(vec![
            entry("verb", &["to run quickly"]),
            entry("verb", &["to run quickly"]),
        ]);
        aggregate_entries(&mut word);
        assert_eq!(word.definitions, vec!["[verb] to run quickly"]);
    }

    #[test]
    fn same_text_under_different_pos_is_kept_per_pos() {
        let mut word = word_with(vec![
            entry("noun", &["to run quickly"]),
            entry("verb", &["to run quickly"]),
        ]);
        aggregate_entries(&mut word);
        assert_eq!(
            word.definitions,
            vec!["[noun] to run quickly", "[verb] to run quickly"]
        );
        assert_eq!(word.part_of_speech.as_deref(), Some("noun | verb"));
    }

    #[test]
    fn explicit_top_level_arrays_are_not_overwritten() {
        let mut word = word_with(vec![entry("verb", &["to move fast"])]);
        word.definitions = vec!["already here".to_string()];
        aggregate_entries(&mut word);
        assert_eq!(word.definitions, vec!["already here"]);
        // absent aggregates are still filled
        assert_eq!(word.part_of_speech.as_deref(), Some("verb"));
    }

    #[test]
    fn no_entries_leaves_word_untouched() {
        let mut word = word_with(vec![]);
        aggregate_entries(&mut word);
        assert!(word.definitions.is_empty());
        assert!(word.part_of_speech.is_none());
    }
}
