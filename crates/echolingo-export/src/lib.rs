mod cards;
mod csv;

pub use cards::CardRow;
pub use csv::escape_field;

use chrono::{DateTime, Duration, Utc};
use echolingo_types::{SavedIdiom, SavedWord};

/// Name the export route serves the file under
pub const EXPORT_FILENAME: &str = "echolingo_anki_7_days.csv";

/// Fixed trailing window: only entries created within the last 7 days
/// are exported
const WINDOW_DAYS: i64 = 7;

/// Render the Anki CSV snapshot for entries created within the trailing
/// window. Pure; the caller supplies the clock.
pub fn anki_csv(words: &[SavedWord], idioms: &[SavedIdiom], now: DateTime<Utc>) -> String {
    let cutoff = now - Duration::days(WINDOW_DAYS);

    let mut rows = vec![CardRow {
        front: "Front".to_string(),
        back: "Back".to_string(),
        tags: "Tags".to_string(),
    }];

    for word in words.iter().filter(|w| w.created_at >= cutoff) {
        rows.extend(cards::word_rows(word));
    }
    for idiom in idioms.iter().filter(|i| i.created_at >= cutoff) {
        rows.push(cards::idiom_row(idiom));
    }

    let mut out = String::new();
    for row in rows {
        out.push_str(&escape_field(&row.front));
        out.push(',');
        out.push_str(&escape_field(&row.back));
        out.push(',');
        out.push_str(&escape_field(&row.tags));
        out.push_str("\r\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use echolingo_types::{LexMode, PosEntry};

    use super::*;

    fn saved_word(text: &str, created_at: DateTime<Utc>) -> SavedWord {
        SavedWord {
            id: "id-1".to_string(),
            word: text.to_string(),
            pronunciation: "/x/".to_string(),
            entries: vec![],
            definitions: vec!["plain meaning".to_string()],
            examples: vec![],
            translations: vec!["ترجمه".to_string()],
            part_of_speech: None,
            mode: LexMode::Vocabulary,
            created_at,
        }
    }

    #[test]
    fn quotes_are_doubled_and_fields_quote_wrapped() {
        let now = Utc::now();
        let mut word = saved_word("say", now);
        word.definitions = vec![r#"He said "hi""#.to_string()];

        let csv = anki_csv(&[word], &[], now);
        assert!(csv.contains(r#"He said ""hi"""#));

        // every field is quote wrapped
        for line in csv.lines().filter(|l| !l.is_empty()) {
            assert!(line.starts_with('"'));
            assert!(line.ends_with('"'));
        }
    }

    #[test]
    fn entries_older_than_seven_days_are_excluded() {
        let now = Utc::now();
        let recent = saved_word("fresh", now - Duration::days(2));
        let stale = saved_word("stale", now - Duration::days(8));

        let csv = anki_csv(&[recent, stale], &[], now);
        assert!(csv.contains("fresh"));
        assert!(!csv.contains("stale"));
    }

    #[test]
    fn words_with_structured_entries_get_one_row_per_pos() {
        let now = Utc::now();
        let mut word = saved_word("run", now);
        word.entries = vec![
            PosEntry {
                part_of_speech: "verb".to_string(),
                definitions: vec!["to move fast".to_string()],
                examples: vec![],
                persian_translations: vec!["دویدن".to_string()],
            },
            PosEntry {
                part_of_speech: "noun".to_string(),
                definitions: vec!["an act of running".to_string()],
                examples: vec![],
                persian_translations: vec!["دو".to_string()],
            },
        ];

        let csv = anki_csv(&[word], &[], now);
        let rows: Vec<&str> = csv.lines().filter(|l| !l.is_empty()).collect();
        // header + one row per part of speech
        assert_eq!(rows.len(), 3);
        assert!(rows[1].contains("(verb)"));
        assert!(rows[2].contains("(noun)"));
    }

    #[test]
    fn idioms_render_as_single_rows() {
        let now = Utc::now();
        let idiom = SavedIdiom {
            id: "id-2".to_string(),
            idiom: "break the ice".to_string(),
            meaning: vec!["ease tension".to_string()],
            examples: vec!["A joke broke the ice.".to_string()],
            translations: vec!["اصطلاح".to_string()],
            mode: LexMode::Idiom,
            created_at: now,
        };

        let csv = anki_csv(&[], &[idiom], now);
        let rows: Vec<&str> = csv.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[1].contains("break the ice"));
        assert!(rows[1].contains("idiom"));
    }
}
