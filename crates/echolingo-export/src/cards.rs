//! Row construction. Words with structured per-part-of-speech entries
//! get one row per group, with untagged ("general") entries distributed
//! into every detected group; words without usable groups fall back to
//! a single bullet-joined row. Idioms always use the single-row shape.

use echolingo_types::{SavedIdiom, SavedWord};

use crate::csv::{bullets, html_list};

pub struct CardRow {
    pub front: String,
    pub back: String,
    pub tags: String,
}

struct PosGroup {
    pos: String,
    definitions: Vec<String>,
    examples: Vec<String>,
    translations: Vec<String>,
}

pub(crate) fn word_rows(word: &SavedWord) -> Vec<CardRow> {
    let groups = pos_groups(word);
    if groups.is_empty() {
        return vec![word_fallback_row(word)];
    }

    groups
        .into_iter()
        .map(|group| CardRow {
            front: format!("{} {} ({})", word.word, word.pronunciation, group.pos),
            back: sections(&[
                ("Definitions", &group.definitions),
                ("Examples", &group.examples),
                ("Translations", &group.translations),
            ]),
            tags: format!("echolingo vocabulary {}", tag_safe(&group.pos)),
        })
        .collect()
}

pub(crate) fn idiom_row(idiom: &SavedIdiom) -> CardRow {
    CardRow {
        front: idiom.idiom.clone(),
        back: [
            bullets(&idiom.meaning),
            bullets(&idiom.examples),
            bullets(&idiom.translations),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join("\n\n"),
        tags: "echolingo idiom".to_string(),
    }
}

fn pos_groups(word: &SavedWord) -> Vec<PosGroup> {
    let mut groups: Vec<PosGroup> = Vec::new();
    let mut general = PosGroup {
        pos: "general".to_string(),
        definitions: vec![],
        examples: vec![],
        translations: vec![],
    };

    for entry in &word.entries {
        let pos = entry.part_of_speech.trim().to_lowercase();
        let target = if pos.is_empty() || pos == "general" {
            &mut general
        } else {
            let index = match groups.iter().position(|g| g.pos == pos) {
                Some(index) => index,
                None => {
                    groups.push(PosGroup {
                        pos,
                        definitions: vec![],
                        examples: vec![],
                        translations: vec![],
                    });
                    groups.len() - 1
                }
            };
            &mut groups[index]
        };

        target.definitions.extend(entry.definitions.iter().cloned());
        target.examples.extend(entry.examples.iter().cloned());
        target
            .translations
            .extend(entry.persian_translations.iter().cloned());
    }

    // Untagged items apply to every detected group; with no tagged
    // group at all the caller falls back to the single-row shape.
    if !groups.is_empty() {
        for group in &mut groups {
            group.definitions.extend(general.definitions.iter().cloned());
            group.examples.extend(general.examples.iter().cloned());
            group
                .translations
                .extend(general.translations.iter().cloned());
        }
    }

    groups
}

fn word_fallback_row(word: &SavedWord) -> CardRow {
    CardRow {
        front: format!("{} {}", word.word, word.pronunciation),
        back: [
            bullets(&word.definitions),
            bullets(&word.examples),
            bullets(&word.translations),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join("\n\n"),
        tags: "echolingo vocabulary".to_string(),
    }
}

fn sections(parts: &[(&str, &Vec<String>)]) -> String {
    let mut out = String::new();
    for (title, items) in parts {
        if items.is_empty() {
            continue;
        }
        out.push_str(&format!("<b>{title}</b>"));
        out.push_str(&html_list(items));
    }
    out
}

/// Anki tags are space-separated, so multi-word tags get hyphenated
fn tag_safe(pos: &str) -> String {
    pos.replace(' ', "-")
}
