//! Prompt construction for the completion endpoint. Both prompts demand
//! strict JSON with a fixed field contract; the repair step still copes
//! with fenced or prose-wrapped output.

pub fn word_prompt(term: &str) -> String {
    format!(
        r#"You are an English dictionary for Persian-speaking learners.
Look up the word "{term}" and answer with strict JSON only, no markdown,
no commentary, exactly this shape:

{{
  "word": "the word",
  "pronunciation": "IPA pronunciation",
  "entries": [
    {{
      "partOfSpeech": "noun",
      "definitions": ["short English definitions"],
      "examples": ["example sentences"],
      "persianTranslations": ["Persian translations"]
    }}
  ]
}}

Include one entry per part of speech the word actually has. Give 2-4
definitions, 2-3 examples and 2-4 Persian translations per entry."#
    )
}

pub fn idiom_prompt(term: &str) -> String {
    format!(
        r#"You are an English idiom dictionary for Persian-speaking learners.
Explain the idiom "{term}" and answer with strict JSON only, no markdown,
no commentary, exactly this shape:

{{
  "idiom": "the idiom",
  "meaning": ["plain English explanations of the meaning"],
  "examples": ["example sentences using the idiom"],
  "persianTranslations": ["Persian equivalents or translations"]
}}

Give 1-3 meanings, 2-3 examples and 2-4 Persian translations."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_embed_the_term() {
        assert!(word_prompt("serendipity").contains("\"serendipity\""));
        assert!(idiom_prompt("break the ice").contains("\"break the ice\""));
    }

    #[test]
    fn prompts_request_the_wire_fields() {
        let word = word_prompt("run");
        assert!(word.contains("partOfSpeech"));
        assert!(word.contains("persianTranslations"));

        let idiom = idiom_prompt("hit the sack");
        assert!(idiom.contains("\"meaning\""));
        assert!(idiom.contains("persianTranslations"));
    }
}
