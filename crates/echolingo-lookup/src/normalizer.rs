use std::sync::Arc;
use std::time::Duration;

use echolingo_types::{IdiomLookup, WordLookup};
use rand::Rng;
use unicode_normalization::UnicodeNormalization;

use crate::{LookupError, aggregate, prompt, provider::CompletionProvider, repair};

/// Bounded retry around the provider call. Only transport failures are
/// retried; validation and schema failures never are.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
}

impl RetryPolicy {
    /// Interactive lookups: 3 attempts, 600ms doubling backoff
    pub fn standard() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(600),
            max_jitter: Duration::from_millis(200),
        }
    }

    /// Batch import: slightly longer initial backoff
    pub fn batch() -> Self {
        Self {
            base_delay: Duration::from_millis(800),
            ..Self::standard()
        }
    }
}

/// The lookup normalizer: prompt, call with retry, repair, validate,
/// aggregate. Pure besides the outbound provider call.
pub struct Lookup {
    provider: Arc<dyn CompletionProvider>,
    retry: RetryPolicy,
}

impl Lookup {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self::with_retry(provider, RetryPolicy::standard())
    }

    pub fn with_retry(provider: Arc<dyn CompletionProvider>, retry: RetryPolicy) -> Self {
        Self { provider, retry }
    }

    pub async fn word(&self, input: &str) -> Result<WordLookup, LookupError> {
        let term = clean_input(input);
        if term.is_empty() {
            return Err(LookupError::Validation("word is required".to_string()));
        }

        let raw = self.complete_with_retry(&prompt::word_prompt(&term)).await?;
        let value = repair::parse_lenient(&raw)?;
        let mut word = validate_word(value)?;
        aggregate::aggregate_entries(&mut word);
        Ok(word)
    }

    pub async fn idiom(&self, input: &str) -> Result<IdiomLookup, LookupError> {
        let term = clean_input(input);
        if term.is_empty() {
            return Err(LookupError::Validation("idiom is required".to_string()));
        }

        let raw = self
            .complete_with_retry(&prompt::idiom_prompt(&term))
            .await?;
        let value = repair::parse_lenient(&raw)?;
        validate_idiom(value)
    }

    async fn complete_with_retry(&self, prompt: &str) -> Result<String, LookupError> {
        let mut delay = self.retry.base_delay;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            match self.provider.complete(prompt).await {
                Ok(text) => return Ok(text),
                Err(err) if attempt < self.retry.max_attempts => {
                    tracing::warn!(attempt, error = %err, "provider call failed, retrying");
                    tokio::time::sleep(delay + jitter(self.retry.max_jitter)).await;
                    delay *= 2;
                }
                Err(err) => {
                    tracing::error!(attempt, error = %err, "provider retries exhausted");
                    return Err(LookupError::Provider(err));
                }
            }
        }
    }
}

/// NFC-normalize and trim user input
fn clean_input(input: &str) -> String {
    input.nfc().collect::<String>().trim().to_string()
}

fn jitter(max: Duration) -> Duration {
    if max.is_zero() {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..max.as_millis() as u64))
}

fn validate_word(value: serde_json::Value) -> Result<WordLookup, LookupError> {
    let word: WordLookup =
        serde_json::from_value(value).map_err(|e| LookupError::Schema(e.to_string()))?;

    if word.word.trim().is_empty() {
        return Err(LookupError::Schema("empty word field".to_string()));
    }

    if word.entries.is_empty() {
        if word.definitions.is_empty() || word.persian_translations.is_empty() {
            return Err(LookupError::Schema(
                "need entries or definitions + persianTranslations".to_string(),
            ));
        }
        return Ok(word);
    }

    for entry in &word.entries {
        if entry.part_of_speech.trim().is_empty()
            || entry.definitions.is_empty()
            || entry.persian_translations.is_empty()
        {
            return Err(LookupError::Schema(
                "entry missing partOfSpeech, definitions or persianTranslations".to_string(),
            ));
        }
    }

    Ok(word)
}

fn validate_idiom(value: serde_json::Value) -> Result<IdiomLookup, LookupError> {
    let idiom: IdiomLookup =
        serde_json::from_value(value).map_err(|e| LookupError::Schema(e.to_string()))?;

    if idiom.idiom.trim().is_empty()
        || idiom.meaning.is_empty()
        || idiom.persian_translations.is_empty()
    {
        return Err(LookupError::Schema(
            "idiom needs idiom, meaning and persianTranslations".to_string(),
        ));
    }

    Ok(idiom)
}

#[cfg(test)]
mod tests {
    use crate::mock::MockProvider;
    use crate::provider::ProviderError;

    use super::*;

    const WORD_JSON: &str = r#"{
        "word": "run",
        "pronunciation": "/rʌn/",
        "entries": [
            {
                "partOfSpeech": "verb",
                "definitions": ["to move quickly on foot"],
                "examples": ["She runs every morning."],
                "persianTranslations": ["دویدن"]
            },
            {
                "partOfSpeech": "noun",
                "definitions": ["an act of running"],
                "examples": ["He went for a run."],
                "persianTranslations": ["دو"]
            }
        ]
    }"#;

    fn lookup_with(provider: Arc<MockProvider>) -> Lookup {
        Lookup::new(provider)
    }

    #[test]
    fn batch_policy_backs_off_from_800ms() {
        let standard = RetryPolicy::standard();
        let batch = RetryPolicy::batch();
        assert_eq!(standard.base_delay, Duration::from_millis(600));
        assert_eq!(batch.base_delay, Duration::from_millis(800));
        assert_eq!(batch.max_attempts, standard.max_attempts);
    }

    #[tokio::test(start_paused = true)]
    async fn batch_policy_is_honored_by_the_retry_loop() {
        let provider = Arc::new(MockProvider::new(vec![
            Err(ProviderError::ApiError("HTTP 502".to_string())),
            Ok(WORD_JSON.to_string()),
        ]));
        let lookup = Lookup::with_retry(
            provider.clone() as Arc<dyn CompletionProvider>,
            RetryPolicy::batch(),
        );

        let word = lookup.word("run").await.unwrap();
        assert_eq!(word.word, "run");
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn whitespace_input_fails_without_a_provider_call() {
        let provider = Arc::new(MockProvider::always(WORD_JSON));
        let lookup = lookup_with(Arc::clone(&provider));

        let err = lookup.word("   \t\n").await.unwrap_err();
        assert!(matches!(err, LookupError::Validation(_)));
        assert_eq!(provider.calls(), 0);

        let err = lookup.idiom("").await.unwrap_err();
        assert!(matches!(err, LookupError::Validation(_)));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn word_lookup_aggregates_entries() {
        let provider = Arc::new(MockProvider::always(WORD_JSON));
        let lookup = lookup_with(provider);

        let word = lookup.word("run").await.unwrap();
        assert_eq!(word.word, "run");
        assert_eq!(word.entries.len(), 2);
        assert_eq!(
            word.definitions,
            vec!["[verb] to move quickly on foot", "[noun] an act of running"]
        );
        assert_eq!(word.part_of_speech.as_deref(), Some("verb | noun"));
    }

    #[tokio::test]
    async fn fenced_response_parses_like_unfenced() {
        let fenced = format!("```json\n{WORD_JSON}\n```");
        let plain = lookup_with(Arc::new(MockProvider::always(WORD_JSON)))
            .word("run")
            .await
            .unwrap();
        let repaired = lookup_with(Arc::new(MockProvider::always(&fenced)))
            .word("run")
            .await
            .unwrap();
        assert_eq!(plain, repaired);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_provider_failures_are_retried() {
        let provider = Arc::new(MockProvider::new(vec![
            Err(ProviderError::ApiError("HTTP 502".to_string())),
            Err(ProviderError::RateLimitExceeded),
            Ok(WORD_JSON.to_string()),
        ]));
        let lookup = lookup_with(Arc::clone(&provider));

        let word = lookup.word("run").await.unwrap();
        assert_eq!(word.word, "run");
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_surface_the_last_provider_error() {
        let provider = Arc::new(MockProvider::new(vec![Err(ProviderError::ApiError(
            "HTTP 503".to_string(),
        ))]));
        let lookup = lookup_with(Arc::clone(&provider));

        let err = lookup.word("run").await.unwrap_err();
        assert!(matches!(err, LookupError::Provider(_)));
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn missing_required_fields_is_a_schema_error() {
        let provider = Arc::new(MockProvider::always(r#"{"word":"run"}"#));
        let err = lookup_with(provider).word("run").await.unwrap_err();
        assert!(matches!(err, LookupError::Schema(_)));
    }

    #[tokio::test]
    async fn top_level_arrays_satisfy_the_schema_without_entries() {
        let provider = Arc::new(MockProvider::always(
            r#"{"word":"cat","pronunciation":"/kæt/",
                "definitions":["a small feline"],
                "examples":["The cat sat."],
                "persianTranslations":["گربه"]}"#,
        ));
        let word = lookup_with(provider).word("cat").await.unwrap();
        assert_eq!(word.definitions, vec!["a small feline"]);
        assert!(word.entries.is_empty());
    }

    #[tokio::test]
    async fn idiom_lookup_validates_required_fields() {
        let provider = Arc::new(MockProvider::always(
            r#"{"idiom":"break the ice",
                "meaning":["to ease initial tension"],
                "examples":["A joke broke the ice."],
                "persianTranslations":["سر صحبت را باز کردن"]}"#,
        ));
        let lookup = lookup_with(provider);
        let idiom = lookup.idiom("break the ice").await.unwrap();
        assert_eq!(idiom.idiom, "break the ice");

        let bad = Arc::new(MockProvider::always(r#"{"idiom":"x","examples":[]}"#));
        let err = lookup_with(bad).idiom("x").await.unwrap_err();
        assert!(matches!(err, LookupError::Schema(_)));
    }
}
