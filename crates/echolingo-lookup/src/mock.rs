//! Scripted provider for tests. Not compiled out so integration tests
//! in dependent crates can use it.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::provider::{CompletionProvider, ProviderError, ProviderMetadata};

pub struct MockProvider {
    responses: Mutex<VecDeque<Result<String, ProviderError>>>,
    calls: AtomicUsize,
}

impl MockProvider {
    pub fn new(responses: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Provider that returns the same completion for every call
    pub fn always(response: &str) -> Self {
        Self::new(vec![Ok(response.to_string())])
    }

    /// Number of completion calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(&self, _prompt: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut responses = self
            .responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match responses.len() {
            0 => Err(ProviderError::ApiError("mock exhausted".to_string())),
            // Keep the last scripted response for repeated calls
            1 => match responses.front() {
                Some(Ok(text)) => Ok(text.clone()),
                _ => Err(ProviderError::ApiError("mock failure".to_string())),
            },
            _ => match responses.pop_front() {
                Some(result) => result,
                None => Err(ProviderError::ApiError("mock exhausted".to_string())),
            },
        }
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "mock".to_string(),
            requires_api_key: false,
        }
    }
}
