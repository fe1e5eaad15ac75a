pub mod aggregate;
pub mod mock;
pub mod normalizer;
pub mod prompt;
pub mod provider;
pub mod repair;

pub use normalizer::{Lookup, RetryPolicy};
pub use provider::{CompletionProvider, OpenAiProvider, ProviderError, ProviderMetadata};

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("provider response missing required fields: {0}")]
    Schema(String),
}
