use std::env;

use serde::{Deserialize, Serialize};

#[derive(Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Completion endpoint credential
    pub api_key: String,
    /// Chat-completions style endpoint URL
    pub api_url: String,
    /// Model identifier sent with each request
    pub model: String,
    /// Per-request HTTP timeout
    pub timeout_seconds: u64,
}

impl ProviderConfig {
    pub fn new() -> Self {
        let api_key = env::var("ECHOLINGO_API_KEY").unwrap_or_default();

        let api_url = env::var("ECHOLINGO_API_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string());

        let model = env::var("ECHOLINGO_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let timeout_seconds = env::var("ECHOLINGO_PROVIDER_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30); // 30 seconds default

        Self {
            api_key,
            api_url,
            model,
            timeout_seconds,
        }
    }
}
