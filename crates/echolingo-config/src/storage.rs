use std::env;

use serde::{Deserialize, Serialize};

/// Which store implementation to construct at startup. Selection is
/// explicit configuration; the process never probes the filesystem or
/// deployment environment at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    Memory,
    Remote,
}

#[derive(Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Path to the SQLite database file (sqlite backend)
    pub sqlite_path: String,
    /// Remote SQL endpoint URL (remote backend)
    pub remote_url: String,
    /// Remote SQL endpoint credential (remote backend)
    pub remote_token: String,
}

impl StorageConfig {
    pub fn new() -> Self {
        let backend = match env::var("ECHOLINGO_STORAGE").as_deref() {
            Ok("memory") => StorageBackend::Memory,
            Ok("remote") => StorageBackend::Remote,
            _ => StorageBackend::Sqlite,
        };

        let sqlite_path =
            env::var("ECHOLINGO_DB_PATH").unwrap_or_else(|_| "echolingo.db".to_string());

        let remote_url = env::var("ECHOLINGO_REMOTE_DB_URL").unwrap_or_default();
        let remote_token = env::var("ECHOLINGO_REMOTE_DB_TOKEN").unwrap_or_default();

        Self {
            backend,
            sqlite_path,
            remote_url,
            remote_token,
        }
    }
}
