use std::env;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address, host:port
    pub listen: String,
}

impl ServerConfig {
    pub fn new() -> Self {
        let listen =
            env::var("ECHOLINGO_LISTEN").unwrap_or_else(|_| "127.0.0.1:3000".to_string());

        Self { listen }
    }
}
