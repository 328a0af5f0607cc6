// Runtime configuration handed to the application layer

use serde::{Deserialize, Serialize};

pub const DEVELOPMENT_ENVIRONMENT: &str = "development";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub allowed_tokens: Vec<String>,
    pub allow_read_no_token: bool,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub retention_margin_minutes: u64,
    pub retention_sweep_interval_seconds: u64,
    pub sweep_on_write: bool,
    pub default_query_limit: usize,
    pub max_query_limit: usize,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            allowed_tokens: Vec::new(),
            allow_read_no_token: true,
            cors_origins: Vec::new(),
            environment: "production".to_string(),
            retention_margin_minutes: 60,
            retention_sweep_interval_seconds: 600,
            sweep_on_write: true,
            default_query_limit: 5_000,
            max_query_limit: 10_000,
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 15,
        }
    }
}

impl RuntimeConfig {
    pub fn token_allowed(&self, token: Option<&str>) -> bool {
        match token {
            Some(token) => self.allowed_tokens.iter().any(|allowed| allowed == token),
            None => false,
        }
    }

    /// Writes are open when no tokens are configured.
    pub fn write_authorized(&self, token: Option<&str>) -> bool {
        self.allowed_tokens.is_empty() || self.token_allowed(token)
    }

    /// Reads are gated only when public reads are disabled and an allow-list exists.
    pub fn read_authorized(&self, token: Option<&str>) -> bool {
        self.allow_read_no_token || self.write_authorized(token)
    }

    pub fn purge_enabled(&self) -> bool {
        self.environment.eq_ignore_ascii_case(DEVELOPMENT_ENVIRONMENT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub db_path: String,
}
