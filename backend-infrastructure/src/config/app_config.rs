use std::env;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tokio::fs;

use backend_domain::{DbConfig, RuntimeConfig};

use crate::config::validation::{validate_cors_origin, validate_token};
use crate::utils::{normalize_list, parse_env_flag, parse_env_list, replace_port, resolve_path};

pub const CONFIG_PATH_ENV: &str = "TRIBEWATCH_CONFIG";

/// Command-line settings. They win over the file and the environment,
/// `PORT` included.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db_path: Option<String>,
    pub bind_addr: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub db_path: String,
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
    pub log_dir: Option<String>,
    /// File the settings were read from; `None` when running on defaults.
    #[serde(skip)]
    pub loaded_from: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let runtime = RuntimeConfig::default();
        Self {
            bind_addr: runtime.bind_addr,
            db_path: "./attacks.db".to_string(),
            allowed_tokens: runtime.allowed_tokens,
            allow_read_no_token: runtime.allow_read_no_token,
            cors_origins: runtime.cors_origins,
            environment: runtime.environment,
            retention_margin_minutes: runtime.retention_margin_minutes,
            retention_sweep_interval_seconds: runtime.retention_sweep_interval_seconds,
            sweep_on_write: runtime.sweep_on_write,
            default_query_limit: runtime.default_query_limit,
            max_query_limit: runtime.max_query_limit,
            max_body_bytes: runtime.max_body_bytes,
            request_timeout_seconds: runtime.request_timeout_seconds,
            log_dir: None,
            loaded_from: None,
        }
    }
}

impl AppConfig {
    pub async fn load(overrides: &CliOverrides) -> Result<Self> {
        let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "./config.toml".to_string());
        let file_path = Path::new(&path);
        let base_dir = file_path.parent();
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path)
                .await
                .with_context(|| format!("failed to read {}", file_path.display()))?;
            let mut config = Self::from_toml(&content)?;
            config.loaded_from = Some(file_path.display().to_string());
            config
        } else {
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.resolve_paths(base_dir);
        config.apply_cli_overrides(overrides);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid config file")
    }

    pub fn normalize(&mut self) {
        self.bind_addr = self.bind_addr.trim().to_string();
        self.environment = self.environment.trim().to_ascii_lowercase();
        if self.db_path.trim().is_empty() {
            self.db_path = AppConfig::default().db_path;
        }
        if let Some(log_dir) = &self.log_dir {
            if log_dir.trim().is_empty() {
                self.log_dir = None;
            }
        }
        self.allowed_tokens = normalize_list(std::mem::take(&mut self.allowed_tokens));
        self.cors_origins = normalize_list(
            std::mem::take(&mut self.cors_origins)
                .into_iter()
                .map(|origin| origin.to_ascii_lowercase())
                .collect(),
        );
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.db_path = resolve_path(base, &self.db_path);
        if let Some(log_dir) = &self.log_dir {
            self.log_dir = Some(resolve_path(base, log_dir));
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr {}: {}", self.bind_addr, err))?;
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        if self.default_query_limit == 0 || self.default_query_limit > self.max_query_limit {
            return Err(anyhow!(
                "default_query_limit must be between 1 and max_query_limit ({})",
                self.max_query_limit
            ));
        }
        if self.retention_margin_minutes == 0 {
            return Err(anyhow!("retention_margin_minutes must be greater than 0"));
        }
        for token in &self.allowed_tokens {
            validate_token(token)?;
        }
        for origin in &self.cors_origins {
            validate_cors_origin(origin)?;
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            allowed_tokens: self.allowed_tokens.clone(),
            allow_read_no_token: self.allow_read_no_token,
            cors_origins: self.cors_origins.clone(),
            environment: self.environment.clone(),
            retention_margin_minutes: self.retention_margin_minutes,
            retention_sweep_interval_seconds: self.retention_sweep_interval_seconds,
            sweep_on_write: self.sweep_on_write,
            default_query_limit: self.default_query_limit,
            max_query_limit: self.max_query_limit,
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }

    pub fn to_db_config(&self) -> DbConfig {
        DbConfig {
            db_path: self.db_path.clone(),
        }
    }

    fn apply_cli_overrides(&mut self, overrides: &CliOverrides) {
        if let Some(db_path) = &overrides.db_path {
            self.db_path = db_path.clone();
        }
        if let Some(bind_addr) = &overrides.bind_addr {
            self.bind_addr = bind_addr.clone();
        }
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("TRIBEWATCH_BIND_ADDR") {
            self.bind_addr = value;
        }
        let port = lookup("TRIBEWATCH_PORT").or_else(|| lookup("PORT"));
        if let Some(port) = port.and_then(|value| value.trim().parse::<u16>().ok()) {
            self.bind_addr = replace_port(&self.bind_addr, port);
        }
        if let Some(value) = lookup("TRIBEWATCH_DB_PATH") {
            self.db_path = value;
        }
        if let Some(value) = lookup("TRIBEWATCH_ALLOWED_TOKENS") {
            self.allowed_tokens = parse_env_list(&value);
        }
        if let Some(value) = lookup("TRIBEWATCH_ALLOW_READ_NO_TOKEN") {
            self.allow_read_no_token = parse_env_flag(&value).unwrap_or(self.allow_read_no_token);
        }
        if let Some(value) = lookup("TRIBEWATCH_CORS_ORIGINS") {
            self.cors_origins = parse_env_list(&value);
        }
        if let Some(value) = lookup("TRIBEWATCH_ENVIRONMENT") {
            self.environment = value;
        }
        if let Some(value) = lookup("TRIBEWATCH_RETENTION_MARGIN_MINUTES") {
            self.retention_margin_minutes =
                value.trim().parse().unwrap_or(self.retention_margin_minutes);
        }
        if let Some(value) = lookup("TRIBEWATCH_RETENTION_SWEEP_INTERVAL_SECONDS") {
            self.retention_sweep_interval_seconds = value
                .trim()
                .parse()
                .unwrap_or(self.retention_sweep_interval_seconds);
        }
        if let Some(value) = lookup("TRIBEWATCH_SWEEP_ON_WRITE") {
            self.sweep_on_write = parse_env_flag(&value).unwrap_or(self.sweep_on_write);
        }
        if let Some(value) = lookup("TRIBEWATCH_DEFAULT_QUERY_LIMIT") {
            self.default_query_limit = value.trim().parse().unwrap_or(self.default_query_limit);
        }
        if let Some(value) = lookup("TRIBEWATCH_MAX_QUERY_LIMIT") {
            self.max_query_limit = value.trim().parse().unwrap_or(self.max_query_limit);
        }
        if let Some(value) = lookup("TRIBEWATCH_MAX_BODY_BYTES") {
            self.max_body_bytes = value.trim().parse().unwrap_or(self.max_body_bytes);
        }
        if let Some(value) = lookup("TRIBEWATCH_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds =
                value.trim().parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Some(value) = lookup("TRIBEWATCH_LOG_DIR") {
            self.log_dir = Some(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn overridden(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        let mut config = AppConfig::default();
        config.apply_overrides(|key| vars.get(key).cloned());
        config.normalize();
        config
    }

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().expect("defaults validate");
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.db_path, "./attacks.db");
        assert!(config.allow_read_no_token);
        assert_eq!(config.environment, "production");
    }

    #[test]
    fn parses_token_and_origin_lists_from_env() {
        let config = overridden(&[
            ("TRIBEWATCH_ALLOWED_TOKENS", "t2, t1 ,,t1"),
            ("TRIBEWATCH_CORS_ORIGINS", "Example.com, tribalwars.com.br"),
        ]);
        assert_eq!(config.allowed_tokens, vec!["t1", "t2"]);
        assert_eq!(config.cors_origins, vec!["example.com", "tribalwars.com.br"]);
        config.validate().expect("valid");
    }

    #[test]
    fn port_env_replaces_bind_port() {
        let config = overridden(&[("PORT", "9000")]);
        assert_eq!(config.bind_addr, "0.0.0.0:9000");

        let config = overridden(&[("PORT", "9000"), ("TRIBEWATCH_PORT", "9100")]);
        assert_eq!(config.bind_addr, "0.0.0.0:9100");

        let config = overridden(&[("PORT", "not-a-port")]);
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn cli_bind_wins_over_port_env() {
        let mut config = overridden(&[("PORT", "9000"), ("TRIBEWATCH_BIND_ADDR", "0.0.0.0:7000")]);
        assert_eq!(config.bind_addr, "0.0.0.0:9000");

        config.apply_cli_overrides(&CliOverrides {
            db_path: Some("cli.db".to_string()),
            bind_addr: Some("127.0.0.1:4000".to_string()),
        });
        config.normalize();
        assert_eq!(config.bind_addr, "127.0.0.1:4000");
        assert_eq!(config.db_path, "cli.db");
        config.validate().expect("valid");
    }

    #[test]
    fn parses_flags_and_numbers_from_env() {
        let config = overridden(&[
            ("TRIBEWATCH_ALLOW_READ_NO_TOKEN", "false"),
            ("TRIBEWATCH_SWEEP_ON_WRITE", "0"),
            ("TRIBEWATCH_RETENTION_MARGIN_MINUTES", "90"),
            ("TRIBEWATCH_MAX_BODY_BYTES", "oops"),
            ("TRIBEWATCH_ENVIRONMENT", " Development "),
        ]);
        assert!(!config.allow_read_no_token);
        assert!(!config.sweep_on_write);
        assert_eq!(config.retention_margin_minutes, 90);
        assert_eq!(config.max_body_bytes, 1024 * 1024);
        assert_eq!(config.environment, "development");
        assert!(config.to_runtime_config().purge_enabled());
    }

    #[test]
    fn reads_partial_toml() {
        let config = AppConfig::from_toml(
            r#"
            db_path = "data/attacks.db"
            allowed_tokens = ["t1"]
            retention_margin_minutes = 30
            "#,
        )
        .expect("parse");
        assert_eq!(config.db_path, "data/attacks.db");
        assert_eq!(config.allowed_tokens, vec!["t1"]);
        assert_eq!(config.retention_margin_minutes, 30);
        assert_eq!(config.default_query_limit, 5_000);
    }

    #[test]
    fn resolves_db_path_against_config_dir() {
        let mut config = AppConfig {
            db_path: "attacks.db".to_string(),
            log_dir: Some("logs".to_string()),
            ..AppConfig::default()
        };
        config.resolve_paths(Some(Path::new("/srv/tribewatch")));
        assert_eq!(config.db_path, "/srv/tribewatch/attacks.db");
        assert_eq!(config.log_dir.as_deref(), Some("/srv/tribewatch/logs"));

        let mut memory = AppConfig {
            db_path: ":memory:".to_string(),
            ..AppConfig::default()
        };
        memory.resolve_paths(Some(Path::new("/srv/tribewatch")));
        assert_eq!(memory.db_path, ":memory:");
    }

    #[test]
    fn rejects_invalid_settings() {
        let bad_addr = AppConfig {
            bind_addr: "nowhere".to_string(),
            ..AppConfig::default()
        };
        assert!(bad_addr.validate().is_err());

        let bad_limits = AppConfig {
            default_query_limit: 20_000,
            ..AppConfig::default()
        };
        assert!(bad_limits.validate().is_err());

        let zero_margin = AppConfig {
            retention_margin_minutes: 0,
            ..AppConfig::default()
        };
        assert!(zero_margin.validate().is_err());

        let url_origin = AppConfig {
            cors_origins: vec!["https://example.com".to_string()],
            ..AppConfig::default()
        };
        assert!(url_origin.validate().is_err());
    }
}
