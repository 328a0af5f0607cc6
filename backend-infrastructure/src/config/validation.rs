use anyhow::{anyhow, Result};

/// CORS entries are bare host suffixes such as `example.com`.
pub fn validate_cors_origin(value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(anyhow!("cors origin is empty"));
    }
    if value.contains("://") || value.contains('/') {
        return Err(anyhow!("cors origin must be a host suffix, got {value}"));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(anyhow!("cors origin must not contain whitespace"));
    }
    Ok(())
}

pub fn validate_token(value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(anyhow!("token is empty"));
    }
    if value.chars().any(|ch| ch.is_whitespace() || ch.is_control()) {
        return Err(anyhow!("token must be a single header-safe word"));
    }
    Ok(())
}
