use std::path::Path;

/// Path to the in-memory SQLite database; never resolved against a directory.
pub const IN_MEMORY_DB_PATH: &str = ":memory:";

pub fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == IN_MEMORY_DB_PATH {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}

pub fn parse_env_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}

pub fn normalize_list(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = values
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

/// Accepts the usual spellings of a boolean environment flag.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Replaces the port of a `host:port` bind address.
pub fn replace_port(bind_addr: &str, port: u16) -> String {
    match bind_addr.trim().rsplit_once(':') {
        Some((host, _)) if !host.is_empty() => format!("{host}:{port}"),
        _ => format!("0.0.0.0:{port}"),
    }
}
