use std::io::Read;

use anyhow::{anyhow, Result};
use axum::extract::Request;
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use flate2::read::GzDecoder;

use backend_domain::{AttackBatch, RuntimeConfig};

use crate::error::HttpError;

pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Token presented by the caller, if any. Inserted for every request by
/// [`extract_caller_token`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerToken(pub Option<String>);

impl CallerToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

pub async fn extract_caller_token(mut request: Request, next: Next) -> Response {
    let token = token_from_headers(request.headers());
    request.extensions_mut().insert(CallerToken(token));
    next.run(request).await
}

pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTH_TOKEN_HEADER)?.to_str().ok()?.trim();
    if value.is_empty() {
        return None;
    }
    Some(value.to_string())
}

pub fn authorize_write(config: &RuntimeConfig, caller: &CallerToken) -> Result<(), HttpError> {
    if config.write_authorized(caller.as_deref()) {
        Ok(())
    } else {
        Err(HttpError::Unauthorized)
    }
}

pub fn authorize_read(config: &RuntimeConfig, caller: &CallerToken) -> Result<(), HttpError> {
    if config.read_authorized(caller.as_deref()) {
        Ok(())
    } else {
        Err(HttpError::Unauthorized)
    }
}

pub fn parse_batch(headers: &HeaderMap, body: &[u8], max_bytes: u64) -> Result<AttackBatch> {
    let content = maybe_gunzip(headers, body, max_bytes)?;
    let batch: AttackBatch = serde_json::from_slice(&content)?;
    Ok(batch)
}

fn maybe_gunzip(headers: &HeaderMap, body: &[u8], max_bytes: u64) -> Result<Vec<u8>> {
    let gzipped = headers
        .get(header::CONTENT_ENCODING)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().eq_ignore_ascii_case("gzip"))
        .unwrap_or(false);
    if !gzipped {
        return Ok(body.to_vec());
    }
    let mut out = Vec::new();
    GzDecoder::new(body)
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut out)?;
    if out.len() as u64 > max_bytes {
        return Err(anyhow!("decompressed body exceeds {} bytes", max_bytes));
    }
    Ok(out)
}
