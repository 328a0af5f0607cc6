use axum::http::request::Parts;
use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use url::Url;

use backend_domain::RuntimeConfig;

/// Empty origin list allows every origin. Otherwise an origin passes when
/// its host equals an entry or is a subdomain of one.
pub fn build_cors_layer(config: &RuntimeConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.cors_origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let suffixes = config.cors_origins.clone();
    layer.allow_origin(AllowOrigin::predicate(
        move |origin: &HeaderValue, _parts: &Parts| {
            origin
                .to_str()
                .map(|origin| origin_allowed(&suffixes, origin))
                .unwrap_or(false)
        },
    ))
}

pub fn origin_allowed(suffixes: &[String], origin: &str) -> bool {
    let Ok(origin) = Url::parse(origin) else {
        return false;
    };
    let Some(host) = origin.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    suffixes.iter().any(|suffix| {
        let suffix = suffix.trim().to_ascii_lowercase();
        !suffix.is_empty()
            && (host == suffix
                || host
                    .strip_suffix(suffix.as_str())
                    .map(|rest| rest.ends_with('.'))
                    .unwrap_or(false))
    })
}
