// Fallback identity for attacks without a game-issued command id

use sha2::{Digest, Sha256};

use crate::value_objects::WorldId;

/// Fields hashed into the fallback identity, in hashing order.
#[derive(Debug, Clone, Copy)]
pub struct FallbackKey<'a> {
    pub attacker: Option<&'a str>,
    pub origin: Option<&'a str>,
    pub target: Option<&'a str>,
    pub attack_type: Option<&'a str>,
    pub arrival_at: i64,
}

/// Lowercase hex SHA-256 of `world|attacker|origin|target|type|arrival_at`.
///
/// Text fields are trimmed and lowercased; missing fields hash as empty
/// strings. `arrival_at` is rendered in full milliseconds.
pub fn fallback_hash(world: &WorldId, key: &FallbackKey<'_>) -> String {
    let material = [
        world.as_str().to_string(),
        fold(key.attacker),
        fold(key.origin),
        fold(key.target),
        fold(key.attack_type),
        key.arrival_at.to_string(),
    ]
    .join("|");

    let digest = Sha256::digest(material.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

fn fold(value: Option<&str>) -> String {
    value.map(|raw| raw.trim().to_lowercase()).unwrap_or_default()
}
