// Normalization of producer rows into upsertable attacks

use crate::entities::{NewAttack, RawAttack};
use crate::services::fingerprint::{fallback_hash, FallbackKey};
use crate::utils::normalize_optional_text;
use crate::value_objects::{AttackIdentity, WorldId};

const SERVER_SOURCE: &str = "srv";
const TOKEN_SOURCE_PREFIX_LEN: usize = 6;

/// Provenance used when a row does not name its own source.
pub fn default_source(caller_token: Option<&str>) -> String {
    match caller_token.map(str::trim).filter(|token| !token.is_empty()) {
        Some(token) => {
            let prefix: String = token.chars().take(TOKEN_SOURCE_PREFIX_LEN).collect();
            format!("user:{prefix}")
        }
        None => SERVER_SOURCE.to_string(),
    }
}

pub fn prepare_attack(
    world: &WorldId,
    raw: RawAttack,
    caller_token: Option<&str>,
    now_ms: i64,
) -> NewAttack {
    let command_id = normalize_optional_text(raw.command_id);
    let attacker = normalize_optional_text(raw.attacker);
    let defender = normalize_optional_text(raw.defender);
    let origin = normalize_optional_text(raw.origin);
    let target = normalize_optional_text(raw.target);
    let attack_type =
        normalize_optional_text(raw.attack_type).or_else(|| normalize_optional_text(raw.unit));
    let distance = normalize_optional_text(raw.distance);
    let arrival_text = normalize_optional_text(raw.arrival_text);
    let arrival_at = raw.arrival_at.unwrap_or(now_ms);
    let captured_at = raw.captured_at.unwrap_or(now_ms);
    let source = normalize_optional_text(raw.source).unwrap_or_else(|| default_source(caller_token));

    let content_hash = fallback_hash(
        world,
        &FallbackKey {
            attacker: attacker.as_deref(),
            origin: origin.as_deref(),
            target: target.as_deref(),
            attack_type: attack_type.as_deref(),
            arrival_at,
        },
    );
    let identity = match &command_id {
        Some(id) => AttackIdentity::Command(id.clone()),
        None => AttackIdentity::Fallback(content_hash.clone()),
    };

    NewAttack {
        identity,
        command_id,
        content_hash,
        attacker,
        defender,
        origin,
        target,
        attack_type,
        distance,
        arrival_text,
        arrival_at,
        source,
        captured_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> WorldId {
        WorldId::parse("br1").expect("world")
    }

    #[test]
    fn command_id_takes_precedence_over_hash() {
        let raw = RawAttack {
            command_id: Some(" c1 ".to_string()),
            attacker: Some("A".to_string()),
            arrival_at: Some(1000),
            ..RawAttack::default()
        };
        let attack = prepare_attack(&world(), raw, None, 5);
        assert_eq!(attack.identity, AttackIdentity::Command("c1".to_string()));
        assert_eq!(attack.command_id.as_deref(), Some("c1"));
        assert_eq!(attack.content_hash.len(), 64);
    }

    #[test]
    fn blank_command_id_falls_back_to_hash() {
        let raw = RawAttack {
            command_id: Some("   ".to_string()),
            attacker: Some("A".to_string()),
            arrival_at: Some(1000),
            ..RawAttack::default()
        };
        let attack = prepare_attack(&world(), raw, None, 5);
        assert!(attack.command_id.is_none());
        assert_eq!(
            attack.identity,
            AttackIdentity::Fallback(attack.content_hash.clone())
        );
    }

    #[test]
    fn missing_timestamps_default_to_now() {
        let attack = prepare_attack(&world(), RawAttack::default(), None, 42);
        assert_eq!(attack.arrival_at, 42);
        assert_eq!(attack.captured_at, 42);
        assert!(attack.attacker.is_none());
        assert!(attack.attack_type.is_none());
    }

    #[test]
    fn source_defaults_to_token_prefix_or_server() {
        assert_eq!(default_source(Some("abcdefghij")), "user:abcdef");
        assert_eq!(default_source(Some("t1")), "user:t1");
        assert_eq!(default_source(Some("  ")), "srv");
        assert_eq!(default_source(None), "srv");
    }

    #[test]
    fn explicit_source_wins() {
        let raw = RawAttack {
            source: Some("scout-42".to_string()),
            ..RawAttack::default()
        };
        let attack = prepare_attack(&world(), raw, Some("token123"), 1);
        assert_eq!(attack.source, "scout-42");
    }

    #[test]
    fn unit_label_fills_missing_type() {
        let raw: RawAttack =
            serde_json::from_str(r#"{"unidade":"snob","arrival_at":1000}"#).expect("raw attack");
        let attack = prepare_attack(&world(), raw, None, 1);
        assert_eq!(attack.attack_type.as_deref(), Some("snob"));

        let raw: RawAttack = serde_json::from_str(
            r#"{"tipo_ataque":"attack_large","unidade":"ram","arrival_at":1000}"#,
        )
        .expect("raw attack");
        let attack = prepare_attack(&world(), raw, None, 1);
        assert_eq!(attack.attack_type.as_deref(), Some("attack_large"));
    }
}
