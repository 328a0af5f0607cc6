// Attack entities
// Incoming-attack rows as reported by producers and as stored

use serde::{Deserialize, Serialize};

use crate::utils::{lenient_millis, lenient_text};
use crate::value_objects::AttackIdentity;

/// One attack row as sent by a producer. Every field is optional; the
/// userscript's original field names are accepted as aliases.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAttack {
    #[serde(default, alias = "commandId", deserialize_with = "lenient_text")]
    pub command_id: Option<String>,
    #[serde(default, alias = "jogadorNome", deserialize_with = "lenient_text")]
    pub attacker: Option<String>,
    #[serde(default, alias = "jogador", deserialize_with = "lenient_text")]
    pub defender: Option<String>,
    #[serde(default, alias = "origemNome", deserialize_with = "lenient_text")]
    pub origin: Option<String>,
    #[serde(default, alias = "destinoNome", deserialize_with = "lenient_text")]
    pub target: Option<String>,
    #[serde(
        default,
        rename = "type",
        alias = "tipo_ataque",
        deserialize_with = "lenient_text"
    )]
    pub attack_type: Option<String>,
    /// Slowest unit label. Stands in for `type` when no classification is sent.
    #[serde(default, alias = "unidade", deserialize_with = "lenient_text")]
    pub unit: Option<String>,
    #[serde(default, alias = "distancia", deserialize_with = "lenient_text")]
    pub distance: Option<String>,
    #[serde(default, alias = "chegada", deserialize_with = "lenient_text")]
    pub arrival_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_millis")]
    pub arrival_at: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient_millis")]
    pub captured_at: Option<i64>,
}

/// Request body of `POST /attacks`.
#[derive(Debug, Clone, Deserialize)]
pub struct AttackBatch {
    #[serde(default, deserialize_with = "lenient_text")]
    pub world: Option<String>,
    #[serde(default)]
    pub attacks: Option<Vec<RawAttack>>,
}

/// A normalized attack ready to be upserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttack {
    pub identity: AttackIdentity,
    pub command_id: Option<String>,
    pub content_hash: String,
    pub attacker: Option<String>,
    pub defender: Option<String>,
    pub origin: Option<String>,
    pub target: Option<String>,
    pub attack_type: Option<String>,
    pub distance: Option<String>,
    pub arrival_text: Option<String>,
    pub arrival_at: i64,
    pub source: String,
    pub captured_at: i64,
}

/// A stored attack as returned to readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRecord {
    pub world: String,
    pub command_id: Option<String>,
    pub attacker: Option<String>,
    pub defender: Option<String>,
    pub origin: Option<String>,
    pub target: Option<String>,
    #[serde(rename = "type")]
    pub attack_type: Option<String>,
    pub distance: Option<String>,
    pub arrival_text: Option<String>,
    pub arrival_at: i64,
    pub source: Option<String>,
    pub captured_at: i64,
    pub created_at: i64,
    pub updated_at: i64,
    pub last_seen_at: i64,
}

/// Exact insert/update split of one applied batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertOutcome {
    pub inserted: usize,
    pub updated: usize,
}
