// Query and response DTOs

use serde::{Deserialize, Serialize};

use crate::entities::AttackRecord;
use crate::utils::lenient_integer;

/// Query string of `GET /attacks`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttackQuery {
    #[serde(default)]
    pub world: Option<String>,
    #[serde(default, alias = "min_eta_minutes", deserialize_with = "lenient_integer")]
    pub min_eta_min: Option<i64>,
    #[serde(default, alias = "since_ms", deserialize_with = "lenient_integer")]
    pub since: Option<i64>,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub limit: Option<i64>,
    #[serde(default)]
    pub attacker: Option<String>,
    #[serde(default, rename = "type", alias = "tipo_ataque")]
    pub attack_type: Option<String>,
}

/// Storage-level filter derived from an [`AttackQuery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackFilter {
    pub world: String,
    pub arrival_before: Option<i64>,
    pub updated_since: Option<i64>,
    pub attacker: Option<String>,
    pub attack_type: Option<String>,
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub ok: bool,
    pub inserted: usize,
    pub updated: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackListResponse {
    pub world: String,
    pub count: usize,
    pub attacks: Vec<AttackRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurgeResponse {
    pub ok: bool,
    pub deleted: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PurgeQuery {
    #[serde(default)]
    pub world: Option<String>,
}
