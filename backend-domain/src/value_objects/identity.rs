// Record identity within a world

use serde::{Deserialize, Serialize};

/// How a stored attack is identified inside its world.
///
/// A game-issued command id always wins. Rows without one fall back to a
/// content hash, and the two namespaces never collide because the stored
/// key carries a prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackIdentity {
    Command(String),
    Fallback(String),
}

impl AttackIdentity {
    pub fn storage_key(&self) -> String {
        match self {
            AttackIdentity::Command(id) => format!("cmd:{id}"),
            AttackIdentity::Fallback(hash) => format!("hash:{hash}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_keys_are_namespaced() {
        let command = AttackIdentity::Command("abc".to_string());
        let fallback = AttackIdentity::Fallback("abc".to_string());
        assert_eq!(command.storage_key(), "cmd:abc");
        assert_eq!(fallback.storage_key(), "hash:abc");
        assert_ne!(command.storage_key(), fallback.storage_key());
    }
}
