use tracing::warn;

use crate::{AppError, AppState};
use backend_domain::{PurgeQuery, WorldId};

/// Administrative wipe. Only available in the development environment; in
/// any other environment the target does not exist.
pub async fn purge_attacks(state: &AppState, query: PurgeQuery) -> Result<u64, AppError> {
    if !state.config.purge_enabled() {
        return Err(AppError::NotFound(
            "purge is only available in development".to_string(),
        ));
    }
    let world = match query.world {
        Some(raw) => Some(
            WorldId::parse(&raw)
                .ok_or_else(|| AppError::BadRequest("world must not be empty".to_string()))?,
        ),
        None => None,
    };
    let deleted = state.attack_repo.purge(world.as_ref()).await?;
    warn!(
        world = world.as_ref().map(WorldId::as_str).unwrap_or("<all>"),
        deleted,
        "attacks purged"
    );
    Ok(deleted)
}
