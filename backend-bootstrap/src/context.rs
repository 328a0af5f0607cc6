use std::sync::Arc;

use anyhow::Result;
use mockable::DefaultClock;
use tracing::info;

use backend_application::{AppState, Metrics};
use backend_domain::AttackRepository;
use backend_infrastructure::{AppConfig, SqliteAttackRepository};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let runtime_config = config.to_runtime_config();
        let db_config = config.to_db_config();

        let repo = Arc::new(SqliteAttackRepository::open(&db_config)?);
        repo.ensure_schema().await?;
        info!(
            db_path = %db_config.db_path,
            environment = %runtime_config.environment,
            tokens = runtime_config.allowed_tokens.len(),
            "attack store ready"
        );

        let state = AppState {
            config: runtime_config,
            attack_repo: repo,
            clock: Arc::new(DefaultClock),
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self { state })
    }
}
