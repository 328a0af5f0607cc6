use std::sync::Arc;

use backend_domain::ports::AttackRepository;
use backend_domain::RuntimeConfig;
use mockable::Clock;

use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub attack_repo: Arc<dyn AttackRepository>,
    pub clock: Arc<dyn Clock + Send + Sync>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn now_millis(&self) -> i64 {
        self.clock.utc().timestamp_millis()
    }
}
