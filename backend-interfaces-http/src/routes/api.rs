use axum::routing::get;
use axum::{middleware, Router};

use backend_application::AppState;

use crate::handlers::{ingest_handlers, ops_handlers, query_handlers};
use crate::middleware::extract_caller_token;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/attacks",
            get(query_handlers::list_attacks)
                .post(ingest_handlers::ingest_attacks)
                .delete(query_handlers::purge_attacks),
        )
        .route(
            "/api/attacks",
            get(query_handlers::list_attacks)
                .post(ingest_handlers::ingest_attacks)
                .delete(query_handlers::purge_attacks),
        )
        .route("/health", get(ops_handlers::health_live))
        .route("/health/ready", get(ops_handlers::health_ready))
        .route("/metrics/prometheus", get(ops_handlers::metrics_prometheus))
        .layer(middleware::from_fn(extract_caller_token))
        .with_state(state)
}
