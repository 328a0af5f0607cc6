use std::sync::atomic::{AtomicU64, Ordering};

use backend_domain::UpsertOutcome;

#[derive(Debug, Default)]
pub struct Metrics {
    ingest_requests: AtomicU64,
    attacks_inserted: AtomicU64,
    attacks_updated: AtomicU64,
    ingest_errors: AtomicU64,
    query_requests: AtomicU64,
    attacks_swept: AtomicU64,
}

impl Metrics {
    pub fn record_ingest(&self, outcome: UpsertOutcome) {
        self.ingest_requests.fetch_add(1, Ordering::Relaxed);
        self.attacks_inserted
            .fetch_add(outcome.inserted as u64, Ordering::Relaxed);
        self.attacks_updated
            .fetch_add(outcome.updated as u64, Ordering::Relaxed);
    }

    pub fn record_ingest_error(&self) {
        self.ingest_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_query(&self) {
        self.query_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_swept(&self, count: u64) {
        self.attacks_swept.fetch_add(count, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let requests = self.ingest_requests.load(Ordering::Relaxed);
        let inserted = self.attacks_inserted.load(Ordering::Relaxed);
        let updated = self.attacks_updated.load(Ordering::Relaxed);
        let errors = self.ingest_errors.load(Ordering::Relaxed);
        let queries = self.query_requests.load(Ordering::Relaxed);
        let swept = self.attacks_swept.load(Ordering::Relaxed);

        format!(
            "# TYPE tribewatch_ingest_requests_total counter\n\
tribewatch_ingest_requests_total {}\n\
# TYPE tribewatch_attacks_inserted_total counter\n\
tribewatch_attacks_inserted_total {}\n\
# TYPE tribewatch_attacks_updated_total counter\n\
tribewatch_attacks_updated_total {}\n\
# TYPE tribewatch_ingest_errors_total counter\n\
tribewatch_ingest_errors_total {}\n\
# TYPE tribewatch_query_requests_total counter\n\
tribewatch_query_requests_total {}\n\
# TYPE tribewatch_attacks_swept_total counter\n\
tribewatch_attacks_swept_total {}\n",
            requests, inserted, updated, errors, queries, swept
        )
    }
}
