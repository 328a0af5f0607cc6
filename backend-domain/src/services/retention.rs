// Retention policy for expired attacks

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Attacks are kept for `margin` past their arrival so a producer whose clock
/// runs behind the server does not see rows vanish early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    margin_ms: i64,
}

impl RetentionPolicy {
    pub fn from_minutes(minutes: u64) -> Self {
        let minutes = i64::try_from(minutes).unwrap_or(i64::MAX);
        Self {
            margin_ms: minutes.saturating_mul(MILLIS_PER_MINUTE),
        }
    }

    pub fn margin_ms(&self) -> i64 {
        self.margin_ms
    }

    /// Rows arriving strictly before this instant are expired. Never later
    /// than `now_ms`, so future arrivals are always kept.
    pub fn cutoff(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.margin_ms)
    }

    pub fn is_expired(&self, arrival_at: i64, now_ms: i64) -> bool {
        arrival_at < self.cutoff(now_ms)
    }
}
