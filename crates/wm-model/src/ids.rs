use std::sync::atomic::{AtomicU64, Ordering};

/// Issues creation-timestamp ids (milliseconds since the epoch).
///
/// Ids are strictly increasing per generator, so two records created within
/// the same clock tick still get distinct ids.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self, floor: u64) -> String {
        self.next_at(now_ms(), floor)
    }

    /// Next id at `now_ms`, greater than both the last issued id and `floor`.
    pub fn next_at(&self, now_ms: u64, floor: u64) -> String {
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now_ms.max(prev + 1).max(floor + 1);
            match self
                .last
                .compare_exchange(prev, candidate, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return candidate.to_string(),
                Err(actual) => prev = actual,
            }
        }
    }
}

/// Largest numeric id among `ids`, 0 when none parse.
pub fn max_numeric_id<'a>(ids: impl IntoIterator<Item = &'a str>) -> u64 {
    ids.into_iter()
        .filter_map(|id| id.parse::<u64>().ok())
        .max()
        .unwrap_or(0)
}

/// Current UTC time in milliseconds; 0 for clocks set before the epoch.
pub fn now_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_tick_ids_do_not_collide() {
        let ids = IdGenerator::new();
        let a = ids.next_at(1_700_000_000_000, 0);
        let b = ids.next_at(1_700_000_000_000, 0);
        assert_eq!(a, "1700000000000");
        assert_eq!(b, "1700000000001");
    }

    #[test]
    fn floor_skips_past_existing_ids() {
        let ids = IdGenerator::new();
        let existing = max_numeric_id(["1700000000005", "legacy", "1700000000002"]);
        assert_eq!(existing, 1_700_000_000_005);
        assert_eq!(ids.next_at(1_700_000_000_000, existing), "1700000000006");
    }

    #[test]
    fn wall_clock_ids_are_epoch_milliseconds() {
        let before = chrono::Utc::now().timestamp_millis();
        let id: i64 = IdGenerator::new().next(0).parse().unwrap();
        assert!(id >= before);
        assert!(id < before + 60_000);
    }
}
