use std::sync::atomic::{AtomicU64, Ordering};

/// Scrape-level counters owned by a [`ScrapeService`](crate::ScrapeService).
///
/// A scrape bumps `total` before it can record any error, so a snapshot
/// never shows more errors than scrapes.
#[derive(Debug, Default)]
pub struct ScrapeCounters {
    total: AtomicU64,
    errors: AtomicU64,
    field_errors: AtomicU64,
}

/// Point-in-time copy of [`ScrapeCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub total_scrapes: u64,
    pub scrape_errors: u64,
    pub field_errors: u64,
}

impl ScrapeCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_total(&self) {
        self.total.fetch_add(1, Ordering::Release);
    }

    pub fn inc_errors(&self) {
        self.errors.fetch_add(1, Ordering::Release);
    }

    pub fn add_field_errors(&self, n: u64) {
        self.field_errors.fetch_add(n, Ordering::Release);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        // Errors first, total last: every error acquired here was preceded
        // by its scrape's total increment, which the later load must see.
        let scrape_errors = self.errors.load(Ordering::Acquire);
        let field_errors = self.field_errors.load(Ordering::Acquire);
        let total_scrapes = self.total.load(Ordering::Acquire);
        CounterSnapshot {
            total_scrapes,
            scrape_errors,
            field_errors,
        }
    }
}
