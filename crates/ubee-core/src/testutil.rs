//! Test utilities: mock implementations of the core traits.
//!
//! Handwritten mocks for dependency injection in unit tests. The fetcher
//! records every login and page fetch so tests can assert on ordering.
//!
//! Mock pages are plain text made of whitespace-separated tokens:
//! `tab:<Label>` marks a tab as current, `bad` produces one field error
//! when the Docsis section is extracted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::decode::{Field, FieldError};
use crate::error::AppError;
use crate::models::{
    ChannelMeasurement, CounterKind, CounterMeasurement, Credentials, DownstreamChannel,
    Measurements, Page, Section,
};
use crate::traits::{Extractor, PageFetcher};

pub const MOCK_UPTIME_SECS: u64 = 94_973;
pub const MOCK_FIRMWARE: &str = "UVW3200-BC-1.0.0";

// ---------------------------------------------------------------------------
// MockPageFetcher
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Every login attempt fails with a network error.
    Unreachable,
    /// Every login attempt is rejected.
    BadCredentials,
    /// Login works but fetching this page returns HTTP 500.
    PageError(Page),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    Login { session: usize },
    Fetch { session: usize, page: Page },
}

impl FetchEvent {
    pub fn session(&self) -> usize {
        match self {
            FetchEvent::Login { session } | FetchEvent::Fetch { session, .. } => *session,
        }
    }
}

/// Mock fetcher serving canned pages. Each login opens a new numbered session.
#[derive(Clone)]
pub struct MockPageFetcher {
    pages: Arc<HashMap<Page, String>>,
    failure: Option<MockFailure>,
    delay: Duration,
    next_session: Arc<AtomicUsize>,
    events: Arc<Mutex<Vec<FetchEvent>>>,
}

impl MockPageFetcher {
    pub fn with_pages<const N: usize>(pages: [(Page, &str); N]) -> Self {
        Self {
            pages: Arc::new(
                pages
                    .into_iter()
                    .map(|(page, body)| (page, body.to_string()))
                    .collect(),
            ),
            failure: None,
            delay: Duration::ZERO,
            next_session: Arc::new(AtomicUsize::new(0)),
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Each page marks the section matching its URL as current.
    pub fn with_default_pages() -> Self {
        Self::with_pages([
            (Page::DocsisStatus, "tab:Docsis"),
            (Page::BasicStatus, "tab:Status"),
            (Page::Firmware, "tab:Firmware"),
        ])
    }

    pub fn failing(failure: MockFailure) -> Self {
        let mut fetcher = Self::with_default_pages();
        fetcher.failure = Some(failure);
        fetcher
    }

    /// Sleep this long inside every call, to give concurrent callers a
    /// chance to interleave.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn events(&self) -> Vec<FetchEvent> {
        self.events.lock().unwrap().clone()
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

impl PageFetcher for MockPageFetcher {
    type Session = usize;

    async fn authenticate(
        &self,
        address: &str,
        _credentials: &Credentials,
    ) -> Result<usize, AppError> {
        self.pause().await;
        match self.failure {
            Some(MockFailure::Unreachable) => {
                return Err(AppError::NetworkError(format!(
                    "Connection failed: {address} unreachable"
                )));
            }
            Some(MockFailure::BadCredentials) => {
                return Err(AppError::AuthenticationFailed("login failed".into()));
            }
            _ => {}
        }

        let session = self.next_session.fetch_add(1, Ordering::SeqCst);
        self.events
            .lock()
            .unwrap()
            .push(FetchEvent::Login { session });
        Ok(session)
    }

    async fn fetch(&self, session: &usize, page: Page) -> Result<String, AppError> {
        self.pause().await;
        if self.failure == Some(MockFailure::PageError(page)) {
            return Err(AppError::HttpError(format!("HTTP 500 for {page}")));
        }

        self.events.lock().unwrap().push(FetchEvent::Fetch {
            session: *session,
            page,
        });
        Ok(self.pages.get(&page).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// MockExtractor
// ---------------------------------------------------------------------------

/// Mock extractor over the token format described in the module docs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockExtractor;

impl Extractor for MockExtractor {
    type Document = String;

    fn parse(&self, html: &str) -> String {
        html.to_string()
    }

    fn current_tabs(&self, doc: &String) -> Vec<String> {
        doc.split_whitespace()
            .filter_map(|token| token.strip_prefix("tab:"))
            .map(str::to_string)
            .collect()
    }

    fn extract(&self, doc: &String, section: Section, out: &mut Measurements) {
        match section {
            Section::Docsis => {
                out.channels
                    .push(ChannelMeasurement::Downstream(DownstreamChannel {
                        channel: "1".into(),
                        lock_status: "Locked".into(),
                        modulation: "QAM256".into(),
                        frequency: "602.00 Mhz".into(),
                        snr_db: 38.5,
                        power_dbmv: 2.1,
                    }));
                out.counters.push(CounterMeasurement {
                    kind: CounterKind::CorrectableErrors,
                    name: None,
                    value: 12,
                });
                for _ in doc.split_whitespace().filter(|t| *t == "bad") {
                    out.field_errors.push(FieldError {
                        field: Field::Power,
                        column: Some(4),
                        text: "n/a".into(),
                        expected: "<number> dBmV",
                    });
                }
            }
            Section::Status => {
                out.uptime.uptime = Some(Duration::from_secs(MOCK_UPTIME_SECS));
            }
            Section::Firmware => {
                out.uptime.firmware = Some(MOCK_FIRMWARE.to_string());
            }
        }
    }
}
