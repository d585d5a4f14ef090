use std::collections::HashSet;

use tokio::sync::Mutex;

use crate::error::AppError;
use crate::models::{Credentials, Measurements, Page, ScrapeResult, Section};
use crate::stats::ScrapeCounters;
use crate::traits::{Extractor, PageFetcher};

/// Orchestrates one modem scrape: login → fetch pages → extract → merge.
///
/// Generic over the HTTP side and the HTML side so the pipeline can be
/// tested without a modem. Scrapes on the same service are serialized;
/// the modem does not cope with overlapping logins.
pub struct ScrapeService<F, E>
where
    F: PageFetcher,
    E: Extractor,
{
    fetcher: F,
    extractor: E,
    counters: ScrapeCounters,
    lock: Mutex<()>,
}

impl<F, E> ScrapeService<F, E>
where
    F: PageFetcher,
    E: Extractor,
{
    pub fn new(fetcher: F, extractor: E) -> Self {
        Self {
            fetcher,
            extractor,
            counters: ScrapeCounters::new(),
            lock: Mutex::new(()),
        }
    }

    pub fn counters(&self) -> &ScrapeCounters {
        &self.counters
    }

    /// Run a full scrape of the modem at `address`.
    ///
    /// Never fails as a call: transport, authentication and protocol
    /// errors are returned in the result's status and counted once.
    /// Measurements from pages fetched before the failure are dropped.
    pub async fn scrape(&self, address: &str, credentials: &Credentials) -> ScrapeResult {
        let _guard = self.lock.lock().await;
        self.counters.inc_total();

        tracing::info!(%address, "Scraping modem");

        match self.run(address, credentials).await {
            Ok(measurements) => {
                self.counters
                    .add_field_errors(measurements.field_errors.len() as u64);
                tracing::info!(
                    channels = measurements.channels.len(),
                    counters = measurements.counters.len(),
                    uptime = ?measurements.uptime.uptime,
                    firmware = ?measurements.uptime.firmware,
                    field_errors = measurements.field_errors.len(),
                    "Scrape complete"
                );
                ScrapeResult::success(measurements)
            }
            Err(e) => {
                self.counters.inc_errors();
                tracing::warn!(%address, error_kind = e.kind(), error = %e, "Scrape failed");
                ScrapeResult::failed(e)
            }
        }
    }

    async fn run(&self, address: &str, credentials: &Credentials) -> Result<Measurements, AppError> {
        // The session is dropped at the end of this call, whatever the outcome.
        let session = self.fetcher.authenticate(address, credentials).await?;
        tracing::debug!(%address, "Logged in");

        let mut measurements = Measurements::default();
        let mut seen = HashSet::new();
        for page in Page::ALL {
            let html = self.fetcher.fetch(&session, page).await?;
            tracing::debug!(%page, bytes = html.len(), "Fetched page");
            self.absorb_page(page, &html, &mut measurements, &mut seen);
        }

        Ok(measurements)
    }

    /// Extract whatever sections `html` renders as current into `out`.
    ///
    /// Results are appended as-is: a section reported by two pages shows
    /// up twice. `seen` tracks sections already extracted in this scrape
    /// so repeats can be logged.
    fn absorb_page(
        &self,
        page: Page,
        html: &str,
        out: &mut Measurements,
        seen: &mut HashSet<Section>,
    ) {
        let doc = self.extractor.parse(html);
        let tabs = self.extractor.current_tabs(&doc);
        if tabs.is_empty() {
            tracing::warn!(%page, "Page has no current tab");
        }

        let errors_before = out.field_errors.len();
        for tab in tabs {
            match Section::from_tab_label(&tab) {
                Some(section) => {
                    if !seen.insert(section) {
                        tracing::warn!(%page, %section, "Section already extracted, keeping both");
                    }
                    tracing::debug!(%page, %section, "Extracting section");
                    self.extractor.extract(&doc, section, out);
                }
                None => tracing::debug!(%page, tab = %tab, "Ignoring unknown tab"),
            }
        }

        for err in &out.field_errors[errors_before..] {
            tracing::warn!(
                %page,
                field = %err.field,
                column = ?err.column,
                text = %err.text,
                expected = err.expected,
                "Could not decode field, using zero value"
            );
        }
    }
}
