use std::future::Future;

use crate::error::AppError;
use crate::models::{Credentials, Measurements, Page, Section};

/// Logs into the modem and downloads its pages.
pub trait PageFetcher: Send + Sync {
    /// Authenticated client state, alive for a single scrape.
    type Session: Send + Sync;

    fn authenticate(
        &self,
        address: &str,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<Self::Session, AppError>> + Send;

    /// Returns the raw HTML of `page`.
    fn fetch(
        &self,
        session: &Self::Session,
        page: Page,
    ) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Reads measurements out of a fetched page.
///
/// Parsing and extraction are synchronous; the parsed document never
/// lives across an `.await`.
pub trait Extractor: Send + Sync {
    type Document;

    fn parse(&self, html: &str) -> Self::Document;

    /// Labels of the navigation tabs the page marks as current.
    fn current_tabs(&self, doc: &Self::Document) -> Vec<String>;

    /// Append the measurements of `section` found in `doc` to `out`.
    fn extract(&self, doc: &Self::Document, section: Section, out: &mut Measurements);
}
