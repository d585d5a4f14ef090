use ubee_core::ScrapeService;
use ubee_core::traits::{Extractor, PageFetcher};

use crate::config::ExporterConfig;

/// Shared application state, available to all route handlers via `State<Arc<AppState<..>>>`.
pub struct AppState<F, E>
where
    F: PageFetcher,
    E: Extractor,
{
    pub service: ScrapeService<F, E>,
    pub config: ExporterConfig,
}
