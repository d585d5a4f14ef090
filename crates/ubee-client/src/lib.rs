pub mod extractor;
pub mod fetcher;

pub use extractor::ScraperExtractor;
pub use fetcher::{ModemSession, ReqwestPageFetcher};
