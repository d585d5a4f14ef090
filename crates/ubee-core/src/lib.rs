pub mod decode;
pub mod error;
pub mod layout;
pub mod login;
pub mod models;
pub mod scrape;
pub mod stats;
pub mod traits;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use error::AppError;
pub use models::{
    ChannelMeasurement, CounterKind, CounterMeasurement, Credentials, Measurements, Page,
    ScrapeResult, ScrapeStatus, Section, UptimeInfo,
};
pub use scrape::ScrapeService;
pub use stats::{CounterSnapshot, ScrapeCounters};
pub use traits::{Extractor, PageFetcher};
