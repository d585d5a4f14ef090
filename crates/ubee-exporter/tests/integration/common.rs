use std::sync::Arc;
use std::time::Duration;

use axum::Router;

use ubee_core::ScrapeService;
use ubee_core::models::Credentials;
use ubee_core::testutil::{MockExtractor, MockPageFetcher};
use ubee_exporter::config::ExporterConfig;
use ubee_exporter::routes;
use ubee_exporter::state::AppState;

pub const METRICS_PATH: &str = "/metrics";

pub struct TestApp {
    pub router: Router,
    pub fetcher: MockPageFetcher,
}

pub fn test_config(metrics_path: &str) -> ExporterConfig {
    ExporterConfig {
        modem_address: "192.168.178.1".into(),
        credentials: Credentials::new("admin", "password"),
        listen_address: "127.0.0.1:0".parse().unwrap(),
        metrics_path: metrics_path.into(),
        timeout: Duration::from_secs(5),
    }
}

/// Router backed by the given mock fetcher, serving metrics at `metrics_path`.
pub fn setup_test_app_with(fetcher: MockPageFetcher, metrics_path: &str) -> TestApp {
    let state = Arc::new(AppState {
        service: ScrapeService::new(fetcher.clone(), MockExtractor),
        config: test_config(metrics_path),
    });

    TestApp {
        router: routes::router(state),
        fetcher,
    }
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with(MockPageFetcher::with_default_pages(), METRICS_PATH)
}

/// Sample lines of the metric `name`, without HELP/TYPE comments.
pub fn samples<'a>(text: &'a str, name: &str) -> Vec<&'a str> {
    text.lines()
        .filter(|l| {
            l.strip_prefix(name)
                .is_some_and(|rest| rest.starts_with('{') || rest.starts_with(' '))
        })
        .collect()
}
