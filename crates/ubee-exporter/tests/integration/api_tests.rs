use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use ubee_core::testutil::{MOCK_FIRMWARE, MOCK_UPTIME_SECS, MockFailure, MockPageFetcher};

use crate::integration::common::{METRICS_PATH, samples, setup_test_app, setup_test_app_with};

async fn get(router: axum::Router, path: &str) -> (StatusCode, axum::http::HeaderMap, String) {
    let response = router
        .oneshot(Request::get(path).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn health_returns_200() {
    let app = setup_test_app();

    let (status, _, body) = get(app.router, "/health").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert!(app.fetcher.events().is_empty());
}

#[tokio::test]
async fn root_redirects_to_metrics() {
    let app = setup_test_app();

    let (status, headers, _) = get(app.router, "/").await;

    assert_eq!(status, StatusCode::MOVED_PERMANENTLY);
    assert_eq!(headers[header::LOCATION], METRICS_PATH);
}

#[tokio::test]
async fn metrics_scrapes_and_renders() {
    let app = setup_test_app();

    let (status, headers, body) = get(app.router, METRICS_PATH).await;

    assert_eq!(status, StatusCode::OK);
    assert!(
        headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain")
    );

    assert_eq!(
        samples(&body, "ubee_uvw320b_status_scrapes_total"),
        ["ubee_uvw320b_status_scrapes_total 1"]
    );
    assert_eq!(
        samples(&body, "ubee_uvw320b_status_scrape_errors_total"),
        ["ubee_uvw320b_status_scrape_errors_total 0"]
    );
    assert_eq!(samples(&body, "ubee_uvw320b_downstream_channel_snr_db").len(), 1);
    assert_eq!(
        samples(&body, "ubee_uvw320b_downstream_channel_correctable_errors_total"),
        ["ubee_uvw320b_downstream_channel_correctable_errors_total 12"]
    );
    assert_eq!(
        samples(&body, "ubee_uvw320b_uptime_seconds"),
        [format!(
            r#"ubee_uvw320b_uptime_seconds{{firmware="{MOCK_FIRMWARE}"}} {MOCK_UPTIME_SECS}"#
        )]
    );

    // One login and three pages per request.
    assert_eq!(app.fetcher.events().len(), 4);
}

#[tokio::test]
async fn each_request_scrapes_again() {
    let app = setup_test_app();

    get(app.router.clone(), METRICS_PATH).await;
    let (_, _, body) = get(app.router, METRICS_PATH).await;

    assert_eq!(
        samples(&body, "ubee_uvw320b_status_scrapes_total"),
        ["ubee_uvw320b_status_scrapes_total 2"]
    );
    assert_eq!(app.fetcher.events().len(), 8);
}

#[tokio::test]
async fn failed_scrape_still_publishes_counters() {
    let app = setup_test_app_with(MockPageFetcher::failing(MockFailure::Unreachable), METRICS_PATH);

    let (status, _, body) = get(app.router, METRICS_PATH).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        samples(&body, "ubee_uvw320b_status_scrapes_total"),
        ["ubee_uvw320b_status_scrapes_total 1"]
    );
    assert_eq!(
        samples(&body, "ubee_uvw320b_status_scrape_errors_total"),
        ["ubee_uvw320b_status_scrape_errors_total 1"]
    );
    assert!(samples(&body, "ubee_uvw320b_uptime_seconds").is_empty());
    assert!(samples(&body, "ubee_uvw320b_downstream_channel_snr_db").is_empty());
}

#[tokio::test]
async fn field_errors_are_published() {
    let fetcher = MockPageFetcher::with_pages([
        (ubee_core::Page::DocsisStatus, "tab:Docsis bad"),
        (ubee_core::Page::BasicStatus, "tab:Status"),
        (ubee_core::Page::Firmware, "tab:Firmware"),
    ]);
    let app = setup_test_app_with(fetcher, METRICS_PATH);

    let (_, _, body) = get(app.router, METRICS_PATH).await;

    assert_eq!(
        samples(&body, "ubee_uvw320b_field_decode_errors_total"),
        ["ubee_uvw320b_field_decode_errors_total 1"]
    );
    assert_eq!(
        samples(&body, "ubee_uvw320b_status_scrape_errors_total"),
        ["ubee_uvw320b_status_scrape_errors_total 0"]
    );
}

#[tokio::test]
async fn custom_metrics_path() {
    let app = setup_test_app_with(MockPageFetcher::with_default_pages(), "/modem-metrics");

    let (status, _, body) = get(app.router.clone(), "/modem-metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(samples(&body, "ubee_uvw320b_status_scrapes_total").len(), 1);

    let (status, _, _) = get(app.router.clone(), METRICS_PATH).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, headers, _) = get(app.router, "/").await;
    assert_eq!(status, StatusCode::MOVED_PERMANENTLY);
    assert_eq!(headers[header::LOCATION], "/modem-metrics");
}
