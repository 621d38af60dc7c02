mod common;

use common::{controls, filter_body, page_body};
use controls_report::core::ControlSource;
use controls_report::{ControlFetcher, ReportError, ReportSettings};
use httpmock::prelude::*;
use serde_json::json;

fn settings(server: &MockServer) -> ReportSettings {
    ReportSettings::default()
        .with_base_url(server.url("/api/controls/v1/control-implementations/pages"))
        .with_token("secret-token")
}

#[tokio::test]
async fn test_accumulates_all_pages_in_arrival_order() {
    let server = MockServer::start();
    let path = "/api/controls/v1/control-implementations/pages";

    let page_mocks: Vec<_> = [(0, 50), (1, 50), (2, 7)]
        .into_iter()
        .map(|(page, count)| {
            server.mock(|when, then| {
                when.method(POST)
                    .path(path)
                    .query_param("page", page.to_string())
                    .query_param("size", "50")
                    .header("authorization", "Bearer secret-token")
                    .json_body(filter_body("org-123"));
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(page_body(controls(page + 1, count), 3));
            })
        })
        .collect();

    let fetcher = ControlFetcher::new(settings(&server)).unwrap();
    let records = fetcher.fetch_controls("org-123").await.unwrap();

    for mock in &page_mocks {
        mock.assert_hits(1);
    }
    assert_eq!(records.len(), 107);
    assert_eq!(records[0].identifier().as_deref(), Some("1.1"));
    assert_eq!(records[50].identifier().as_deref(), Some("2.1"));
    assert_eq!(records[106].identifier().as_deref(), Some("3.7"));
}

#[tokio::test]
async fn test_failed_page_aborts_without_partial_results() {
    let server = MockServer::start();
    let path = "/api/controls/v1/control-implementations/pages";

    let first = server.mock(|when, then| {
        when.method(POST).path(path).query_param("page", "0");
        then.status(200).json_body(page_body(controls(1, 50), 4));
    });
    let second = server.mock(|when, then| {
        when.method(POST).path(path).query_param("page", "1");
        then.status(502).body("bad gateway");
    });
    let third = server.mock(|when, then| {
        when.method(POST).path(path).query_param("page", "2");
        then.status(200).json_body(page_body(controls(3, 50), 4));
    });

    let fetcher = ControlFetcher::new(settings(&server)).unwrap();
    let err = fetcher.fetch_controls("org-123").await.unwrap_err();

    first.assert_hits(1);
    second.assert_hits(1);
    third.assert_hits(0);
    match err {
        ReportError::UpstreamStatus { status, page, body } => {
            assert_eq!(status, 502);
            assert_eq!(page, 1);
            assert_eq!(body, "bad gateway");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_and_missing_content_pages() {
    let server = MockServer::start();
    let path = "/api/controls/v1/control-implementations/pages";

    let first = server.mock(|when, then| {
        when.method(POST).path(path).query_param("page", "0");
        then.status(200).json_body(json!({"totalPages": 2}));
    });
    let second = server.mock(|when, then| {
        when.method(POST).path(path).query_param("page", "1");
        then.status(200).json_body(page_body(vec![], 2));
    });

    let fetcher = ControlFetcher::new(settings(&server)).unwrap();
    let records = fetcher.fetch_controls("org-123").await.unwrap();

    first.assert_hits(1);
    second.assert_hits(1);
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_zero_total_pages_stops_after_first_request() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/api/controls/v1/control-implementations/pages");
        then.status(200).json_body(page_body(vec![], 0));
    });

    let fetcher = ControlFetcher::new(settings(&server)).unwrap();
    let records = fetcher.fetch_controls("org-123").await.unwrap();

    mock.assert_hits(1);
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_configured_page_size_is_sent() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/controls/v1/control-implementations/pages")
            .query_param("size", "10");
        then.status(200).json_body(page_body(controls(1, 10), 1));
    });

    let config = ReportSettings {
        page_size: 10,
        ..settings(&server)
    };
    let fetcher = ControlFetcher::new(config).unwrap();
    let records = fetcher.fetch_controls("org-9").await.unwrap();

    mock.assert();
    assert_eq!(records.len(), 10);
}
