mod common;

use common::{control, page_body, pdf_page_texts};
use controls_report::{ControlFetcher, ReportEngine, ReportSettings, ReportStyle};
use httpmock::prelude::*;
use serde_json::json;

#[tokio::test]
async fn test_end_to_end_detailed_report() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/pages").query_param("page", "0");
        then.status(200).json_body(page_body(
            vec![
                control("10.1", json!("30")),
                control("2.10", json!("0")),
                control("2.1", json!("10")),
                control("2.2", json!("N/A")),
            ],
            1,
        ));
    });

    let settings = ReportSettings::default()
        .with_base_url(server.url("/pages"))
        .with_token("t");
    let engine = ReportEngine::new(ControlFetcher::new(settings).unwrap(), ReportStyle::Detailed);

    let report = engine.generate("org-1").await.unwrap();
    api_mock.assert();
    assert_eq!(report.filename, "controls_org-1.pdf");
    assert_eq!(report.control_count, 4);

    let pages = pdf_page_texts(&report.bytes);
    assert_eq!(pages.len(), 1);
    let lines = &pages[0];
    assert_eq!(lines[0], "OneTrust Controls Summary - Acme Holdings");
    assert_eq!(lines[1], "Average Score of Applicable Controls: 20.00");

    let identifiers: Vec<&str> = lines
        .iter()
        .filter_map(|line| line.strip_prefix("Identifier    : "))
        .collect();
    assert_eq!(identifiers, vec!["2.1", "2.2", "2.10", "10.1"]);

    let values: Vec<&str> = lines
        .iter()
        .filter_map(|line| line.strip_prefix("Value         : "))
        .collect();
    assert_eq!(values, vec!["10", "N/A", "N/A", "30"]);
}

#[tokio::test]
async fn test_basic_report_spans_pages() {
    let server = MockServer::start();
    let records: Vec<_> = (1..=30)
        .map(|i| control(&format!("1.{}", i), json!("5")))
        .collect();
    server.mock(|when, then| {
        when.method(POST).path("/pages");
        then.status(200).json_body(page_body(records, 1));
    });

    let settings = ReportSettings::default()
        .with_base_url(server.url("/pages"))
        .with_style(ReportStyle::Basic);
    let style = settings.style;
    let engine = ReportEngine::new(ControlFetcher::new(settings).unwrap(), style);

    let report = engine.generate("org-2").await.unwrap();
    let pages = pdf_page_texts(&report.bytes);

    // title + 30 controls * 5 lines = 151 sub-lines -> 4 pages of 50
    assert_eq!(pages.len(), 4);
    assert_eq!(pages[0][0], "OneTrust Controls Summary");
    assert!(pages.iter().flatten().all(|line| !line.starts_with("Value")));
    assert!(pages.iter().flatten().all(|line| !line.starts_with("Average")));
    assert_eq!(pages.iter().map(Vec::len).sum::<usize>(), 1 + 150);
}

#[tokio::test]
async fn test_upstream_failure_surfaces_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/pages");
        then.status(500).body("boom");
    });

    let settings = ReportSettings::default().with_base_url(server.url("/pages"));
    let engine = ReportEngine::new(ControlFetcher::new(settings).unwrap(), ReportStyle::Detailed);

    let err = engine.generate("org-3").await.unwrap_err();
    assert_eq!(err.to_string(), "Upstream returned 500 for page 0: boom");
}
