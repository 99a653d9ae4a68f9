use chrono::NaiveDate;
use dify_export::config::credentials::{CliFlag, CredentialChain};
use dify_export::{ExportEngine, ExportSettings, OutputMode};
use httpmock::prelude::*;
use tempfile::TempDir;

fn engine_for(
    server: &MockServer,
    temp_dir: &TempDir,
    page_size: usize,
) -> ExportEngine<dify_export::ConsoleClient, dify_export::LocalStorage, ExportSettings> {
    let settings = ExportSettings {
        base_url: server.base_url(),
        output_path: temp_dir.path().to_str().unwrap().to_string(),
        output_mode: OutputMode::Files,
        page_size,
        ..Default::default()
    };
    let token = CredentialChain::new().with(CliFlag::new("--token", Some("t".to_string())));
    let cookie = CredentialChain::new();
    ExportEngine::connect(settings, &token, &cookie).unwrap()
}

fn apps(range: std::ops::RangeInclusive<u32>) -> serde_json::Value {
    let data: Vec<serde_json::Value> = range
        .map(|i| serde_json::json!({"id": format!("app-{}", i), "name": format!("App {}", i)}))
        .collect();
    serde_json::json!({ "data": data })
}

#[tokio::test]
async fn test_short_page_ends_pagination() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();

    let page1 = server.mock(|when, then| {
        when.method(GET).path("/apps").query_param("page", "1").query_param("limit", "3");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(apps(1..=3));
    });
    let page2 = server.mock(|when, then| {
        when.method(GET).path("/apps").query_param("page", "2").query_param("limit", "3");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(apps(4..=5));
    });
    let page3 = server.mock(|when, then| {
        when.method(GET).path("/apps").query_param("page", "3");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(apps(6..=6));
    });

    let engine = engine_for(&server, &temp_dir, 3);
    let planned = engine
        .dry_run_on(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
        .await;

    page1.assert_hits(1);
    page2.assert_hits(1);
    page3.assert_hits(0);

    let ids: Vec<&str> = planned.iter().map(|p| p.item.id.as_str()).collect();
    assert_eq!(ids, vec!["app-1", "app-2", "app-3", "app-4", "app-5"]);
    assert_eq!(planned[0].file_name, "App 1_workflow_20240305.yaml");
}

#[tokio::test]
async fn test_exact_multiple_needs_one_empty_page() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();

    let page1 = server.mock(|when, then| {
        when.method(GET).path("/apps").query_param("page", "1");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(apps(1..=2));
    });
    let page2 = server.mock(|when, then| {
        when.method(GET).path("/apps").query_param("page", "2");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"data": []}));
    });

    let engine = engine_for(&server, &temp_dir, 2);
    let planned = engine
        .dry_run_on(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
        .await;

    page1.assert_hits(1);
    page2.assert_hits(1);
    assert_eq!(planned.len(), 2);
}

#[tokio::test]
async fn test_failed_page_keeps_earlier_items_and_exports_them() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/apps").query_param("page", "1");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(apps(1..=2));
    });
    let page2 = server.mock(|when, then| {
        when.method(GET).path("/apps").query_param("page", "2");
        then.status(503);
    });
    let page3 = server.mock(|when, then| {
        when.method(GET).path("/apps").query_param("page", "3");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(apps(5..=5));
    });
    let exports = server.mock(|when, then| {
        when.method(GET).path_contains("/export");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"data": "kind: app"}));
    });

    let engine = engine_for(&server, &temp_dir, 2);
    let report = engine
        .run_on(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
        .await
        .unwrap();

    page2.assert_hits(1);
    page3.assert_hits(0);
    exports.assert_hits(2);
    assert_eq!(report.attempted, 2);
    assert_eq!(report.succeeded, 2);
}

#[tokio::test]
async fn test_first_page_failure_reports_no_items() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();

    let page1 = server.mock(|when, then| {
        when.method(GET).path("/apps");
        then.status(401);
    });

    let engine = engine_for(&server, &temp_dir, 100);
    let report = engine
        .run_on(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
        .await
        .unwrap();

    page1.assert_hits(1);
    assert_eq!(report.attempted, 0);
    assert_eq!(report.succeeded, 0);
    assert_eq!(report.failed, 0);
    assert!(report.artifact.is_none());
}
