//! Health and metrics endpoint tests.

mod common;

use common::TestApp;

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn().await;

    let response = reqwest::Client::new()
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "pos-service");
}

#[tokio::test]
async fn readiness_check_works() {
    let app = TestApp::spawn().await;

    let response = reqwest::Client::new()
        .get(format!("{}/ready", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn metrics_endpoint_exposes_prometheus_text() {
    let app = TestApp::spawn().await;

    let response = reqwest::Client::new()
        .get(format!("{}/metrics", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"));
    // Body parses as Prometheus text format (possibly empty before traffic).
    response.text().await.unwrap();
}
