//! Agent action-group invocation tests
//!
//! Exercises the full handler pipeline through the router with a stubbed
//! data source: parameter normalization, response shaping at the flattening
//! threshold, and the response envelope.

mod support;

use axum::http::StatusCode;
use serde_json::{json, Value};

use support::{agent_event, observation_bundle, StubDataSource, StubFlow, TestApp};

fn flattened_rows(body: &str) -> Vec<Value> {
    let rows: Value = serde_json::from_str(
        body.strip_prefix("Observation results: ")
            .expect("body should carry flattened rows"),
    )
    .unwrap();
    rows.as_array().unwrap().clone()
}

#[tokio::test]
async fn observation_query_end_to_end() -> anyhow::Result<()> {
    let data_source = StubDataSource::new(observation_bundle(5));
    let app = TestApp::new(data_source.clone(), StubFlow::new(Vec::new()));

    let event = agent_event(
        "/Observation",
        json!([{"name": "code", "type": "string", "value": "98979-8, 38483-4"}]),
    );
    let (status, body) = app.post("/agent/invoke", &event).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["httpStatusCode"], 200);
    assert_eq!(body["response"]["apiPath"], "/Observation");
    assert_eq!(body["messageVersion"], "1.0");

    let text = body["response"]["responseBody"]["TEXT"]["body"]
        .as_str()
        .unwrap();
    assert!(text.starts_with("Observation results: "));
    let rows = flattened_rows(text);
    assert_eq!(rows[0], json!(["Date", "LOINC", "Observation", "Value"]));
    assert_eq!(rows.len(), 6);

    // The data source saw the normalized code list.
    let seen = data_source.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "/Observation");
    assert_eq!(
        seen[0].1,
        vec![("code".to_string(), "98979-8,38483-4".to_string())]
    );
    Ok(())
}

#[tokio::test]
async fn bundle_at_threshold_returns_raw_document() -> anyhow::Result<()> {
    let document = observation_bundle(4);
    let app = TestApp::new(StubDataSource::new(document.clone()), StubFlow::new(Vec::new()));

    let event = agent_event("/Observation", json!([]));
    let (status, body) = app.post("/agent/invoke", &event).await?;

    assert_eq!(status, StatusCode::OK);
    let text = body["response"]["responseBody"]["TEXT"]["body"]
        .as_str()
        .unwrap();
    assert!(!text.starts_with("Observation results: "));
    assert_eq!(serde_json::from_str::<Value>(text)?, document);
    Ok(())
}

#[tokio::test]
async fn bundle_above_threshold_is_flattened() -> anyhow::Result<()> {
    let app = TestApp::new(
        StubDataSource::new(observation_bundle(5)),
        StubFlow::new(Vec::new()),
    );

    let event = agent_event("/Observation", json!([]));
    let (_, body) = app.post("/agent/invoke", &event).await?;

    let text = body["response"]["responseBody"]["TEXT"]["body"]
        .as_str()
        .unwrap();
    assert!(text.starts_with("Observation results: "));
    Ok(())
}

#[tokio::test]
async fn non_observation_entries_do_not_appear_in_rows() -> anyhow::Result<()> {
    let mut document = observation_bundle(5);
    document["entry"]
        .as_array_mut()
        .unwrap()
        .push(json!({"resource": {"resourceType": "Patient", "id": "p1"}}));

    let app = TestApp::new(StubDataSource::new(document), StubFlow::new(Vec::new()));
    let (_, body) = app
        .post("/agent/invoke", &agent_event("/Observation", json!([])))
        .await?;

    let text = body["response"]["responseBody"]["TEXT"]["body"]
        .as_str()
        .unwrap();
    let rows = flattened_rows(text);
    // Header plus the five Observations; the Patient entry is skipped.
    assert_eq!(rows.len(), 6);
    Ok(())
}

#[tokio::test]
async fn non_bundle_document_passes_through() -> anyhow::Result<()> {
    let document = json!({"resourceType": "Patient", "id": "p1"});
    let app = TestApp::new(StubDataSource::new(document.clone()), StubFlow::new(Vec::new()));

    let event = agent_event("/Patient", json!([{"name": "_id", "value": "p1"}]));
    let (status, body) = app.post("/agent/invoke", &event).await?;

    assert_eq!(status, StatusCode::OK);
    let text = body["response"]["responseBody"]["TEXT"]["body"]
        .as_str()
        .unwrap();
    assert_eq!(serde_json::from_str::<Value>(text)?, document);
    Ok(())
}

#[tokio::test]
async fn flatten_threshold_is_configurable() -> anyhow::Result<()> {
    let mut config = steg::Config::default();
    config.shaping.flatten_threshold = 2;

    let app = TestApp::with_config(
        config,
        StubDataSource::new(observation_bundle(3)),
        StubFlow::new(Vec::new()),
    );
    let (_, body) = app
        .post("/agent/invoke", &agent_event("/Observation", json!([])))
        .await?;

    let text = body["response"]["responseBody"]["TEXT"]["body"]
        .as_str()
        .unwrap();
    assert!(text.starts_with("Observation results: "));
    Ok(())
}

#[tokio::test]
async fn health_check_responds() -> anyhow::Result<()> {
    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt as _;

    let app = TestApp::new(
        StubDataSource::new(json!({})),
        StubFlow::new(Vec::new()),
    );
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/health")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}
