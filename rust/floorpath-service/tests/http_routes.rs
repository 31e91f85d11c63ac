use std::io::Write;

use axum::{body::Body, http::{Request, StatusCode}, Router};
use floorpath_core::RoutingOptions;
use floorpath_service::{build_router, AppState, VenueState};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::NamedTempFile;
use tower::ServiceExt; // for `oneshot`

fn one_floor() -> Value {
    json!({
        "floors": [{
            "floor": 0,
            "rooms": [{ "id": "A", "anchor": [0, 0] }, { "id": "B", "anchor": [100, 0] }],
            "segments": [{ "p1": [0, 0], "p2": [100, 0] }]
        }]
    })
}

fn venue_file(v: &Value) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(v.to_string().as_bytes()).unwrap();
    tmp
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let v = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, v)
}

#[tokio::test]
async fn health_route_and_reload() {
    let file = venue_file(&one_floor());
    let state = AppState::new(VenueState::load(file.path().to_path_buf(), RoutingOptions::default()).unwrap());
    let app = build_router(state.clone());

    let (status, v) = call(&app, "GET", "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], "ok");

    let (status, v) = call(&app, "GET", "/version", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(v.get("core_version").is_some());

    let (status, v) = call(&app, "GET", "/readyz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["ready"], true);

    let (status, v) = call(&app, "GET", "/venue", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["floors"].as_array().unwrap().len(), 1);
    assert_eq!(v["floors"][0]["nodes"], 2);

    let req = json!({ "from": { "floor": 0, "room": "A" }, "to": { "floor": 0, "room": "B" } });
    let (status, v) = call(&app, "POST", "/route", Some(req)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["degraded"], false);
    assert_eq!(v["legs"][0]["kind"], "direct-route");
    assert_eq!(v["legs"][0]["bearing"]["compass"], "E");
    assert_eq!(v["legs"][0]["path"], json!([[0.0, 0.0], [100.0, 0.0]]));

    let req = json!({ "from": { "floor": 0, "room": "A" }, "to": { "floor": "-1", "room": "B" } });
    let (status, v) = call(&app, "POST", "/route", Some(req)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["error"]["code"], "not_found");

    // add a basement and reload
    let mut bigger = one_floor();
    bigger["floors"].as_array_mut().unwrap().push(json!({
        "floor": -1,
        "rooms": [{ "id": "C", "anchor": [5, 5] }],
        "segments": [{ "p1": [0, 0], "p2": [10, 0] }]
    }));
    std::fs::write(file.path(), bigger.to_string()).unwrap();
    let (status, v) = call(&app, "POST", "/admin/reload", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["reloaded"], true);
    assert_eq!(v["floors"], 2);
    assert_eq!(state.current.load().venue.as_ref().unwrap().floors().count(), 2);
}

#[tokio::test]
async fn without_venue_the_service_is_not_ready() {
    let app = build_router(AppState::new(VenueState::empty(None, RoutingOptions::default())));

    let (status, v) = call(&app, "GET", "/readyz", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(v["ready"], false);

    let req = json!({ "from": { "floor": 0, "room": "A" }, "to": { "floor": 0, "room": "B" } });
    let (status, v) = call(&app, "POST", "/route", Some(req)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(v["error"]["code"], "not_ready");

    let (status, _) = call(&app, "POST", "/admin/reload", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn broken_reload_keeps_serving_the_old_venue() {
    let file = venue_file(&one_floor());
    let state = AppState::new(VenueState::load(file.path().to_path_buf(), RoutingOptions::default()).unwrap());
    let app = build_router(state);

    std::fs::write(file.path(), "{ not json").unwrap();
    let (status, v) = call(&app, "POST", "/admin/reload", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(v["error"]["code"], "internal");

    let (status, _) = call(&app, "GET", "/venue", None).await;
    assert_eq!(status, StatusCode::OK);
}
