//! Viewer drivers against a mock chromedriver

use std::io::Write;

use navigator::control::FrameUpdate;
use navigator::gigapan::GigapanMetadata;
use navigator::viewer::{PointerViewer, ScriptViewer, ViewerInterface, WebDriverClient};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SESSION: &str = "/session/s1";

fn ok(value: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "value": value }))
}

async fn mount_session(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ok(json!({ "sessionId": "s1", "capabilities": {} })))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(SESSION))
        .respond_with(ok(Value::Null))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{SESSION}/url")))
        .respond_with(ok(Value::Null))
        .expect(1)
        .mount(server)
        .await;
}

fn update(dx: f64, dy: f64, cx: f64, cy: f64, zoom_delta: f64) -> FrameUpdate {
    FrameUpdate {
        pan_rate_x: 0.0,
        pan_rate_y: 0.0,
        dx,
        dy,
        cx,
        cy,
        zoom_delta,
        zoom_factor: 2f64.powf(zoom_delta),
    }
}

async fn bodies(server: &MockServer, suffix: &str) -> Vec<Value> {
    let wanted = format!("{SESSION}{suffix}");
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == wanted)
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn test_pointer_viewer_drags_canvas() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("{SESSION}/element")))
        .and(body_partial_json(json!({ "using": "tag name", "value": "canvas" })))
        .respond_with(ok(json!({ "element-6066-11e4-a52e-4f735466cecf": "c1" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{SESSION}/element/c1/rect")))
        .respond_with(ok(json!({ "x": 10.0, "y": 20.0, "width": 800.0, "height": 600.0 })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{SESSION}/actions")))
        .respond_with(ok(Value::Null))
        .expect(2)
        .mount(&server)
        .await;

    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        let mut viewer = PointerViewer::new(
            WebDriverClient::new(&uri),
            "http://www.gigapan.com/gigapans/117375",
            vec!["disable-infobars".to_string()],
        );
        viewer.prepare().unwrap();
        viewer.apply(&update(-1.6, 0.0, 1498.4, 400.0, 0.0)).unwrap();
    })
    .await
    .unwrap();

    let actions = bodies(&server, "/actions").await;
    assert_eq!(actions.len(), 2);

    // Setup: focus double click, then press at the canvas corner
    let setup = &actions[0]["actions"][0]["actions"];
    assert_eq!(setup.as_array().unwrap().len(), 7);
    assert_eq!(setup[5]["x"], json!(10));
    assert_eq!(setup[5]["y"], json!(20));
    assert_eq!(setup[6]["type"], json!("pointerDown"));

    let frame = &actions[1]["actions"][0]["actions"][0];
    assert_eq!(frame["type"], json!("pointerMove"));
    assert_eq!(frame["origin"], json!("viewport"));
    assert_eq!(frame["x"], json!(1508));
    assert_eq!(frame["y"], json!(420));
}

#[tokio::test]
async fn test_script_viewer_loads_and_pans() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("{SESSION}/execute/sync")))
        .respond_with(ok(Value::Null))
        .mount(&server)
        .await;

    let mut page = tempfile::Builder::new().suffix(".html").tempfile().unwrap();
    page.write_all(b"<html><body></body></html>").unwrap();
    let page_path = page.path().to_path_buf();

    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        let metadata = GigapanMetadata {
            id: "117375".to_string(),
            width: 154_368,
            height: 34_048,
            levels: 11,
        };
        let mut viewer = ScriptViewer::new(
            WebDriverClient::new(&uri),
            "http://www.gigapan.com/gigapans/117375",
            &page_path,
            Vec::new(),
        )
        .with_metadata(metadata);

        viewer.prepare().unwrap();
        // Idle frames send nothing
        viewer.apply(&update(0.0, 0.0, 1500.0, 400.0, 0.0)).unwrap();
        viewer.apply(&update(-1.6, 0.4, 1498.4, 400.4, 0.008)).unwrap();
    })
    .await
    .unwrap();

    let navigations = bodies(&server, "/url").await;
    let url = navigations[0]["url"].as_str().unwrap();
    assert!(url.starts_with("file://"));
    assert!(url.ends_with(".html"));

    let scripts = bodies(&server, "/execute/sync").await;
    assert_eq!(scripts.len(), 2);
    assert!(scripts[0]["script"].as_str().unwrap().contains("loadViewer"));
    assert_eq!(scripts[0]["args"], json!([117375, 154368, 34048, 11]));

    assert!(scripts[1]["script"].as_str().unwrap().contains("panBy"));
    let args = scripts[1]["args"].as_array().unwrap();
    assert_eq!(args[0], json!(-1.6));
    assert_eq!(args[1], json!(0.4));
    assert!((args[2].as_f64().unwrap() - 2f64.powf(0.008)).abs() < 1e-12);
}

#[tokio::test]
async fn test_script_viewer_reports_script_error() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("{SESSION}/execute/sync")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "value": {
                "error": "javascript error",
                "message": "loadViewer is not defined",
                "stacktrace": ""
            }
        })))
        .mount(&server)
        .await;

    let page = tempfile::Builder::new().suffix(".html").tempfile().unwrap();
    let page_path = page.path().to_path_buf();

    let uri = server.uri();
    let err = tokio::task::spawn_blocking(move || {
        let mut viewer = ScriptViewer::new(
            WebDriverClient::new(&uri),
            "http://www.gigapan.com/gigapans/5",
            &page_path,
            Vec::new(),
        )
        .with_metadata(GigapanMetadata {
            id: "5".to_string(),
            width: 100,
            height: 50,
            levels: 2,
        });
        viewer.prepare().unwrap_err()
    })
    .await
    .unwrap();

    assert!(err.to_string().contains("loadViewer is not defined"));
}
