use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body, BodyDataStream},
    http::{Method, Request, StatusCode},
    Router,
};
use futures::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use timekeeper::{
    api::create_router,
    state::AppState,
    tasks::ManualScheduler,
};
use tower::ServiceExt;

struct Harness {
    router: Router,
    state: Arc<AppState>,
    scheduler: ManualScheduler,
}

impl Harness {
    fn new() -> Self {
        let scheduler = ManualScheduler::new();
        let state = Arc::new(AppState::with_scheduler(
            20553,
            "127.0.0.1".to_string(),
            Arc::new(scheduler.clone()),
        ));
        Self {
            router: create_router(Arc::clone(&state)),
            state,
            scheduler,
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(body) => {
                request = request.header("content-type", "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn open_events(&self) -> EventStream {
        let request = Request::builder().uri("/events").body(Body::empty()).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/event-stream");
        EventStream {
            body: response.into_body().into_data_stream(),
            buffer: String::new(),
        }
    }

    fn tick(&self) {
        self.scheduler.fire_all(self.state.as_ref());
    }
}

/// Reads server-sent events off a streaming response body
struct EventStream {
    body: BodyDataStream,
    buffer: String,
}

impl EventStream {
    /// Next event name and its JSON payload
    async fn next_event(&mut self) -> (String, Value) {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                let frame: String = self.buffer.drain(..end + 2).collect();
                let mut name = None;
                let mut data = String::new();
                for line in frame.lines() {
                    if let Some(value) = line.strip_prefix("event:") {
                        name = Some(value.trim().to_string());
                    } else if let Some(value) = line.strip_prefix("data:") {
                        data.push_str(value.trim_start());
                    }
                }
                if let Some(name) = name {
                    return (name, serde_json::from_str(&data).unwrap());
                }
                continue;
            }

            let chunk = tokio::time::timeout(Duration::from_secs(5), self.body.next())
                .await
                .expect("timed out waiting for an event")
                .expect("event stream ended")
                .unwrap();
            self.buffer.push_str(std::str::from_utf8(&chunk).unwrap());
        }
    }
}

#[tokio::test]
async fn create_and_list_units() {
    let harness = Harness::new();

    let (status, body) = harness
        .send(Method::POST, "/stopwatches", Some(json!({ "name": "Run" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["unit"]["name"], "Run");
    assert_eq!(body["unit"]["display"], "00:00:00");

    let (status, body) = harness
        .send(Method::POST, "/countdowns", Some(json!({ "minutes": "2", "seconds": 5 })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["unit"]["name"], "Countdown 2");
    assert_eq!(body["unit"]["progress"], 125);
    assert_eq!(body["unit"]["display"], "02:05");

    let (status, body) = harness.send(Method::GET, "/units", None).await;
    assert_eq!(status, StatusCode::OK);
    let kinds: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|unit| unit["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["stopwatch", "countdown"]);
}

#[tokio::test]
async fn lifecycle_through_http() {
    let harness = Harness::new();
    harness.send(Method::POST, "/stopwatches", Some(json!({}))).await;

    let (_, body) = harness.send(Method::POST, "/units/1/toggle", None).await;
    assert_eq!(body["status"], "applied");
    assert_eq!(body["unit"]["run_state"], "running");
    assert_eq!(body["unit"]["icon"], "pause");

    harness.tick();
    harness.tick();

    let (_, body) = harness.send(Method::POST, "/units/1/pause", None).await;
    assert_eq!(body["unit"]["progress"], 2);
    assert_eq!(body["unit"]["icon"], "play");

    let (_, body) = harness.send(Method::POST, "/units/1/pause", None).await;
    assert_eq!(body["status"], "ignored");

    let (_, body) = harness.send(Method::POST, "/units/1/resume", None).await;
    assert_eq!(body["unit"]["run_state"], "running");

    let (_, body) = harness.send(Method::POST, "/units/1/stop", None).await;
    assert_eq!(body["unit"]["run_state"], "stopped");
    assert_eq!(body["unit"]["progress"], 0);
    assert!(harness.scheduler.live().is_empty());
}

#[tokio::test]
async fn zero_countdown_start_is_ignored_and_duration_can_be_set() {
    let harness = Harness::new();
    harness.send(Method::POST, "/countdowns", Some(json!({ "name": "Eggs" }))).await;

    let (status, body) = harness.send(Method::POST, "/units/1/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ignored");
    assert_eq!(body["unit"]["run_state"], "idle");

    let (_, body) = harness
        .send(Method::PUT, "/units/1/duration", Some(json!({ "minutes": "abc", "seconds": "3" })))
        .await;
    assert_eq!(body["status"], "applied");
    assert_eq!(body["unit"]["progress"], 3);

    harness.send(Method::POST, "/units/1/start", None).await;
    let (_, body) = harness
        .send(Method::PUT, "/units/1/duration", Some(json!({ "minutes": 1 })))
        .await;
    assert_eq!(body["status"], "ignored");

    for _ in 0..3 {
        harness.tick();
    }
    let (_, body) = harness.send(Method::GET, "/units/1", None).await;
    assert_eq!(body["run_state"], "stopped");
    assert_eq!(body["progress"], 0);
}

#[tokio::test]
async fn rename_unit() {
    let harness = Harness::new();
    harness.send(Method::POST, "/stopwatches", Some(json!({}))).await;

    let (status, body) = harness
        .send(Method::PUT, "/units/1/name", Some(json!({ "name": "Plank" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unit"]["name"], "Plank");
}

#[tokio::test]
async fn delete_by_id_and_position() {
    let harness = Harness::new();
    for _ in 0..3 {
        harness.send(Method::POST, "/stopwatches", Some(json!({}))).await;
    }
    harness.send(Method::POST, "/units/2/start", None).await;

    let (status, body) = harness.send(Method::DELETE, "/positions/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "removed");
    assert_eq!(body["unit"]["id"], 2);
    assert_eq!(body["unit"]["run_state"], "stopped");
    assert!(harness.scheduler.live().is_empty());

    let (status, _) = harness.send(Method::DELETE, "/units/3", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = harness.send(Method::GET, "/units", None).await;
    assert_eq!(body, json!([{
        "id": 1,
        "kind": "stopwatch",
        "name": "Stopwatch 1",
        "progress": 0,
        "run_state": "idle",
        "icon": "play",
        "display": "00:00:00",
        "ticking": false
    }]));
}

#[tokio::test]
async fn missing_units_are_not_found() {
    let harness = Harness::new();

    let (status, body) = harness.send(Method::DELETE, "/positions/0", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "position 0 is out of range for 0 units");

    let (status, _) = harness.send(Method::POST, "/units/9/start", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = harness.send(Method::GET, "/units/9", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_and_health() {
    let harness = Harness::new();
    harness.send(Method::POST, "/stopwatches", Some(json!({}))).await;
    harness.send(Method::POST, "/units/1/start", None).await;

    let (status, body) = harness.send(Method::GET, "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["running"], 1);
    assert_eq!(body["port"], 20553);
    assert_eq!(body["last_action"], "start #1");

    let (status, body) = harness.send(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn events_stream_reports_changes_in_order() {
    let harness = Harness::new();
    let mut events = harness.open_events().await;

    harness
        .send(Method::POST, "/countdowns", Some(json!({ "name": "Tea", "seconds": 2 })))
        .await;
    harness.send(Method::POST, "/units/1/start", None).await;
    harness.tick();
    harness.tick();
    harness.send(Method::DELETE, "/units/1", None).await;

    let (name, data) = events.next_event().await;
    assert_eq!(name, "added");
    assert_eq!(data["event"], "added");
    assert_eq!(data["unit"]["name"], "Tea");
    assert_eq!(data["unit"]["run_state"], "idle");

    let (name, data) = events.next_event().await;
    assert_eq!(name, "changed");
    assert_eq!(data["unit"]["run_state"], "running");

    let (name, data) = events.next_event().await;
    assert_eq!(name, "changed");
    assert_eq!(data["unit"]["progress"], 1);

    let (name, data) = events.next_event().await;
    assert_eq!(name, "changed");
    assert_eq!(data["unit"]["progress"], 0);
    assert_eq!(data["unit"]["run_state"], "stopped");

    let (name, data) = events.next_event().await;
    assert_eq!(name, "removed");
    assert_eq!(data["unit"]["id"], 1);
}

#[tokio::test]
async fn events_stream_recovers_after_falling_behind() {
    let harness = Harness::new();
    harness.send(Method::POST, "/stopwatches", Some(json!({}))).await;
    harness.send(Method::POST, "/units/1/start", None).await;
    let mut events = harness.open_events().await;

    for _ in 0..250 {
        harness.tick();
    }

    let (name, data) = events.next_event().await;
    assert_eq!(name, "changed");
    let first = data["unit"]["progress"].as_u64().unwrap();
    assert!(first > 1, "expected lagged events to be skipped, got progress {}", first);

    let (_, data) = events.next_event().await;
    assert_eq!(data["unit"]["progress"].as_u64().unwrap(), first + 1);

    harness.send(Method::POST, "/units/1/pause", None).await;
    let mut last = None;
    while last.is_none() {
        let (_, data) = events.next_event().await;
        if data["unit"]["run_state"] == "paused" {
            last = Some(data);
        }
    }
    assert_eq!(last.unwrap()["unit"]["progress"], 250);
}

#[tokio::test]
async fn unusable_duration_values_fall_back_to_zero() {
    let harness = Harness::new();

    let (status, body) = harness
        .send(Method::POST, "/countdowns", Some(json!({ "minutes": null, "seconds": 1.5 })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["unit"]["progress"], 0);

    let (status, body) = harness
        .send(Method::PUT, "/units/1/duration", Some(json!({ "minutes": true, "seconds": 9 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unit"]["progress"], 9);
}
