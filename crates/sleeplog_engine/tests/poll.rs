use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use sleeplog_core::{JobId, JobStatus};
use sleeplog_engine::{
    poll_job, poll_recommendation, ClientSettings, EngineEvent, EventSink, PollHandle,
    ReqwestSleepApi, SleepApi, JOB_POLL_NETWORK_RETRIES,
};
use tokio::runtime::Handle;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl TestSink {
    fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn api_for(server: &MockServer) -> Arc<dyn SleepApi> {
    let settings = ClientSettings {
        base_url: server.uri(),
        ..ClientSettings::default()
    };
    Arc::new(ReqwestSleepApi::new(settings).expect("client"))
}

async fn wait_finished(handle: &PollHandle) {
    for _ in 0..200 {
        if handle.is_finished() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("poll loop did not finish");
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

#[tokio::test]
async fn job_poll_reports_progress_then_success_and_stops() {
    sleeplog_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/celery-progress/abc123/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "state": "PROGRESS", "complete": false, "progress": {"percent": 40}
        })))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/celery-progress/abc123/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "state": "SUCCESS", "complete": true, "success": true, "progress": {"percent": 100}
        })))
        .mount(&server)
        .await;

    let sink = Arc::new(TestSink::default());
    let handle = poll_job(
        &Handle::current(),
        api_for(&server),
        JobId::new("abc123"),
        Duration::from_millis(10),
        sink.clone(),
    );
    wait_finished(&handle).await;

    assert_eq!(
        sink.take(),
        vec![
            EngineEvent::JobStatus {
                job_id: JobId::new("abc123"),
                status: JobStatus::Progress(40),
            },
            EngineEvent::JobStatus {
                job_id: JobId::new("abc123"),
                status: JobStatus::Success,
            },
        ]
    );
    assert_eq!(request_count(&server).await, 2);
    assert!(!handle.is_stopped());
}

#[tokio::test]
async fn job_poll_fails_the_job_on_http_error_and_stops() {
    sleeplog_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/celery-progress/gone/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let sink = Arc::new(TestSink::default());
    let handle = poll_job(
        &Handle::current(),
        api_for(&server),
        JobId::new("gone"),
        Duration::from_millis(10),
        sink.clone(),
    );
    wait_finished(&handle).await;

    assert_eq!(
        sink.take(),
        vec![EngineEvent::JobStatus {
            job_id: JobId::new("gone"),
            status: JobStatus::Failure("HTTP Code 404".into()),
        }]
    );
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn job_poll_fails_the_job_on_unreadable_body() {
    sleeplog_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let sink = Arc::new(TestSink::default());
    let handle = poll_job(
        &Handle::current(),
        api_for(&server),
        JobId::new("j2"),
        Duration::from_millis(10),
        sink.clone(),
    );
    wait_finished(&handle).await;

    let events = sink.take();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        EngineEvent::JobStatus { status: JobStatus::Failure(_), .. }
    ));
    assert_eq!(request_count(&server).await, 1);
}

fn slow_api_for(server: &MockServer) -> Arc<dyn SleepApi> {
    let settings = ClientSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(50),
        ..ClientSettings::default()
    };
    Arc::new(ReqwestSleepApi::new(settings).expect("client"))
}

#[tokio::test]
async fn job_poll_retries_timeouts_within_budget() {
    sleeplog_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "state": "FAILURE", "complete": true, "success": false, "result": "bad rows"
        })))
        .mount(&server)
        .await;

    let sink = Arc::new(TestSink::default());
    let handle = poll_job(
        &Handle::current(),
        slow_api_for(&server),
        JobId::new("j1"),
        Duration::from_millis(10),
        sink.clone(),
    );
    wait_finished(&handle).await;

    assert_eq!(
        sink.take(),
        vec![EngineEvent::JobStatus {
            job_id: JobId::new("j1"),
            status: JobStatus::Failure("bad rows".into()),
        }]
    );
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn job_poll_gives_up_after_repeated_timeouts() {
    sleeplog_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;

    let sink = Arc::new(TestSink::default());
    let handle = poll_job(
        &Handle::current(),
        slow_api_for(&server),
        JobId::new("j3"),
        Duration::from_millis(10),
        sink.clone(),
    );
    wait_finished(&handle).await;

    let events = sink.take();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        EngineEvent::JobStatus { status: JobStatus::Failure(_), .. }
    ));
    assert_eq!(
        request_count(&server).await,
        JOB_POLL_NETWORK_RETRIES as usize + 1
    );
}

#[tokio::test]
async fn recommendation_ready_after_three_empty_polls() {
    sleeplog_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("poll", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rec": ""})))
        .up_to_n_times(3)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("poll", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rec": "Sleep earlier.",
            "metric": {"sleep_efficiency": 87}
        })))
        .mount(&server)
        .await;

    let sink = Arc::new(TestSink::default());
    let handle = poll_recommendation(
        &Handle::current(),
        api_for(&server),
        Duration::from_millis(10),
        sink.clone(),
    );
    wait_finished(&handle).await;

    let events = sink.take();
    assert_eq!(events.len(), 1);
    match &events[0] {
        EngineEvent::RecommendationReady(response) => {
            assert_eq!(response.rec.as_deref(), Some("Sleep earlier."));
            assert_eq!(response.sleep_efficiency, Some(87.0));
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(request_count(&server).await, 4);
}

#[tokio::test]
async fn recommendation_poll_stops_on_transport_error() {
    sleeplog_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let sink = Arc::new(TestSink::default());
    let handle = poll_recommendation(
        &Handle::current(),
        api_for(&server),
        Duration::from_millis(10),
        sink.clone(),
    );
    wait_finished(&handle).await;

    assert!(sink.take().is_empty());
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn stopped_loop_sends_no_more_requests() {
    sleeplog_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rec": null})))
        .mount(&server)
        .await;

    let sink = Arc::new(TestSink::default());
    let handle = poll_recommendation(
        &Handle::current(),
        api_for(&server),
        Duration::from_millis(20),
        sink.clone(),
    );
    tokio::time::sleep(Duration::from_millis(70)).await;
    handle.stop();
    wait_finished(&handle).await;
    assert!(handle.is_stopped());
    tokio::time::sleep(Duration::from_millis(20)).await;

    let sent = request_count(&server).await;
    assert!(sent >= 1);
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(request_count(&server).await, sent);
    assert!(sink.take().is_empty());
}

#[tokio::test]
async fn dropping_the_handle_cancels_the_loop() {
    sleeplog_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"state": "PENDING"})))
        .mount(&server)
        .await;

    let handle = poll_job(
        &Handle::current(),
        api_for(&server),
        JobId::new("j-drop"),
        Duration::from_millis(20),
        Arc::new(TestSink::default()),
    );
    tokio::time::sleep(Duration::from_millis(50)).await;
    drop(handle);
    tokio::time::sleep(Duration::from_millis(30)).await;

    let sent = request_count(&server).await;
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(request_count(&server).await, sent);
}
