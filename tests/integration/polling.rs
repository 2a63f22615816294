//! Watch loops: polling gate, idle stop and shutdown

use crate::fake::{done_records, record, FakeApi};
use crate::http_client::{create_api, record_json};
use pagewatch::detail::DetailWatcher;
use pagewatch::poller::{watch_detail, watch_table, PollScheduler, StopReason};
use pagewatch::table::ErrorSource;
use pagewatch::{ApiError, QueryState, RecordId, RecordStatus, TableController};
use serde_json::json;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test(start_paused = true)]
async fn test_watch_stops_once_everything_is_terminal() {
    let api = FakeApi::scripted(vec![
        vec![record(1, RecordStatus::Queued), record(2, RecordStatus::Done)],
        vec![record(1, RecordStatus::Running), record(2, RecordStatus::Done)],
        vec![record(1, RecordStatus::Done), record(2, RecordStatus::Done)],
    ]);
    let mut controller = TableController::new(api, QueryState::default());
    let mut scheduler = PollScheduler::new(Duration::from_secs(5));

    let started = Instant::now();
    let mut updates = 0;
    let summary = watch_table(
        &mut controller,
        &mut scheduler,
        std::future::pending(),
        true,
        |_| updates += 1,
    )
    .await;

    assert_eq!(summary.stopped, StopReason::Idle);
    assert_eq!(summary.requests, 2);
    assert_eq!(updates, 3);
    assert_eq!(started.elapsed(), Duration::from_secs(10));
    assert_eq!(controller.api().list_calls(), 3);
    assert!(!scheduler.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_failed_first_load_keeps_blocking_error() {
    let api = FakeApi::with_records(vec![record(1, RecordStatus::Running)]);
    api.fail_list(Some(ApiError::Network("Connection refused".to_string())));
    let mut controller = TableController::new(api, QueryState::default());
    let mut scheduler = PollScheduler::new(Duration::from_secs(5));

    let mut shown_error = false;
    let summary = watch_table(
        &mut controller,
        &mut scheduler,
        std::future::pending(),
        true,
        |view| shown_error = view.error.is_some(),
    )
    .await;

    // Nothing loaded, so nothing is active and the loop ends at once
    assert_eq!(summary.stopped, StopReason::Idle);
    assert_eq!(summary.requests, 0);
    assert!(shown_error);

    let error = controller.error().expect("refresh error kept");
    assert_eq!(error.source, ErrorSource::Refresh);
    assert!(error.blocks_view());
    assert!(controller.records().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_terminal_collection_never_polls() {
    let mut controller = TableController::new(FakeApi::with_records(done_records(3)), QueryState::default());
    let mut scheduler = PollScheduler::new(Duration::from_secs(5));

    let summary = watch_table(
        &mut controller,
        &mut scheduler,
        sleep(Duration::from_secs(60)),
        false,
        |_| {},
    )
    .await;

    assert_eq!(summary.stopped, StopReason::Shutdown);
    assert_eq!(summary.ticks, 0);
    assert_eq!(controller.api().list_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_releases_timer() {
    let api = FakeApi::with_records(vec![record(1, RecordStatus::Running)]);
    let mut controller = TableController::new(api, QueryState::default());
    let mut scheduler = PollScheduler::new(Duration::from_secs(5));

    let summary = watch_table(
        &mut controller,
        &mut scheduler,
        sleep(Duration::from_secs(12)),
        true,
        |_| {},
    )
    .await;

    assert_eq!(summary.stopped, StopReason::Shutdown);
    assert_eq!(summary.requests, 2);
    assert!(!scheduler.is_running());

    // No tick can fire once the loop has returned
    sleep(Duration::from_secs(60)).await;
    assert_eq!(controller.api().list_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_auto_refresh_off_keeps_timer_stopped() {
    let api = FakeApi::with_records(vec![record(1, RecordStatus::Running)]);
    let mut controller = TableController::new(api, QueryState::default());
    controller.set_auto_refresh(false);
    let mut scheduler = PollScheduler::new(Duration::from_secs(5));

    let summary = watch_table(
        &mut controller,
        &mut scheduler,
        sleep(Duration::from_secs(30)),
        false,
        |_| {},
    )
    .await;

    assert_eq!(summary.ticks, 0);
    assert_eq!(controller.api().list_calls(), 1);
}

#[tokio::test]
async fn test_watch_table_against_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/urls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "urls": [record_json(1, "running")],
            "total": 1,
            "page": 1,
            "limit": 10
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/urls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "urls": [record_json(1, "done")],
            "total": 1,
            "page": 1,
            "limit": 10
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut controller = TableController::new(create_api(&mock_server.uri()), QueryState::default());
    let mut scheduler = PollScheduler::new(Duration::from_millis(20));

    let summary = watch_table(
        &mut controller,
        &mut scheduler,
        sleep(Duration::from_secs(10)),
        true,
        |_| {},
    )
    .await;

    assert_eq!(summary.stopped, StopReason::Idle);
    assert_eq!(summary.requests, 1);
    assert_eq!(controller.records()[0].status, RecordStatus::Done);
}

#[tokio::test]
async fn test_watch_detail_until_done() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/urls/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(record_json(3, "running")))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/urls/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(record_json(3, "done")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut watcher = DetailWatcher::new(create_api(&mock_server.uri()), RecordId(3));
    let mut scheduler = PollScheduler::new(Duration::from_millis(20));

    let mut seen = Vec::new();
    let summary = watch_detail(
        &mut watcher,
        &mut scheduler,
        sleep(Duration::from_secs(10)),
        |record| seen.extend(record.map(|r| r.status)),
    )
    .await;

    assert_eq!(summary.stopped, StopReason::Idle);
    assert_eq!(summary.requests, 2);
    assert_eq!(
        seen,
        vec![RecordStatus::Running, RecordStatus::Running, RecordStatus::Done]
    );
    assert!(!watcher.is_active());
}
