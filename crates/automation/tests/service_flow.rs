//! End-to-end service tests: enqueue through the real driver against a
//! scripted page surface.

mod common;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use tokio::sync::Semaphore;

use tilebot_automation::AutomationService;
use tilebot_core::job::UploadVariant;
use tilebot_core::{CoreError, FileStatus, ProgressStatus};

use common::{metadata, MockSurface};

fn paths(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(PathBuf::from).collect()
}

/// Poll until the queue reports the given session as current.
async fn wait_until_current(service: &AutomationService, session_id: &str) {
    for _ in 0..200 {
        let status = service.queue_status().await;
        if status
            .current_job
            .as_ref()
            .is_some_and(|c| c.session_id == session_id)
        {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("session {session_id} never became current");
}

/// The control entry registers a beat after the job becomes current,
/// so control calls in tests retry until the run is registered.
async fn signal_until_acknowledged<F, Fut>(mut call: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..200 {
        if call().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("control signal was never acknowledged");
}

#[tokio::test]
async fn mixed_batch_reports_every_file_and_completes() {
    let surface = Arc::new(
        MockSurface::new()
            .with_alamat("a.mbtiles", "Jl. Merdeka No. 17")
            .with_alamat("b.mbtiles", "   ")
            .failing_fill_on("c.mbtiles"),
    );
    let service = AutomationService::start();
    service.install_surface(surface.clone()).await;

    let (_token, mut events) = service.subscribe_progress("session_mixed").await;
    let receipt = service
        .enqueue_batch(
            UploadVariant::Mbtiles,
            metadata(),
            paths(&["a.mbtiles", "b.mbtiles", "c.mbtiles"]),
            Some("session_mixed".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(receipt.queue_position, 1);

    let results = receipt.outcome.await.unwrap().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].status, FileStatus::Success);
    assert_eq!(results[1].status, FileStatus::Skipped);
    assert_eq!(results[1].reason.as_deref(), Some("Empty alamat"));
    assert_eq!(results[2].status, FileStatus::Error);
    assert!(results[2].error.is_some());

    let mut statuses = Vec::new();
    while let Ok(event) = events.try_recv() {
        statuses.push(event.status);
    }
    assert_eq!(
        statuses,
        vec![
            ProgressStatus::Queued,
            ProgressStatus::QueueStarted,
            ProgressStatus::Started,
            ProgressStatus::Processing,
            ProgressStatus::Success,
            ProgressStatus::Processing,
            ProgressStatus::Skipped,
            ProgressStatus::Processing,
            ProgressStatus::Error,
            ProgressStatus::Completed,
        ]
    );

    // The MBTiles mode button was pressed, not the XYZ one.
    assert!(surface
        .calls()
        .contains(&"frame_click_value:Mbtiles Peta Foto Drones".to_string()));

    // The run's control entry is gone, so control calls report not-found.
    assert!(!service.pause("session_mixed").await);
    service.shutdown();
}

#[tokio::test]
async fn enqueue_without_browser_is_rejected() {
    let service = AutomationService::start();
    let result = service
        .enqueue_batch(
            UploadVariant::Xyz,
            metadata(),
            paths(&["dtm.zip"]),
            None,
        )
        .await;
    assert_matches!(result, Err(CoreError::BrowserNotReady));
    service.shutdown();
}

#[tokio::test]
async fn jobs_drain_serially_in_fifo_order() {
    let gate = Arc::new(Semaphore::new(0));
    let service = AutomationService::start();
    service
        .install_surface(Arc::new(MockSurface::new().gated(gate.clone())))
        .await;

    let (_token, mut second_events) = service.subscribe_progress("session_two").await;
    let first = service
        .enqueue_batch(
            UploadVariant::Mbtiles,
            metadata(),
            paths(&["one.mbtiles"]),
            Some("session_one".to_string()),
        )
        .await
        .unwrap();
    let second = service
        .enqueue_batch(
            UploadVariant::Mbtiles,
            metadata(),
            paths(&["two.mbtiles"]),
            Some("session_two".to_string()),
        )
        .await
        .unwrap();

    wait_until_current(&service, "session_one").await;
    let status = service.queue_status().await;
    assert!(status.is_processing);
    assert_eq!(status.queue_length, 1);
    assert_eq!(status.queued_jobs[0].session_id, "session_two");

    // While the first job holds the browser, the second has only been
    // queued; its queue_started must not fire yet.
    assert_eq!(
        second_events.recv().await.unwrap().status,
        ProgressStatus::Queued
    );
    assert_matches!(
        second_events.try_recv(),
        Err(tokio::sync::mpsc::error::TryRecvError::Empty)
    );

    gate.add_permits(1);
    let results = first.outcome.await.unwrap().unwrap();
    assert_eq!(results[0].status, FileStatus::Success);

    wait_until_current(&service, "session_two").await;
    assert_eq!(
        second_events.recv().await.unwrap().status,
        ProgressStatus::QueueStarted
    );

    gate.add_permits(1);
    let results = second.outcome.await.unwrap().unwrap();
    assert_eq!(results[0].status, FileStatus::Success);

    // The current-job marker clears just after the outcome resolves.
    for _ in 0..200 {
        if !service.queue_status().await.is_processing {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let status = service.queue_status().await;
    assert!(!status.is_processing);
    assert_eq!(status.queue_length, 0);
    service.shutdown();
}

#[tokio::test]
async fn waiting_job_can_be_removed_but_running_cannot() {
    let gate = Arc::new(Semaphore::new(0));
    let service = AutomationService::start();
    service
        .install_surface(Arc::new(MockSurface::new().gated(gate.clone())))
        .await;

    let running = service
        .enqueue_batch(
            UploadVariant::Mbtiles,
            metadata(),
            paths(&["running.mbtiles"]),
            Some("session_running".to_string()),
        )
        .await
        .unwrap();
    let waiting = service
        .enqueue_batch(
            UploadVariant::Mbtiles,
            metadata(),
            paths(&["waiting.mbtiles"]),
            Some("session_waiting".to_string()),
        )
        .await
        .unwrap();

    wait_until_current(&service, "session_running").await;
    assert!(service.remove_queued("session_waiting").await);
    assert!(!service.remove_queued("session_running").await);

    // The removed job's completion channel is dropped, never resolved.
    assert!(waiting.outcome.await.is_err());

    gate.add_permits(1);
    assert!(running.outcome.await.unwrap().is_ok());
    service.shutdown();
}

#[tokio::test]
async fn abort_interrupts_a_run_mid_file() {
    let gate = Arc::new(Semaphore::new(0));
    let service = AutomationService::start();
    service
        .install_surface(Arc::new(MockSurface::new().gated(gate.clone())))
        .await;

    let (_token, mut events) = service.subscribe_progress("session_abort").await;
    let receipt = service
        .enqueue_batch(
            UploadVariant::Mbtiles,
            metadata(),
            paths(&["first.mbtiles", "second.mbtiles"]),
            Some("session_abort".to_string()),
        )
        .await
        .unwrap();

    // Freeze the run inside the first file, then signal abort.
    wait_until_current(&service, "session_abort").await;
    signal_until_acknowledged(|| service.abort("session_abort")).await;
    gate.add_permits(2);

    let results = receipt.outcome.await.unwrap().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status, FileStatus::Aborted);
    assert_eq!(results[0].file, "first.mbtiles");

    let mut statuses = Vec::new();
    while let Ok(event) = events.try_recv() {
        statuses.push(event.status);
    }
    assert!(statuses.contains(&ProgressStatus::Aborted));
    assert_eq!(statuses.last(), Some(&ProgressStatus::Completed));

    assert!(!service.abort("session_abort").await);
    service.shutdown();
}

#[tokio::test]
async fn pause_holds_the_run_until_resumed() {
    let gate = Arc::new(Semaphore::new(0));
    let service = AutomationService::start();
    service
        .install_surface(Arc::new(MockSurface::new().gated(gate.clone())))
        .await;

    let receipt = service
        .enqueue_batch(
            UploadVariant::Xyz,
            metadata(),
            paths(&["dtm.zip"]),
            Some("session_pause".to_string()),
        )
        .await
        .unwrap();

    wait_until_current(&service, "session_pause").await;
    signal_until_acknowledged(|| service.pause("session_pause")).await;
    gate.add_permits(1);

    // Paused at the next gate: the run must not finish yet.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(service.queue_status().await.is_processing);

    assert!(service.resume("session_pause").await);
    let results = receipt.outcome.await.unwrap().unwrap();
    assert_eq!(results[0].status, FileStatus::Success);
    service.shutdown();
}

#[tokio::test]
async fn control_calls_for_unknown_sessions_report_not_found() {
    let service = AutomationService::start();
    assert!(!service.pause("session_none").await);
    assert!(!service.resume("session_none").await);
    assert!(!service.abort("session_none").await);
    assert!(!service.remove_queued("session_none").await);
    service.shutdown();
}

#[tokio::test]
async fn reconnected_observer_outlives_the_old_streams_teardown() {
    let service = AutomationService::start();
    service
        .install_surface(Arc::new(
            MockSurface::new().with_alamat("a.mbtiles", "Jl. Merdeka No. 17"),
        ))
        .await;

    // A client reconnects: the new stream replaces the old sink, then
    // the old stream's teardown runs late with its stale token.
    let (old_token, old_rx) = service.subscribe_progress("session_re").await;
    let (_new_token, mut events) = service.subscribe_progress("session_re").await;
    drop(old_rx);
    service.unsubscribe_progress("session_re", old_token).await;

    let receipt = service
        .enqueue_batch(
            UploadVariant::Mbtiles,
            metadata(),
            paths(&["a.mbtiles"]),
            Some("session_re".to_string()),
        )
        .await
        .unwrap();
    let results = receipt.outcome.await.unwrap().unwrap();
    assert_eq!(results[0].status, FileStatus::Success);

    // The replacement stream is still attached and saw the whole run.
    let mut statuses = Vec::new();
    while let Ok(event) = events.try_recv() {
        statuses.push(event.status);
    }
    assert!(statuses.contains(&ProgressStatus::Queued));
    assert!(statuses.contains(&ProgressStatus::Completed));
    service.shutdown();
}
