//! Admission control and failure classification tests for dispatch.

use std::sync::Arc;
use std::time::Duration;

use uplink::channel::{CallSurface, Status};
use uplink::health::{HealthCell, HealthState};
use uplink::observability::LogRegistry;
use uplink::{ConnectionManager, DispatchError, Dispatcher};

mod common;
use common::{fixed_surface, test_config, wait_for, Behavior, ChannelScript, CountingSurface, ScriptedConnector};

fn manager(
    script: &ChannelScript,
    surface: Arc<CountingSurface>,
    poll_interval_ms: u64,
) -> ConnectionManager<String, String> {
    ConnectionManager::new(
        test_config("inventory", poll_interval_ms),
        ScriptedConnector::new(script.clone()),
        fixed_surface(surface),
        &LogRegistry::new(),
    )
}

#[tokio::test]
async fn dispatch_before_start_is_rejected() {
    let script = ChannelScript::new(true);
    let surface = CountingSurface::new(Behavior::Reply("pong".into()));
    let manager = manager(&script, Arc::clone(&surface), 20);

    let result = manager.dispatch("ping".into()).await;
    assert!(matches!(result, Err(DispatchError::Rejected { .. })));
    assert_eq!(surface.call_count(), 0);
}

#[tokio::test]
async fn successful_dispatch_returns_payload_unmodified() {
    let script = ChannelScript::new(true);
    let surface = CountingSurface::new(Behavior::Reply("exact-payload-9e51".into()));
    let manager = manager(&script, Arc::clone(&surface), 20);

    manager.start().await.unwrap();
    assert!(wait_for(Duration::from_secs(2), || manager.is_healthy()).await);

    let response = manager.dispatch("ping".into()).await.unwrap();
    assert_eq!(response, "exact-payload-9e51");
    assert_eq!(surface.call_count(), 1);

    manager.stop().await;
}

#[tokio::test]
async fn unhealthy_dependency_rejects_without_network_attempt() {
    let script = ChannelScript::new(true);
    let surface = CountingSurface::new(Behavior::Reply("pong".into()));
    let manager = manager(&script, Arc::clone(&surface), 20);

    manager.start().await.unwrap();
    assert!(wait_for(Duration::from_secs(2), || manager.is_healthy()).await);

    script.set_ready(false);
    assert!(wait_for(Duration::from_secs(2), || !manager.is_healthy()).await);

    let result = manager.dispatch("ping".into()).await;
    assert!(matches!(result, Err(DispatchError::Rejected { .. })));
    assert_eq!(surface.call_count(), 0);

    manager.stop().await;
}

#[tokio::test]
async fn deadline_exceeded_downgrades_health_and_gates_the_next_call() {
    // Component-level: drive the dispatcher directly so no monitor poll can
    // interleave between the failing call and the follow-up.
    let health = Arc::new(HealthCell::new());
    health.set(HealthState::Healthy);

    let surface = CountingSurface::new(Behavior::Delay(
        Duration::from_millis(500),
        "too late".into(),
    ));
    let dispatcher = Dispatcher::new(
        "inventory",
        Arc::clone(&surface) as Arc<dyn CallSurface<String, String>>,
        Arc::clone(&health),
        Duration::from_millis(50),
    );

    let result = dispatcher.dispatch("ping".into()).await;
    match result {
        Err(DispatchError::Transient { failure, .. }) => {
            assert_eq!(failure.status, Status::DeadlineExceeded);
        }
        other => panic!("expected transient deadline failure, got {:?}", other.err()),
    }
    assert_eq!(health.get(), HealthState::Unhealthy);

    // The very next dispatch is rejected by admission control, before the
    // monitor would ever have polled.
    let result = dispatcher.dispatch("ping".into()).await;
    assert!(matches!(result, Err(DispatchError::Rejected { .. })));
    assert_eq!(surface.call_count(), 1);
}

#[tokio::test]
async fn unavailable_status_downgrades_health() {
    let health = Arc::new(HealthCell::new());
    health.set(HealthState::Healthy);

    let surface = CountingSurface::new(Behavior::Fail(Status::Unavailable, "connection refused"));
    let dispatcher = Dispatcher::new(
        "inventory",
        Arc::clone(&surface) as Arc<dyn CallSurface<String, String>>,
        Arc::clone(&health),
        Duration::from_millis(200),
    );

    let result = dispatcher.dispatch("ping".into()).await;
    assert!(matches!(result, Err(DispatchError::Transient { .. })));
    assert_eq!(health.get(), HealthState::Unhealthy);
}

#[tokio::test]
async fn permanent_remote_error_leaves_health_untouched() {
    let health = Arc::new(HealthCell::new());
    health.set(HealthState::Healthy);

    let surface = CountingSurface::new(Behavior::Fail(Status::NotFound, "no such entity"));
    let dispatcher = Dispatcher::new(
        "inventory",
        Arc::clone(&surface) as Arc<dyn CallSurface<String, String>>,
        Arc::clone(&health),
        Duration::from_millis(200),
    );

    let result = dispatcher.dispatch("ping".into()).await;
    match result {
        Err(DispatchError::Remote { failure, .. }) => {
            assert_eq!(failure.status, Status::NotFound);
        }
        other => panic!("expected remote failure, got {:?}", other.err()),
    }
    assert_eq!(health.get(), HealthState::Healthy);

    // Still admitted: permanent errors say nothing about reachability.
    let _ = dispatcher.dispatch("ping".into()).await;
    assert_eq!(surface.call_count(), 2);
}
